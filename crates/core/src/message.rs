//! Transcript data model: messages, their identity, and the inbound chat event contract.

use crate::error::SourceError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adapter-assigned message identity, unique within a session
///
/// This is the only key used for re-render and animation continuity; array
/// position is never used as identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create an id, rejecting empty or whitespace-only values
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() { None } else { Some(Self(id)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creation or edit instant of a message
///
/// Accepts epoch milliseconds (integer or float) or an RFC 3339 / ISO-8601 string
/// on the wire and serializes back to epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimestamp", into = "i64")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Parse an ISO-8601 string or a decimal epoch-millisecond string
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(millis) = text.parse::<i64>() {
            return Self::from_millis(millis);
        }
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.millis()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

impl TryFrom<RawTimestamp> for Timestamp {
    type Error = String;

    fn try_from(raw: RawTimestamp) -> Result<Self, Self::Error> {
        match raw {
            RawTimestamp::Millis(ms) => Self::from_millis(ms).ok_or_else(|| format!("timestamp out of range: {ms}")),
            RawTimestamp::Fractional(ms) => {
                Self::from_millis(ms as i64).ok_or_else(|| format!("timestamp out of range: {ms}"))
            }
            RawTimestamp::Text(text) => Self::parse(&text).ok_or_else(|| format!("invalid timestamp: {text}")),
        }
    }
}

/// Which side of the conversation a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// This session's own participant
    Local,
    /// The counterpart (assistant)
    Remote,
}

impl Origin {
    pub fn from_is_local(is_local: bool) -> Self {
        if is_local { Origin::Local } else { Origin::Remote }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Local => "local",
            Origin::Remote => "remote",
        }
    }
}

/// Sender metadata carried by every chat event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Sole authority for origin classification
    pub is_local: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl Participant {
    pub fn local() -> Self {
        Self { is_local: true, identity: None }
    }

    pub fn remote() -> Self {
        Self { is_local: false, identity: None }
    }
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub timestamp: Option<Timestamp>,
    pub edit_timestamp: Option<Timestamp>,
    pub from: Participant,
    /// Raw text, rendered literally
    pub body: String,
}

impl Message {
    /// Origin derived from the sender's locality flag on every call
    pub fn origin(&self) -> Origin {
        Origin::from_is_local(self.from.is_local)
    }

    pub fn is_local(&self) -> bool {
        self.origin() == Origin::Local
    }

    pub fn is_edited(&self) -> bool {
        self.edit_timestamp.is_some()
    }

    /// Apply a re-delivered update for the same id in place
    ///
    /// The creation timestamp is kept when the update omits it.
    pub(crate) fn apply_update(&mut self, update: Message) {
        debug_assert_eq!(self.id, update.id);
        self.body = update.body;
        self.from = update.from;
        if update.timestamp.is_some() {
            self.timestamp = update.timestamp;
        }
        if update.edit_timestamp.is_some() {
            self.edit_timestamp = update.edit_timestamp;
        }
    }
}

/// Inbound chat event as delivered by the real-time session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub edit_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub from: Participant,
    pub message: String,
}

impl ChatEvent {
    pub fn new(id: impl Into<String>, from: Participant, message: impl Into<String>) -> Self {
        Self { id: Some(id.into()), timestamp: None, edit_timestamp: None, from, message: message.into() }
    }

    /// Event from the remote counterpart
    pub fn remote(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Participant::remote(), message)
    }

    /// Event from this session's own participant
    pub fn local(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Participant::local(), message)
    }

    pub fn at(mut self, millis: i64) -> Self {
        self.timestamp = Timestamp::from_millis(millis);
        self
    }

    pub fn edited_at(mut self, millis: i64) -> Self {
        self.edit_timestamp = Timestamp::from_millis(millis);
        self
    }

    /// Convert into a message, rejecting events without an id
    pub fn into_message(self) -> Result<Message, SourceError> {
        let id = self.id.and_then(MessageId::new).ok_or(SourceError::MissingId)?;
        Ok(Message {
            id,
            timestamp: self.timestamp,
            edit_timestamp: self.edit_timestamp,
            from: self.from,
            body: self.message,
        })
    }
}
