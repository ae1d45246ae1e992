//! Message source adapter.
//!
//! Turns a real-time session's chat event stream into an ordered, deduplicated
//! message sequence with stable identity. [`MessageSource`] is the only writer;
//! everything downstream reads through a [`MessageFeed`].

use crate::error::SourceError;
use crate::message::{ChatEvent, Message, MessageId};

use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Immutable snapshot of the transcript in arrival order
pub type MessageSequence = Arc<[Message]>;

/// Health of the underlying event subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceStatus {
    /// No stream attached yet
    #[default]
    Idle,
    /// Events are flowing
    Live,
    /// Last stream ended or failed; the sequence is frozen
    Disconnected,
}

/// What a single ingested event did to the sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest {
    /// New id, appended at the end
    Appended(MessageId),
    /// Known id, updated in place
    Edited(MessageId),
    /// Rejected without touching the sequence
    Dropped(SourceError),
}

/// Why [`MessageSource::drive`] returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// Stream finished cleanly
    Ended,
    /// Stream reported a transport failure
    Failed(SourceError),
}

/// Owner of the message sequence
#[derive(Debug)]
pub struct MessageSource {
    messages: Vec<Message>,
    positions: HashMap<MessageId, usize>,
    dropped: usize,
    sequence_tx: watch::Sender<MessageSequence>,
    status_tx: watch::Sender<SourceStatus>,
}

impl MessageSource {
    pub fn new() -> Self {
        let (sequence_tx, _) = watch::channel(MessageSequence::from(Vec::new()));
        let (status_tx, _) = watch::channel(SourceStatus::Idle);
        Self { messages: Vec::new(), positions: HashMap::new(), dropped: 0, sequence_tx, status_tx }
    }

    /// Live, read-only view of the sequence
    pub fn subscribe(&self) -> MessageFeed {
        MessageFeed { sequence_rx: self.sequence_tx.subscribe(), status_rx: self.status_tx.subscribe() }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of events rejected so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn status(&self) -> SourceStatus {
        *self.status_tx.borrow()
    }

    /// Apply one event
    ///
    /// New ids append in arrival order regardless of their timestamps; a known
    /// id is updated in place and keeps its position.
    pub fn ingest(&mut self, event: ChatEvent) -> Ingest {
        let message = match event.into_message() {
            Ok(message) => message,
            Err(err) => {
                self.dropped += 1;
                warn!(error = %err, dropped = self.dropped, "dropping malformed chat event");
                return Ingest::Dropped(err);
            }
        };

        let id = message.id.clone();
        let result = match self.positions.get(&id) {
            Some(&position) => {
                self.messages[position].apply_update(message);
                debug!(message_id = %id, position, "updated message in place");
                Ingest::Edited(id)
            }
            None => {
                let position = self.messages.len();
                debug!(message_id = %id, position, origin = message.origin().as_str(), "appended message");
                self.positions.insert(id.clone(), position);
                self.messages.push(message);
                Ingest::Appended(id)
            }
        };

        self.publish();
        result
    }

    /// Consume an event stream until it ends or fails
    ///
    /// The sequence survives either outcome, so calling `drive` again with a
    /// fresh stream after a reconnect continues the same transcript and
    /// re-delivered ids are folded into their existing entries.
    pub async fn drive<S>(&mut self, mut stream: S) -> DriveOutcome
    where
        S: Stream<Item = Result<ChatEvent, SourceError>> + Unpin,
    {
        self.status_tx.send_replace(SourceStatus::Live);
        info!(existing = self.messages.len(), "message source attached");

        let outcome = loop {
            match stream.next().await {
                Some(Ok(event)) => {
                    self.ingest(event);
                }
                Some(Err(SourceError::MissingId)) => {
                    self.dropped += 1;
                    warn!(dropped = self.dropped, "transport delivered an event without an id");
                }
                Some(Err(err)) => break DriveOutcome::Failed(err),
                None => break DriveOutcome::Ended,
            }
        };

        self.status_tx.send_replace(SourceStatus::Disconnected);
        match &outcome {
            DriveOutcome::Ended => info!(retained = self.messages.len(), "message source detached"),
            DriveOutcome::Failed(err) => {
                warn!(error = %err, retained = self.messages.len(), "message source failed; keeping last sequence")
            }
        }

        outcome
    }

    fn publish(&self) {
        self.sequence_tx.send_replace(MessageSequence::from(self.messages.clone()));
    }
}

impl Default for MessageSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only subscription to a [`MessageSource`]
///
/// Keeps returning the last published sequence even after the source is gone.
#[derive(Debug, Clone)]
pub struct MessageFeed {
    sequence_rx: watch::Receiver<MessageSequence>,
    status_rx: watch::Receiver<SourceStatus>,
}

impl MessageFeed {
    /// Current sequence, marking it as seen
    pub fn snapshot(&mut self) -> MessageSequence {
        self.sequence_rx.borrow_and_update().clone()
    }

    /// Current sequence without marking it as seen
    pub fn peek(&self) -> MessageSequence {
        self.sequence_rx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.sequence_rx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> SourceStatus {
        *self.status_rx.borrow()
    }

    /// Whether a sequence newer than the last snapshot is available
    pub fn has_changed(&self) -> bool {
        self.sequence_rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next published sequence
    ///
    /// Returns `SourceError::Closed` once the source has been dropped; the last
    /// sequence stays readable through [`MessageFeed::peek`].
    pub async fn changed(&mut self) -> Result<(), SourceError> {
        self.sequence_rx.changed().await.map_err(|_| SourceError::Closed)
    }
}
