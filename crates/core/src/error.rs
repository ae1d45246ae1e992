use thiserror::Error;

/// Result type alias for voxline-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the voxline session front-end
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session lifecycle errors
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Message source errors
    #[error("message source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),
}

/// Session lifecycle errors
///
/// A `ConnectionTimeout` is terminal: whoever receives it must tear the session
/// view down and propagate it, never swallow it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No successful connection within the watchdog bound
    #[error("no connection established within {bound_ms} ms")]
    ConnectionTimeout { bound_ms: u64 },

    /// Transport reported a disconnect
    #[error("session disconnected: {0}")]
    Disconnected(String),
}

impl SessionError {
    /// Whether the session cannot continue after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }
}

/// Errors raised while ingesting chat events
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Event arrived without an adapter-assigned id
    #[error("chat event is missing an id")]
    MissingId,

    /// Underlying transport failed
    #[error("transport failure: {0}")]
    Transport(String),

    /// Event stream was closed by the transport
    #[error("event stream closed")]
    Closed,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
