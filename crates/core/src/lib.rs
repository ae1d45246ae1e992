pub mod config;
pub mod connection;
pub mod debug;
pub mod error;
pub mod logging;
pub mod message;
pub mod source;
pub mod watchdog;

pub use config::{Config, DisplayConfig, FALLBACK_LOCALE, ScrollPolicy, SessionConfig};
pub use connection::{ConnectionMonitor, ConnectionState};
pub use error::{Error, Result, SessionError, SourceError};
pub use message::{ChatEvent, Message, MessageId, Origin, Participant, Timestamp};
pub use source::{DriveOutcome, Ingest, MessageFeed, MessageSequence, MessageSource, SourceStatus};
pub use watchdog::{ConnectionWatchdog, WatchdogExit, WatchdogHandle, WatchdogSignal};

#[doc(hidden)]
pub use tracing as __tracing;
