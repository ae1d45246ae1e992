pub mod app;
pub mod components;
pub mod event_handler;
pub mod layout;
pub mod presence;
pub mod session;
pub mod state;
pub mod theme;
pub mod time_format;
pub mod transcript;

pub use app::{App, SessionExit};
pub use event_handler::{EventHandler, KeyAction};
pub use presence::{Presence, PresenceState, RowStagger};
pub use session::{
    Control, ControlAction, ControlCapabilities, SessionLinks, SessionPhase, SessionSignal, SessionUiState,
    SessionUpdate, SessionView, TransportCommand,
};
pub use theme::{Theme, ThemePalette};
pub use time_format::TimeFormatter;
pub use transcript::{ScrollController, TranscriptRow, TranscriptView};
