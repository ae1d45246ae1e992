mod event_loop;

use crate::session::{SessionSignal, SessionUpdate, SessionView};
use crate::transcript::Politeness;

use crossterm::event::Event;
use ratatui::Frame;
use std::io::Result;
use std::time::Duration;
use tracing::debug;
use voxline_core::SessionError;
use voxline_core::logging::{PrivacyConfig, redact_body};

/// How a session ended without a fatal error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// The user left
    Left,
    /// The transport ended the session
    Ended(String),
}

/// Main TUI application: one mounted session view plus frame bookkeeping
pub struct App {
    session: SessionView,
    outcome: Option<SessionSignal>,
    dirty: bool,
    privacy: PrivacyConfig,
}

impl App {
    pub fn new(session: SessionView) -> Self {
        Self { session, outcome: None, dirty: true, privacy: PrivacyConfig::default() }
    }

    /// How much of each announced message reaches the log
    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn session(&self) -> &SessionView {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionView {
        &mut self.session
    }

    pub fn should_exit(&self) -> bool {
        self.outcome.is_some()
    }

    /// Run the TUI until the session ends
    pub async fn run(&mut self) -> Result<()> {
        event_loop::run(self).await
    }

    /// Handle a terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                if let Some(signal) = self.session.handle_key(key) {
                    self.outcome = Some(signal);
                }
                self.dirty = true;
            }
            Event::Resize(_, _) | Event::FocusGained => self.dirty = true,
            _ => {}
        }
    }

    /// Handle a feed, connection, or watchdog update
    pub fn handle_update(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::Messages => {
                for text in self.session.take_announcements() {
                    let text = redact_body(&text, &self.privacy);
                    debug!(target: "voxline::announce", politeness = Politeness::Polite.as_str(), "{text}");
                }
            }
            SessionUpdate::Connection(_) => {}
            SessionUpdate::Signal(signal) => {
                if let SessionSignal::Teardown(err) = &signal {
                    self.session.teardown(err);
                }
                self.outcome = Some(signal);
            }
        }
        self.dirty = true;
    }

    /// Advance animations; marks the frame dirty while anything moves
    pub fn tick(&mut self, dt: Duration) {
        if self.session.is_animating() {
            self.session.tick(dt);
            self.dirty = true;
        }
    }

    /// Whether a redraw is due; clears the flag
    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        self.session.render(frame, area);
    }

    /// Map the final signal to the caller's result
    ///
    /// Fatal errors such as a connection timeout are returned, never swallowed.
    pub fn finish(mut self) -> std::result::Result<SessionExit, SessionError> {
        self.session.unmount();
        match self.outcome.take() {
            None | Some(SessionSignal::Leave) => Ok(SessionExit::Left),
            Some(SessionSignal::Teardown(err)) if err.is_fatal() => Err(err),
            Some(SessionSignal::Teardown(err)) => Ok(SessionExit::Ended(err.to_string())),
        }
    }
}
