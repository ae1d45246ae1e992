//! Session orchestrator.
//!
//! [`SessionView`] composes the transcript, the control bar and the pre-connect
//! banner, owns the `chat_open` flag, and ties the view's lifetime to the
//! connection watchdog and the debug hook: both are armed on mount and released
//! on unmount or teardown.

mod controls;
mod debug_hook;

pub use controls::{Control, ControlAction, ControlCapabilities, MediaState};
pub use debug_hook::DebugHook;

use crate::components::{ControlBar, Header, PreConnectBanner, Stage};
use crate::event_handler::{EventHandler, KeyAction, KeyContext, ScrollKey};
use crate::layout::SessionLayout;
use crate::presence::PresenceState;
use crate::state::{ChatComposer, ExitState};
use crate::theme::{Theme, ThemePalette};
use crate::time_format::TimeFormatter;
use crate::transcript::TranscriptView;

use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect, style::Style, widgets::Block};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use voxline_core::{
    Config, ConnectionState, ConnectionWatchdog, Message, MessageFeed, MessageSequence, SessionConfig, SessionError,
    SourceStatus, WatchdogHandle, WatchdogSignal,
};

/// Requests the session view sends to the real-time transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    SetMicrophone(bool),
    SetCamera(bool),
    SetScreenShare(bool),
    SendChat(String),
    Disconnect,
}

/// Channels connecting a session view to its transport
#[derive(Debug)]
pub struct SessionLinks {
    pub feed: MessageFeed,
    pub connection: watch::Receiver<ConnectionState>,
    pub commands: mpsc::UnboundedSender<TransportCommand>,
}

/// Why the session view is going away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// Session must end; the error is propagated to the caller
    Teardown(SessionError),
    /// The user left
    Leave,
}

/// Something the event loop should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Messages,
    Connection(ConnectionState),
    Signal(SessionSignal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Mounted,
    TornDown,
}

/// View-level state owned by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUiState {
    pub chat_open: bool,
    pub controls: ControlCapabilities,
}

impl SessionUiState {
    pub fn new(config: &SessionConfig) -> Self {
        Self { chat_open: false, controls: ControlCapabilities::from_session(config) }
    }
}

pub struct SessionView {
    config: SessionConfig,
    agent_name: String,
    ui: SessionUiState,
    media: MediaState,
    composer: ChatComposer,
    exit: ExitState,
    transcript: TranscriptView,
    feed: MessageFeed,
    feed_open: bool,
    messages: MessageSequence,
    connection: watch::Receiver<ConnectionState>,
    connection_open: bool,
    connection_state: ConnectionState,
    ever_connected: bool,
    commands: mpsc::UnboundedSender<TransportCommand>,
    watchdog: Option<WatchdogHandle>,
    watchdog_signal: WatchdogSignal,
    debug_hook: Option<DebugHook>,
    phase: SessionPhase,
    theme: ThemePalette,
}

impl SessionView {
    /// Mount the view: arm the watchdog and register the debug hook
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(config: &Config, links: SessionLinks) -> Self {
        let SessionLinks { mut feed, mut connection, commands } = links;
        let session = config.session.clone();

        let (watchdog, watchdog_signal) = ConnectionWatchdog::arm(session.connection_timeout(), connection.clone());
        let debug_hook = DebugHook::register(session.debug);

        let messages = feed.snapshot();
        let connection_state = *connection.borrow_and_update();
        let formatter = TimeFormatter::from_config(&config.display);
        let mut transcript =
            TranscriptView::new(false, session.scroll_policy, formatter, config.display.agent_name.clone());
        transcript.prime(&messages);

        info!(
            chat = session.supports_chat_input,
            video = session.supports_video_input,
            timeout_ms = session.connection_timeout_ms,
            existing = messages.len(),
            "session view mounted"
        );

        let mut view = Self {
            ui: SessionUiState::new(&session),
            config: session,
            agent_name: config.display.agent_name.clone(),
            media: MediaState::default(),
            composer: ChatComposer::new(),
            exit: ExitState::new(),
            transcript,
            feed,
            feed_open: true,
            messages,
            connection,
            connection_open: true,
            connection_state,
            ever_connected: connection_state == ConnectionState::Connected,
            commands,
            watchdog: Some(watchdog),
            watchdog_signal,
            debug_hook: Some(debug_hook),
            phase: SessionPhase::Mounted,
            theme: Theme::palette(),
        };
        view.note_debug();
        view
    }

    pub fn chat_open(&self) -> bool {
        self.ui.chat_open
    }

    pub fn controls(&self) -> ControlCapabilities {
        self.ui.controls
    }

    pub fn ui_state(&self) -> SessionUiState {
        self.ui
    }

    pub fn media(&self) -> MediaState {
        self.media
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    pub fn composer(&self) -> &ChatComposer {
        &self.composer
    }

    pub fn transcript(&self) -> &TranscriptView {
        &self.transcript
    }

    pub fn is_watchdog_armed(&self) -> bool {
        self.watchdog.as_ref().is_some_and(WatchdogHandle::is_armed)
    }

    pub fn is_debug_hook_registered(&self) -> bool {
        self.debug_hook.is_some()
    }

    /// The transcript takes scroll input only while it is shown
    pub fn transcript_interactive(&self) -> bool {
        self.ui.chat_open
    }

    /// Banner shows while buffering is enabled and nothing has been said yet
    pub fn banner_visible(&self) -> bool {
        self.phase == SessionPhase::Mounted && self.config.is_pre_connect_buffer_enabled && self.messages.is_empty()
    }

    fn composer_visible(&self) -> bool {
        self.ui.chat_open && self.ui.controls.chat
    }

    /// Open or close the transcript; ignored when chat is not offered
    pub fn set_chat_open(&mut self, open: bool) {
        if !self.ui.controls.chat || self.ui.chat_open == open {
            return;
        }
        self.ui.chat_open = open;
        self.transcript.set_visible(open, &self.messages);
        debug!(chat_open = open, "chat visibility changed");
    }

    /// Apply a control bar request
    pub fn dispatch(&mut self, action: ControlAction) -> Option<SessionSignal> {
        if self.phase == SessionPhase::TornDown {
            warn!(?action, "ignoring control action after teardown");
            return None;
        }

        let control = action.control();
        if !self.ui.controls.allows(control) {
            debug!(control = control.as_str(), "ignoring action for a control this session does not offer");
            return None;
        }

        match action {
            ControlAction::ToggleChat => {
                self.set_chat_open(!self.ui.chat_open);
                None
            }
            ControlAction::ToggleMicrophone => {
                self.media.microphone = !self.media.microphone;
                self.send(TransportCommand::SetMicrophone(self.media.microphone));
                None
            }
            ControlAction::ToggleCamera => {
                self.media.camera = !self.media.camera;
                self.send(TransportCommand::SetCamera(self.media.camera));
                None
            }
            ControlAction::ToggleScreenShare => {
                self.media.screen_share = !self.media.screen_share;
                self.send(TransportCommand::SetScreenShare(self.media.screen_share));
                None
            }
            ControlAction::SendChat(text) => {
                if !text.trim().is_empty() {
                    self.send(TransportCommand::SendChat(text));
                }
                None
            }
            ControlAction::Leave => {
                info!("leaving session");
                self.relinquish(true);
                Some(SessionSignal::Leave)
            }
        }
    }

    /// Route a key press through the event handler
    pub fn handle_key(&mut self, event: KeyEvent) -> Option<SessionSignal> {
        let mut ctx = KeyContext {
            controls: self.ui.controls,
            chat_open: self.ui.chat_open,
            transcript_interactive: self.transcript_interactive(),
            composer: &mut self.composer,
            exit: &mut self.exit,
        };

        match EventHandler::handle_key_event(event, &mut ctx)? {
            KeyAction::Control(action) => self.dispatch(action),
            KeyAction::Scroll(key) => {
                self.scroll(key);
                None
            }
            KeyAction::ConfirmLeave => {
                info!("press Ctrl+C again to leave");
                None
            }
        }
    }

    fn scroll(&mut self, key: ScrollKey) {
        if !self.transcript_interactive() {
            return;
        }
        let scroll = self.transcript.scroll_mut();
        match key {
            ScrollKey::LineUp => scroll.scroll_up(1),
            ScrollKey::LineDown => scroll.scroll_down(1),
            ScrollKey::PageUp => scroll.page_up(),
            ScrollKey::PageDown => scroll.page_down(),
            ScrollKey::Bottom => scroll.scroll_to_bottom(),
        }
    }

    /// Pull the latest sequence from the feed
    pub fn refresh_messages(&mut self) {
        self.messages = self.feed.snapshot();
        self.transcript.sync(&self.messages);
        self.note_debug();
    }

    /// Wait for the next feed, connection, or watchdog event
    ///
    /// Cancel-safe, so it can sit in a `select!` next to terminal input.
    pub async fn next_update(&mut self) -> SessionUpdate {
        tokio::select! {
            err = self.watchdog_signal.fired() => SessionUpdate::Signal(SessionSignal::Teardown(err)),
            changed = self.feed.changed(), if self.feed_open => {
                if changed.is_err() {
                    self.feed_open = false;
                    warn!(retained = self.messages.len(), "message feed closed; transcript frozen");
                }
                self.refresh_messages();
                SessionUpdate::Messages
            }
            changed = self.connection.changed(), if self.connection_open => {
                match changed {
                    Ok(()) => {
                        let state = *self.connection.borrow_and_update();
                        self.on_connection(state)
                    }
                    Err(_) => {
                        self.connection_open = false;
                        match self.ever_connected {
                            true => SessionUpdate::Signal(SessionSignal::Teardown(SessionError::Disconnected(
                                "transport went away".to_string(),
                            ))),
                            false => SessionUpdate::Connection(self.connection_state),
                        }
                    }
                }
            }
        }
    }

    fn on_connection(&mut self, state: ConnectionState) -> SessionUpdate {
        let previous = std::mem::replace(&mut self.connection_state, state);
        self.note_debug();

        if state == ConnectionState::Connected {
            self.ever_connected = true;
        }
        if self.ever_connected && state == ConnectionState::Disconnected && previous != ConnectionState::Disconnected {
            return SessionUpdate::Signal(SessionSignal::Teardown(SessionError::Disconnected(
                "transport closed the session".to_string(),
            )));
        }
        SessionUpdate::Connection(state)
    }

    /// Tear the view down after a fatal signal
    ///
    /// The caller propagates `reason`; this only releases what the view holds.
    pub fn teardown(&mut self, reason: &SessionError) {
        if self.phase == SessionPhase::TornDown {
            return;
        }
        match reason.is_fatal() {
            true => error!(error = %reason, "tearing down session view"),
            false => info!(reason = %reason, "session ended"),
        }
        self.relinquish(true);
    }

    /// Release the watchdog and debug hook without signalling the transport
    pub fn unmount(&mut self) {
        if self.phase == SessionPhase::TornDown {
            return;
        }
        self.relinquish(false);
        info!("session view unmounted");
    }

    fn relinquish(&mut self, disconnect: bool) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel();
        }
        if let Some(hook) = self.debug_hook.take() {
            hook.unregister();
        }
        if disconnect {
            self.send(TransportCommand::Disconnect);
        }
        self.ui.chat_open = false;
        self.transcript.set_visible(false, &self.messages);
        self.phase = SessionPhase::TornDown;
    }

    fn send(&self, command: TransportCommand) {
        if self.commands.send(command).is_err() {
            warn!("transport command channel closed");
        }
    }

    fn note_debug(&mut self) {
        if let Some(hook) = self.debug_hook.as_mut() {
            hook.on_connection(self.connection_state);
            hook.on_messages(self.messages.len());
        }
    }

    /// Advance animations
    pub fn tick(&mut self, dt: Duration) {
        self.transcript.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.transcript.is_animating()
    }

    /// Polite announcements for rows that arrived since the last call
    pub fn take_announcements(&mut self) -> Vec<String> {
        self.transcript.take_announcements()
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.bg)), area);
        let layout = SessionLayout::calculate(area, self.banner_visible(), self.composer_visible());

        Header::new(&self.agent_name, self.connection_state, self.feed.status(), self.theme).render(frame, layout.header);

        if self.transcript.presence() != PresenceState::Present {
            Stage::new(&self.agent_name, self.connection_state, self.media.microphone, self.ui.controls.chat, self.theme)
                .render(frame, layout.transcript);
        }
        self.transcript.render(frame, layout.transcript, &self.messages, self.theme);

        if let Some(banner) = layout.banner {
            PreConnectBanner::new(&self.agent_name, self.theme).render(frame, banner);
        }

        ControlBar::new(self.ui.controls, self.media, self.ui.chat_open, &self.composer, self.theme)
            .render(frame, layout.control_bar);
    }

    /// Feed health, for the status line
    pub fn source_status(&self) -> SourceStatus {
        self.feed.status()
    }
}

impl Drop for SessionView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;
    use voxline_core::{ChatEvent, ConnectionMonitor, MessageSource};

    struct Fixture {
        view: SessionView,
        source: MessageSource,
        monitor: ConnectionMonitor,
        commands: mpsc::UnboundedReceiver<TransportCommand>,
    }

    fn mount_with(session: SessionConfig) -> Fixture {
        let source = MessageSource::new();
        let monitor = ConnectionMonitor::new();
        let (tx, commands) = mpsc::unbounded_channel();
        let config = Config { session, ..Default::default() };
        let links = SessionLinks { feed: source.subscribe(), connection: monitor.subscribe(), commands: tx };
        Fixture { view: SessionView::mount(&config, links), source, monitor, commands }
    }

    fn mount() -> Fixture {
        mount_with(SessionConfig::default())
    }

    #[tokio::test]
    async fn test_mount_starts_closed_and_armed() {
        let fixture = mount();
        assert!(!fixture.view.chat_open());
        assert_eq!(fixture.view.transcript().presence(), PresenceState::Absent);
        assert!(fixture.view.is_watchdog_armed());
        assert!(fixture.view.is_debug_hook_registered());
        assert_eq!(fixture.view.phase(), SessionPhase::Mounted);
    }

    #[tokio::test]
    async fn test_controls_from_capabilities() {
        let fixture =
            mount_with(SessionConfig { supports_chat_input: false, supports_video_input: true, ..Default::default() });
        let controls = fixture.view.controls();
        assert!(controls.leave && controls.microphone && controls.camera && controls.screen_share);
        assert!(!controls.chat);
    }

    #[tokio::test]
    async fn test_toggle_chat_drives_transcript_presence() {
        let mut fixture = mount();
        fixture.source.ingest(ChatEvent::remote("a", "Welcome in!"));
        fixture.view.refresh_messages();
        let before = fixture.view.messages().to_vec();

        fixture.view.dispatch(ControlAction::ToggleChat);
        assert!(fixture.view.chat_open());
        assert!(fixture.view.transcript_interactive());
        assert_eq!(fixture.view.transcript().presence(), PresenceState::Entering);

        fixture.view.dispatch(ControlAction::ToggleChat);
        assert!(!fixture.view.chat_open());
        assert!(!fixture.view.transcript_interactive());
        assert_eq!(fixture.view.transcript().presence(), PresenceState::Exiting);
        assert_eq!(fixture.view.messages(), before.as_slice());
    }

    #[tokio::test]
    async fn test_chat_toggle_ignored_without_chat_input() {
        let mut fixture = mount_with(SessionConfig { supports_chat_input: false, ..Default::default() });
        fixture.view.dispatch(ControlAction::ToggleChat);
        assert!(!fixture.view.chat_open());

        fixture.view.dispatch(ControlAction::SendChat("hello".into()));
        assert!(fixture.commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_media_toggles_reach_transport() {
        let mut fixture = mount_with(SessionConfig { supports_video_input: true, ..Default::default() });

        fixture.view.dispatch(ControlAction::ToggleMicrophone);
        fixture.view.dispatch(ControlAction::ToggleCamera);
        fixture.view.dispatch(ControlAction::ToggleScreenShare);

        assert_eq!(fixture.commands.try_recv(), Ok(TransportCommand::SetMicrophone(false)));
        assert_eq!(fixture.commands.try_recv(), Ok(TransportCommand::SetCamera(true)));
        assert_eq!(fixture.commands.try_recv(), Ok(TransportCommand::SetScreenShare(true)));
        assert!(!fixture.view.media().microphone);
    }

    #[tokio::test]
    async fn test_camera_ignored_without_video() {
        let mut fixture = mount();
        fixture.view.dispatch(ControlAction::ToggleCamera);
        assert!(fixture.commands.try_recv().is_err());
        assert!(!fixture.view.media().camera);
    }

    #[tokio::test]
    async fn test_send_chat_forwards_text() {
        let mut fixture = mount();
        fixture.view.dispatch(ControlAction::SendChat("a mocha".into()));
        fixture.view.dispatch(ControlAction::SendChat("   ".into()));

        assert_eq!(fixture.commands.try_recv(), Ok(TransportCommand::SendChat("a mocha".into())));
        assert!(fixture.commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_disconnects_and_releases() {
        let mut fixture = mount();
        let signal = fixture.view.dispatch(ControlAction::Leave);

        assert_eq!(signal, Some(SessionSignal::Leave));
        assert_eq!(fixture.commands.try_recv(), Ok(TransportCommand::Disconnect));
        assert_eq!(fixture.view.phase(), SessionPhase::TornDown);
        assert!(!fixture.view.is_watchdog_armed());
        assert!(!fixture.view.is_debug_hook_registered());

        assert_eq!(fixture.view.dispatch(ControlAction::ToggleMicrophone), None);
        assert!(fixture.commands.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_fires_teardown_after_bound() {
        let mut fixture = mount();

        let update = fixture.view.next_update().await;
        let SessionUpdate::Signal(SessionSignal::Teardown(err)) = update else {
            panic!("expected teardown, got {update:?}");
        };
        assert_eq!(err, SessionError::ConnectionTimeout { bound_ms: 200_000 });
        assert!(err.is_fatal());

        fixture.view.teardown(&err);
        assert_eq!(fixture.view.phase(), SessionPhase::TornDown);
        assert_eq!(fixture.commands.try_recv(), Ok(TransportCommand::Disconnect));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connecting_in_time_disarms_watchdog() {
        let mut fixture = mount();
        fixture.monitor.set(ConnectionState::Connected);

        assert_eq!(fixture.view.next_update().await, SessionUpdate::Connection(ConnectionState::Connected));
        assert!(timeout(Duration::from_secs(400), fixture.view.next_update()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_before_bound_never_fires() {
        let mut fixture = mount();
        tokio::time::sleep(Duration::from_secs(10)).await;
        fixture.view.unmount();

        assert!(!fixture.view.is_watchdog_armed());
        assert!(timeout(Duration::from_secs(400), fixture.view.next_update()).await.is_err());
    }

    #[tokio::test]
    async fn test_banner_hides_after_first_message() {
        let mut fixture = mount_with(SessionConfig { is_pre_connect_buffer_enabled: true, ..Default::default() });
        assert!(fixture.view.banner_visible());

        fixture.source.ingest(ChatEvent::remote("a", "Welcome in!"));
        assert_eq!(fixture.view.next_update().await, SessionUpdate::Messages);
        assert!(!fixture.view.banner_visible());
        assert_eq!(fixture.view.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_banner_off_without_buffering() {
        let fixture = mount();
        assert!(!fixture.view.banner_visible());
    }

    #[tokio::test]
    async fn test_disconnect_after_connect_ends_session() {
        let mut fixture = mount();
        fixture.monitor.set(ConnectionState::Connected);
        fixture.view.next_update().await;

        fixture.monitor.set(ConnectionState::Disconnected);
        let update = fixture.view.next_update().await;
        assert!(matches!(update, SessionUpdate::Signal(SessionSignal::Teardown(SessionError::Disconnected(_)))));
    }

    #[tokio::test]
    async fn test_feed_close_freezes_transcript() {
        let mut fixture = mount();
        fixture.source.ingest(ChatEvent::remote("a", "kept"));
        fixture.view.next_update().await;

        drop(fixture.source);
        assert_eq!(fixture.view.next_update().await, SessionUpdate::Messages);
        assert_eq!(fixture.view.messages().len(), 1);
    }
}
