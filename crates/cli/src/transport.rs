//! Stand-in real-time transport for the terminal client.
//!
//! Owns the [`MessageSource`] and [`ConnectionMonitor`] and plays either a
//! recorded JSONL script or a loopback that echoes sent chat back as local
//! messages.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use voxline_core::{
    ChatEvent, ConnectionMonitor, ConnectionState, MessageSource, Participant, SourceError, Timestamp,
};
use voxline_ui::TransportCommand;

/// One line of a replay script
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayStep {
    /// Wait before applying this step, relative to the previous one
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(flatten)]
    pub event: ReplayEvent,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplayEvent {
    Chat(ChatEvent),
    Connection { state: ConnectionState },
    Disconnect,
}

/// Parse a JSONL replay script; blank lines and `//` comments are skipped
pub fn parse_replay(content: &str) -> Result<Vec<ReplayStep>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid replay step on line {}", index + 1))
        })
        .collect()
}

pub fn load_replay(path: &Path) -> Result<Vec<ReplayStep>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read replay file {}", path.display()))?;
    parse_replay(&content)
}

pub enum TransportMode {
    /// Connect immediately and echo sent chat
    Loopback,
    /// Play back a recorded session
    Replay(Vec<ReplayStep>),
}

type EventSender = mpsc::UnboundedSender<Result<ChatEvent, SourceError>>;

pub struct Transport {
    source: MessageSource,
    monitor: ConnectionMonitor,
    commands: mpsc::UnboundedReceiver<TransportCommand>,
}

impl Transport {
    pub fn new(
        source: MessageSource, monitor: ConnectionMonitor, commands: mpsc::UnboundedReceiver<TransportCommand>,
    ) -> Self {
        Self { source, monitor, commands }
    }

    /// Run until the session disconnects or `cancel` fires
    ///
    /// The source and monitor stay alive until then, so a finished script
    /// leaves the transcript and connection state as the last step set them.
    pub async fn run(self, mode: TransportMode, cancel: CancellationToken) {
        let Transport { mut source, monitor, commands } = self;
        let (events, mut inbox) = mpsc::unbounded_channel();
        let stream = futures::stream::poll_fn(move |cx| inbox.poll_recv(cx));

        let session = async {
            let (outcome, ()) = tokio::join!(source.drive(stream), produce(mode, &monitor, commands, events));
            debug!(?outcome, "transport stream finished");
            cancel.cancelled().await;
        };

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = session => {}
        }
        info!("transport stopped");
    }
}

async fn produce(
    mode: TransportMode, monitor: &ConnectionMonitor, mut commands: mpsc::UnboundedReceiver<TransportCommand>,
    events: EventSender,
) {
    let mut script = match mode {
        TransportMode::Loopback => {
            monitor.set(ConnectionState::Connecting);
            monitor.set(ConnectionState::Connected);
            VecDeque::new()
        }
        TransportMode::Replay(steps) => {
            info!(steps = steps.len(), "starting replay");
            VecDeque::from(steps)
        }
    };
    let mut next_at = script.front().map(|step| Instant::now() + Duration::from_millis(step.delay_ms));

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(TransportCommand::Disconnect) | None => {
                    info!("session asked the transport to disconnect");
                    return;
                }
                Some(command) => handle_command(command, &events),
            },
            _ = sleep_until(next_at.unwrap_or_else(Instant::now)), if next_at.is_some() => {
                let Some(step) = script.pop_front() else {
                    next_at = None;
                    continue;
                };
                next_at = script.front().map(|next| Instant::now() + Duration::from_millis(next.delay_ms));

                match step.event {
                    ReplayEvent::Chat(event) => send(&events, event),
                    ReplayEvent::Connection { state } => monitor.set(state),
                    ReplayEvent::Disconnect => {
                        info!("replay ended the session");
                        monitor.set(ConnectionState::Disconnected);
                        return;
                    }
                }
                if next_at.is_none() {
                    info!("replay finished");
                }
            }
        }
    }
}

fn handle_command(command: TransportCommand, events: &EventSender) {
    match command {
        TransportCommand::SendChat(text) => {
            let mut event = ChatEvent::new(uuid::Uuid::new_v4().to_string(), Participant::local(), text);
            event.timestamp = Some(Timestamp::from(Utc::now()));
            send(events, event);
        }
        TransportCommand::SetMicrophone(on) => info!(on, "microphone toggled"),
        TransportCommand::SetCamera(on) => info!(on, "camera toggled"),
        TransportCommand::SetScreenShare(on) => info!(on, "screen share toggled"),
        TransportCommand::Disconnect => {}
    }
}

fn send(events: &EventSender, event: ChatEvent) {
    if events.send(Ok(event)).is_err() {
        warn!("message source is gone; dropping chat event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay_steps() {
        let script = r#"
// greeting
{"delay_ms": 0, "type": "connection", "state": "connected"}
{"delay_ms": 400, "type": "chat", "id": "1", "timestamp": 1700000000000, "from": {"isLocal": false}, "message": "Hi!"}

{"type": "disconnect"}
"#;
        let steps = parse_replay(script).unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].event, ReplayEvent::Connection { state: ConnectionState::Connected });
        assert_eq!(steps[1].delay_ms, 400);
        let ReplayEvent::Chat(event) = &steps[1].event else {
            panic!("expected chat step, got {:?}", steps[1].event);
        };
        assert_eq!(event.message, "Hi!");
        assert!(!event.from.is_local);
        assert_eq!(steps[2], ReplayStep { delay_ms: 0, event: ReplayEvent::Disconnect });
    }

    #[test]
    fn test_parse_replay_reports_line() {
        let err = parse_replay("{\"type\": \"disconnect\"}\n{\"type\": \"shout\"}").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_drives_source_and_connection() {
        let source = MessageSource::new();
        let mut feed = source.subscribe();
        let monitor = ConnectionMonitor::new();
        let mut connection = monitor.subscribe();
        let (_commands_tx, commands) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let steps = parse_replay(
            r#"{"type": "connection", "state": "connected"}
{"delay_ms": 1000, "type": "chat", "id": "1", "message": "Welcome in"}"#,
        )
        .unwrap();
        let task = tokio::spawn(Transport::new(source, monitor, commands).run(TransportMode::Replay(steps), cancel.clone()));

        connection.changed().await.unwrap();
        assert_eq!(*connection.borrow(), ConnectionState::Connected);

        feed.changed().await.unwrap();
        let messages = feed.snapshot();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "Welcome in");

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_loopback_echoes_chat_as_local() {
        let source = MessageSource::new();
        let mut feed = source.subscribe();
        let monitor = ConnectionMonitor::new();
        let connection = monitor.subscribe();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Transport::new(source, monitor, commands).run(TransportMode::Loopback, cancel.clone()));

        commands_tx.send(TransportCommand::SendChat("a flat white".into())).unwrap();
        feed.changed().await.unwrap();
        let messages = feed.snapshot();

        assert_eq!(*connection.borrow(), ConnectionState::Connected);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_local());
        assert!(messages[0].timestamp.is_some());

        commands_tx.send(TransportCommand::Disconnect).unwrap();
        cancel.cancel();
        task.await.unwrap();
    }
}
