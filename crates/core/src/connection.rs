use crate::debug::DebugCategory;
use crate::debug_log;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// Connection state reported by the real-time transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "disconnected" => Some(ConnectionState::Disconnected),
            "connecting" => Some(ConnectionState::Connecting),
            "connected" => Some(ConnectionState::Connected),
            "reconnecting" => Some(ConnectionState::Reconnecting),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single writer for the connection state; hands out watch receivers
#[derive(Debug)]
pub struct ConnectionMonitor {
    tx: watch::Sender<ConnectionState>,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionState::Disconnected);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Record a transition; repeated states are ignored
    pub fn set(&self, state: ConnectionState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            info!(from = previous.as_str(), to = state.as_str(), "connection state changed");
            debug_log!(DebugCategory::Connection, "{} -> {}", previous, state);
        }
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_round_trip() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Reconnecting,
        ] {
            assert_eq!(ConnectionState::parse_str(state.as_str()), Some(state));
        }
        assert_eq!(ConnectionState::parse_str("CONNECTED"), Some(ConnectionState::Connected));
        assert_eq!(ConnectionState::parse_str("lost"), None);
    }

    #[test]
    fn test_monitor_publishes_transitions() {
        let monitor = ConnectionMonitor::new();
        let mut rx = monitor.subscribe();
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Disconnected);

        monitor.set(ConnectionState::Connecting);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Connecting);
        assert_eq!(monitor.state(), ConnectionState::Connecting);
    }
}
