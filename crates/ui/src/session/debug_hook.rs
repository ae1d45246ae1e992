use voxline_core::debug::{self, DebugCategory};
use voxline_core::{ConnectionState, debug_log};

/// Debug-mode hook registered for the lifetime of a mounted session view
///
/// Reports connection transitions and transcript growth through the
/// `session` debug category.
#[derive(Debug)]
pub struct DebugHook {
    last_state: ConnectionState,
    last_count: usize,
}

impl DebugHook {
    pub fn register(enable_all: bool) -> Self {
        debug::init_debug(enable_all);
        debug_log!(DebugCategory::Session, "debug hook registered");
        Self { last_state: ConnectionState::Disconnected, last_count: 0 }
    }

    pub fn on_connection(&mut self, state: ConnectionState) {
        if state != self.last_state {
            debug_log!(DebugCategory::Session, "connection {} -> {}", self.last_state, state);
            self.last_state = state;
        }
    }

    pub fn on_messages(&mut self, count: usize) {
        if count != self.last_count {
            debug_log!(DebugCategory::Session, "transcript {} -> {} messages", self.last_count, count);
            self.last_count = count;
        }
    }

    pub fn unregister(self) {
        debug_log!(DebugCategory::Session, "debug hook unregistered");
    }
}
