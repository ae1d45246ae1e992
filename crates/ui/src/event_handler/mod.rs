mod command_mode;
mod compose_mode;
mod key_action;

pub use key_action::{KeyAction, ScrollKey};

use crate::session::{ControlAction, ControlCapabilities};
use crate::state::{ChatComposer, ExitState};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use self::{command_mode::handle_command_key, compose_mode::handle_compose_key};

/// Session state a key handler may read or edit
pub struct KeyContext<'a> {
    pub controls: ControlCapabilities,
    pub chat_open: bool,
    /// Scroll keys only reach the transcript while it is shown
    pub transcript_interactive: bool,
    pub composer: &'a mut ChatComposer,
    pub exit: &'a mut ExitState,
}

impl KeyContext<'_> {
    /// Typing goes to the composer while chat is open and offered
    fn is_composing(&self) -> bool {
        self.chat_open && self.controls.chat
    }
}

/// Event handler for the session view
pub struct EventHandler;

impl EventHandler {
    /// Handle a keyboard event
    pub fn handle_key_event(event: KeyEvent, ctx: &mut KeyContext<'_>) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return match ctx.exit.record_ctrl_c_press() {
                true => Some(KeyAction::Control(ControlAction::Leave)),
                false => Some(KeyAction::ConfirmLeave),
            };
        }
        ctx.exit.reset_ctrl_c_count();

        if event.code == KeyCode::Tab && ctx.controls.chat {
            return Some(KeyAction::Control(ControlAction::ToggleChat));
        }

        match ctx.is_composing() {
            true => handle_compose_key(event, ctx),
            false => handle_command_key(event, ctx),
        }
    }
}

/// Keys that move the transcript in either mode
fn scroll_key(code: KeyCode) -> Option<ScrollKey> {
    match code {
        KeyCode::Up => Some(ScrollKey::LineUp),
        KeyCode::Down => Some(ScrollKey::LineDown),
        KeyCode::PageUp => Some(ScrollKey::PageUp),
        KeyCode::PageDown => Some(ScrollKey::PageDown),
        _ => None,
    }
}
