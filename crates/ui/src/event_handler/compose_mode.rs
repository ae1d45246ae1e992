use crate::session::ControlAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{KeyAction, KeyContext, ScrollKey, scroll_key};

/// Handle keys while the chat composer is open
pub fn handle_compose_key(event: KeyEvent, ctx: &mut KeyContext<'_>) -> Option<KeyAction> {
    let has_ctrl_or_alt = event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

    match event.code {
        KeyCode::Enter => ctx.composer.submit().map(|text| KeyAction::Control(ControlAction::SendChat(text))),
        KeyCode::Esc => Some(KeyAction::Control(ControlAction::ToggleChat)),
        KeyCode::End if event.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Scroll(ScrollKey::Bottom)),
        KeyCode::Backspace => {
            ctx.composer.backspace();
            None
        }
        KeyCode::Delete => {
            ctx.composer.delete();
            None
        }
        KeyCode::Left => {
            ctx.composer.move_left();
            None
        }
        KeyCode::Right => {
            ctx.composer.move_right();
            None
        }
        KeyCode::Home => {
            ctx.composer.move_home();
            None
        }
        KeyCode::End => {
            ctx.composer.move_end();
            None
        }
        KeyCode::Char(c) if !has_ctrl_or_alt => {
            ctx.composer.insert_char(c);
            None
        }
        code => scroll_key(code).map(KeyAction::Scroll),
    }
}
