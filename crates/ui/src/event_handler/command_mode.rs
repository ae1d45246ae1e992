use crate::session::{Control, ControlAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{KeyAction, KeyContext, ScrollKey, scroll_key};

/// Handle keys while the composer is closed
///
/// Single letters trigger enabled controls; letters for controls the session
/// does not offer do nothing.
pub fn handle_command_key(event: KeyEvent, ctx: &mut KeyContext<'_>) -> Option<KeyAction> {
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    match event.code {
        KeyCode::Char(c) => {
            let c = c.to_ascii_lowercase();
            let control = Control::VALUES.iter().copied().find(|control| control.key() == c)?;
            ctx.controls.allows(control).then(|| KeyAction::Control(ControlAction::for_control(control)))
        }
        KeyCode::Esc if ctx.controls.leave => Some(KeyAction::Control(ControlAction::Leave)),
        KeyCode::End if ctx.transcript_interactive => Some(KeyAction::Scroll(ScrollKey::Bottom)),
        code if ctx.transcript_interactive => scroll_key(code).map(KeyAction::Scroll),
        _ => None,
    }
}
