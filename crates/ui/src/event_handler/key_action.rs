use crate::session::ControlAction;

/// Actions that can be triggered by key events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// A control bar request
    Control(ControlAction),
    /// Move the transcript viewport
    Scroll(ScrollKey),
    /// First Ctrl+C; a second one within the window leaves
    ConfirmLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKey {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Bottom,
}
