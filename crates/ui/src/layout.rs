use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Widest the transcript column grows before it is centered
pub const MAX_TRANSCRIPT_WIDTH: u16 = 96;

/// Layout breakpoints for the session view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Transcript column centered with margins (>= 100 columns)
    Wide,
    /// Transcript fills the width
    Compact,
}

impl From<u16> for LayoutMode {
    fn from(width: u16) -> Self {
        match width {
            w if w >= 100 => Self::Wide,
            _ => Self::Compact,
        }
    }
}

/// Calculated layout for one frame
#[derive(Debug, Clone)]
pub struct SessionLayout {
    pub mode: LayoutMode,
    /// Status line (1 line)
    pub header: Rect,
    /// Transcript panel, or the idle stage while chat is closed
    pub transcript: Rect,
    /// Pre-connect banner, when shown
    pub banner: Option<Rect>,
    /// Control bar: separator, buttons, and the composer when open
    pub control_bar: Rect,
}

impl SessionLayout {
    pub fn calculate(area: Rect, banner_visible: bool, composer_visible: bool) -> Self {
        let mode = LayoutMode::from(area.width);
        let banner_height = if banner_visible { 1 } else { 0 };
        let control_height = if composer_visible { 3 } else { 2 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(banner_height),
                Constraint::Length(control_height),
            ])
            .split(area);

        let transcript = match mode {
            LayoutMode::Wide => center_column(chunks[1], MAX_TRANSCRIPT_WIDTH),
            LayoutMode::Compact => chunks[1],
        };
        let banner = banner_visible.then_some(chunks[2]);

        Self { mode, header: chunks[0], transcript, banner, control_bar: chunks[3] }
    }
}

fn center_column(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    let x = area.x + (area.width - width) / 2;
    Rect { x, width, ..area }
}
