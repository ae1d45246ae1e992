use crate::theme::ThemePalette;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use voxline_core::{ConnectionState, SourceStatus};

/// Status line: agent on the left, connection and feed health on the right
pub struct Header<'a> {
    agent_name: &'a str,
    connection: ConnectionState,
    source: SourceStatus,
    theme: ThemePalette,
}

impl<'a> Header<'a> {
    pub fn new(agent_name: &'a str, connection: ConnectionState, source: SourceStatus, theme: ThemePalette) -> Self {
        Self { agent_name, connection, source, theme }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.panel_bg)), area);

        let left = Line::from(vec![
            Span::styled(" ◆ ", Style::default().fg(self.theme.assistant)),
            Span::styled(self.agent_name.to_string(), Style::default().fg(self.theme.fg).bold()),
        ]);
        frame.render_widget(Paragraph::new(left), area);

        let mut right = vec![self.connection_span()];
        if self.source == SourceStatus::Disconnected {
            right.push(Span::styled("  transcript offline", Style::default().fg(self.theme.warning)));
        }
        right.push(Span::raw(" "));
        frame.render_widget(Paragraph::new(Line::from(right)).alignment(Alignment::Right), area);
    }

    fn connection_span(&self) -> Span<'static> {
        let (symbol, color) = match self.connection {
            ConnectionState::Connected => ("●", self.theme.live),
            ConnectionState::Connecting | ConnectionState::Reconnecting => ("◌", self.theme.warning),
            ConnectionState::Disconnected => ("○", self.theme.muted),
        };
        Span::styled(format!("{symbol} {}", self.connection.as_str()), Style::default().fg(color))
    }
}
