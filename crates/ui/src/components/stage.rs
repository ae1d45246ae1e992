use crate::theme::ThemePalette;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph},
};
use voxline_core::ConnectionState;

/// Centered voice status shown where the transcript would be while chat is closed
pub struct Stage<'a> {
    agent_name: &'a str,
    connection: ConnectionState,
    microphone_on: bool,
    chat_available: bool,
    theme: ThemePalette,
}

impl<'a> Stage<'a> {
    pub fn new(
        agent_name: &'a str, connection: ConnectionState, microphone_on: bool, chat_available: bool, theme: ThemePalette,
    ) -> Self {
        Self { agent_name, connection, microphone_on, chat_available, theme }
    }

    pub fn status_text(&self) -> &'static str {
        match self.connection {
            ConnectionState::Disconnected => "Waiting for connection",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected if self.microphone_on => "Listening",
            ConnectionState::Connected => "Microphone muted",
            ConnectionState::Reconnecting => "Reconnecting...",
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.bg)), area);
        if area.height == 0 {
            return;
        }

        let mut lines = vec![
            Line::from(Span::styled(self.agent_name.to_string(), Style::default().fg(self.theme.assistant).bold())),
            Line::from(Span::styled(self.status_text(), Style::default().fg(self.theme.muted))),
        ];
        if self.chat_available {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("press c to open the transcript", Style::default().fg(self.theme.border))));
        }

        let height = lines.len() as u16;
        let top = area.y + area.height.saturating_sub(height) / 2;
        let centered = Rect { y: top, height: height.min(area.height), ..area };
        frame.render_widget(Paragraph::new(Text::from(lines)).alignment(Alignment::Center), centered);
    }
}
