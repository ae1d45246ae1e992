use crate::theme::ThemePalette;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

pub const BANNER_TEXT: &str = "is listening, ask it a question";

/// Hint shown while audio is buffered before the first message arrives
pub struct PreConnectBanner<'a> {
    agent_name: &'a str,
    theme: ThemePalette,
}

impl<'a> PreConnectBanner<'a> {
    pub fn new(agent_name: &'a str, theme: ThemePalette) -> Self {
        Self { agent_name, theme }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("● ", Style::default().fg(self.theme.live).bg(self.theme.bg)),
            Span::styled(format!("{} {BANNER_TEXT}", self.agent_name), Style::default().fg(self.theme.muted).bg(self.theme.bg)),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}
