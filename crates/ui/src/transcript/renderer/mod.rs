mod bubble;
mod scrollbar;
mod wrap;

use crate::theme::{ThemePalette, blend};
use crate::transcript::row::TranscriptRow;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph},
};

/// Title drawn above the rows
pub const HEADER_TITLE: &str = "Transcript";

/// Renders transcript rows to a frame
pub struct TranscriptRenderer<'a> {
    rows: &'a [TranscriptRow],
    row_progress: Vec<f32>,
    fade: f32,
    agent_name: &'a str,
    theme: ThemePalette,
}

impl<'a> TranscriptRenderer<'a> {
    pub fn new(rows: &'a [TranscriptRow], agent_name: &'a str, theme: ThemePalette) -> Self {
        Self { rows, row_progress: Vec::new(), fade: 1.0, agent_name, theme }
    }

    /// Per-row entrance progress, parallel to `rows`; missing entries count as settled
    pub fn with_row_progress(mut self, progress: Vec<f32>) -> Self {
        self.row_progress = progress;
        self
    }

    /// Container visibility during enter/exit
    pub fn with_fade(mut self, fade: f32) -> Self {
        self.fade = fade.clamp(0.0, 1.0);
        self
    }

    /// Area below the header where rows scroll
    pub fn body_area(area: Rect) -> Rect {
        Rect { y: area.y.saturating_add(1), height: area.height.saturating_sub(1), ..area }
    }

    /// Columns available to rows inside `body`
    pub fn content_width(body: Rect) -> usize {
        let padding_x = 1usize;
        let scrollbar_width = 1usize;
        (body.width as usize).saturating_sub(padding_x * 2 + scrollbar_width)
    }

    /// All row lines at `width`
    ///
    /// Rows that have not started entering keep their space but are painted in
    /// the background color, so the measured height already includes them.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (idx, row) in self.rows.iter().enumerate() {
            let progress = self.row_progress.get(idx).copied().unwrap_or(1.0).clamp(0.0, 1.0);
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            self.render_row(row, progress, width, &mut lines);
        }
        lines
    }

    /// Draw header, rows at `scroll`, and the scrollbar
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>, scroll: usize) {
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.bg)), area);
        if area.height == 0 {
            return;
        }

        let header = Line::from(vec![
            Span::styled(" ", Style::default().bg(self.theme.bg)),
            Span::styled(HEADER_TITLE, Style::default().fg(self.faded(self.theme.fg, 1.0)).bold()),
            Span::styled(format!("  {}", self.rows.len()), Style::default().fg(self.faded(self.theme.muted, 1.0))),
        ]);
        frame.render_widget(Paragraph::new(header), Rect { height: 1, ..area });

        let body = Self::body_area(area);
        let line_count = lines.len();
        let left_pad = Span::styled(" ", Style::default().bg(self.theme.bg));
        let padded: Vec<Line<'static>> = lines
            .into_iter()
            .map(|line| {
                let mut spans = vec![left_pad.clone()];
                spans.extend(line.spans);
                Line::from(spans)
            })
            .collect();

        let scroll_y = u16::try_from(scroll).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(Text::from(padded)).scroll((scroll_y, 0)), body);
        self.render_scrollbar(frame, body, line_count, scroll);
    }

    /// Pull `color` toward the background by the container fade and `progress`
    fn faded(&self, color: Color, progress: f32) -> Color {
        blend(self.theme.bg, color, self.fade * progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use crate::time_format::TimeFormatter;
    use crate::transcript::row::build_rows;
    use ratatui::{Terminal, backend::TestBackend};
    use voxline_core::ChatEvent;

    fn rows() -> Vec<TranscriptRow> {
        let messages = vec![
            ChatEvent::remote("a", "Hi, what can I get you?").at(1_700_000_000_000).into_message().unwrap(),
            ChatEvent::local("b", "A flat white").into_message().unwrap(),
        ];
        build_rows(&messages, &TimeFormatter::utc(Some("en-US")))
    }

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect()).collect()
    }

    #[test]
    fn test_lines_include_badges_and_bodies() {
        let rows = rows();
        let renderer = TranscriptRenderer::new(&rows, "Agent", Theme::palette());
        let text = text_of(&renderer.lines(40)).join("\n");

        assert!(text.contains("Agent"));
        assert!(text.contains("10:13 PM"));
        assert!(text.contains("Hi, what can I get you?"));
        assert!(text.contains("You"));
        assert!(text.contains("A flat white"));
    }

    #[test]
    fn test_unstarted_rows_reserve_space_invisibly() {
        let rows = rows();
        let theme = Theme::palette();
        let settled = TranscriptRenderer::new(&rows, "Agent", theme).lines(40);
        let staged = TranscriptRenderer::new(&rows, "Agent", theme).with_row_progress(vec![1.0, 0.0]).lines(40);
        assert_eq!(settled.len(), staged.len());

        let hidden = staged.last().unwrap();
        let bubble = hidden.spans.iter().find(|span| span.content.contains("A flat white")).unwrap();
        assert_eq!(bubble.style.fg, Some(theme.bg));
        assert_eq!(bubble.style.bg, Some(theme.bg));
    }

    #[test]
    fn test_render_draws_header() {
        let rows = rows();
        let renderer = TranscriptRenderer::new(&rows, "Agent", Theme::palette());
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.area();
                let width = TranscriptRenderer::content_width(TranscriptRenderer::body_area(area));
                let lines = renderer.lines(width);
                renderer.render(frame, area, lines, 0);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let first: String = (0..buffer.area().width).map(|x| buffer[(x, 0)].symbol().to_string()).collect();
        assert!(first.contains("Transcript"));
    }

    #[test]
    fn test_body_area_sits_below_header() {
        let body = TranscriptRenderer::body_area(Rect::new(0, 0, 30, 10));
        assert_eq!(body, Rect::new(0, 1, 30, 9));
        assert_eq!(TranscriptRenderer::content_width(body), 27);
    }
}
