use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

impl<'a> super::TranscriptRenderer<'a> {
    /// Render scrollbar indicator on right edge of the transcript body
    pub(super) fn render_scrollbar(&self, frame: &mut Frame<'_>, area: Rect, content_line_count: usize, scroll: usize) {
        if area.height <= 1 || content_line_count == 0 {
            return;
        }

        let visible_height = area.height as usize;
        let content_height = content_line_count;

        if content_height <= visible_height {
            return;
        }

        let scroll_ratio = (scroll as f64 / (content_height - visible_height) as f64).min(1.0);
        let thumb_size = ((visible_height as f64) / (content_height as f64) * visible_height as f64).ceil() as u16;
        let thumb_position = (scroll_ratio * (visible_height - thumb_size as usize) as f64).ceil() as u16;

        let scrollbar_x = area.x + area.width.saturating_sub(1);
        let accent = self.faded(self.theme.accent, 1.0);
        let track = self.faded(self.theme.border, 1.0);

        for y in 0..area.height {
            let is_thumb = y >= thumb_position && y < thumb_position + thumb_size;
            let style = Style::default().fg(if is_thumb { accent } else { track }).bg(self.theme.bg);

            frame.render_widget(
                Paragraph::new(Line::from(vec![Span::styled("|", style)])),
                Rect::new(scrollbar_x, area.top() + y, 1, 1),
            );
        }
    }
}
