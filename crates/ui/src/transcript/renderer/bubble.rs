use super::wrap::{max_line_width, wrap_preserving};
use crate::theme::blend;
use crate::transcript::row::{Badge, BubbleStyle, Edge, TranscriptRow};

use ratatui::{
    style::{Style, Stylize},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

const MIN_BUBBLE_WIDTH: usize = 10;

impl<'a> super::TranscriptRenderer<'a> {
    /// Render one row: a meta line with badge and time, then the bubble
    pub(super) fn render_row(&self, row: &TranscriptRow, progress: f32, width: usize, lines: &mut Vec<Line<'static>>) {
        if width == 0 {
            return;
        }

        let bubble_max = (width * 3 / 4).max(MIN_BUBBLE_WIDTH).min(width);
        let body = wrap_preserving(&row.body, bubble_max.saturating_sub(2));
        let inner_width = max_line_width(&body);

        let meta = self.meta_spans(row, progress);
        lines.push(self.anchor(meta, row.edge, width));

        let fill = match row.bubble {
            BubbleStyle::Local => self.theme.local_bubble,
            BubbleStyle::Remote => self.theme.remote_bubble,
        };
        let bubble_style = Style::default()
            .fg(self.faded(self.theme.fg, progress))
            .bg(blend(self.theme.bg, fill, self.fade * progress));

        for text in body {
            let pad = inner_width.saturating_sub(text.width());
            let content = format!(" {text}{} ", " ".repeat(pad));
            lines.push(self.anchor(vec![Span::styled(content, bubble_style)], row.edge, width));
        }
    }

    fn meta_spans(&self, row: &TranscriptRow, progress: f32) -> Vec<Span<'static>> {
        let muted = Style::default().fg(self.faded(self.theme.muted, progress));
        let mut details = Vec::new();
        if !row.time_label.is_empty() {
            details.push(Span::styled(row.time_label.clone(), muted));
        }
        if row.edited {
            details.push(Span::styled("(edited)", muted.italic()));
        }

        match row.badge {
            Badge::Assistant => {
                let color = self.faded(self.theme.assistant, progress);
                let mut spans = vec![
                    Span::styled("◆ ", Style::default().fg(color)),
                    Span::styled(self.agent_name.to_string(), Style::default().fg(color).bold()),
                ];
                for detail in details {
                    spans.push(Span::raw("  "));
                    spans.push(detail);
                }
                spans
            }
            Badge::Own => {
                let color = self.faded(self.theme.own, progress);
                let mut spans = Vec::new();
                for detail in details {
                    spans.push(detail);
                    spans.push(Span::raw("  "));
                }
                spans.push(Span::styled("You", Style::default().fg(color).bold()));
                spans.push(Span::styled(" ●", Style::default().fg(color)));
                spans
            }
        }
    }

    /// Place spans against the row's edge
    fn anchor(&self, spans: Vec<Span<'static>>, edge: Edge, width: usize) -> Line<'static> {
        match edge {
            Edge::Leading => Line::from(spans),
            Edge::Trailing => {
                let used: usize = spans.iter().map(|span| span.content.width()).sum();
                let mut padded = vec![Span::styled(" ".repeat(width.saturating_sub(used)), Style::default().bg(self.theme.bg))];
                padded.extend(spans);
                Line::from(padded)
            }
        }
    }
}
