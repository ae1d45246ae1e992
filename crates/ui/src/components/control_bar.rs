use crate::session::{Control, ControlCapabilities, MediaState};
use crate::state::ChatComposer;
use crate::theme::ThemePalette;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use unicode_width::UnicodeWidthStr;

const INPUT_PLACEHOLDER: &str = "Type a message...";

/// Control bar: one button per enabled control, plus the chat composer when open
///
/// - Row 1: separator
/// - Row 2: buttons (left) and key hints (right)
/// - Row 3: composer, only while chat is open
pub struct ControlBar<'a> {
    controls: ControlCapabilities,
    media: MediaState,
    chat_open: bool,
    composer: &'a ChatComposer,
    theme: ThemePalette,
}

impl<'a> ControlBar<'a> {
    pub fn new(
        controls: ControlCapabilities, media: MediaState, chat_open: bool, composer: &'a ChatComposer, theme: ThemePalette,
    ) -> Self {
        Self { controls, media, chat_open, composer, theme }
    }

    /// Text of the button row, for tests and assistive output
    pub fn button_labels(&self) -> Vec<String> {
        self.controls.enabled().into_iter().map(|control| self.button_text(control)).collect()
    }

    fn button_text(&self, control: Control) -> String {
        let state = match self.media.is_on(control) {
            Some(true) => " on",
            Some(false) => " off",
            None if control == Control::Chat && self.chat_open => " open",
            None => "",
        };
        format!("[{}] {}{}", control.key(), control.label(), state)
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.bg)), area);

        let separator = Line::from(Span::styled("─".repeat(area.width as usize), Style::default().fg(self.theme.border)));
        frame.render_widget(Paragraph::new(separator), Rect { height: 1, ..area });

        if area.height >= 2 {
            let buttons = Rect { y: area.y + 1, height: 1, ..area };
            self.render_buttons(frame, buttons);
        }

        if area.height >= 3 && self.chat_open && self.controls.chat {
            let input = Rect { y: area.y + 2, height: 1, ..area };
            self.render_composer(frame, input);
        }
    }

    fn render_buttons(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for control in self.controls.enabled() {
            let color = match (control, self.media.is_on(control)) {
                (Control::Leave, _) => self.theme.error,
                (_, Some(true)) => self.theme.live,
                (_, Some(false)) => self.theme.muted,
                (Control::Chat, None) if self.chat_open => self.theme.accent,
                _ => self.theme.fg,
            };
            spans.push(Span::styled(self.button_text(control), Style::default().fg(color)));
            spans.push(Span::raw("  "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        let hint = match self.chat_open {
            true => "[Enter] send  [Esc] close  [Ctrl+C×2] leave ",
            false => "[Esc] leave  [Ctrl+C×2] leave ",
        };
        let hint_width = hint.width() as u16;
        if area.width > hint_width + 40 {
            frame.render_widget(
                Paragraph::new(Span::styled(hint, Style::default().fg(self.theme.muted))).alignment(Alignment::Right),
                area,
            );
        }
    }

    fn render_composer(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.panel_bg)), area);

        let prompt = Span::styled(" › ", Style::default().fg(self.theme.accent).bg(self.theme.panel_bg).bold());
        let body = match self.composer.is_empty() {
            true => Span::styled(INPUT_PLACEHOLDER, Style::default().fg(self.theme.muted).bg(self.theme.panel_bg)),
            false => Span::styled(self.composer.text().to_string(), Style::default().fg(self.theme.fg).bg(self.theme.panel_bg)),
        };
        frame.render_widget(Paragraph::new(Line::from(vec![prompt, body])), area);

        let before_cursor: String = self.composer.text().chars().take(self.composer.cursor()).collect();
        let cursor_x = area.x + 3 + before_cursor.width() as u16;
        if cursor_x < area.x + area.width {
            frame.set_cursor_position((cursor_x, area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use voxline_core::SessionConfig;

    fn caps(chat: bool, video: bool) -> ControlCapabilities {
        ControlCapabilities::from_session(&SessionConfig {
            supports_chat_input: chat,
            supports_video_input: video,
            ..Default::default()
        })
    }

    #[test]
    fn test_labels_follow_capabilities() {
        let composer = ChatComposer::new();
        let bar = ControlBar::new(caps(false, false), MediaState::default(), false, &composer, Theme::palette());
        assert_eq!(bar.button_labels(), vec!["[m] Mic on", "[q] Leave"]);
    }

    #[test]
    fn test_labels_with_all_controls() {
        let composer = ChatComposer::new();
        let bar = ControlBar::new(caps(true, true), MediaState::default(), true, &composer, Theme::palette());
        assert_eq!(
            bar.button_labels(),
            vec!["[m] Mic on", "[v] Camera off", "[s] Share off", "[c] Chat open", "[q] Leave"]
        );
    }
}
