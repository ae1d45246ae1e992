use crate::presence::{Presence, PresenceState, RowStagger, rows_in_view};
use crate::theme::ThemePalette;
use crate::time_format::TimeFormatter;
use crate::transcript::renderer::TranscriptRenderer;
use crate::transcript::row::{TranscriptRow, build_rows};
use crate::transcript::scroll::{ScrollController, ScrollRequest, Viewport};

use ratatui::{Frame, layout::Rect};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use voxline_core::debug::DebugCategory;
use voxline_core::{Message, MessageId, ScrollPolicy, debug_log};

/// Transcript panel state: presence, row entrances, scroll, and announcements
#[derive(Debug)]
pub struct TranscriptView {
    presence: Presence,
    stagger: RowStagger,
    scroll: ScrollController,
    formatter: TimeFormatter,
    agent_name: String,
    announced: HashSet<MessageId>,
    announcements: VecDeque<String>,
    last_request: Option<ScrollRequest>,
    /// Lines available to rows at the last render
    body_height: usize,
}

impl TranscriptView {
    pub fn new(visible: bool, policy: ScrollPolicy, formatter: TimeFormatter, agent_name: impl Into<String>) -> Self {
        Self {
            presence: Presence::initial(visible),
            stagger: RowStagger::new(),
            scroll: ScrollController::new(policy),
            formatter,
            agent_name: agent_name.into(),
            announced: HashSet::new(),
            announcements: VecDeque::new(),
            last_request: None,
            body_height: 0,
        }
    }

    /// Adopt the sequence present at mount without animating or announcing it
    pub fn prime(&mut self, messages: &[Message]) {
        self.stagger.settle(messages);
        self.announced = messages.iter().map(|m| m.id.clone()).collect();
    }

    pub fn presence(&self) -> PresenceState {
        self.presence.state()
    }

    pub fn is_mounted(&self) -> bool {
        self.presence.is_mounted()
    }

    /// Show or hide the panel; showing replays the staggered row entrance
    pub fn set_visible(&mut self, visible: bool, messages: &[Message]) {
        if self.presence.set_visible(visible) {
            self.stagger.restage(messages, rows_in_view(self.body_height));
        }
        debug_log!(DebugCategory::Transcript, "visibility -> {}", self.presence.state().as_str());
    }

    /// Pick up new ids after the sequence changed
    pub fn sync(&mut self, messages: &[Message]) {
        self.stagger.sync(messages);
        for message in messages {
            if self.announced.insert(message.id.clone()) {
                let row = TranscriptRow::from_message(message, &self.formatter);
                self.announcements.push_back(row.accessible_text(&self.agent_name));
            }
        }
    }

    /// Polite announcements queued since the last call, oldest first
    pub fn take_announcements(&mut self) -> Vec<String> {
        self.announcements.drain(..).collect()
    }

    pub fn tick(&mut self, dt: Duration) {
        self.presence.tick(dt);
        self.stagger.tick(dt);
        self.scroll.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.presence.is_animating() || self.stagger.is_animating() || self.scroll.is_animating()
    }

    /// Entrance progress of one row in `0.0..=1.0`
    pub fn row_progress(&self, id: &MessageId) -> f32 {
        self.stagger.progress(id)
    }

    pub fn rows(&self, messages: &[Message]) -> Vec<TranscriptRow> {
        build_rows(messages, &self.formatter)
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollController {
        &mut self.scroll
    }

    /// Scroll request issued by the most recent render, if any
    pub fn last_scroll_request(&self) -> Option<ScrollRequest> {
        self.last_request
    }

    /// Lay out, let the scroll controller observe, then paint
    ///
    /// While absent nothing is drawn, but growth is still observed so the
    /// panel opens scrolled to the newest message.
    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, messages: &[Message], theme: ThemePalette) {
        self.body_height = TranscriptRenderer::body_area(area).height as usize;
        if !self.presence.is_mounted() || area.height == 0 {
            self.last_request = self.scroll.observe(messages, Viewport::default());
            return;
        }

        let offset = self.presence.vertical_offset().min(area.height.saturating_sub(1));
        let area = Rect { y: area.y + offset, height: area.height - offset, ..area };

        let rows = self.rows(messages);
        let progress: Vec<f32> = rows.iter().map(|row| self.stagger.progress(&row.key)).collect();
        let renderer = TranscriptRenderer::new(&rows, &self.agent_name, theme)
            .with_row_progress(progress)
            .with_fade(self.presence.progress());

        let body = TranscriptRenderer::body_area(area);
        let lines = renderer.lines(TranscriptRenderer::content_width(body));
        let viewport = Viewport::new(body.height as usize, lines.len());

        self.last_request = self.scroll.observe(messages, viewport);
        renderer.render(frame, area, lines, self.scroll.offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::TRANSITION;
    use crate::theme::Theme;
    use crate::transcript::scroll::ScrollBehavior;
    use ratatui::{Terminal, backend::TestBackend};
    use voxline_core::ChatEvent;

    fn view(visible: bool) -> TranscriptView {
        TranscriptView::new(visible, ScrollPolicy::OnGrowth, TimeFormatter::utc(Some("en-US")), "Agent")
    }

    fn messages(count: usize) -> Vec<Message> {
        (0..count).map(|i| ChatEvent::remote(format!("m{i}"), format!("message {i}")).into_message().unwrap()).collect()
    }

    fn draw(view: &mut TranscriptView, terminal: &mut Terminal<TestBackend>, messages: &[Message]) {
        terminal
            .draw(|frame| {
                let area = frame.area();
                view.render(frame, area, messages, Theme::palette());
            })
            .unwrap();
    }

    #[test]
    fn test_empty_transcript_renders_header_only() {
        let mut view = view(true);
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        draw(&mut view, &mut terminal, &[]);

        assert!(view.rows(&[]).is_empty());
        assert!(view.last_scroll_request().is_none());
    }

    #[test]
    fn test_initially_visible_rows_do_not_animate() {
        let messages = messages(3);
        let mut view = view(true);
        view.prime(&messages);
        assert!(!view.is_animating());
        assert!(view.take_announcements().is_empty());
    }

    #[test]
    fn test_toggle_visible_staggers_rows() {
        let messages = messages(3);
        let mut view = view(false);
        view.prime(&messages);

        view.set_visible(true, &messages);
        assert_eq!(view.presence(), PresenceState::Entering);
        assert!(view.is_animating());

        view.tick(TRANSITION * 3);
        assert_eq!(view.presence(), PresenceState::Present);
        assert!(!view.is_animating());
    }

    #[test]
    fn test_hidden_growth_scrolls_on_open() {
        let mut view = view(false);
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let messages = messages(10);
        view.sync(&messages);
        draw(&mut view, &mut terminal, &messages);
        assert_eq!(view.last_scroll_request().map(|r| r.behavior), Some(ScrollBehavior::Instant));

        view.set_visible(true, &messages);
        view.tick(TRANSITION * 10);
        draw(&mut view, &mut terminal, &messages);
        assert!(view.scroll().offset() > 0);
        assert!(view.scroll().is_at_bottom());
    }

    #[test]
    fn test_sync_queues_polite_announcements() {
        let mut view = view(true);
        let mut messages = messages(1);
        view.prime(&messages);

        messages.push(ChatEvent::local("mine", "a cortado please").into_message().unwrap());
        view.sync(&messages);
        view.sync(&messages);

        assert_eq!(view.take_announcements(), vec!["You: a cortado please".to_string()]);
    }

    #[test]
    fn test_long_transcript_opens_with_newest_rows_in_view() {
        let messages = messages(300);
        let mut view = view(false);
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        view.prime(&messages);
        draw(&mut view, &mut terminal, &messages);

        view.set_visible(true, &messages);
        for _ in 0..40 {
            view.tick(Duration::from_millis(33));
            draw(&mut view, &mut terminal, &messages);
        }

        assert_eq!(view.presence(), PresenceState::Present);
        assert_eq!(view.row_progress(&messages[299].id), 1.0);
        assert_eq!(view.row_progress(&messages[0].id), 1.0);
        assert!(!view.is_animating());
    }

    #[test]
    fn test_edit_keeps_entrance_and_does_not_scroll() {
        let mut messages = messages(5);
        let mut view = view(true);
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        view.prime(&messages);
        draw(&mut view, &mut terminal, &messages);
        let offset = view.scroll().offset();

        messages[2] = ChatEvent::remote("m2", "message 2, corrected").at(1_000).edited_at(2_000).into_message().unwrap();
        view.sync(&messages);
        draw(&mut view, &mut terminal, &messages);

        assert_eq!(view.row_progress(&messages[2].id), 1.0);
        assert!(view.last_scroll_request().is_none());
        assert_eq!(view.scroll().offset(), offset);
        assert!(view.take_announcements().is_empty());
    }
}
