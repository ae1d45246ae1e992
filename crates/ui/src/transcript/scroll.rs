//! Keeps the newest message in view as the transcript grows.
//!
//! Offsets are measured in lines from the top of the content. The controller
//! only reacts to the message count increasing; edits and re-renders at the
//! same count never move the viewport.

use std::time::Duration;
use voxline_core::debug::DebugCategory;
use voxline_core::{Message, ScrollPolicy, debug_log};

/// Length of a smooth scroll
pub const SMOOTH_SCROLL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animate from the current offset
    Smooth,
    /// Jump as soon as layout is known
    Instant,
}

/// A scroll-to-bottom issued after the count grew
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: usize,
    pub behavior: ScrollBehavior,
}

/// Measured geometry of the scroll container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub height: usize,
    pub content_height: usize,
}

impl Viewport {
    pub fn new(height: usize, content_height: usize) -> Self {
        Self { height, content_height }
    }

    /// Whether a real layout has been measured
    pub fn has_layout(&self) -> bool {
        self.height > 0
    }

    /// Largest offset that still fills the viewport
    pub fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.height)
    }
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: usize,
    to: usize,
    elapsed: Duration,
}

impl ScrollAnimation {
    fn offset(&self) -> usize {
        let t = (self.elapsed.as_secs_f32() / SMOOTH_SCROLL.as_secs_f32()).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        let (from, to) = (self.from as f32, self.to as f32);
        (from + (to - from) * eased).round() as usize
    }

    fn is_done(&self) -> bool {
        self.elapsed >= SMOOTH_SCROLL
    }
}

/// Whether growth ending in `messages` should scroll under `policy`
pub fn should_follow(policy: ScrollPolicy, messages: &[Message]) -> bool {
    match policy {
        ScrollPolicy::OnGrowth => true,
        ScrollPolicy::OnLocalMessage => messages.last().is_some_and(Message::is_local),
    }
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    policy: ScrollPolicy,
    last_count: usize,
    offset: usize,
    viewport: Viewport,
    animation: Option<ScrollAnimation>,
    pending_jump: bool,
}

impl ScrollController {
    pub fn new(policy: ScrollPolicy) -> Self {
        Self { policy, last_count: 0, offset: 0, viewport: Viewport::default(), animation: None, pending_jump: false }
    }

    /// Current top offset in lines
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Feed the latest sequence and measured viewport, after layout and before paint
    ///
    /// Returns the request issued when the count grew and the policy allows
    /// following. Smooth when the viewport already had a layout on the previous
    /// observation, instant otherwise.
    pub fn observe(&mut self, messages: &[Message], viewport: Viewport) -> Option<ScrollRequest> {
        let had_layout = self.viewport.has_layout();
        self.viewport = viewport;

        if viewport.has_layout() {
            if self.pending_jump {
                self.offset = viewport.max_offset();
                self.pending_jump = false;
            }
            self.offset = self.offset.min(viewport.max_offset());
        }

        let count = messages.len();
        let previous = std::mem::replace(&mut self.last_count, count);
        if count <= previous || !should_follow(self.policy, messages) {
            return None;
        }

        let behavior = match had_layout && viewport.has_layout() {
            true => ScrollBehavior::Smooth,
            false => ScrollBehavior::Instant,
        };
        let request = ScrollRequest { target: viewport.max_offset(), behavior };
        debug_log!(DebugCategory::Scroll, "count {} -> {}, {:?} to {}", previous, count, behavior, request.target);
        self.apply(request);
        Some(request)
    }

    /// A newer request supersedes any animation in flight
    fn apply(&mut self, request: ScrollRequest) {
        match request.behavior {
            ScrollBehavior::Smooth => {
                self.animation = Some(ScrollAnimation { from: self.offset, to: request.target, elapsed: Duration::ZERO });
            }
            ScrollBehavior::Instant => {
                self.animation = None;
                if self.viewport.has_layout() {
                    self.offset = request.target;
                } else {
                    self.pending_jump = true;
                }
            }
        }
    }

    /// Advance a smooth scroll
    pub fn tick(&mut self, dt: Duration) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        animation.elapsed += dt;
        self.offset = animation.offset();
        if animation.is_done() {
            self.offset = animation.to;
            self.animation = None;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.viewport.max_offset()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.animation = None;
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.animation = None;
        self.offset = (self.offset + lines).min(self.viewport.max_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport.height.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport.height.saturating_sub(1).max(1));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.animation = None;
        self.offset = self.viewport.max_offset();
    }
}
