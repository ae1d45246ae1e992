//! Enter/exit animation state for the transcript panel and its rows.
//!
//! Frames are driven by [`Presence::tick`]; nothing here touches the clock, so
//! the whole lifecycle can be stepped deterministically in tests.

use std::collections::HashMap;
use std::time::Duration;
use voxline_core::{Message, MessageId};

/// Duration of the container enter/exit transition
pub const TRANSITION: Duration = Duration::from_millis(300);

/// Delay between successive rows entering
pub const STAGGER: Duration = Duration::from_millis(100);

/// Rows the container travels while entering or exiting
pub const TRAVEL_ROWS: u16 = 2;

/// Fewest lines a transcript row occupies: meta line, one body line, separator
const MIN_ROW_LINES: usize = 3;

/// Rows that can share a viewport `height` lines tall, counting a partial row at each edge
pub fn rows_in_view(height: usize) -> usize {
    height.div_ceil(MIN_ROW_LINES) + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    /// Not mounted; nothing is drawn
    Absent,
    Entering,
    Present,
    /// Still mounted and drawn while the exit transition runs
    Exiting,
}

impl PresenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceState::Absent => "absent",
            PresenceState::Entering => "entering",
            PresenceState::Present => "present",
            PresenceState::Exiting => "exiting",
        }
    }
}

/// Mount/unmount state machine with a timed transition in each direction
#[derive(Debug, Clone)]
pub struct Presence {
    state: PresenceState,
    elapsed: Duration,
    duration: Duration,
}

impl Presence {
    /// Initial state on first mount
    ///
    /// A panel that starts visible is shown settled; the entrance transition
    /// only plays on a later hidden-to-visible change.
    pub fn initial(visible: bool) -> Self {
        let state = if visible { PresenceState::Present } else { PresenceState::Absent };
        Self { state, elapsed: Duration::ZERO, duration: TRANSITION }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    /// Request visibility; returns true when this starts an entrance
    ///
    /// Reversing mid-transition continues from the current progress instead
    /// of jumping.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        match (visible, self.state) {
            (true, PresenceState::Absent) => {
                self.state = PresenceState::Entering;
                self.elapsed = Duration::ZERO;
                true
            }
            (true, PresenceState::Exiting) => {
                self.state = PresenceState::Entering;
                self.elapsed = self.duration.saturating_sub(self.elapsed);
                true
            }
            (false, PresenceState::Present) => {
                self.state = PresenceState::Exiting;
                self.elapsed = Duration::ZERO;
                false
            }
            (false, PresenceState::Entering) => {
                self.state = PresenceState::Exiting;
                self.elapsed = self.duration.saturating_sub(self.elapsed);
                false
            }
            _ => false,
        }
    }

    /// Advance the running transition
    pub fn tick(&mut self, dt: Duration) {
        match self.state {
            PresenceState::Entering | PresenceState::Exiting => {
                self.elapsed += dt;
                if self.elapsed >= self.duration {
                    self.elapsed = Duration::ZERO;
                    self.state = match self.state {
                        PresenceState::Entering => PresenceState::Present,
                        _ => PresenceState::Absent,
                    };
                }
            }
            PresenceState::Absent | PresenceState::Present => {}
        }
    }

    /// Whether the panel is in the tree at all
    pub fn is_mounted(&self) -> bool {
        self.state != PresenceState::Absent
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, PresenceState::Entering | PresenceState::Exiting)
    }

    /// Visibility in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        let t = ratio(self.elapsed, self.duration);
        match self.state {
            PresenceState::Absent => 0.0,
            PresenceState::Entering => t,
            PresenceState::Present => 1.0,
            PresenceState::Exiting => 1.0 - t,
        }
    }

    /// Downward displacement in rows for the current progress
    pub fn vertical_offset(&self) -> u16 {
        ((1.0 - self.progress()) * TRAVEL_ROWS as f32).round() as u16
    }
}

fn ratio(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowEntrance {
    /// Drawn at full strength
    Settled,
    /// Begins fading in at this point on the stagger clock
    Scheduled(Duration),
}

/// Per-row entrance scheduling keyed by message id
///
/// Rows enter top to bottom one [`STAGGER`] apart. Rows already known keep
/// their entry when their message is edited.
///
/// A restage only replays the trailing rows that fit on screen; history
/// above them is settled, so a long transcript opens with its newest rows
/// in view after a bounded delay.
#[derive(Debug, Clone, Default)]
pub struct RowStagger {
    clock: Duration,
    rows: HashMap<MessageId, RowEntrance>,
}

impl RowStagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every current row as already entered
    pub fn settle(&mut self, messages: &[Message]) {
        self.rows = messages.iter().map(|m| (m.id.clone(), RowEntrance::Settled)).collect();
    }

    /// Replay the staggered entrance for the last `in_view` rows, as when the panel appears
    pub fn restage(&mut self, messages: &[Message], in_view: usize) {
        let clock = self.clock;
        let first_staged = messages.len().saturating_sub(in_view);
        self.rows = messages
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let entrance = match i.checked_sub(first_staged) {
                    Some(slot) => RowEntrance::Scheduled(clock + STAGGER * slot as u32),
                    None => RowEntrance::Settled,
                };
                (m.id.clone(), entrance)
            })
            .collect();
    }

    /// Schedule rows for ids not seen before; returns how many were added
    pub fn sync(&mut self, messages: &[Message]) -> usize {
        let mut added = 0u32;
        for message in messages {
            if !self.rows.contains_key(&message.id) {
                self.rows.insert(message.id.clone(), RowEntrance::Scheduled(self.clock + STAGGER * added));
                added += 1;
            }
        }
        added as usize
    }

    pub fn tick(&mut self, dt: Duration) {
        self.clock += dt;
    }

    /// Row visibility in `0.0..=1.0`; unknown ids are treated as settled
    pub fn progress(&self, id: &MessageId) -> f32 {
        match self.rows.get(id) {
            None | Some(RowEntrance::Settled) => 1.0,
            Some(RowEntrance::Scheduled(start)) => match self.clock.checked_sub(*start) {
                Some(elapsed) => ratio(elapsed, TRANSITION),
                None => 0.0,
            },
        }
    }

    /// Whether any row is still waiting or fading in
    pub fn is_animating(&self) -> bool {
        self.rows.values().any(|entry| match entry {
            RowEntrance::Settled => false,
            RowEntrance::Scheduled(start) => self.clock < *start + TRANSITION,
        })
    }
}
