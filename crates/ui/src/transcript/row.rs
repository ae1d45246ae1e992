use crate::time_format::TimeFormatter;

use voxline_core::{Message, MessageId, Origin};

/// Identity marker drawn beside a bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    /// The remote assistant
    Assistant,
    /// This session's own participant
    Own,
}

/// Horizontal edge a row is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Leading,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    Local,
    Remote,
}

/// How assistive output should announce a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Politeness {
    /// Queued after whatever is being read, never interrupting it
    Polite,
}

impl Politeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Politeness::Polite => "polite",
        }
    }
}

/// Everything needed to draw one message, derived fresh from the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRow {
    pub key: MessageId,
    pub origin: Origin,
    pub badge: Badge,
    pub edge: Edge,
    pub bubble: BubbleStyle,
    pub time_label: String,
    pub edited: bool,
    /// Sanitized body, still literal text
    pub body: String,
    pub live_region: Politeness,
}

impl TranscriptRow {
    pub fn from_message(message: &Message, formatter: &TimeFormatter) -> Self {
        let origin = message.origin();
        let (badge, edge, bubble) = match origin {
            Origin::Local => (Badge::Own, Edge::Trailing, BubbleStyle::Local),
            Origin::Remote => (Badge::Assistant, Edge::Leading, BubbleStyle::Remote),
        };
        Self {
            key: message.id.clone(),
            origin,
            badge,
            edge,
            bubble,
            time_label: formatter.format(message.timestamp),
            edited: message.is_edited(),
            body: sanitize_body(&message.body),
            live_region: Politeness::Polite,
        }
    }

    /// Text read out by assistive output for this row
    pub fn accessible_text(&self, agent_name: &str) -> String {
        let speaker = match self.badge {
            Badge::Assistant => agent_name,
            Badge::Own => "You",
        };
        let mut text = match self.time_label.is_empty() {
            true => format!("{speaker}: {}", self.body),
            false => format!("{speaker} at {}: {}", self.time_label, self.body),
        };
        if self.edited {
            text.push_str(" (edited)");
        }
        text
    }
}

/// Rows for a sequence, one per message in order
pub fn build_rows(messages: &[Message], formatter: &TimeFormatter) -> Vec<TranscriptRow> {
    messages.iter().map(|message| TranscriptRow::from_message(message, formatter)).collect()
}

/// Make a body safe to print verbatim
///
/// Control characters would let a message drive the terminal, so they are
/// dropped. Newlines survive and tabs become spaces; nothing else is touched.
pub fn sanitize_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for ch in body.chars() {
        match ch {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            '\r' => {}
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxline_core::ChatEvent;

    fn formatter() -> TimeFormatter {
        TimeFormatter::utc(Some("en-US"))
    }

    #[test]
    fn test_remote_row_leads_with_assistant_badge() {
        let message = ChatEvent::remote("a", "hello").into_message().unwrap();
        let row = TranscriptRow::from_message(&message, &formatter());

        assert_eq!(row.badge, Badge::Assistant);
        assert_eq!(row.edge, Edge::Leading);
        assert_eq!(row.bubble, BubbleStyle::Remote);
        assert_eq!(row.live_region, Politeness::Polite);
    }

    #[test]
    fn test_single_remote_hello() {
        let messages = vec![ChatEvent::remote("1", "Hello").at(1_700_000_000_000).into_message().unwrap()];
        let rows = build_rows(&messages, &formatter());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].edge, Edge::Leading);
        assert_eq!(rows[0].badge, Badge::Assistant);
        assert_eq!(rows[0].body, "Hello");
        assert!(!rows[0].time_label.is_empty());
        assert!(!rows[0].edited);
    }

    #[test]
    fn test_local_row_trails_with_own_badge() {
        let message = ChatEvent::local("a", "hi").into_message().unwrap();
        let row = TranscriptRow::from_message(&message, &formatter());

        assert_eq!(row.badge, Badge::Own);
        assert_eq!(row.edge, Edge::Trailing);
        assert_eq!(row.bubble, BubbleStyle::Local);
    }

    #[test]
    fn test_edit_timestamp_sets_edited() {
        let message = ChatEvent::remote("a", "fixed").at(1_000).edited_at(2_000).into_message().unwrap();
        let row = TranscriptRow::from_message(&message, &formatter());
        assert!(row.edited);
        assert!(row.accessible_text("Agent").ends_with("(edited)"));
    }

    #[test]
    fn test_missing_timestamp_empty_label() {
        let message = ChatEvent::remote("a", "no clock").into_message().unwrap();
        let row = TranscriptRow::from_message(&message, &formatter());
        assert_eq!(row.time_label, "");
        assert_eq!(row.accessible_text("Barista"), "Barista: no clock");
    }

    #[test]
    fn test_body_is_literal() {
        let markup = "<b>bold</b> **not markdown** [link](x)";
        let message = ChatEvent::remote("a", markup).into_message().unwrap();
        let row = TranscriptRow::from_message(&message, &formatter());
        assert_eq!(row.body, markup);
    }

    #[test]
    fn test_sanitize_strips_control_sequences() {
        assert_eq!(sanitize_body("\u{1b}[31mred\u{1b}[0m"), "[31mred[0m");
        assert_eq!(sanitize_body("a\r\nb\tc"), "a\nb    c");
        assert_eq!(sanitize_body("  keep  spaces  "), "  keep  spaces  ");
    }

    #[test]
    fn test_build_rows_keeps_order_and_keys() {
        let messages = vec![
            ChatEvent::remote("b", "2").at(5_000).into_message().unwrap(),
            ChatEvent::local("a", "1").at(1_000).into_message().unwrap(),
        ];
        let rows = build_rows(&messages, &formatter());
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
