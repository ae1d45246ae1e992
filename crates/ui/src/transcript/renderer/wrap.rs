use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap literal text to `max_width` columns, keeping every space and line break
///
/// Breaks after the last space that fits; words wider than a line are split
/// at the column limit.
pub(super) fn wrap_preserving(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    for source_line in text.split('\n') {
        if source_line.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut width = 0;
        let mut break_at: Option<usize> = None;

        for ch in source_line.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if width + ch_width > max_width && !current.is_empty() {
                match break_at {
                    Some(idx) if idx < current.len() => {
                        let rest = current.split_off(idx);
                        out.push(std::mem::replace(&mut current, rest));
                    }
                    _ => out.push(std::mem::take(&mut current)),
                }
                width = current.width();
                break_at = None;
            }

            current.push(ch);
            width += ch_width;
            if ch == ' ' {
                break_at = Some(current.len());
            }
        }

        out.push(current);
    }

    out
}

/// Widest line in columns
pub(super) fn max_line_width(lines: &[String]) -> usize {
    lines.iter().map(|line| line.width()).max().unwrap_or(0)
}
