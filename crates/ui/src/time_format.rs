//! Locale-aware time-of-day labels for transcript rows.

use chrono::{FixedOffset, Local, Locale, Offset, Utc};
use voxline_core::{DisplayConfig, FALLBACK_LOCALE, Timestamp};

/// Regions whose conventional clock is 12-hour
const TWELVE_HOUR_REGIONS: &[&str] = &["US", "CA", "AU", "NZ", "IN", "PH", "PK", "BD", "EG", "SA", "MX", "CO", "KR", "TW"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourCycle {
    H12,
    H24,
}

impl HourCycle {
    fn pattern(self) -> &'static str {
        match self {
            HourCycle::H12 => "%I:%M %p",
            HourCycle::H24 => "%H:%M",
        }
    }
}

/// Formats timestamps as two-digit hour and minute in one locale and offset
#[derive(Debug, Clone)]
pub struct TimeFormatter {
    locale: Locale,
    tag: String,
    cycle: HourCycle,
    offset: FixedOffset,
}

impl TimeFormatter {
    /// Build a formatter; unknown or missing locales fall back to `en-US`
    pub fn new(locale: Option<&str>, offset: FixedOffset) -> Self {
        let (locale, tag) = locale
            .and_then(|tag| resolve_locale(tag).map(|locale| (locale, tag.to_string())))
            .or_else(|| resolve_locale(FALLBACK_LOCALE).map(|locale| (locale, FALLBACK_LOCALE.to_string())))
            .unwrap_or((Locale::en_US, FALLBACK_LOCALE.to_string()));
        let cycle = hour_cycle(&tag);
        Self { locale, tag, cycle, offset }
    }

    pub fn utc(locale: Option<&str>) -> Self {
        Self::new(locale, Utc.fix())
    }

    /// Formatter for the configured locale, using the configured offset or the host's
    pub fn from_config(display: &DisplayConfig) -> Self {
        let offset = display
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| Local::now().offset().fix());
        Self::new(display.locale.as_deref(), offset)
    }

    /// Locale tag actually in effect
    pub fn locale_tag(&self) -> &str {
        &self.tag
    }

    pub fn hour_cycle(&self) -> HourCycle {
        self.cycle
    }

    /// Time label for a row; empty when the message carries no timestamp
    pub fn format(&self, timestamp: Option<Timestamp>) -> String {
        let Some(timestamp) = timestamp else {
            return String::new();
        };
        timestamp
            .as_datetime()
            .with_timezone(&self.offset)
            .format_localized(self.cycle.pattern(), self.locale)
            .to_string()
    }
}

/// Map a BCP 47 tag like `de-DE` to a POSIX locale like `de_DE`
fn resolve_locale(tag: &str) -> Option<Locale> {
    let normalized = tag.trim().replace('-', "_");
    if let Ok(locale) = Locale::try_from(normalized.as_str()) {
        return Some(locale);
    }
    let language = normalized.split('_').next()?;
    Locale::try_from(language).ok()
}

fn hour_cycle(tag: &str) -> HourCycle {
    let mut parts = tag.split(['-', '_']);
    let language = parts.next().unwrap_or_default().to_ascii_lowercase();
    match parts.next() {
        Some(region) if TWELVE_HOUR_REGIONS.contains(&region.to_ascii_uppercase().as_str()) => HourCycle::H12,
        Some(_) => HourCycle::H24,
        None if language == "en" => HourCycle::H12,
        None => HourCycle::H24,
    }
}
