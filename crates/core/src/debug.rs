use std::collections::HashSet;
use std::env;
use std::sync::OnceLock;

static DEBUG_CATEGORIES: OnceLock<HashSet<DebugCategory>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugCategory {
    Connection,
    Transcript,
    Scroll,
    Session,
    All,
}

impl DebugCategory {
    const CONCRETE: &[DebugCategory] =
        &[DebugCategory::Connection, DebugCategory::Transcript, DebugCategory::Scroll, DebugCategory::Session];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "connection" | "conn" => Some(DebugCategory::Connection),
            "transcript" | "messages" => Some(DebugCategory::Transcript),
            "scroll" => Some(DebugCategory::Scroll),
            "session" => Some(DebugCategory::Session),
            "all" => Some(DebugCategory::All),
            _ => None,
        }
    }
}

/// Parse a comma-separated category list such as `"connection,scroll"`
pub fn parse_categories(spec: &str) -> HashSet<DebugCategory> {
    let mut categories = HashSet::new();

    for part in spec.split(',') {
        if let Some(cat) = DebugCategory::parse_str(part.trim()) {
            if cat == DebugCategory::All {
                categories.extend(DebugCategory::CONCRETE.iter().copied());
            } else {
                categories.insert(cat);
            }
        }
    }

    categories
}

/// Install the debug categories once per process
///
/// `VOXLINE_DEBUG` wins when set; otherwise `enable_all` (the session's
/// `debug = true` flag) turns every category on.
pub fn init_debug(enable_all: bool) {
    let debug_str = env::var("VOXLINE_DEBUG").unwrap_or_default();

    if !debug_str.is_empty() {
        DEBUG_CATEGORIES.get_or_init(|| parse_categories(&debug_str));
    } else if enable_all {
        DEBUG_CATEGORIES.get_or_init(|| parse_categories("all"));
    } else {
        DEBUG_CATEGORIES.get_or_init(HashSet::new);
    }
}

pub fn is_debug_enabled(category: DebugCategory) -> bool {
    DEBUG_CATEGORIES
        .get()
        .map(|cats| cats.contains(&category))
        .unwrap_or(false)
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        if $crate::debug::is_debug_enabled($category) {
            $crate::__tracing::debug!(category = ?$category, "{}", format!($($arg)*));
        }
    };
}
