//! Logging for the session front-end, built on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `VOXLINE_LOG`: Filter directive (like `RUST_LOG`), e.g., `voxline_ui=debug`
//! - `VOXLINE_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `VOXLINE_LOG_DIR`: Directory for the rolling log file (default `~/.voxline/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = true
//! level = "debug"
//!
//! [logging.privacy]
//! log_message_bodies = "truncate"
//! truncate_length = 80
//! ```
//!
//! Each sink has its own filter: stderr follows `level` (or `VOXLINE_LOG`),
//! the file follows `[logging.file] level`.
//!
//! The TUI owns the terminal while a session is running, so the binary turns
//! stderr output off (`LoggingConfig::without_stderr`), which makes the file
//! the only sink. A session with `debug = true` raises the file to debug
//! (`LoggingConfig::with_debug`) so the debug hook and announcements land.

use crate::Error;
use crate::config::{FileLoggingConfig, LoggingConfig as ConfigLoggingConfig};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

}

/// How message bodies appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyLogging {
    /// Never log bodies.
    None,
    /// Log the first `truncate_length` chars.
    #[default]
    Truncate,
    /// Log full bodies (may include sensitive speech transcripts).
    Full,
}

impl BodyLogging {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(BodyLogging::None),
            "truncate" => Some(BodyLogging::Truncate),
            "full" => Some(BodyLogging::Full),
            _ => None,
        }
    }
}

/// Privacy configuration for transcript content in logs.
#[derive(Debug, Clone)]
pub struct PrivacyConfig {
    pub log_message_bodies: BodyLogging,
    /// Maximum length for truncated content.
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_message_bodies: BodyLogging::default(), truncate_length: 80 }
    }
}

/// Resolved logging settings used to build the subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level for stderr output.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// Emit to stderr at all.
    pub stderr: bool,
    /// File sink and its level; `None` when file logging is off.
    pub file: Option<FileLoggingConfig>,
    pub privacy: PrivacyConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            stderr: true,
            file: None,
            privacy: PrivacyConfig::default(),
        }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();
        let log_message_bodies = BodyLogging::parse_str(&config.privacy.log_message_bodies).unwrap_or_default();

        Self {
            level: config.level,
            format,
            stderr: true,
            file: if config.file.enabled { Some(config.file) } else { None },
            privacy: PrivacyConfig { log_message_bodies, truncate_length: config.privacy.truncate_length },
        }
    }
}

impl LoggingConfig {
    /// Disable stderr output (while a full-screen UI owns the terminal).
    ///
    /// The file becomes the only sink, so it is switched on at `level` when
    /// the config left it off.
    pub fn without_stderr(mut self) -> Self {
        self.stderr = false;
        if self.file.is_none() {
            self.file = Some(FileLoggingConfig { enabled: true, level: self.level.clone() });
        }
        self
    }

    /// Let debug-level events reach the file sink.
    pub fn with_debug(mut self) -> Self {
        let file = self.file.get_or_insert_with(|| FileLoggingConfig { enabled: true, level: self.level.clone() });
        file.level = "debug".to_string();
        self
    }

    /// Filter for stderr, from `VOXLINE_LOG`, `RUST_LOG`, or `level`; `None` when stderr is off.
    pub fn stderr_filter(&self) -> Option<EnvFilter> {
        if !self.stderr {
            return None;
        }
        let filter = env::var("VOXLINE_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone());

        Some(EnvFilter::new(filter))
    }

    /// Filter for the file sink; `None` when file logging is off.
    pub fn file_filter(&self) -> Option<EnvFilter> {
        self.file.as_ref().map(|file| EnvFilter::new(&file.level))
    }

    /// Detect if stderr is a TTY for pretty formatting.
    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the appropriate format for stderr output.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("VOXLINE_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if self.format != LogFormat::Pretty {
            return self.format;
        }

        if Self::is_tty() { LogFormat::Pretty } else { LogFormat::Compact }
    }

    /// Get the log directory path.
    pub fn log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("VOXLINE_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home =
            dirs::home_dir().ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".voxline").join("logs"))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn stderr_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).boxed(),
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Sets up:
/// - Formatted stderr output (pretty, json, or compact) under its own filter, unless disabled
/// - Optional daily-rolling JSON file output under the file level
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if let Some(filter) = config.stderr_filter() {
        layers.push(stderr_layer(config.detect_format()).with_filter(filter).boxed());
    }

    let mut guard = None;
    if let Some(filter) = config.file_filter() {
        let log_dir = LoggingConfig::log_dir()?;
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "voxline.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        layers.push(fmt::layer().json().with_writer(non_blocking).with_filter(filter).boxed());
        guard = Some(file_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}

/// Redact a message body according to privacy settings.
pub fn redact_body(content: &str, privacy: &PrivacyConfig) -> String {
    match privacy.log_message_bodies {
        BodyLogging::None => "[REDACTED]".to_string(),
        BodyLogging::Full => content.to_string(),
        BodyLogging::Truncate => {
            let total = content.chars().count();
            if total <= privacy.truncate_length {
                return content.to_string();
            }
            let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
            truncated.push_str("...");
            truncated.push_str(&format!(" ({} total chars)", total));
            truncated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::parse_str("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse_str("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse_str("Compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse_str("invalid"), None);
    }

    #[test]
    fn test_body_logging_from_str() {
        assert_eq!(BodyLogging::parse_str("none"), Some(BodyLogging::None));
        assert_eq!(BodyLogging::parse_str("TRUNCATE"), Some(BodyLogging::Truncate));
        assert_eq!(BodyLogging::parse_str("full"), Some(BodyLogging::Full));
        assert_eq!(BodyLogging::parse_str("verbose"), None);
        assert_eq!(BodyLogging::default(), BodyLogging::Truncate);
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.stderr);
        assert!(config.file.is_none());
    }

    fn example_logging() -> ConfigLoggingConfig {
        crate::Config::from_toml_str(crate::Config::example()).unwrap().logging
    }

    fn max_level(filter: Option<EnvFilter>) -> Option<LevelFilter> {
        filter.and_then(|f| f.max_level_hint())
    }

    #[test]
    fn test_example_session_logs_warnings_to_file() {
        let config = LoggingConfig::from(example_logging()).without_stderr();

        assert!(config.stderr_filter().is_none());
        assert_eq!(max_level(config.file_filter()), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_debug_session_raises_file_level() {
        let config = LoggingConfig::from(example_logging()).without_stderr().with_debug();

        assert!(config.stderr_filter().is_none());
        assert_eq!(max_level(config.file_filter()), Some(LevelFilter::DEBUG));
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn test_file_level_is_independent_of_stderr_level() {
        let mut logging = example_logging();
        logging.file.enabled = true;
        let config = LoggingConfig::from(logging).without_stderr();

        assert_eq!(config.level, "warn");
        assert_eq!(max_level(config.file_filter()), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_logging_config_from_file_config() {
        let mut file_config = ConfigLoggingConfig::default();
        file_config.format = "json".to_string();
        file_config.file.enabled = true;
        file_config.privacy.log_message_bodies = "none".to_string();

        let config = LoggingConfig::from(file_config);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.file.is_some());
        assert_eq!(config.privacy.log_message_bodies, BodyLogging::None);
    }

    #[test]
    fn test_redact_body_none() {
        let privacy = PrivacyConfig { log_message_bodies: BodyLogging::None, truncate_length: 100 };
        assert_eq!(redact_body("my order is a latte", &privacy), "[REDACTED]");
    }

    #[test]
    fn test_redact_body_truncate() {
        let privacy = PrivacyConfig { log_message_bodies: BodyLogging::Truncate, truncate_length: 10 };

        let redacted = redact_body("abcdefghijklmnopqrstuvwxyz", &privacy);
        assert!(redacted.starts_with("abcdefghij..."));
        assert!(redacted.contains("26 total chars"));

        assert_eq!(redact_body("short", &privacy), "short");
    }

    #[test]
    fn test_redact_body_full() {
        let privacy = PrivacyConfig { log_message_bodies: BodyLogging::Full, truncate_length: 1 };
        let long_content = "a".repeat(200);
        assert_eq!(redact_body(&long_content, &privacy), long_content);
    }
}
