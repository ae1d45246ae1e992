use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Reference bound for the connection-timeout watchdog
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 200_000;

/// Locale used when none is configured or the configured one is unusable
pub const FALLBACK_LOCALE: &str = "en-US";

/// When the transcript viewport follows new messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollPolicy {
    /// Scroll to the newest row whenever the message count grows (default)
    #[default]
    OnGrowth,
    /// Scroll only when the newest message is the user's own
    OnLocalMessage,
}

impl ScrollPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollPolicy::OnGrowth => "on-growth",
            ScrollPolicy::OnLocalMessage => "on-local-message",
        }
    }
}

impl std::fmt::Display for ScrollPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Session capabilities and lifecycle settings, consumed at composition time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Show the chat toggle and chat input in the control bar
    #[serde(default = "default_true")]
    pub supports_chat_input: bool,

    /// Show camera and screen-share controls
    #[serde(default)]
    pub supports_video_input: bool,

    /// Show the pre-connect buffering banner
    #[serde(default)]
    pub is_pre_connect_buffer_enabled: bool,

    /// Watchdog bound in milliseconds
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Auto-scroll policy for the transcript
    #[serde(default)]
    pub scroll_policy: ScrollPolicy,

    /// Enable the debug-mode hook
    #[serde(default)]
    pub debug: bool,
}

impl SessionConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            supports_chat_input: true,
            supports_video_input: false,
            is_pre_connect_buffer_enabled: false,
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
            scroll_policy: ScrollPolicy::default(),
            debug: false,
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// BCP 47 locale for time labels (e.g. "en-US", "de-DE")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Fixed UTC offset for time labels; host local offset when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,

    /// Label shown on the assistant badge
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { locale: None, utc_offset_minutes: None, agent_name: default_agent_name() }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: FileLoggingConfig,
    #[serde(default)]
    pub privacy: PrivacyLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: FileLoggingConfig::default(),
            privacy: PrivacyLoggingConfig::default(),
        }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_file_log_level")]
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_log_level() }
    }
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivacyLoggingConfig {
    /// "none", "truncate" or "full"
    #[serde(default = "default_body_logging")]
    pub log_message_bodies: String,
    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

impl Default for PrivacyLoggingConfig {
    fn default() -> Self {
        Self { log_message_bodies: default_body_logging(), truncate_length: default_truncate_length() }
    }
}

fn default_true() -> bool {
    true
}

fn default_connection_timeout_ms() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT_MS
}

fn default_agent_name() -> String {
    "Agent".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

fn default_body_logging() -> String {
    "truncate".to_string()
}

fn default_truncate_length() -> usize {
    80
}

/// Root configuration structure for voxline.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Parse(e.to_string()))
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        if self.session.connection_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::ZeroTimeout.to_string()));
        }

        if let Some(locale) = &self.display.locale
            && !is_well_formed_locale(locale)
        {
            return Err(Error::Config(ConfigError::InvalidLocale(locale.clone()).to_string()));
        }

        if let Some(offset) = self.display.utc_offset_minutes
            && offset.abs() >= 24 * 60
        {
            return Err(Error::Config(ConfigError::InvalidUtcOffset(offset).to_string()));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# voxline configuration example

[session]
# Show the chat toggle and chat input in the control bar
supports_chat_input = true
# Show camera and screen-share controls
supports_video_input = false
# Show the "agent is listening" banner until the first message arrives
is_pre_connect_buffer_enabled = true
# Tear the session down if no connection is established within this bound
connection_timeout_ms = 200000
# "on-growth" or "on-local-message"
scroll_policy = "on-growth"
# Log connection transitions and transcript growth at debug level
debug = false

[display]
# Locale for message time labels (falls back to en-US)
locale = "en-US"
# utc_offset_minutes = 0
agent_name = "Agent"

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = false
level = "debug"

[logging.privacy]
# "none", "truncate" or "full"
log_message_bodies = "truncate"
truncate_length = 80
"#
    }
}

/// Loose BCP 47 shape check: a 2-3 letter language, optional subtags
fn is_well_formed_locale(locale: &str) -> bool {
    let mut parts = locale.split(['-', '_']);
    let Some(language) = parts.next() else {
        return false;
    };
    let language_ok = (2..=3).contains(&language.len()) && language.chars().all(|c| c.is_ascii_alphabetic());
    language_ok && parts.all(|p| !p.is_empty() && p.len() <= 8 && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Locale is not a BCP 47 tag
    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    /// Offset outside a day
    #[error("invalid utc offset: {0} minutes")]
    InvalidUtcOffset(i32),

    /// Watchdog bound must be positive
    #[error("connection_timeout_ms must be greater than zero")]
    ZeroTimeout,

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_policy_values() {
        assert_eq!(ScrollPolicy::OnGrowth.as_str(), "on-growth");
        assert_eq!(ScrollPolicy::OnLocalMessage.as_str(), "on-local-message");
        assert_eq!(ScrollPolicy::default().to_string(), "on-growth");
    }

    #[test]
    fn test_scroll_policy_rejects_unknown_value() {
        let result = Config::from_toml_str("[session]\nscroll_policy = \"sometimes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.session.supports_chat_input);
        assert!(!config.session.supports_video_input);
        assert!(!config.session.is_pre_connect_buffer_enabled);
        assert_eq!(config.session.connection_timeout_ms, 200_000);
        assert_eq!(config.session.connection_timeout(), Duration::from_secs(200));
        assert_eq!(config.display.locale, None);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_config_from_empty_toml() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_from_toml_str() {
        let toml = r#"
[session]
supports_chat_input = false
supports_video_input = true
is_pre_connect_buffer_enabled = true
connection_timeout_ms = 15000
scroll_policy = "on-local-message"
debug = true

[display]
locale = "de-DE"
utc_offset_minutes = 60
agent_name = "Barista"
"#;

        let config = Config::from_toml_str(toml).unwrap();
        assert!(!config.session.supports_chat_input);
        assert!(config.session.supports_video_input);
        assert!(config.session.is_pre_connect_buffer_enabled);
        assert_eq!(config.session.connection_timeout_ms, 15_000);
        assert_eq!(config.session.scroll_policy, ScrollPolicy::OnLocalMessage);
        assert!(config.session.debug);
        assert_eq!(config.display.locale.as_deref(), Some("de-DE"));
        assert_eq!(config.display.utc_offset_minutes, Some(60));
        assert_eq!(config.display.agent_name, "Barista");
    }

    #[test]
    fn test_config_example_parses() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert!(config.session.is_pre_connect_buffer_enabled);
        assert_eq!(config.session.connection_timeout_ms, DEFAULT_CONNECTION_TIMEOUT_MS);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let result = Config::from_toml_str("[session]\nconnection_timeout_ms = 0\n");
        assert!(result.unwrap_err().to_string().contains("greater than zero"));
    }

    #[test]
    fn test_config_validation_bad_locale() {
        let result = Config::from_toml_str("[display]\nlocale = \"not a locale\"\n");
        assert!(result.unwrap_err().to_string().contains("invalid locale"));
    }

    #[test]
    fn test_config_validation_bad_offset() {
        let result = Config::from_toml_str("[display]\nutc_offset_minutes = 1440\n");
        assert!(result.unwrap_err().to_string().contains("invalid utc offset"));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result = Config::from_toml_str("[session]\nsupports_teleport = true\n");
        assert!(result.unwrap_err().to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxline.toml");
        std::fs::write(&path, "[session]\ndebug = true\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.session.debug);
    }

    #[test]
    fn test_well_formed_locales() {
        assert!(is_well_formed_locale("en-US"));
        assert!(is_well_formed_locale("en_GB"));
        assert!(is_well_formed_locale("fr"));
        assert!(is_well_formed_locale("zh-Hant-TW"));
        assert!(!is_well_formed_locale(""));
        assert!(!is_well_formed_locale("english"));
        assert!(!is_well_formed_locale("en-"));
    }
}
