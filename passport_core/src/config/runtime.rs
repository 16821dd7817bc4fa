// RUNTIME PREFERENCES (User Experience)

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Read an environment variable and parse it, falling back to `default`
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Runtime configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerPreferences {
    /// Run the scanner on its own thread and hand tokens over a channel
    pub threaded: bool,

    /// Treat `\r\n` inside a newline run as a single newline
    pub fold_crlf: bool,

    /// Emit a debug event for every token (very noisy)
    pub trace_tokens: bool,
}

impl Default for ScannerPreferences {
    fn default() -> Self {
        Self {
            threaded: env_or(env_vars::SCANNER_THREADED, false),
            fold_crlf: env_or(env_vars::SCANNER_FOLD_CRLF, true),
            trace_tokens: env_or(env_vars::SCANNER_TRACE_TOKENS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPreferences {
    /// Require all six characters after `#` in `hcl` to be hex digits
    pub strict_hair_color: bool,

    /// Keep a per-record validation report in the pipeline result
    pub collect_reports: bool,

    /// Log a warning when a field has no `:` separator
    pub warn_on_malformed_fields: bool,
}

impl Default for ValidationPreferences {
    fn default() -> Self {
        Self {
            strict_hair_color: env_or(env_vars::VALIDATION_STRICT_HCL, false),
            collect_reports: env_or(env_vars::VALIDATION_COLLECT_REPORTS, false),
            warn_on_malformed_fields: env_or(env_vars::VALIDATION_WARN_MALFORMED, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub scanner: ScannerPreferences,
    pub validation: ValidationPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a runtime configuration; missing tables and keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a runtime configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Scanner
    pub const SCANNER_THREADED: &str = "PASSPORT_SCANNER_THREADED";
    pub const SCANNER_FOLD_CRLF: &str = "PASSPORT_SCANNER_FOLD_CRLF";
    pub const SCANNER_TRACE_TOKENS: &str = "PASSPORT_SCANNER_TRACE_TOKENS";

    // Validation
    pub const VALIDATION_STRICT_HCL: &str = "PASSPORT_VALIDATION_STRICT_HCL";
    pub const VALIDATION_COLLECT_REPORTS: &str = "PASSPORT_VALIDATION_COLLECT_REPORTS";
    pub const VALIDATION_WARN_MALFORMED: &str = "PASSPORT_VALIDATION_WARN_MALFORMED";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "PASSPORT_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "PASSPORT_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "PASSPORT_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [validation]
            strict_hair_color = true
            "#,
        )
        .unwrap();

        assert!(config.validation.strict_hair_color);
        assert_eq!(
            config.validation.warn_on_malformed_fields,
            ValidationPreferences::default().warn_on_malformed_fields
        );
    }

    #[test]
    fn test_log_level_from_toml() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [logging]
            min_log_level = "Debug"
            use_structured_logging = true
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert!(config.logging.use_structured_logging);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = RuntimeConfig::from_toml_str("[scanner]\nthreaded = \"maybe\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = RuntimeConfig::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
