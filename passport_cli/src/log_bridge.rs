//! Forwards pipeline log events to the `log` facade

use passport_core::config::LoggingPreferences;
use passport_core::logging::{self, LogEvent, LogLevel, Logger, LoggingService};
use std::sync::Arc;

const TARGET: &str = "passport";

pub struct LogBridge;

impl Logger for LogBridge {
    fn log(&self, event: &LogEvent) {
        let level = match event.level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        };
        log::log!(target: TARGET, level, "{}", event.format());
    }
}

/// Level requested by `-v` repetitions, if any
pub fn level_for_verbosity(verbose: u8) -> Option<LogLevel> {
    match verbose {
        0 => None,
        1 => Some(LogLevel::Info),
        _ => Some(LogLevel::Debug),
    }
}

/// Runtime logging preferences with command-line verbosity applied
///
/// `-v` replaces the configured level and turns console output on.
pub fn effective_preferences(configured: &LoggingPreferences, verbose: u8) -> LoggingPreferences {
    let mut preferences = configured.clone();
    if let Some(level) = level_for_verbosity(verbose) {
        preferences.min_log_level = level;
        preferences.enable_console_logging = true;
    }
    preferences
}

/// Whether events should go through `log`/env_logger rather than the
/// library's own console or structured loggers
pub fn uses_bridge(preferences: &LoggingPreferences) -> bool {
    preferences.enable_console_logging && !preferences.use_structured_logging
}

fn level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    }
}

/// Install the global logger described by `preferences`
pub fn init(preferences: &LoggingPreferences) -> Result<(), String> {
    if !uses_bridge(preferences) {
        return logging::init_global_logging(preferences);
    }

    env_logger::Builder::new()
        .filter_level(level_filter(preferences.min_log_level))
        .parse_default_env()
        .format_target(false)
        .try_init()
        .map_err(|e| e.to_string())?;

    logging::init_global_logging_with_service(Arc::new(LoggingService::new(
        Arc::new(LogBridge),
        preferences.min_log_level,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(level: LogLevel, console: bool, structured: bool) -> LoggingPreferences {
        LoggingPreferences {
            use_structured_logging: structured,
            enable_console_logging: console,
            min_log_level: level,
        }
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), None);
        assert_eq!(level_for_verbosity(1), Some(LogLevel::Info));
        assert_eq!(level_for_verbosity(5), Some(LogLevel::Debug));
    }

    #[test]
    fn test_configuration_applies_without_verbosity() {
        let config = configured(LogLevel::Error, true, true);
        let effective = effective_preferences(&config, 0);

        assert_eq!(effective.min_log_level, LogLevel::Error);
        assert!(effective.use_structured_logging);
        assert!(!uses_bridge(&effective));
    }

    #[test]
    fn test_verbosity_overrides_level_only() {
        let config = configured(LogLevel::Warning, false, true);
        let effective = effective_preferences(&config, 2);

        assert_eq!(effective.min_log_level, LogLevel::Debug);
        assert!(effective.enable_console_logging);
        assert!(effective.use_structured_logging);
    }

    #[test]
    fn test_plain_console_goes_through_bridge() {
        assert!(uses_bridge(&configured(LogLevel::Info, true, false)));
        assert!(!uses_bridge(&configured(LogLevel::Info, false, false)));
        assert_eq!(level_filter(LogLevel::Warning), log::LevelFilter::Warn);
    }
}
