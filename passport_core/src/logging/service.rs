//! Logging service implementation

use super::events::{LogEvent, LogLevel};
use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH};
use crate::config::LoggingPreferences;
use std::sync::{Arc, Mutex};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with level filtering
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Create service from runtime logging preferences
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let min_level = preferences.min_log_level;
        let logger: Arc<dyn Logger> = if !preferences.enable_console_logging {
            Arc::new(NullLogger)
        } else if preferences.use_structured_logging {
            Arc::new(StructuredLogger::new(min_level))
        } else {
            Arc::new(ConsoleLogger::new(min_level))
        };

        Self::new(logger, min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Log an event
    pub fn log_event(&self, mut event: LogEvent) {
        if self.should_log(event.level) {
            if event.message.len() > MAX_LOG_MESSAGE_LENGTH {
                let mut cut = MAX_LOG_MESSAGE_LENGTH;
                while !event.message.is_char_boundary(cut) {
                    cut -= 1;
                }
                event.message.truncate(cut);
            }
            self.logger.log(&event);
        }
    }
}

/// Logger that drops everything
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Simple console logger
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            eprintln!("{}", event.format());
        }
    }
}

/// Structured logger for JSON output
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            // Fallback to regular format if JSON serialization fails
            let line = event.format_json().unwrap_or_else(|_| event.format());
            eprintln!("{}", line);
        }
    }
}

/// Memory logger for testing
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_warnings(&self) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.is_warning())
            .cloned()
            .collect()
    }

    pub fn has_event_with_code(&self, code: super::Code) -> bool {
        self.lock().iter().any(|e| e.code == code)
    }

    pub fn count_with_code(&self, code: super::Code) -> usize {
        self.lock().iter().filter(|e| e.code == code).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();

        if events.len() >= LOG_BUFFER_SIZE {
            let remove_count = events.len() - LOG_BUFFER_SIZE + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

/// Create testing logger (memory-based, all events captured) and a debug-level service over it
pub fn create_test_service() -> (Arc<LoggingService>, Arc<MemoryLogger>) {
    let memory = Arc::new(MemoryLogger::new());
    let service = Arc::new(LoggingService::new(memory.clone(), LogLevel::Debug));
    (service, memory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::warning_with_code(
            codes::reduction::MALFORMED_FIELD,
            "Malformed",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_warnings().len(), 1);
        assert!(logger.has_event_with_code(codes::reduction::MALFORMED_FIELD));

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Warning);

        service.log_event(LogEvent::debug("Debug message"));
        service.log_event(LogEvent::info("Info message"));
        service.log_event(LogEvent::error(codes::system::INTERNAL_ERROR, "Error"));

        assert_eq!(logger.event_count(), 1);
        assert!(logger.has_event_with_code(codes::system::INTERNAL_ERROR));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let (service, memory) = create_test_service();
        service.log_event(LogEvent::info(&"x".repeat(MAX_LOG_MESSAGE_LENGTH + 10)));

        let events = memory.get_events();
        assert_eq!(events[0].message.len(), MAX_LOG_MESSAGE_LENGTH);
    }

    #[test]
    fn test_console_loggers_do_not_panic() {
        ConsoleLogger::new(LogLevel::Info).log(&LogEvent::info("Test message"));
        StructuredLogger::new(LogLevel::Debug).log(
            &LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "Test error")
                .with_context("key", "value"),
        );
    }

    #[test]
    fn test_service_from_preferences_uses_configured_level() {
        let preferences = LoggingPreferences {
            use_structured_logging: true,
            enable_console_logging: true,
            min_log_level: LogLevel::Error,
        };
        let service = LoggingService::from_preferences(&preferences);

        assert_eq!(service.min_level(), LogLevel::Error);
        assert!(service.should_log(LogLevel::Error));
        assert!(!service.should_log(LogLevel::Warning));
        service.log_event(LogEvent::error(codes::system::INTERNAL_ERROR, "structured"));
    }
}
