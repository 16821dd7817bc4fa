//! Logging module for the passport record scanner
//!
//! Events go to the logger installed for the current thread by [`with_logger`],
//! falling back to the process-wide logger set by [`init_global_logging`]. With
//! neither installed every macro is a no-op. Logging never feeds back into
//! scanning, reduction or validation.

pub mod codes;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::LoggingPreferences;
use crate::utils::Position;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    create_test_service, ConsoleLogger, Logger, LoggingService, MemoryLogger, NullLogger,
    StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static SCOPED_LOGGER: RefCell<Option<Arc<LoggingService>>> = RefCell::new(None);
    static FILE_CONTEXT: RefCell<Option<PathBuf>> = RefCell::new(None);
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize the global logger from runtime preferences
pub fn init_global_logging(preferences: &LoggingPreferences) -> Result<(), String> {
    init_global_logging_with_service(Arc::new(LoggingService::from_preferences(preferences)))
}

/// Initialize with custom service
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized")?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

// ============================================================================
// ACCESS
// ============================================================================

/// Logger that events from this thread currently go to
pub fn current_logger() -> Option<Arc<LoggingService>> {
    SCOPED_LOGGER
        .with(|scoped| scoped.borrow().clone())
        .or_else(|| GLOBAL_LOGGER.get().cloned())
}

/// Run `f` with `service` receiving every event logged on this thread
pub fn with_logger<F, R>(service: Arc<LoggingService>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = SCOPED_LOGGER.with(|scoped| scoped.borrow_mut().replace(service));
    let result = f();
    SCOPED_LOGGER.with(|scoped| *scoped.borrow_mut() = previous);
    result
}

/// Whether an event at `level` would reach a logger
pub fn is_enabled(level: LogLevel) -> bool {
    current_logger().is_some_and(|service| service.should_log(level))
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

/// Run `f` with every event tagged with `file_path`
pub fn with_file_context<F, R>(file_path: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous =
        FILE_CONTEXT.with(|ctx| ctx.borrow_mut().replace(file_path.to_path_buf()));
    let result = f();
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

pub fn current_file_context() -> Option<PathBuf> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Send an event to the active logger
pub fn dispatch(event: LogEvent) {
    let Some(service) = current_logger() else {
        return;
    };

    let event = match current_file_context() {
        Some(path) => event.with_context("file", &path.display().to_string()),
        None => event,
    };

    service.log_event(event);
}

fn apply_context(
    mut event: LogEvent,
    position: Option<Position>,
    context: Vec<(&str, &str)>,
) -> LogEvent {
    if let Some(position) = position {
        event = event.with_position(position);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    position: Option<Position>,
    context: Vec<(&str, &str)>,
) {
    dispatch(apply_context(LogEvent::error(code, message), position, context));
}

pub fn log_warning_with_context(
    code: Code,
    message: &str,
    position: Option<Position>,
    context: Vec<(&str, &str)>,
) {
    dispatch(apply_context(
        LogEvent::warning_with_code(code, message),
        position,
        context,
    ));
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(apply_context(LogEvent::success(code, message), None, context));
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(apply_context(LogEvent::info(message), None, context));
}

pub fn log_debug_with_context(
    message: &str,
    position: Option<Position>,
    context: Vec<(&str, &str)>,
) {
    dispatch(apply_context(LogEvent::debug(message), position, context));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_logger_receives_events() {
        let (service, memory) = create_test_service();

        with_logger(service, || {
            crate::log_info!("hello", "answer" => 42);
        });

        let events = memory.get_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].context.get("answer"), Some(&"42".to_string()));
    }

    #[test]
    fn test_scoped_logger_is_restored() {
        let (outer, outer_memory) = create_test_service();
        let (inner, inner_memory) = create_test_service();

        with_logger(outer, || {
            with_logger(inner, || crate::log_info!("inner"));
            crate::log_info!("outer");
        });

        assert_eq!(inner_memory.event_count(), 1);
        assert_eq!(outer_memory.event_count(), 1);
    }

    #[test]
    fn test_file_context_is_attached() {
        let (service, memory) = create_test_service();

        with_logger(service, || {
            with_file_context(Path::new("batch/a.txt"), || crate::log_info!("inside"));
            crate::log_info!("outside");
        });

        let events = memory.get_events();
        assert_eq!(
            events[0].context.get("file"),
            Some(&"batch/a.txt".to_string())
        );
        assert!(!events[1].context.contains_key("file"));
    }

    #[test]
    fn test_debug_suppressed_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = Arc::new(LoggingService::new(memory.clone(), LogLevel::Info));

        with_logger(service, || {
            assert!(!is_enabled(LogLevel::Debug));
            crate::log_debug!("hidden", "k" => "v");
        });

        assert_eq!(memory.event_count(), 0);
    }
}
