//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for all codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a diagnostic code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Runtime configuration error codes
pub mod config {
    use super::Code;

    pub const CONFIG_IO_ERROR: Code = Code::new("E001");
    pub const CONFIG_PARSE_ERROR: Code = Code::new("E002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const NOT_A_REGULAR_FILE: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Character source error codes
pub mod source {
    use super::Code;

    pub const READ_FAILURE: Code = Code::new("E015");
    pub const INVALID_UTF8: Code = Code::new("E016");
    pub const PUSHBACK_OVERFLOW: Code = Code::new("E017");
}

/// Lexical (scanner) error and warning codes
pub mod lexical {
    use super::Code;

    pub const LONG_FIELD: Code = Code::new("W020");
    pub const LARGE_TOKEN_COUNT: Code = Code::new("W021");
    pub const SCANNER_DISCONNECTED: Code = Code::new("E022");
    pub const SPAWN_FAILED: Code = Code::new("E023");
}

/// Reduction error and warning codes
pub mod reduction {
    use super::Code;

    pub const MALFORMED_FIELD: Code = Code::new("W030");
    pub const WIDE_RECORD: Code = Code::new("W031");
    pub const DUPLICATE_FIELD: Code = Code::new("W032");
    pub const TRUNCATED_STREAM: Code = Code::new("E033");
}

/// Batch processing error codes
pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E050");
    pub const NO_FILES_FOUND: Code = Code::new("E051");
    pub const TOO_MANY_FILES: Code = Code::new("E052");
    pub const THREAD_FAILURE: Code = Code::new("E053");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const SCAN_COMPLETE: Code = Code::new("I020");
    pub const REDUCTION_COMPLETE: Code = Code::new("I030");
    pub const PIPELINE_COMPLETE: Code = Code::new("I060");
    pub const BATCH_COMPLETE: Code = Code::new("I070");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal system error",
        "File a bug report with the input that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "Logging or system initialization failed",
        "Initialize logging exactly once at startup",
    ),
    // Configuration
    ErrorMetadata::new(
        "E001",
        "Configuration",
        Severity::High,
        false,
        true,
        "Runtime configuration file could not be read",
        "Check the --config path and its permissions",
    ),
    ErrorMetadata::new(
        "E002",
        "Configuration",
        Severity::High,
        false,
        true,
        "Runtime configuration file is not valid TOML for this schema",
        "Fix the reported key or value in the configuration file",
    ),
    // File processing
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Input file does not exist",
        "Check the input path",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Input path is not a regular file",
        "Pass a file, or use directory mode for folders",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Input file exceeds the compile-time size limit",
        "Split the input or rebuild with a larger max_file_size",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Permission denied opening input file",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::High,
        true,
        false,
        "I/O error while opening input file",
        "Retry; check the underlying device",
    ),
    // Character source
    ErrorMetadata::new(
        "E015",
        "Source",
        Severity::High,
        false,
        true,
        "Reading from the character source failed",
        "Check the underlying reader",
    ),
    ErrorMetadata::new(
        "E016",
        "Source",
        Severity::High,
        false,
        true,
        "Input is not valid UTF-8",
        "Re-encode the input as UTF-8",
    ),
    ErrorMetadata::new(
        "E017",
        "Source",
        Severity::Critical,
        false,
        true,
        "A second character was pushed back before the first was re-read",
        "File a bug report; the scanner only ever needs one character of pushback",
    ),
    // Lexical
    ErrorMetadata::new(
        "W020",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Field is longer than the compile-time threshold; it is kept in full",
        "Check the input for a missing separator",
    ),
    ErrorMetadata::new(
        "W021",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Input produced more tokens than the compile-time threshold; scanning continues",
        "Consider splitting the input into smaller files",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::Critical,
        false,
        true,
        "Scanner thread stopped before sending end of stream",
        "File a bug report",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Critical,
        false,
        true,
        "Scanner thread could not be started",
        "Check process thread limits or use pull mode",
    ),
    // Reduction
    ErrorMetadata::new(
        "W030",
        "Reduction",
        Severity::Low,
        true,
        false,
        "Field has no ':' separator; stored as a key with an empty value",
        "Check the record for a missing ':'",
    ),
    ErrorMetadata::new(
        "W031",
        "Reduction",
        Severity::Low,
        true,
        false,
        "Record holds more fields than the compile-time threshold; all are kept",
        "Check the input for a missing blank line between records",
    ),
    ErrorMetadata::new(
        "W032",
        "Reduction",
        Severity::Low,
        true,
        false,
        "Field key repeated within a record; the later value wins",
        "Remove the duplicate field",
    ),
    ErrorMetadata::new(
        "E033",
        "Reduction",
        Severity::High,
        false,
        true,
        "Token sequence ended without an end-of-stream token",
        "Check the token producer; a scanner always ends with end of stream",
    ),
    // Batch
    ErrorMetadata::new(
        "E050",
        "Batch",
        Severity::High,
        false,
        true,
        "Batch directory does not exist",
        "Check the directory path",
    ),
    ErrorMetadata::new(
        "E051",
        "Batch",
        Severity::Medium,
        true,
        false,
        "No input files found for batch processing",
        "Check the directory contents and extension filter",
    ),
    ErrorMetadata::new(
        "E052",
        "Batch",
        Severity::High,
        false,
        true,
        "Batch exceeds the compile-time file limit",
        "Process the directory in smaller parts",
    ),
    ErrorMetadata::new(
        "E053",
        "Batch",
        Severity::Critical,
        false,
        true,
        "Batch worker thread panicked",
        "File a bug report",
    ),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicate_codes() {
        assert_eq!(get_error_registry().len(), REGISTRY_ENTRIES.len());
    }

    #[test]
    fn test_every_error_constant_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            config::CONFIG_IO_ERROR,
            config::CONFIG_PARSE_ERROR,
            file_processing::FILE_NOT_FOUND,
            file_processing::NOT_A_REGULAR_FILE,
            file_processing::FILE_TOO_LARGE,
            file_processing::PERMISSION_DENIED,
            file_processing::IO_ERROR,
            source::READ_FAILURE,
            source::INVALID_UTF8,
            source::PUSHBACK_OVERFLOW,
            lexical::LONG_FIELD,
            lexical::LARGE_TOKEN_COUNT,
            lexical::SCANNER_DISCONNECTED,
            lexical::SPAWN_FAILED,
            reduction::MALFORMED_FIELD,
            reduction::WIDE_RECORD,
            reduction::DUPLICATE_FIELD,
            reduction::TRUNCATED_STREAM,
            batch::DIRECTORY_NOT_FOUND,
            batch::NO_FILES_FOUND,
            batch::TOO_MANY_FILES,
            batch::THREAD_FAILURE,
        ];

        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_lookup() {
        assert_eq!(get_category("W030"), "Reduction");
        assert!(is_recoverable("W030"));
        assert!(!requires_halt("W030"));
        assert!(requires_halt("ERR001"));
        assert_eq!(get_severity("ERR001"), Severity::Critical);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
    }
}
