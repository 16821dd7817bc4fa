//! File processor implementation with compile-time limits and logging

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, READ_BUFFER_SIZE,
};
use crate::logging::codes;
use crate::source::RuneReader;
use crate::{log_debug, log_error};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// File processor specific errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Not a regular file: {path}")]
    NotARegularFile { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::NotARegularFile { .. } => {
                codes::file_processing::NOT_A_REGULAR_FILE
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
                path: path.display().to_string(),
            },
            io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                path: path.display().to_string(),
            },
            _ => FileProcessorError::IoError {
                message: format!("{}: {}", path.display(), error),
            },
        }
    }
}

/// File metadata collected before scanning
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    /// Get file size in human-readable format
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

/// A file checked and ready to scan
pub struct OpenedFile {
    pub metadata: FileMetadata,
    pub source: RuneReader<BufReader<File>>,
}

/// Opens input files as buffered character sources
#[derive(Debug, Clone, Default)]
pub struct FileProcessor;

impl FileProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Check `path` and open it for scanning
    pub fn open(&self, path: &Path) -> Result<OpenedFile, FileProcessorError> {
        let metadata = self.validate(path).inspect_err(|error| {
            log_error!(error.error_code(), &error.to_string(),
                "path" => path.display()
            );
        })?;

        let file = File::open(path).map_err(|e| {
            let error = FileProcessorError::from_io(path, e);
            log_error!(error.error_code(), "Failed to open file",
                "path" => path.display(),
                "error" => &error
            );
            error
        })?;

        log_debug!("File opened",
            "path" => path.display(),
            "size" => metadata.human_readable_size(),
            "large_file" => metadata.is_large_file()
        );

        Ok(OpenedFile {
            metadata,
            source: RuneReader::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)),
        })
    }

    fn validate(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| FileProcessorError::from_io(path, e))?;

        if !metadata.is_file() {
            return Err(FileProcessorError::NotARegularFile {
                path: path.display().to_string(),
            });
        }

        if metadata.len() > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size: metadata.len(),
                max_size: MAX_FILE_SIZE,
            });
        }

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}
