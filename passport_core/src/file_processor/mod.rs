//! File processor module with compile-time limits and logging integration

mod processor;

pub use processor::{FileMetadata, FileProcessor, FileProcessorError, OpenedFile};
