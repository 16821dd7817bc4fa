//! Batch processing of many record files
//!
//! Counts valid records across an explicit file list or a directory, either
//! sequentially or on a small pool of worker threads.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::logging::{self, codes};
use crate::pipeline::{self, PipelineError, PipelineOptions, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub fail_fast: bool,
    /// Only pick up files with this extension during directory discovery
    pub extension: Option<String>,
    pub options: PipelineOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            recursive: false,
            max_files: None,
            fail_fast: false,
            extension: None,
            options: PipelineOptions::default(),
        }
    }
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    /// Valid records across every successfully processed file
    pub fn total_valid_records(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.valid_count())
            .sum()
    }

    pub fn total_records(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.total_records())
            .sum()
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful, {} failed, {} valid of {} records, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.failure_count(),
            self.total_valid_records(),
            self.total_records(),
            self.processing_duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No input files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoFilesFound { .. } => codes::batch::NO_FILES_FOUND,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::ThreadError { .. } => codes::batch::THREAD_FAILURE,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Discover input files in a directory, sorted by path
pub fn discover_files(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    if let Some(max_files) = config.max_files {
        files.truncate(max_files);
    }

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: e.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;

        let path = entry.path();

        if path.is_dir() {
            if config.recursive {
                visit_directory(&path, files, config)?;
            }
        } else if is_input_file(&path, config.extension.as_deref()) {
            files.push(path);
        }
    }

    Ok(())
}

/// Regular, non-hidden file matching the optional extension filter
fn is_input_file(path: &Path, extension: Option<&str>) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'));

    let extension_matches = match extension {
        Some(wanted) => path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted)),
        None => true,
    };

    path.is_file() && !hidden && extension_matches
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Process a list of files sequentially
pub fn process_files_sequential(
    files: &[PathBuf],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    check_file_count(files.len())?;
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch processing", "files" => files.len());

    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for file_path in files {
        match pipeline::process_file(file_path, &config.options) {
            Ok(pipeline_result) => results.add_success(file_path.clone(), pipeline_result),
            Err(pipeline_error) => {
                results.add_failure(file_path.clone(), pipeline_error);
                if config.fail_fast {
                    crate::log_info!("Fail-fast mode enabled, stopping batch processing",
                        "file" => file_path.display()
                    );
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion(&results, 1);

    Ok(results)
}

/// Process a list of files on up to `config.max_threads` worker threads
pub fn process_files_parallel(
    files: &[PathBuf],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    check_file_count(files.len())?;
    let start_time = Instant::now();

    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS).min(files.len().max(1));

    crate::log_info!("Starting parallel batch processing",
        "files" => files.len(),
        "threads" => threads
    );

    let results = Arc::new(Mutex::new(BatchResults::new()));
    let stop = Arc::new(AtomicBool::new(false));
    let logger = logging::current_logger();
    let files_per_thread = files.len().div_ceil(threads).max(1);

    let mut handles = Vec::new();
    for chunk in files.chunks(files_per_thread) {
        let thread_files = chunk.to_vec();
        let results = Arc::clone(&results);
        let stop = Arc::clone(&stop);
        let logger = logger.clone();
        let options = config.options.clone();
        let fail_fast = config.fail_fast;

        let work = move || {
            for file_path in thread_files {
                if stop.load(Ordering::Relaxed) {
                    break;
                }

                let outcome = pipeline::process_file(&file_path, &options);
                let mut guard = results.lock().unwrap_or_else(|p| p.into_inner());
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => {
                        guard.add_failure(file_path, error);
                        if fail_fast {
                            stop.store(true, Ordering::Relaxed);
                        }
                    }
                }
            }
        };

        handles.push(thread::spawn(move || match logger {
            Some(service) => logging::with_logger(service, work),
            None => work(),
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| {
            let error = BatchError::ThreadError {
                message: "Worker thread panicked during processing".to_string(),
            };
            crate::log_error!(error.error_code(), &error.to_string());
            error
        })?;
    }

    let mut final_results = Arc::try_unwrap(results)
        .map_err(|_| BatchError::ThreadError {
            message: "Failed to extract results from worker threads".to_string(),
        })?
        .into_inner()
        .unwrap_or_else(|p| p.into_inner());

    final_results.files_discovered = files.len();
    final_results.sort();
    final_results.processing_duration = start_time.elapsed();
    log_completion(&final_results, threads);

    Ok(final_results)
}

fn check_file_count(count: usize) -> Result<(), BatchError> {
    if count > MAX_FILES_PER_BATCH {
        let error = BatchError::TooManyFiles {
            count,
            max: MAX_FILES_PER_BATCH,
        };
        crate::log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }
    Ok(())
}

fn log_completion(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch processing completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "valid_records" => results.total_valid_records(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Process a list of files with the configured thread count
pub fn process_files(files: &[PathBuf], config: &BatchConfig) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 || files.len() <= 1 {
        process_files_sequential(files, config)
    } else {
        process_files_parallel(files, config)
    }
}

/// Discover and process every input file in a directory
pub fn process_directory(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let files = discover_files(dir_path, config)?;
    process_files(&files, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    const VALID_RECORD: &str =
        "ecl:gry pid:860033327 eyr:2020 hcl:#fffffd\nbyr:1937 iyr:2017 cid:147 hgt:183cm\n";

    fn config(threads: usize) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path();

        fs::write(temp_path.join("b.txt"), VALID_RECORD).unwrap();
        fs::write(temp_path.join("a.txt"), VALID_RECORD).unwrap();
        fs::write(temp_path.join("notes.md"), "x").unwrap();
        fs::write(temp_path.join(".hidden"), "x").unwrap();
        fs::create_dir(temp_path.join("nested")).unwrap();
        fs::write(temp_path.join("nested").join("c.txt"), VALID_RECORD).unwrap();

        let all = discover_files(temp_path, &config(1)).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].ends_with("a.txt"));

        let txt_only = BatchConfig {
            extension: Some("TXT".to_string()),
            recursive: true,
            ..config(1)
        };
        let files = discover_files(temp_path, &txt_only).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.extension().unwrap() == "txt"));
    }

    #[test]
    fn test_missing_and_empty_directories() {
        let temp_dir = tempdir().unwrap();

        assert_matches!(
            discover_files(&temp_dir.path().join("missing"), &config(1)),
            Err(BatchError::DirectoryNotFound { .. })
        );
        assert_matches!(
            discover_files(temp_dir.path(), &config(1)),
            Err(BatchError::NoFilesFound { .. })
        );
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let temp_dir = tempdir().unwrap();
        let mut files = Vec::new();
        for i in 0..6 {
            let path = temp_dir.path().join(format!("batch{}.txt", i));
            let content = format!("{}\n{}", VALID_RECORD, VALID_RECORD).repeat(i % 3 + 1);
            fs::write(&path, content).unwrap();
            files.push(path);
        }

        let sequential = process_files_sequential(&files, &config(1)).unwrap();
        let parallel = process_files_parallel(&files, &config(3)).unwrap();

        assert_eq!(sequential.success_count(), 6);
        assert_eq!(parallel.success_count(), 6);
        assert_eq!(
            sequential.total_valid_records(),
            parallel.total_valid_records()
        );
        assert_eq!(
            parallel.successful_files[0].0,
            sequential.successful_files[0].0
        );
    }

    #[test]
    fn test_failures_are_collected() {
        let temp_dir = tempdir().unwrap();
        let good = temp_dir.path().join("good.txt");
        fs::write(&good, VALID_RECORD).unwrap();
        let missing = temp_dir.path().join("missing.txt");

        let results = process_files(&[missing.clone(), good], &config(2)).unwrap();
        assert_eq!(results.success_count(), 1);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.failed_files[0].0, missing);
        assert_eq!(results.total_valid_records(), 1);
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let temp_dir = tempdir().unwrap();
        let good = temp_dir.path().join("good.txt");
        fs::write(&good, VALID_RECORD).unwrap();

        let fail_fast = BatchConfig {
            fail_fast: true,
            ..config(1)
        };
        let results =
            process_files_sequential(&[temp_dir.path().join("missing.txt"), good], &fail_fast)
                .unwrap();

        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_process_directory() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("one.txt"), VALID_RECORD).unwrap();
        fs::write(temp_dir.path().join("two.txt"), "hgt:190\n").unwrap();

        let results = process_directory(temp_dir.path(), &config(2)).unwrap();
        assert_eq!(results.files_discovered, 2);
        assert_eq!(results.total_valid_records(), 1);
        assert_eq!(results.total_records(), 2);
        assert!(results.summary().contains("1 valid of 2 records"));
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert!(config.max_threads >= 1);
        assert!(config.max_threads <= MAX_WORKER_THREADS);
        assert!(!config.fail_fast);
        assert!(config.max_files.is_none());
    }
}
