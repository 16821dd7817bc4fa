//! End-to-end processing: character source -> scanner -> reducer -> validator

mod error;
pub mod output;
mod result;

pub use error::PipelineError;
pub use output::PipelineOutput;
pub use result::PipelineResult;

use crate::config::{RuntimeConfig, ScannerPreferences, ValidationPreferences};
use crate::file_processor::FileProcessor;
use crate::lexical::{spawn_scanner, ScanMetrics, Scanner};
use crate::logging;
use crate::reduction::{Reducer, ReductionOutcome};
use crate::source::{CharSource, RuneReader, StrSource};
use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

/// Preferences that shape a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub scanner: ScannerPreferences,
    pub validation: ValidationPreferences,
}

impl From<&RuntimeConfig> for PipelineOptions {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            scanner: config.scanner.clone(),
            validation: config.validation.clone(),
        }
    }
}

impl PipelineOptions {
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.scanner.threaded = threaded;
        self
    }

    pub fn with_reports(mut self, collect_reports: bool) -> Self {
        self.validation.collect_reports = collect_reports;
        self
    }
}

/// Count valid records in `input` with default options
pub fn count_valid_records(input: &str) -> Result<usize, PipelineError> {
    process_str(input, &PipelineOptions::default()).map(|result| result.valid_count())
}

/// Process an in-memory string
pub fn process_str(input: &str, options: &PipelineOptions) -> Result<PipelineResult, PipelineError> {
    if options.scanner.threaded {
        process_source(
            "<string>",
            RuneReader::from_string(input.to_string()),
            options,
        )
    } else {
        run("<string>", options, false, || {
            reduce_pulled(StrSource::new(input), options)
        })
    }
}

/// Process any buffered reader, such as stdin
pub fn process_reader<R>(
    name: &str,
    reader: R,
    options: &PipelineOptions,
) -> Result<PipelineResult, PipelineError>
where
    R: BufRead + Send + 'static,
{
    process_source(name, RuneReader::new(reader), options)
}

/// Process a character source in the mode the options select
pub fn process_source<S>(
    name: &str,
    source: S,
    options: &PipelineOptions,
) -> Result<PipelineResult, PipelineError>
where
    S: CharSource + Send + 'static,
{
    let threaded = options.scanner.threaded;
    run(name, options, threaded, || {
        if threaded {
            reduce_threaded(source, options)
        } else {
            reduce_pulled(source, options)
        }
    })
}

/// Process one file
pub fn process_file(path: &Path, options: &PipelineOptions) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(path, || -> Result<PipelineResult, PipelineError> {
        let opened = FileProcessor::new().open(path)?;
        let mut result = process_source(&path.display().to_string(), opened.source, options)?;
        result.file_metadata = Some(opened.metadata);
        Ok(result)
    })
}

/// Process one file with the scanner on its own thread
pub fn process_file_threaded(
    path: &Path,
    options: &PipelineOptions,
) -> Result<PipelineResult, PipelineError> {
    process_file(path, &options.clone().threaded(true))
}

fn run<F>(
    name: &str,
    options: &PipelineOptions,
    threaded: bool,
    reduce: F,
) -> Result<PipelineResult, PipelineError>
where
    F: FnOnce() -> Result<(ReductionOutcome, ScanMetrics), PipelineError>,
{
    let start_time = Instant::now();

    crate::log_info!("Starting record validation",
        "source" => name,
        "threaded" => threaded,
        "strict_hcl" => options.validation.strict_hair_color
    );

    let (outcome, scan_metrics) = reduce().inspect_err(|error| {
        crate::log_error!(error.error_code(), &error.to_string(), "source" => name);
    })?;

    let result = PipelineResult {
        source: name.to_string(),
        file_metadata: None,
        scan_metrics,
        outcome,
        threaded,
        processing_duration: start_time.elapsed(),
    };
    result.log_success();

    Ok(result)
}

fn reduce_pulled<S: CharSource>(
    source: S,
    options: &PipelineOptions,
) -> Result<(ReductionOutcome, ScanMetrics), PipelineError> {
    let mut scanner = Scanner::with_preferences(source, options.scanner.clone());
    let outcome = Reducer::from_preferences(&options.validation).reduce(scanner.by_ref())?;
    Ok((outcome, scanner.into_metrics()))
}

fn reduce_threaded<S>(
    source: S,
    options: &PipelineOptions,
) -> Result<(ReductionOutcome, ScanMetrics), PipelineError>
where
    S: CharSource + Send + 'static,
{
    let scanner = Scanner::with_preferences(source, options.scanner.clone());
    let mut receiver = spawn_scanner(scanner)?;
    let outcome = Reducer::from_preferences(&options.validation).reduce(receiver.by_ref())?;
    let metrics = receiver.finish()?;
    Ok((outcome, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{codes, create_test_service, with_logger};

    const SAMPLE: &str = "ecl:gry pid:860033327 eyr:2020 hcl:#fffffd
byr:1937 iyr:2017 cid:147 hgt:183cm

iyr:2013 ecl:amb cid:350 eyr:2023 pid:028048884
hcl:#cfa07d byr:1929

hcl:#ae17e1 iyr:2013
eyr:2024
ecl:brn pid:760753108 byr:1931
hgt:179cm

hcl:#cfa07d eyr:2025 pid:166559648
iyr:2011 ecl:brn hgt:59in";

    #[test]
    fn test_sample_batch() {
        let result = process_str(SAMPLE, &PipelineOptions::default()).unwrap();
        assert_eq!(result.valid_count(), 2);
        assert_eq!(result.total_records(), 4);
        assert_eq!(result.scan_metrics.boundary_tokens, 3);
        assert!(!result.threaded);
    }

    #[test]
    fn test_threaded_and_pulled_agree() {
        let pulled = process_str(SAMPLE, &PipelineOptions::default()).unwrap();
        let threaded = process_str(SAMPLE, &PipelineOptions::default().threaded(true)).unwrap();

        assert!(threaded.threaded);
        assert_eq!(pulled.outcome, threaded.outcome);
        assert_eq!(pulled.scan_metrics, threaded.scan_metrics);
    }

    #[test]
    fn test_reader_input() {
        let reader = std::io::Cursor::new(SAMPLE.as_bytes().to_vec());
        let result = process_reader("<memory>", reader, &PipelineOptions::default()).unwrap();
        assert_eq!(result.valid_count(), 2);
        assert_eq!(result.source, "<memory>");
    }

    #[test]
    fn test_reports_collected_on_request() {
        let options = PipelineOptions::default().with_reports(true);
        let result = process_str(SAMPLE, &options).unwrap();
        assert_eq!(result.reports().len(), 4);
        assert!(!result.reports()[1].report.valid);
    }

    #[test]
    fn test_count_valid_records() {
        assert_eq!(count_valid_records("").unwrap(), 0);
        assert_eq!(count_valid_records(SAMPLE).unwrap(), 2);
    }

    #[test]
    fn test_invalid_utf8_aborts_with_error() {
        let (service, memory) = create_test_service();
        let reader = std::io::Cursor::new(vec![b'e', b'c', b'l', b':', 0xC3]);

        let result = with_logger(service, || {
            process_reader("<bad>", reader, &PipelineOptions::default())
        });

        assert_eq!(
            result.unwrap_err().error_code(),
            codes::source::INVALID_UTF8
        );
        assert!(memory.has_event_with_code(codes::source::INVALID_UTF8));
        assert!(!memory.has_event_with_code(codes::success::PIPELINE_COMPLETE));
    }

    #[test]
    fn test_success_is_logged() {
        let (service, memory) = create_test_service();
        with_logger(service, || process_str("a:1", &PipelineOptions::default())).unwrap();
        assert!(memory.has_event_with_code(codes::success::PIPELINE_COMPLETE));
        assert!(memory.has_event_with_code(codes::success::REDUCTION_COMPLETE));
    }

    #[test]
    fn test_output_serializes() {
        let result = process_str(SAMPLE, &PipelineOptions::default()).unwrap();
        let json = PipelineOutput::new(&result).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["valid_records"], 2);
        assert_eq!(value["invalid_records"], 2);
        assert!(value.get("reports").is_none());
        assert!(value["generated_at"].as_str().is_some());
    }
}
