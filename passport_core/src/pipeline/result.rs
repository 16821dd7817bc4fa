use crate::file_processor::FileMetadata;
use crate::lexical::ScanMetrics;
use crate::reduction::{RecordReport, ReductionOutcome};
use std::time::Duration;

/// Result of running one input through scanner, reducer and validator
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Display name of the input (path, `<stdin>` or `<string>`)
    pub source: String,
    pub file_metadata: Option<FileMetadata>,
    pub scan_metrics: ScanMetrics,
    pub outcome: ReductionOutcome,
    pub threaded: bool,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn valid_count(&self) -> usize {
        self.outcome.valid_count
    }

    pub fn total_records(&self) -> usize {
        self.outcome.total_records
    }

    pub fn reports(&self) -> &[RecordReport] {
        &self.outcome.reports
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Record validation pipeline succeeded",
            "source" => &self.source,
            "valid" => self.outcome.valid_count,
            "records" => self.outcome.total_records,
            "tokens" => self.scan_metrics.total_tokens,
            "threaded" => self.threaded,
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
