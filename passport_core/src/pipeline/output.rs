use super::PipelineResult;
use crate::lexical::ScanMetrics;
use crate::reduction::RecordReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serializable summary of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub source: String,
    pub valid_records: usize,
    pub total_records: usize,
    pub invalid_records: usize,
    pub malformed_fields: usize,
    pub duplicate_fields: usize,
    pub wide_records: usize,
    pub metrics: ScanMetrics,
    pub duration_ms: f64,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reports: Vec<RecordReport>,
}

impl PipelineOutput {
    pub fn new(result: &PipelineResult) -> Self {
        Self {
            source: result.source.clone(),
            valid_records: result.outcome.valid_count,
            total_records: result.outcome.total_records,
            invalid_records: result.outcome.invalid_count(),
            malformed_fields: result.outcome.malformed_fields,
            duplicate_fields: result.outcome.duplicate_fields,
            wide_records: result.outcome.wide_records,
            metrics: result.scan_metrics.clone(),
            duration_ms: result.processing_duration.as_secs_f64() * 1000.0,
            generated_at: Utc::now(),
            reports: result.outcome.reports.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
