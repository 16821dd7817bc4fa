//! Token reducer
//!
//! Folds fields into the current record and closes it on a boundary or at
//! end of stream. Only one record is ever held in memory.

use super::error::ReduceError;
use crate::config::compile_time::reduction::{MAX_FIELDS_PER_RECORD, MAX_RETAINED_REPORTS};
use crate::config::ValidationPreferences;
use crate::lexical::LexerError;
use crate::logging::codes;
use crate::record::Collection;
use crate::tokens::{FieldEntry, SpannedToken, Token};
use crate::utils::Position;
use crate::validation::{ValidationReport, Validator};
use crate::{log_debug, log_success, log_warning};
use serde::{Deserialize, Serialize};

/// Reducer state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReducerState {
    /// No record open
    #[default]
    Empty,
    /// A record is open; `start` is where its first field began
    Accumulating { record: Collection, start: Position },
}

/// Report for one closed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReport {
    /// 1-based record number in input order
    pub index: usize,
    pub start: Position,
    pub field_count: usize,
    pub report: ValidationReport,
}

/// Whether the reducer wants more tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
}

/// Everything a reduction produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionOutcome {
    pub valid_count: usize,
    pub total_records: usize,
    pub malformed_fields: usize,
    pub duplicate_fields: usize,
    /// Records that grew past `MAX_FIELDS_PER_RECORD` distinct keys
    pub wide_records: usize,
    pub reports: Vec<RecordReport>,
    /// Reports not retained because the retention limit was reached
    pub dropped_reports: usize,
}

impl ReductionOutcome {
    pub fn invalid_count(&self) -> usize {
        self.total_records - self.valid_count
    }
}

/// Two-state reducer over a token sequence
pub struct Reducer {
    state: ReducerState,
    validator: Validator,
    collect_reports: bool,
    warn_on_malformed: bool,
    outcome: ReductionOutcome,
    done: bool,
}

impl Reducer {
    pub fn new(validator: Validator) -> Self {
        Self {
            state: ReducerState::Empty,
            validator,
            collect_reports: false,
            warn_on_malformed: true,
            outcome: ReductionOutcome::default(),
            done: false,
        }
    }

    pub fn from_preferences(preferences: &ValidationPreferences) -> Self {
        Self {
            collect_reports: preferences.collect_reports,
            warn_on_malformed: preferences.warn_on_malformed_fields,
            ..Self::new(Validator::from_preferences(preferences))
        }
    }

    pub fn with_reports(mut self, collect_reports: bool) -> Self {
        self.collect_reports = collect_reports;
        self
    }

    pub fn state(&self) -> &ReducerState {
        &self.state
    }

    /// Valid records seen so far
    pub fn valid_count(&self) -> usize {
        self.outcome.valid_count
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Apply one token
    pub fn feed(&mut self, token: SpannedToken) -> Result<Step, ReduceError> {
        if self.done {
            return Ok(Step::Done);
        }

        match token.value {
            Token::Field(raw) => {
                self.add_field(&raw, token.span.start);
                Ok(Step::Continue)
            }
            Token::RecordBoundary => {
                self.close_record();
                Ok(Step::Continue)
            }
            Token::EndOfStream => {
                self.close_record();
                self.done = true;
                Ok(Step::Done)
            }
        }
    }

    /// Drive the reducer over `tokens` until end of stream
    pub fn reduce<I>(mut self, tokens: I) -> Result<ReductionOutcome, ReduceError>
    where
        I: IntoIterator<Item = Result<SpannedToken, LexerError>>,
    {
        for item in tokens {
            if self.feed(item?)? == Step::Done {
                return Ok(self.finish());
            }
        }
        Err(ReduceError::TruncatedStream)
    }

    /// Consume the reducer and return what it collected
    pub fn finish(self) -> ReductionOutcome {
        log_success!(
            codes::success::REDUCTION_COMPLETE,
            "Reduction complete",
            "records" => self.outcome.total_records,
            "valid" => self.outcome.valid_count,
            "malformed_fields" => self.outcome.malformed_fields
        );
        self.outcome
    }

    fn add_field(&mut self, raw: &str, position: Position) {
        let entry = FieldEntry::parse(raw);

        if entry.malformed {
            self.outcome.malformed_fields += 1;
            if self.warn_on_malformed {
                log_warning!(
                    codes::reduction::MALFORMED_FIELD,
                    "Field has no ':' separator",
                    position = position,
                    "raw" => raw
                );
            }
        }

        let (mut record, start) = match std::mem::take(&mut self.state) {
            ReducerState::Empty => (Collection::new(), position),
            ReducerState::Accumulating { record, start } => (record, start),
        };

        let duplicate = record.contains_key(&entry.key);
        if !duplicate && record.len() == MAX_FIELDS_PER_RECORD {
            self.outcome.wide_records += 1;
            log_warning!(
                codes::reduction::WIDE_RECORD,
                "Record passed field count threshold; keeping every field",
                position = start,
                "threshold" => MAX_FIELDS_PER_RECORD
            );
        }

        if duplicate {
            self.outcome.duplicate_fields += 1;
            log_warning!(
                codes::reduction::DUPLICATE_FIELD,
                "Repeated key; keeping the later value",
                position = position,
                "key" => &entry.key
            );
        }

        record.insert(entry.key, entry.value);
        self.state = ReducerState::Accumulating { record, start };
    }

    fn close_record(&mut self) {
        let ReducerState::Accumulating { record, start } = std::mem::take(&mut self.state) else {
            return;
        };

        self.outcome.total_records += 1;
        let index = self.outcome.total_records;

        let valid = if self.collect_reports {
            let report = self.validator.evaluate(&record);
            let valid = report.valid;
            self.retain_report(RecordReport {
                index,
                start,
                field_count: record.len(),
                report,
            });
            valid
        } else {
            self.validator.is_valid(&record)
        };

        if valid {
            self.outcome.valid_count += 1;
        }

        log_debug!("Record closed",
            position = start,
            "record" => index,
            "fields" => record.len(),
            "valid" => valid
        );
    }

    fn retain_report(&mut self, report: RecordReport) {
        if self.outcome.reports.len() < MAX_RETAINED_REPORTS {
            self.outcome.reports.push(report);
        } else {
            self.outcome.dropped_reports += 1;
        }
    }
}
