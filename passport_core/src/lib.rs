// Internal modules
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod reduction;
pub mod source;
pub mod tokens;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use lexical::{Scanner, TokenReceiver};
pub use pipeline::{count_valid_records, PipelineError, PipelineOptions, PipelineResult};
pub use record::Collection;
pub use reduction::{Reducer, ReductionOutcome};
pub use source::{CharSource, RuneReader, StrSource};
pub use tokens::Token;
pub use validation::{FieldKey, HairColorMode, ValidationReport, Validator};

// Re-export pipeline output for serialization consumers
pub use pipeline::output::PipelineOutput;
