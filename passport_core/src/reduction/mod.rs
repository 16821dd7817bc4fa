//! Reduction of a token sequence into validated records

pub mod error;
pub mod reducer;

pub use error::ReduceError;
pub use reducer::{RecordReport, Reducer, ReducerState, ReductionOutcome, Step};

use crate::lexical::LexerError;
use crate::tokens::SpannedToken;
use crate::validation::Validator;

/// Count valid records in `tokens` with default validation
pub fn count_valid<I>(tokens: I) -> Result<usize, ReduceError>
where
    I: IntoIterator<Item = Result<SpannedToken, LexerError>>,
{
    Reducer::new(Validator::default())
        .reduce(tokens)
        .map(|outcome| outcome.valid_count)
}
