//! Reduction errors

use crate::lexical::LexerError;
use crate::logging::codes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReduceError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error("Token sequence ended without end of stream")]
    TruncatedStream,
}

impl ReduceError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ReduceError::Lexer(e) => e.error_code(),
            ReduceError::TruncatedStream => codes::reduction::TRUNCATED_STREAM,
        }
    }
}
