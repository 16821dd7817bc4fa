use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::reduction::ReduceError;

/// Pipeline processing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Reduction failed: {0}")]
    Reduction(ReduceError),
}

impl From<ReduceError> for PipelineError {
    fn from(error: ReduceError) -> Self {
        match error {
            ReduceError::Lexer(e) => PipelineError::LexicalAnalysis(e),
            other => PipelineError::Reduction(other),
        }
    }
}

impl PipelineError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::LexicalAnalysis(e) => e.error_code(),
            PipelineError::Reduction(e) => e.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        crate::logging::codes::requires_halt(self.error_code().as_str())
    }
}
