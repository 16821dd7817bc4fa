//! Character sources for the record scanner
//!
//! A [`CharSource`] hands out one character at a time and can take back the
//! most recently read character. The scanner needs no more lookahead than that.
//!
//! Two implementations are provided:
//! - [`StrSource`] borrows an in-memory `&str`
//! - [`RuneReader`] decodes UTF-8 incrementally from any `BufRead`

mod reader;

pub use reader::RuneReader;

use crate::logging::codes;
use crate::utils::Position;

/// Character source errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Expected termination signal, not a failure
    #[error("End of input")]
    EndOfInput,

    #[error("Read failed: {message}")]
    Io { message: String },

    #[error("Invalid UTF-8 sequence at byte offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("Pushback slot already holds {pending:?}")]
    PushbackOccupied { pending: char },
}

impl SourceError {
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, SourceError::EndOfInput)
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            SourceError::EndOfInput => codes::success::SCAN_COMPLETE,
            SourceError::Io { .. } => codes::source::READ_FAILURE,
            SourceError::InvalidUtf8 { .. } => codes::source::INVALID_UTF8,
            SourceError::PushbackOccupied { .. } => codes::source::PUSHBACK_OVERFLOW,
        }
    }
}

/// One-character-at-a-time input with a single pushback slot
pub trait CharSource {
    /// Read the next character, or `SourceError::EndOfInput` once exhausted
    fn next_char(&mut self) -> Result<char, SourceError>;

    /// Return the most recently read character to the source
    fn pushback(&mut self, ch: char) -> Result<(), SourceError>;

    /// Position of the next character to be read
    fn position(&self) -> Position;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn next_char(&mut self) -> Result<char, SourceError> {
        (**self).next_char()
    }

    fn pushback(&mut self, ch: char) -> Result<(), SourceError> {
        (**self).pushback(ch)
    }

    fn position(&self) -> Position {
        (**self).position()
    }
}

/// Position bookkeeping shared by the sources; remembers where the last
/// character started so a pushback can rewind exactly one step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PositionTracker {
    current: Position,
    before_last: Option<Position>,
}

impl PositionTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: Position::start(),
            before_last: None,
        }
    }

    pub(crate) fn current(&self) -> Position {
        self.current
    }

    pub(crate) fn advance(&mut self, ch: char) {
        self.before_last = Some(self.current);
        self.current = self.current.advance(ch);
    }

    pub(crate) fn rewind(&mut self) {
        if let Some(previous) = self.before_last.take() {
            self.current = previous;
        }
    }
}

/// Character source over a borrowed string
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: std::str::Chars<'a>,
    pending: Option<char>,
    tracker: PositionTracker,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            pending: None,
            tracker: PositionTracker::new(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> Result<char, SourceError> {
        let ch = match self.pending.take() {
            Some(ch) => ch,
            None => self.chars.next().ok_or(SourceError::EndOfInput)?,
        };
        self.tracker.advance(ch);
        Ok(ch)
    }

    fn pushback(&mut self, ch: char) -> Result<(), SourceError> {
        if let Some(pending) = self.pending {
            return Err(SourceError::PushbackOccupied { pending });
        }
        self.pending = Some(ch);
        self.tracker.rewind();
        Ok(())
    }

    fn position(&self) -> Position {
        self.tracker.current()
    }
}
