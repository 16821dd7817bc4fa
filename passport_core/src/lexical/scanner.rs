//! Incremental record scanner
//!
//! Reads one character at a time from a [`CharSource`] and yields tokens lazily.
//! At most one character of lookahead is ever held, in the source's pushback slot.

use crate::config::compile_time::lexical::{MAX_FIELD_LENGTH, MAX_TOKEN_COUNT};
use crate::config::ScannerPreferences;
use crate::logging::codes;
use crate::source::{CharSource, SourceError};
use crate::tokens::{SpannedToken, Token};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success, log_warning};
use serde::{Deserialize, Serialize};

/// Scanner errors; every one of them ends the token sequence
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Character source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Scanner thread stopped before end of stream")]
    ScannerDisconnected,

    #[error("Failed to start scanner thread: {message}")]
    SpawnFailed { message: String },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::Source(e) => e.error_code(),
            LexerError::ScannerDisconnected => codes::lexical::SCANNER_DISCONNECTED,
            LexerError::SpawnFailed { .. } => codes::lexical::SPAWN_FAILED,
        }
    }
}

/// Counters collected while scanning
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMetrics {
    pub total_tokens: usize,
    pub field_tokens: usize,
    pub boundary_tokens: usize,
    pub characters: usize,
    pub longest_newline_run: usize,
    pub longest_field: usize,
    /// Fields longer than `MAX_FIELD_LENGTH`
    pub long_fields: usize,
}

impl ScanMetrics {
    fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token {
            Token::Field(raw) => {
                self.field_tokens += 1;
                self.longest_field = self.longest_field.max(raw.chars().count());
            }
            Token::RecordBoundary => self.boundary_tokens += 1,
            Token::EndOfStream => {}
        }
    }

    fn record_newline_run(&mut self, length: usize) {
        self.longest_newline_run = self.longest_newline_run.max(length);
    }
}

/// Lazy token sequence over a character source
///
/// The scanner yields tokens in input order and stops for good after
/// `EndOfStream` or the first error. The source is never polled again once it
/// has reported end of input.
///
/// `MAX_FIELD_LENGTH` and `MAX_TOKEN_COUNT` are warning thresholds only; an
/// over-long field is still emitted whole and scanning carries on.
pub struct Scanner<S> {
    source: S,
    preferences: ScannerPreferences,
    metrics: ScanMetrics,
    exhausted: bool,
    finished: bool,
}

impl<S: CharSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self::with_preferences(source, ScannerPreferences::default())
    }

    pub fn with_preferences(source: S, preferences: ScannerPreferences) -> Self {
        Self {
            source,
            preferences,
            metrics: ScanMetrics::default(),
            exhausted: false,
            finished: false,
        }
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> ScanMetrics {
        self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next character, with end of input folded into `None`
    fn read(&mut self) -> Result<Option<char>, LexerError> {
        if self.exhausted {
            return Ok(None);
        }

        match self.source.next_char() {
            Ok(ch) => {
                self.metrics.characters += 1;
                Ok(Some(ch))
            }
            Err(SourceError::EndOfInput) => {
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn unread(&mut self, ch: char) -> Result<(), LexerError> {
        self.source.pushback(ch)?;
        self.metrics.characters -= 1;
        Ok(())
    }

    fn scan_token(&mut self) -> Result<SpannedToken, LexerError> {
        loop {
            let start = self.source.position();
            let Some(ch) = self.read()? else {
                return Ok(SpannedToken::new(Token::EndOfStream, Span::empty(start)));
            };

            match ch {
                '\n' => {
                    if let Some(token) = self.scan_newline_run(start)? {
                        return Ok(token);
                    }
                }
                '\r' if self.preferences.fold_crlf => match self.read()? {
                    Some('\n') => {
                        if let Some(token) = self.scan_newline_run(start)? {
                            return Ok(token);
                        }
                    }
                    // A lone '\r' is plain whitespace
                    Some(other) => self.unread(other)?,
                    None => {}
                },
                c if c.is_whitespace() => {}
                c => return self.scan_field(start, c),
            }
        }
    }

    /// Consume the rest of a newline run whose first '\n' has been read
    fn scan_newline_run(&mut self, start: Position) -> Result<Option<SpannedToken>, LexerError> {
        let mut run = 1;

        loop {
            match self.read()? {
                Some('\n') => run += 1,
                Some('\r') if self.preferences.fold_crlf => match self.read()? {
                    Some('\n') => run += 1,
                    // A '\r' not followed by '\n' ends the run
                    Some(other) => {
                        self.unread(other)?;
                        break;
                    }
                    None => break,
                },
                Some(other) => {
                    self.unread(other)?;
                    break;
                }
                None => break,
            }
        }

        self.metrics.record_newline_run(run);

        if run < 2 {
            return Ok(None);
        }

        let span = Span::new(start, self.source.position());
        Ok(Some(SpannedToken::new(Token::RecordBoundary, span)))
    }

    /// Greedily read non-whitespace into one field
    fn scan_field(&mut self, start: Position, first: char) -> Result<SpannedToken, LexerError> {
        let mut raw = String::new();
        raw.push(first);
        let mut length = 1;

        while let Some(ch) = self.read()? {
            if ch.is_whitespace() {
                self.unread(ch)?;
                break;
            }
            length += 1;
            raw.push(ch);
        }

        if length > MAX_FIELD_LENGTH {
            self.metrics.long_fields += 1;
            log_warning!(
                codes::lexical::LONG_FIELD,
                "Field exceeds length threshold",
                position = start,
                "length" => length,
                "threshold" => MAX_FIELD_LENGTH
            );
        }

        let span = Span::new(start, self.source.position());
        Ok(SpannedToken::new(Token::Field(raw), span))
    }

    fn emit(&mut self, token: SpannedToken) -> Result<SpannedToken, LexerError> {
        self.metrics.record_token(&token.value);

        if self.metrics.total_tokens == MAX_TOKEN_COUNT + 1 {
            log_warning!(
                codes::lexical::LARGE_TOKEN_COUNT,
                "Token count passed threshold",
                position = token.span.start,
                "threshold" => MAX_TOKEN_COUNT
            );
        }

        if self.preferences.trace_tokens {
            log_debug!("Token scanned",
                position = token.span.start,
                "kind" => token.value.kind(),
                "token" => &token.value
            );
        }

        if token.value.is_end_of_stream() {
            log_success!(
                codes::success::SCAN_COMPLETE,
                "Scan complete",
                "tokens" => self.metrics.total_tokens,
                "fields" => self.metrics.field_tokens,
                "boundaries" => self.metrics.boundary_tokens,
                "characters" => self.metrics.characters
            );
        }

        Ok(token)
    }
}

impl<S: CharSource> Iterator for Scanner<S> {
    type Item = Result<SpannedToken, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.scan_token().and_then(|token| self.emit(token));
        match &result {
            Ok(token) => self.finished = token.value.is_end_of_stream(),
            Err(e) => {
                self.finished = true;
                log_error!(e.error_code(), &e.to_string(),
                    position = self.source.position(),
                    "characters_read" => self.metrics.characters
                );
            }
        }

        Some(result)
    }
}

impl<S: CharSource> std::iter::FusedIterator for Scanner<S> {}
