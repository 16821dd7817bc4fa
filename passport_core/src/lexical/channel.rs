//! Threaded scanning
//!
//! Runs a [`Scanner`] on its own thread and hands tokens to the consumer over a
//! bounded FIFO channel. Token order and results match pull mode exactly.

use super::scanner::{LexerError, ScanMetrics, Scanner};
use crate::config::compile_time::lexical::TOKEN_CHANNEL_CAPACITY;
use crate::logging;
use crate::source::CharSource;
use crate::tokens::SpannedToken;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

type TokenResult = Result<SpannedToken, LexerError>;

/// Receiving end of a scanner thread
pub struct TokenReceiver {
    receiver: Receiver<TokenResult>,
    handle: Option<JoinHandle<ScanMetrics>>,
    finished: bool,
}

/// Start `scanner` on a new thread
///
/// The calling thread's logger and file context are carried over, so events
/// from the scanner thread land in the same place as the caller's.
pub fn spawn_scanner<S>(scanner: Scanner<S>) -> Result<TokenReceiver, LexerError>
where
    S: CharSource + Send + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(TOKEN_CHANNEL_CAPACITY);
    let logger = logging::current_logger();
    let file_context = logging::current_file_context();

    let run = move || {
        let mut scanner = scanner;
        for item in scanner.by_ref() {
            if sender.send(item).is_err() {
                // Receiver dropped
                break;
            }
        }
        scanner.into_metrics()
    };

    let body = move || {
        let with_file = move || match file_context {
            Some(path) => logging::with_file_context(&path, run),
            None => run(),
        };
        match logger {
            Some(service) => logging::with_logger(service, with_file),
            None => with_file(),
        }
    };

    let handle = thread::Builder::new()
        .name("passport-scanner".to_string())
        .spawn(body)
        .map_err(spawn_failed)?;

    Ok(TokenReceiver {
        receiver,
        handle: Some(handle),
        finished: false,
    })
}

fn spawn_failed(error: std::io::Error) -> LexerError {
    let error = LexerError::SpawnFailed {
        message: error.to_string(),
    };
    crate::log_error!(error.error_code(), &error.to_string());
    error
}

impl TokenReceiver {
    /// Wait for the scanner thread and return its metrics
    ///
    /// Any tokens not yet received are discarded.
    pub fn finish(mut self) -> Result<ScanMetrics, LexerError> {
        // Unblock a sender waiting on a full channel
        drop(std::mem::replace(&mut self.receiver, mpsc::sync_channel(0).1));

        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| LexerError::ScannerDisconnected),
            None => Err(LexerError::ScannerDisconnected),
        }
    }
}

impl Iterator for TokenReceiver {
    type Item = TokenResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.receiver.recv() {
            Ok(item) => {
                self.finished = match &item {
                    Ok(token) => token.value.is_end_of_stream(),
                    Err(_) => true,
                };
                Some(item)
            }
            Err(_) => {
                // Channel closed without EndOfStream or an error: the thread died
                self.finished = true;
                Some(Err(LexerError::ScannerDisconnected))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{codes, create_test_service, with_logger};
    use crate::source::RuneReader;
    use crate::tokens::Token;

    fn tokens_threaded(input: &str) -> Vec<Token> {
        let scanner = Scanner::new(RuneReader::from_string(input.to_string()));
        spawn_scanner(scanner)
            .unwrap()
            .map(|item| item.unwrap().value)
            .collect()
    }

    fn tokens_pulled(input: &str) -> Vec<Token> {
        Scanner::new(RuneReader::from_string(input.to_string()))
            .map(|item| item.unwrap().value)
            .collect()
    }

    #[test]
    fn test_threaded_matches_pull_mode() {
        let input = "a:1 b:2\nc:3\n\n\nd:4\n\ne\n";
        assert_eq!(tokens_threaded(input), tokens_pulled(input));
    }

    #[test]
    fn test_more_tokens_than_channel_capacity() {
        let input = "k:v ".repeat(TOKEN_CHANNEL_CAPACITY * 3);
        let tokens = tokens_threaded(&input);
        assert_eq!(tokens.len(), TOKEN_CHANNEL_CAPACITY * 3 + 1);
        assert_eq!(tokens.last(), Some(&Token::EndOfStream));
    }

    #[test]
    fn test_finish_returns_metrics() {
        let scanner = Scanner::new(RuneReader::from_string("a:1\n\nb:2".to_string()));
        let mut receiver = spawn_scanner(scanner).unwrap();
        let count = receiver.by_ref().count();
        let metrics = receiver.finish().unwrap();

        assert_eq!(count, 4);
        assert_eq!(metrics.field_tokens, 2);
        assert_eq!(metrics.boundary_tokens, 1);
    }

    #[test]
    fn test_finish_early_does_not_hang() {
        let input = "k:v ".repeat(TOKEN_CHANNEL_CAPACITY * 4);
        let scanner = Scanner::new(RuneReader::from_string(input));
        let mut receiver = spawn_scanner(scanner).unwrap();
        assert!(receiver.next().is_some());
        assert!(receiver.finish().is_ok());
    }

    #[test]
    fn test_spawn_failure_is_not_a_disconnect() {
        let (service, memory) = create_test_service();
        let io_error = std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no threads left");

        let error = with_logger(service, || spawn_failed(io_error));

        assert_eq!(
            error,
            LexerError::SpawnFailed {
                message: "no threads left".to_string()
            }
        );
        assert_eq!(error.error_code(), codes::lexical::SPAWN_FAILED);
        assert!(memory.has_event_with_code(codes::lexical::SPAWN_FAILED));
        assert!(!memory.has_event_with_code(codes::lexical::SCANNER_DISCONNECTED));
    }

    #[test]
    fn test_scanner_thread_inherits_logger() {
        let (service, memory) = create_test_service();

        with_logger(service, || {
            let scanner = Scanner::new(RuneReader::from_string("a:1".to_string()));
            let receiver = spawn_scanner(scanner).unwrap();
            receiver.for_each(drop);
        });

        assert!(memory.has_event_with_code(codes::success::SCAN_COMPLETE));
    }
}
