//! Lexical analysis: characters in, tokens out
//!
//! Two ways to drive a scan:
//! - **pull mode**: [`Scanner`] is an `Iterator` and the consumer calls `next()`
//! - **threaded mode**: [`spawn_scanner`] moves the scanner onto its own thread
//!   and the consumer drains a [`TokenReceiver`]
//!
//! Either way fields longer than `MAX_FIELD_LENGTH` characters and scans past
//! `MAX_TOKEN_COUNT` tokens are logged as warnings and processed in full.

pub mod channel;
pub mod scanner;

pub use channel::{spawn_scanner, TokenReceiver};
pub use scanner::{LexerError, ScanMetrics, Scanner};
