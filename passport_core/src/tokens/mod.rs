//! Token types shared by the scanner and the reducer
//!
//! The scanner turns characters into a finite sequence of [`Token`]s:
//! - **`Field`** carries the raw `key:value` text of one field
//! - **`RecordBoundary`** marks a blank line between records
//! - **`EndOfStream`** is emitted exactly once, last
//!
//! The reducer splits each field with [`FieldEntry::parse`].

pub mod token;

pub use token::{FieldEntry, SpannedToken, Token, KEY_VALUE_SEPARATOR};

pub use crate::utils::{Position, Span, Spanned};
