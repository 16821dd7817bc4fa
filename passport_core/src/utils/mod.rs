//! Shared primitive types used by the source, scanner and reducer

pub mod span;

pub use span::{Position, Span, Spanned};
