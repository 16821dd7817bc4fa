//! Token and field entry definitions

use crate::utils::Spanned;
use std::fmt;

/// Separator between a field's key and its value
pub const KEY_VALUE_SEPARATOR: char = ':';

/// Everything the scanner can emit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Raw `key:value` text of one field
    Field(String),
    /// Blank line between two records
    RecordBoundary,
    /// End of input; always the last token
    EndOfStream,
}

impl Token {
    pub fn is_field(&self) -> bool {
        matches!(self, Token::Field(_))
    }

    /// Whether this token closes the current record
    pub fn ends_record(&self) -> bool {
        matches!(self, Token::RecordBoundary | Token::EndOfStream)
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Token::EndOfStream)
    }

    pub fn as_field(&self) -> Option<&str> {
        match self {
            Token::Field(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Token::Field(_) => "field",
            Token::RecordBoundary => "record_boundary",
            Token::EndOfStream => "end_of_stream",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Field(raw) => write!(f, "Field({})", raw),
            Token::RecordBoundary => write!(f, "RecordBoundary"),
            Token::EndOfStream => write!(f, "EndOfStream"),
        }
    }
}

/// Token with the span of source text it was scanned from
pub type SpannedToken = Spanned<Token>;

/// A field split into key and value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub key: String,
    pub value: String,
    /// `true` when the raw text had no separator
    pub malformed: bool,
}

impl FieldEntry {
    /// Split raw field text at the first `:`. The value keeps any later `:`.
    ///
    /// Text without a separator becomes the key and the value is empty.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(KEY_VALUE_SEPARATOR) {
            Some((key, value)) => Self {
                key: key.to_string(),
                value: value.to_string(),
                malformed: false,
            },
            None => Self {
                key: raw.to_string(),
                value: String::new(),
                malformed: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_first_separator() {
        let entry = FieldEntry::parse("hgt:12:30");
        assert_eq!(entry.key, "hgt");
        assert_eq!(entry.value, "12:30");
        assert!(!entry.malformed);
    }

    #[test]
    fn test_empty_value_is_well_formed() {
        let entry = FieldEntry::parse("cid:");
        assert_eq!(entry.key, "cid");
        assert_eq!(entry.value, "");
        assert!(!entry.malformed);
    }

    #[test]
    fn test_field_without_separator() {
        let entry = FieldEntry::parse("byr1937");
        assert_eq!(entry.key, "byr1937");
        assert_eq!(entry.value, "");
        assert!(entry.malformed);
    }

    #[test]
    fn test_token_classification() {
        assert!(Token::Field("a:b".into()).is_field());
        assert!(Token::RecordBoundary.ends_record());
        assert!(Token::EndOfStream.ends_record());
        assert!(!Token::Field("a:b".into()).ends_record());
        assert_eq!(Token::Field("a:b".into()).as_field(), Some("a:b"));
        assert_eq!(Token::EndOfStream.kind(), "end_of_stream");
    }
}
