//! Incremental UTF-8 character source over any buffered reader

use super::{CharSource, PositionTracker, SourceError};
use crate::utils::Position;
use std::io::{self, BufRead, Cursor};

/// Decodes characters from a `BufRead` one at a time, with one character of pushback
pub struct RuneReader<R> {
    reader: R,
    pending: Option<char>,
    tracker: PositionTracker,
}

impl<R: BufRead> RuneReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            tracker: PositionTracker::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SourceError> {
        loop {
            match self.reader.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => {
                    let byte = buf[0];
                    self.reader.consume(1);
                    return Ok(Some(byte));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(SourceError::Io {
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    fn decode_char(&mut self) -> Result<char, SourceError> {
        let offset = self.tracker.current().offset;
        let first = self.read_byte()?.ok_or(SourceError::EndOfInput)?;

        let width = utf8_width(first);
        if width == 0 {
            return Err(SourceError::InvalidUtf8 { offset });
        }

        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            // Truncated sequence at end of input
            *slot = self
                .read_byte()?
                .ok_or(SourceError::InvalidUtf8 { offset })?;
        }

        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(SourceError::InvalidUtf8 { offset })
    }
}

impl RuneReader<Cursor<Vec<u8>>> {
    /// Owned in-memory source, usable where the source must be `'static`
    pub fn from_string(text: String) -> Self {
        Self::new(Cursor::new(text.into_bytes()))
    }
}

impl<R: BufRead> CharSource for RuneReader<R> {
    fn next_char(&mut self) -> Result<char, SourceError> {
        let ch = match self.pending.take() {
            Some(ch) => ch,
            None => self.decode_char()?,
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

/// Sequence length announced by a UTF-8 lead byte, or 0 if it cannot start one
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Read};

    #[test]
    fn test_decodes_multibyte_characters() {
        let mut source = RuneReader::from_string("aé€😀".to_string());
        assert_eq!(source.next_char(), Ok('a'));
        assert_eq!(source.next_char(), Ok('é'));
        assert_eq!(source.next_char(), Ok('€'));
        assert_eq!(source.next_char(), Ok('😀'));
        assert_eq!(source.next_char(), Err(SourceError::EndOfInput));
        assert_eq!(source.position().offset, 10);
    }

    #[test]
    fn test_invalid_lead_byte() {
        let mut source = RuneReader::new(Cursor::new(vec![b'a', 0xFF]));
        assert_eq!(source.next_char(), Ok('a'));
        assert_eq!(
            source.next_char(),
            Err(SourceError::InvalidUtf8 { offset: 1 })
        );
    }

    #[test]
    fn test_truncated_sequence() {
        let mut source = RuneReader::new(Cursor::new(vec![0xE2, 0x82]));
        assert_eq!(
            source.next_char(),
            Err(SourceError::InvalidUtf8 { offset: 0 })
        );
    }

    #[test]
    fn test_pushback_round_trip() {
        let mut source = RuneReader::from_string("é:".to_string());
        let ch = source.next_char().unwrap();
        source.pushback(ch).unwrap();
        assert_eq!(source.position().offset, 0);
        assert_eq!(source.next_char(), Ok('é'));
        assert_eq!(source.next_char(), Ok(':'));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_io_errors_surface() {
        let mut source = RuneReader::new(BufReader::new(FailingReader));
        match source.next_char() {
            Err(SourceError::Io { message }) => assert!(message.contains("disk on fire")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
