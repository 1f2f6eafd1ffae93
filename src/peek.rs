//! A one-byte look-ahead wrapper over a buffered byte stream.
//!
//! The text parser's disambiguation of objects from arrays, and its bare
//! token boundary rule, both depend on seeing the next byte without
//! consuming it. This is the smallest primitive that supports that; it
//! does no line tracking and reports EOF as `-1`, matching the sentinel
//! style of the binary parser's opcode dispatch.

use std::io::{BufReader, Read};

const BUFFER_SIZE: usize = 64 * 1024;

/// Wraps a byte source with a single-byte look-ahead buffer.
pub struct PeekReader<R> {
    inner: BufReader<R>,
    lookahead: Option<i32>,
    position: u64,
}

impl<R: Read> PeekReader<R> {
    /// Wraps `inner` in a peeking reader with a default-sized internal buffer.
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(BUFFER_SIZE, inner),
            lookahead: None,
            position: 0,
        }
    }

    /// Returns the next byte without consuming it, or `-1` at EOF.
    pub fn peek(&mut self) -> i32 {
        if let Some(b) = self.lookahead {
            return b;
        }
        let b = self.read_raw();
        self.lookahead = Some(b);
        b
    }

    /// Returns and consumes the next byte, or `-1` at EOF.
    pub fn read(&mut self) -> i32 {
        if let Some(b) = self.lookahead.take() {
            if b >= 0 {
                self.position += 1;
            }
            return b;
        }
        let b = self.read_raw();
        if b >= 0 {
            self.position += 1;
        }
        b
    }

    /// Returns the number of bytes consumed so far (for error positions).
    pub fn position(&self) -> u64 {
        self.position
    }

    fn read_raw(&mut self) -> i32 {
        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte) {
            Ok(0) => -1,
            Ok(_) => byte[0] as i32,
            Err(_) => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn peek_does_not_consume() {
        let mut r = PeekReader::new(Cursor::new(b"ab".to_vec()));
        assert_eq!(r.peek(), b'a' as i32);
        assert_eq!(r.peek(), b'a' as i32);
        assert_eq!(r.read(), b'a' as i32);
        assert_eq!(r.read(), b'b' as i32);
        assert_eq!(r.read(), -1);
        assert_eq!(r.peek(), -1);
    }

    #[test]
    fn position_tracks_consumed_bytes() {
        let mut r = PeekReader::new(Cursor::new(b"xyz".to_vec()));
        assert_eq!(r.position(), 0);
        r.read();
        r.read();
        assert_eq!(r.position(), 2);
        r.peek();
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn empty_stream_is_eof() {
        let mut r = PeekReader::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(r.peek(), -1);
        assert_eq!(r.read(), -1);
    }
}
