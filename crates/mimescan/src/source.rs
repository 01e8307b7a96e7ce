//! Peekable byte sources.
//!
//! The scanner never owns a read buffer of its own for lookahead. It asks the
//! source to `peek` a bounded window, consumes bytes one at a time, and may push
//! the most recently consumed byte back. [`BufferedSource`] provides these
//! primitives over any [`std::io::Read`].
//!
//! Invariants
//! - A peek never moves the read position.
//! - After `read_byte`, one byte of history survives subsequent peeks so that
//!   `unread_byte` can return it to the stream.
//! - `read_line` and `unread_byte` both clear that history.

use std::io::{self, Read};

use bstr::ByteSlice;
use thiserror::Error;

/// Default capacity of a [`BufferedSource`].
///
/// Must comfortably exceed `\r\n--` + a 70 byte token + `--`; anything of at
/// least 76 bytes works, larger values only reduce the number of refills.
pub const PEEK_BUFFER_SIZE: usize = 4096;

/// Result of a lookahead request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peek<'a> {
    /// Exactly the requested number of bytes.
    Full(&'a [u8]),
    /// Input ended before the requested number of bytes; holds what remains.
    Exhausted(&'a [u8]),
    /// Fewer bytes are available right now, but more may follow.
    Short(&'a [u8]),
}

impl<'a> Peek<'a> {
    /// The bytes visible through this peek, whatever its outcome.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        match *self {
            Peek::Full(b) | Peek::Exhausted(b) | Peek::Short(b) => b,
        }
    }
}

/// How a call to [`ByteSource::read_line`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    /// The line ended with `\n`, which was included.
    Newline,
    /// Input ran out before a `\n` was seen.
    Exhausted,
}

/// Failure to push a byte back onto a source.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadError {
    /// No consumed byte is available to push back.
    #[error("no byte pending to unread")]
    NothingPending,
}

/// The primitives the boundary scanner needs from its input.
pub trait ByteSource {
    /// Looks at up to `n` upcoming bytes without consuming them.
    ///
    /// # Errors
    ///
    /// Any I/O failure of the underlying input.
    fn peek(&mut self, n: usize) -> io::Result<Peek<'_>>;

    /// Consumes one byte. `Ok(None)` means input is exhausted.
    ///
    /// # Errors
    ///
    /// Any I/O failure of the underlying input.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Pushes the most recently consumed byte back.
    ///
    /// # Errors
    ///
    /// [`UnreadError::NothingPending`] when there is nothing to push back.
    /// Callers are expected to tolerate it.
    fn unread_byte(&mut self) -> Result<(), UnreadError>;

    /// Appends bytes through the next `\n` (inclusive) to `line`, or all
    /// remaining bytes when input ends first.
    ///
    /// # Errors
    ///
    /// Any I/O failure of the underlying input.
    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<LineEnd>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn peek(&mut self, n: usize) -> io::Result<Peek<'_>> {
        (**self).peek(n)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn unread_byte(&mut self) -> Result<(), UnreadError> {
        (**self).unread_byte()
    }

    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<LineEnd> {
        (**self).read_line(line)
    }
}

/// A [`ByteSource`] over any reader.
///
/// `Interrupted` reads are retried. `WouldBlock` is reported as
/// [`Peek::Short`] by `peek` and as an error by the consuming operations,
/// which consume nothing when they fail and can be retried.
/// A peek wider than the capacity grows the buffer to fit the window.
#[derive(Debug)]
pub struct BufferedSource<R> {
    inner: R,
    /// Buffered bytes; `buf[pos..]` is unread.
    buf: Vec<u8>,
    pos: usize,
    capacity: usize,
    eof: bool,
    can_unread: bool,
}

impl<R: Read> BufferedSource<R> {
    /// Wraps `inner` with a [`PEEK_BUFFER_SIZE`] buffer.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(PEEK_BUFFER_SIZE, inner)
    }

    /// Wraps `inner` with a buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            buf: Vec::with_capacity(capacity),
            pos: 0,
            capacity,
            eof: false,
            can_unread: false,
        }
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the reader. Buffered but unread bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Drops consumed bytes, keeping one byte of history when it may still be
    /// pushed back.
    fn compact(&mut self) {
        let keep = usize::from(self.can_unread);
        let discard = self.pos.saturating_sub(keep);
        if discard > 0 {
            self.buf.drain(..discard);
            self.pos -= discard;
        }
    }

    /// Reads until `n` bytes are buffered or input ends.
    fn fill(&mut self, n: usize) -> io::Result<()> {
        if self.available() >= n || self.eof {
            return Ok(());
        }
        self.compact();
        let mut len = self.buf.len();
        self.buf.resize(self.capacity.max(self.pos + n), 0);
        let result = loop {
            if len - self.pos >= n || self.eof {
                break Ok(());
            }
            match self.inner.read(&mut self.buf[len..]) {
                Ok(0) => self.eof = true,
                Ok(read) => len += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };
        self.buf.truncate(len);
        result
    }
}

impl<R: Read> ByteSource for BufferedSource<R> {
    fn peek(&mut self, n: usize) -> io::Result<Peek<'_>> {
        let short = match self.fill(n) {
            Ok(()) => false,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => true,
            Err(e) => return Err(e),
        };
        let unread = &self.buf[self.pos..];
        Ok(if unread.len() >= n {
            Peek::Full(&unread[..n])
        } else if short {
            Peek::Short(unread)
        } else {
            Peek::Exhausted(unread)
        })
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.fill(1)?;
        match self.buf.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                self.can_unread = true;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }

    fn unread_byte(&mut self) -> Result<(), UnreadError> {
        if !self.can_unread || self.pos == 0 {
            return Err(UnreadError::NothingPending);
        }
        self.pos -= 1;
        self.can_unread = false;
        Ok(())
    }

    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<LineEnd> {
        self.can_unread = false;
        // Nothing is consumed until the line is complete, so a failed fill
        // can be retried without losing the start of the line.
        let mut scanned = 0;
        loop {
            let unread = &self.buf[self.pos..];
            if let Some(i) = unread[scanned..].find_byte(b'\n') {
                let end = scanned + i + 1;
                line.extend_from_slice(&unread[..end]);
                self.pos += end;
                return Ok(LineEnd::Newline);
            }
            scanned = unread.len();
            if self.eof {
                line.extend_from_slice(unread);
                self.pos = self.buf.len();
                return Ok(LineEnd::Exhausted);
            }
            self.fill(scanned + 1)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_utils::ChunkedReader;

    #[test]
    fn peek_does_not_consume() {
        let mut src = BufferedSource::new(&b"abc"[..]);
        assert_eq!(src.peek(2).unwrap(), Peek::Full(b"ab"));
        assert_eq!(src.peek(2).unwrap(), Peek::Full(b"ab"));
        assert_eq!(src.read_byte().unwrap(), Some(b'a'));
        assert_eq!(src.peek(5).unwrap(), Peek::Exhausted(b"bc"));
    }

    #[test]
    fn peek_spans_short_reads() {
        let reader = ChunkedReader::new(b"hello world".to_vec(), vec![1, 2, 3]);
        let mut src = BufferedSource::new(reader);
        assert_eq!(src.peek(11).unwrap(), Peek::Full(b"hello world"));
    }

    #[test]
    fn peek_wider_than_capacity_grows() {
        let mut src = BufferedSource::with_capacity(4, &b"0123456789"[..]);
        assert_eq!(src.peek(8).unwrap(), Peek::Full(b"01234567"));
        assert_eq!(src.capacity(), 4);
    }

    #[test]
    fn unread_survives_refill() {
        let reader = ChunkedReader::new(b"\r\n--x".to_vec(), vec![1]);
        let mut src = BufferedSource::with_capacity(2, reader);
        assert_eq!(src.read_byte().unwrap(), Some(b'\r'));
        assert_eq!(src.peek(4).unwrap(), Peek::Full(b"\n--x"));
        src.unread_byte().unwrap();
        assert_eq!(src.peek(2).unwrap(), Peek::Full(b"\r\n"));
    }

    #[test]
    fn unread_twice_is_nothing_pending() {
        let mut src = BufferedSource::new(&b"ab"[..]);
        assert_eq!(src.unread_byte(), Err(UnreadError::NothingPending));
        src.read_byte().unwrap();
        src.unread_byte().unwrap();
        assert_eq!(src.unread_byte(), Err(UnreadError::NothingPending));
    }

    #[test]
    fn read_line_reports_exhaustion() {
        let mut src = BufferedSource::with_capacity(3, &b"one\ntwo"[..]);
        let mut line = Vec::new();
        assert_eq!(src.read_line(&mut line).unwrap(), LineEnd::Newline);
        assert_eq!(line, b"one\n");
        line.clear();
        assert_eq!(src.read_line(&mut line).unwrap(), LineEnd::Exhausted);
        assert_eq!(line, b"two");
        line.clear();
        assert_eq!(src.read_line(&mut line).unwrap(), LineEnd::Exhausted);
        assert!(line.is_empty());
    }

    #[test]
    fn read_line_keeps_partial_line_on_would_block() {
        let reader = ChunkedReader::new(b"--XYZ\r\nrest".to_vec(), vec![1]).with_stall_after(3);
        let mut src = BufferedSource::with_capacity(2, reader);
        let mut line = Vec::new();
        let err = src.read_line(&mut line).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert!(line.is_empty());
        assert_eq!(src.read_line(&mut line).unwrap(), LineEnd::Newline);
        assert_eq!(line, b"--XYZ\r\n");
    }

    #[test]
    fn line_longer_than_capacity_grows() {
        let reader = ChunkedReader::new(b"0123456789\nx".to_vec(), vec![3]);
        let mut src = BufferedSource::with_capacity(4, reader);
        let mut line = Vec::new();
        assert_eq!(src.read_line(&mut line).unwrap(), LineEnd::Newline);
        assert_eq!(line, b"0123456789\n");
        assert_eq!(src.read_byte().unwrap(), Some(b'x'));
    }

    #[test]
    fn would_block_is_a_short_peek() {
        let reader = ChunkedReader::new(b"abcdef".to_vec(), vec![2]).with_stall_after(2);
        let mut src = BufferedSource::new(reader);
        assert_eq!(src.peek(4).unwrap(), Peek::Short(b"ab"));
        assert_eq!(src.read_byte().unwrap(), Some(b'a'));
    }
}
