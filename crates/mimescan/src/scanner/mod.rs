//! Scanner: splits a multipart body into part byte-streams.
//!
//! What it does
//! - [`BoundaryScanner::read`] delivers content of the current part and stops
//!   right before the next boundary line, without consuming it.
//! - [`BoundaryScanner::advance`] skips whatever is left of the current part,
//!   consumes the boundary line and reports whether another part follows.
//!
//! How a boundary is found
//! - Content is staged one byte at a time. At every line feed the scanner peeks
//!   a window of `\n--<token>` plus two bytes and classifies it.
//! - A carriage return is consumed but held back until the next byte decides
//!   its fate: it is content unless it turns out to start the `\r\n` in front
//!   of a boundary, in which case it is pushed back onto the source.
//!
//! Invariants
//! - The staging queue only ever holds content bytes.
//! - At most one carriage return is held at a time.
//! - `parts_read` only grows; once `finished` is set it is never cleared.
//! - Each `read` does work proportional to the destination length.
//!
//! Example
//! ```rust
//! use mimescan::{BoundaryScanner, BufferedSource};
//!
//! let body: &[u8] = b"--XYZ\r\npart-one\r\n--XYZ\r\npart-two\r\n--XYZ--\r\n";
//! let mut scanner = BoundaryScanner::new(BufferedSource::new(body), "XYZ");
//! let mut parts = Vec::new();
//! while scanner.advance()? {
//!     let mut part = Vec::new();
//!     scanner.read_part_to_end(&mut part)?;
//!     parts.push(part);
//! }
//! assert_eq!(parts, [b"part-one".to_vec(), b"part-two".to_vec()]);
//! # Ok::<(), mimescan::ScanError>(())
//! ```

use std::{cmp, collections::VecDeque, io, mem};

use log::trace;

use crate::{
    ScanError,
    boundary::Boundary,
    options::ScannerOptions,
    source::ByteSource,
};

mod advance;
mod read;


/// What a call to [`BoundaryScanner::read`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes written to the front of the destination.
    pub written: usize,
    /// A boundary line is next in the source; the part has no more content.
    pub end_of_part: bool,
}

/// One speculative byte taken from the source but not yet classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldByte {
    Empty,
    CarriageReturn,
}

/// Streaming splitter for one level of a multipart body.
///
/// Requires exclusive access to its source for its whole lifetime; nested
/// multipart bodies get a scanner of their own over the enclosing part.
#[derive(Debug)]
pub struct BoundaryScanner<S> {
    source: S,
    boundary: Boundary,
    options: ScannerOptions,
    staged: VecDeque<u8>,
    held: HeldByte,
    line: Vec<u8>,
    parts_read: usize,
    finished: bool,
    truncated: bool,
    exhausted: bool,
}

impl<S: ByteSource> BoundaryScanner<S> {
    /// Creates a scanner for the boundary `token` with default options.
    pub fn new(source: S, token: impl AsRef<[u8]>) -> Self {
        Self::with_options(source, token, ScannerOptions::default())
    }

    /// Creates a scanner for the boundary `token`.
    pub fn with_options(source: S, token: impl AsRef<[u8]>, options: ScannerOptions) -> Self {
        Self {
            source,
            boundary: Boundary::new(token),
            options,
            staged: VecDeque::new(),
            held: HeldByte::Empty,
            line: Vec::new(),
            parts_read: 0,
            finished: false,
            truncated: false,
            exhausted: false,
        }
    }

    /// Number of parts begun so far.
    #[must_use]
    pub fn parts_read(&self) -> usize {
        self.parts_read
    }

    /// Whether the terminator line (or malformed framing) ended the body.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the current part ran into the end of input instead of a
    /// boundary. Not an error by itself; callers usually report it as a
    /// structural warning.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// The patterns this scanner matches.
    #[must_use]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Mutable access to the source. Moving its read position desynchronizes
    /// the scanner.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Gives the source back. Staged content is dropped.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Reads the rest of the current part into `out`, returning the number of
    /// bytes appended.
    ///
    /// Stops at the next boundary, at end of input, or when the source cannot
    /// make progress without blocking.
    ///
    /// # Errors
    ///
    /// [`ScanError::Io`] when the source fails.
    pub fn read_part_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize, ScanError> {
        let mut chunk = vec![0; self.options.discard_chunk.max(1)];
        let mut total = 0;
        loop {
            let scan = self.scan(&mut chunk)?;
            out.extend_from_slice(&chunk[..scan.outcome.written]);
            total += scan.outcome.written;
            if scan.outcome.end_of_part || scan.stalled() {
                return Ok(total);
            }
        }
    }

    /// Moves up to `dest.len()` staged bytes into `dest`.
    fn drain_staged(&mut self, dest: &mut [u8]) -> usize {
        let n = cmp::min(dest.len(), self.staged.len());
        let (front, back) = self.staged.as_slices();
        let head = cmp::min(n, front.len());
        dest[..head].copy_from_slice(&front[..head]);
        dest[head..n].copy_from_slice(&back[..n - head]);
        self.staged.drain(..n);
        n
    }

    /// The held carriage return turned out to be content.
    fn commit_held(&mut self) {
        if mem::replace(&mut self.held, HeldByte::Empty) == HeldByte::CarriageReturn {
            self.staged.push_back(b'\r');
        }
    }

    /// The held carriage return belongs to a boundary line ending.
    fn return_held(&mut self) {
        if mem::replace(&mut self.held, HeldByte::Empty) == HeldByte::CarriageReturn
            && self.source.unread_byte().is_err()
        {
            trace!("carriage return already returned to source");
        }
    }
}

/// Reads the current part as a plain reader; the end of the part reads as EOF.
///
/// Intended for blocking sources: when the source cannot supply a byte without
/// blocking, the call fails with [`io::ErrorKind::WouldBlock`].
impl<S: ByteSource> io::Read for BoundaryScanner<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let scan = self.scan(buf)?;
            if scan.outcome.written > 0 || scan.outcome.end_of_part || self.exhausted {
                return Ok(scan.outcome.written);
            }
            if scan.consumed == 0 {
                return Err(io::ErrorKind::WouldBlock.into());
            }
        }
    }
}
