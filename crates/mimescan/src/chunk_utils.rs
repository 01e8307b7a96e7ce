//! Helpers for feeding a body to the scanner in uneven reads.
//!
//! Used by the tests, benches and the fuzz target to make boundary lines
//! straddle read calls.

use std::io::{self, Read};

/// A reader that hands out its data in a fixed cycle of read sizes.
///
/// A size of zero in the cycle is treated as one. Optionally reports
/// `WouldBlock` once when the read position reaches a given offset.
#[derive(Debug, Clone)]
pub struct ChunkedReader {
    data: Vec<u8>,
    sizes: Vec<usize>,
    pos: usize,
    turn: usize,
    stall_at: Option<usize>,
}

impl ChunkedReader {
    /// Serves `data` in reads of `sizes[0]`, `sizes[1]`, ... bytes, cycling.
    /// An empty `sizes` serves everything in one read.
    #[must_use]
    pub fn new(data: Vec<u8>, sizes: Vec<usize>) -> Self {
        Self {
            data,
            sizes,
            pos: 0,
            turn: 0,
            stall_at: None,
        }
    }

    /// Fails one read with `WouldBlock` once `offset` bytes have been served.
    #[must_use]
    pub fn with_stall_after(mut self, offset: usize) -> Self {
        self.stall_at = Some(offset);
        self
    }

    fn next_size(&mut self) -> usize {
        if self.sizes.is_empty() {
            return self.data.len();
        }
        let size = self.sizes[self.turn % self.sizes.len()];
        self.turn += 1;
        size.max(1)
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.stall_at == Some(self.pos) {
            self.stall_at = None;
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let size = self.next_size();
        let remaining = &self.data[self.pos..];
        let n = size.min(buf.len()).min(remaining.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_reader_cycles_sizes() {
        let mut r = ChunkedReader::new(b"abcdefg".to_vec(), vec![1, 3]);
        let mut buf = [0u8; 8];
        assert_eq!(r.read(&mut buf).unwrap(), 1);
        assert_eq!(r.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"bcd");
        assert_eq!(r.read(&mut buf).unwrap(), 1);
        assert_eq!(r.read(&mut buf).unwrap(), 2);
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }
}
