use std::mem;

use bstr::{BStr, BString};
use log::{debug, trace, warn};

use super::{BoundaryScanner, HeldByte};
use crate::{
    ScanError,
    source::{ByteSource, LineEnd},
};

impl<S: ByteSource> BoundaryScanner<S> {
    /// Moves past the next boundary line.
    ///
    /// Returns `Ok(true)` when a new part begins and `Ok(false)` once the
    /// terminator has been consumed; after that every call returns
    /// `Ok(false)`. Unread content of the current part is discarded first.
    /// Blank lines are skipped, and so is anything before the first delimiter.
    ///
    /// # Errors
    ///
    /// - [`ScanError::UnexpectedEof`] when input ends before a boundary line.
    /// - [`ScanError::MissingBoundary`] when, after the first part, a line is
    ///   neither blank nor a boundary. The scanner is finished afterwards.
    /// - [`ScanError::Io`] when the source fails.
    pub fn advance(&mut self) -> Result<bool, ScanError> {
        if self.finished {
            return Ok(false);
        }
        if self.parts_read > 0 {
            self.discard_part()?;
        }

        loop {
            self.line.clear();
            let end = self
                .source
                .read_line(&mut self.line)
                .map_err(ScanError::io("read line"))?;
            let exhausted = end == LineEnd::Exhausted;
            if exhausted {
                self.exhausted = true;
            }

            if matches!(self.line.first(), Some(b'\r' | b'\n')) {
                trace!("skipping blank line");
                continue;
            }
            if self.boundary.is_terminator(&self.line) {
                debug!("terminator after {} parts", self.parts_read);
                self.finished = true;
                return Ok(false);
            }
            if !exhausted && self.boundary.is_delimiter(&self.line) {
                self.parts_read += 1;
                self.truncated = false;
                self.held = HeldByte::Empty;
                debug!("part {} begins", self.parts_read);
                return Ok(true);
            }
            if exhausted {
                return Err(ScanError::UnexpectedEof);
            }
            if self.parts_read == 0 {
                trace!("skipping preamble line {:?}", BStr::new(&self.line));
                continue;
            }

            self.finished = true;
            let err = ScanError::MissingBoundary {
                expected: BString::from(self.boundary.delimiter()),
                found: BString::from(mem::take(&mut self.line)),
            };
            warn!("{err}");
            #[cfg(any(test, feature = "fuzzing"))]
            if self.options.panic_on_error {
                panic!("{err}");
            }
            return Err(err);
        }
    }

    /// Skips the rest of the current part so the source sits at its boundary
    /// line.
    fn discard_part(&mut self) -> Result<(), ScanError> {
        let mut scratch = vec![0; self.options.discard_chunk.max(1)];
        loop {
            let scan = self.scan(&mut scratch)?;
            if scan.outcome.end_of_part || scan.stalled() {
                return Ok(());
            }
        }
    }
}
