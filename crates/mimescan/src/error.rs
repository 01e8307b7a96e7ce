use std::io;

use bstr::BString;
use thiserror::Error;

/// Errors surfaced by [`BoundaryScanner`](crate::BoundaryScanner).
#[derive(Error, Debug)]
pub enum ScanError {
    /// The byte source failed for a reason other than running out of input.
    #[error("{op}: {source}")]
    Io {
        /// The source operation that failed.
        op: &'static str,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
    /// Input ran out while looking for the next boundary line.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A line after the first part was neither a boundary nor blank.
    #[error("expected boundary not present: expecting boundary {expected:?}, got {found:?}")]
    MissingBoundary {
        /// The delimiter pattern, `--<token>`.
        expected: BString,
        /// The offending line, verbatim.
        found: BString,
    },
}

impl ScanError {
    /// Whether this is the end-of-input sentinel rather than a hard failure.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, ScanError::UnexpectedEof)
    }

    pub(crate) fn io(op: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| ScanError::Io { op, source }
    }
}

impl From<ScanError> for io::Error {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Io { source, .. } => source,
            ScanError::UnexpectedEof => io::ErrorKind::UnexpectedEof.into(),
            err @ ScanError::MissingBoundary { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
        }
    }
}
