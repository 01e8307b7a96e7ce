//! A streaming scanner for MIME multipart bodies (RFC 2046).
//!
//! [`BoundaryScanner`] splits a body into part byte-streams using only a
//! forward-only, peekable [`ByteSource`] and the boundary token. Memory use is
//! bounded by the lookahead window and the size of the caller's reads; the body
//! is never buffered as a whole.
//!
//! Header parsing, transfer decoding and building a part tree are left to the
//! caller. A nested multipart part is scanned by a second scanner reading from
//! the first one:
//!
//! ```rust
//! use mimescan::{BoundaryScanner, BufferedSource};
//!
//! let body: &[u8] = b"--outer\r\n--inner\r\nleaf\r\n--inner--\r\n--outer--\r\n";
//! let mut outer = BoundaryScanner::new(BufferedSource::new(body), "outer");
//! assert!(outer.advance()?);
//!
//! let mut inner = BoundaryScanner::new(BufferedSource::new(&mut outer), "inner");
//! assert!(inner.advance()?);
//! let mut leaf = Vec::new();
//! inner.read_part_to_end(&mut leaf)?;
//! assert_eq!(leaf, b"leaf");
//! assert!(!inner.advance()?);
//! # Ok::<(), mimescan::ScanError>(())
//! ```

mod boundary;
#[doc(hidden)]
pub mod chunk_utils;
mod error;
mod options;
mod scanner;
mod source;


pub use boundary::Boundary;
pub use error::ScanError;
pub use options::{DEFAULT_DISCARD_CHUNK, ScannerOptions};
pub use scanner::{BoundaryScanner, ReadOutcome};
pub use source::{BufferedSource, ByteSource, LineEnd, PEEK_BUFFER_SIZE, Peek, UnreadError};
