/// Size of the scratch reads issued when skipping the rest of a part.
pub const DEFAULT_DISCARD_CHUNK: usize = 4096;

/// Configuration options for [`BoundaryScanner`](crate::BoundaryScanner).
///
/// # Examples
///
/// ```rust
/// use mimescan::{BoundaryScanner, BufferedSource, ScannerOptions};
///
/// let options = ScannerOptions {
///     discard_chunk: 512,
///     ..Default::default()
/// };
/// let body: &[u8] = b"--b\r\nx\r\n--b--\r\n";
/// let scanner = BoundaryScanner::with_options(BufferedSource::new(body), "b", options);
/// assert_eq!(scanner.parts_read(), 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScannerOptions {
    /// Capacity of each content read issued by
    /// [`advance`](crate::BoundaryScanner::advance) while it discards the
    /// unread remainder of the current part. Zero is treated as one.
    ///
    /// # Default
    ///
    /// [`DEFAULT_DISCARD_CHUNK`]
    pub discard_chunk: usize,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on malformed framing instead of returning the error.
    ///
    /// Enabled only in test and fuzzing builds to produce backtraces.
    pub panic_on_error: bool,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            discard_chunk: DEFAULT_DISCARD_CHUNK,
            #[cfg(any(test, feature = "fuzzing"))]
            panic_on_error: false,
        }
    }
}
