use bstr::ByteSlice;

/// The byte patterns derived from a multipart boundary token.
///
/// All three patterns are views into a single `\n--<token>--` buffer:
///
/// | pattern            | bytes          |
/// |--------------------|----------------|
/// | newline delimiter  | `\n--<token>`  |
/// | delimiter          | `--<token>`    |
/// | terminator         | `--<token>--`  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    full: Vec<u8>,
}

impl Boundary {
    /// Derives the patterns for `token`. The token is not validated.
    pub fn new(token: impl AsRef<[u8]>) -> Self {
        let token = token.as_ref();
        let mut full = Vec::with_capacity(token.len() + 5);
        full.extend_from_slice(b"\n--");
        full.extend_from_slice(token);
        full.extend_from_slice(b"--");
        Self { full }
    }

    /// `\n--<token>`
    #[must_use]
    pub fn newline_delimiter(&self) -> &[u8] {
        &self.full[..self.full.len() - 2]
    }

    /// `--<token>`
    #[must_use]
    pub fn delimiter(&self) -> &[u8] {
        &self.full[1..self.full.len() - 2]
    }

    /// `--<token>--`
    #[must_use]
    pub fn terminator(&self) -> &[u8] {
        &self.full[1..]
    }

    /// Bytes to peek at a line feed: the line feed, the delimiter and two more,
    /// enough to see either a trailing whitespace byte or a terminator's `--`.
    pub(crate) fn window_len(&self) -> usize {
        self.newline_delimiter().len() + 2
    }

    /// True for `--<token>` followed by whitespace, which rules out
    /// `--<token>--`.
    #[must_use]
    pub fn is_delimiter(&self, window: &[u8]) -> bool {
        let delimiter = self.delimiter();
        let Some(idx) = window.find(delimiter) else {
            return false;
        };
        window
            .get(idx + delimiter.len())
            .is_some_and(|&b| is_space(b))
    }

    /// True when `--<token>--` occurs anywhere in `window`.
    #[must_use]
    pub fn is_terminator(&self, window: &[u8]) -> bool {
        window.find(self.terminator()).is_some()
    }
}

/// Latin-1 white space.
fn is_space(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ' | 0x85 | 0xa0)
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use super::*;

    #[test]
    fn derives_patterns() {
        let b = Boundary::new("XYZ");
        assert_eq!(b.newline_delimiter(), b"\n--XYZ");
        assert_eq!(b.delimiter(), b"--XYZ");
        assert_eq!(b.terminator(), b"--XYZ--");
        assert_eq!(b.window_len(), 8);
    }

    #[test]
    fn empty_token() {
        let b = Boundary::new("");
        assert_eq!(b.delimiter(), b"--");
        assert_eq!(b.terminator(), b"----");
    }

    #[rstest]
    #[case::crlf(b"--XYZ\r\n", true, false)]
    #[case::lf(b"--XYZ\n", true, false)]
    #[case::trailing_space(b"--XYZ  \r\n", true, false)]
    #[case::tab(b"--XYZ\t", true, false)]
    #[case::nbsp(b"--XYZ\xa0", true, false)]
    #[case::terminator(b"--XYZ--\r\n", false, true)]
    #[case::terminator_at_eof(b"--XYZ--", false, true)]
    #[case::no_trailing_byte(b"--XYZ", false, false)]
    #[case::longer_token(b"--XYZW\r\n", false, false)]
    #[case::offset(b"x--XYZ\r\n", true, false)]
    #[case::content(b"hello\r\n", false, false)]
    #[case::single_dash(b"-XYZ\r\n", false, false)]
    fn classifies_lines(
        #[case] line: &[u8],
        #[case] delimiter: bool,
        #[case] terminator: bool,
    ) {
        let b = Boundary::new("XYZ");
        assert_eq!(b.is_delimiter(line), delimiter);
        assert_eq!(b.is_terminator(line), terminator);
    }

    #[quickcheck]
    fn own_lines_classify_for_any_token(token: Vec<u8>) -> bool {
        let b = Boundary::new(&token);
        let mut delimiter_line = b.delimiter().to_vec();
        delimiter_line.extend_from_slice(b"\r\n");
        b.is_delimiter(&delimiter_line)
            && !b.is_terminator(&delimiter_line)
            && b.is_terminator(b.terminator())
            && !b.is_delimiter(b.terminator())
    }
}
