use log::{trace, warn};

use super::{BoundaryScanner, HeldByte, ReadOutcome};
use crate::{
    ScanError,
    source::{ByteSource, Peek},
};

/// A read outcome plus how many source bytes the call consumed.
#[derive(Debug, Clone, Copy)]
pub(super) struct Scan {
    pub(super) outcome: ReadOutcome,
    pub(super) consumed: usize,
}

impl Scan {
    /// Nothing delivered and nothing consumed: input is exhausted or the source
    /// is stalled.
    pub(super) fn stalled(&self) -> bool {
        self.outcome.written == 0 && self.consumed == 0
    }
}

/// What the window behind a line feed says about the line that follows.
enum Lookahead {
    Boundary,
    Content,
    Exhausted,
    Unavailable,
}

impl<S: ByteSource> BoundaryScanner<S> {
    /// Reads content of the current part into `dest`.
    ///
    /// Returns `end_of_part` once a boundary line is next in the source; the
    /// line itself is left for [`advance`](Self::advance). Performs at most
    /// `dest.len()` steps of lookahead, so a call may return fewer bytes than
    /// are available, including zero. Running out of input is not an error: it
    /// sets [`truncated`](Self::truncated) and the remaining bytes are
    /// delivered as content.
    ///
    /// # Errors
    ///
    /// [`ScanError::Io`] when the source fails.
    pub fn read(&mut self, dest: &mut [u8]) -> Result<ReadOutcome, ScanError> {
        self.scan(dest).map(|scan| scan.outcome)
    }

    pub(super) fn scan(&mut self, dest: &mut [u8]) -> Result<Scan, ScanError> {
        if self.staged.len() >= dest.len() {
            return Ok(Scan {
                outcome: ReadOutcome {
                    written: self.drain_staged(dest),
                    end_of_part: false,
                },
                consumed: 0,
            });
        }

        let mut consumed = 0;
        for _ in 0..dest.len() {
            let next = match self.source.peek(1).map_err(ScanError::io("peek"))? {
                Peek::Full(bytes) => match bytes.first() {
                    Some(&byte) => byte,
                    None => break,
                },
                Peek::Exhausted(_) => {
                    self.end_of_input();
                    break;
                }
                Peek::Short(_) => break,
            };

            match next {
                b'\n' => match self.lookahead() {
                    Lookahead::Boundary => {
                        trace!("boundary ahead in part {}", self.parts_read);
                        self.return_held();
                        return Ok(Scan {
                            outcome: ReadOutcome {
                                written: self.drain_staged(dest),
                                end_of_part: true,
                            },
                            consumed,
                        });
                    }
                    Lookahead::Exhausted => self.mark_truncated(),
                    Lookahead::Content => {}
                    Lookahead::Unavailable => continue,
                },
                b'\r' => {
                    // A second carriage return settles the first as content.
                    self.commit_held();
                    if self.source.read_byte().map_err(ScanError::io("read byte"))?.is_none() {
                        self.end_of_input();
                        break;
                    }
                    consumed += 1;
                    self.held = HeldByte::CarriageReturn;
                    continue;
                }
                _ => {}
            }

            self.commit_held();
            match self.source.read_byte().map_err(ScanError::io("read byte"))? {
                Some(byte) => {
                    self.staged.push_back(byte);
                    consumed += 1;
                }
                None => {
                    self.end_of_input();
                    break;
                }
            }
        }

        Ok(Scan {
            outcome: ReadOutcome {
                written: self.drain_staged(dest),
                end_of_part: false,
            },
            consumed,
        })
    }

    /// Classifies the line after the line feed the source is positioned at.
    fn lookahead(&mut self) -> Lookahead {
        let boundary = &self.boundary;
        let want = boundary.window_len();
        match self.source.peek(want) {
            Ok(Peek::Full(window)) => {
                if window.len() < want {
                    return Lookahead::Unavailable;
                }
                let Some((_, line)) = window.split_first() else {
                    return Lookahead::Unavailable;
                };
                // A blank line right after this line feed means it cannot
                // precede a boundary.
                if window.starts_with(b"\n\n") || window.starts_with(b"\n\r") {
                    return Lookahead::Content;
                }
                if boundary.is_delimiter(line) || boundary.is_terminator(line) {
                    Lookahead::Boundary
                } else {
                    Lookahead::Content
                }
            }
            Ok(Peek::Exhausted(_)) => Lookahead::Exhausted,
            Ok(Peek::Short(_)) | Err(_) => Lookahead::Unavailable,
        }
    }

    fn end_of_input(&mut self) {
        self.exhausted = true;
        self.commit_held();
        self.mark_truncated();
    }

    fn mark_truncated(&mut self) {
        if !self.truncated {
            warn!(
                "part {} ended without a boundary {:?}",
                self.parts_read,
                bstr::BStr::new(self.boundary.delimiter())
            );
            self.truncated = true;
        }
    }
}
