#![allow(dead_code)]

use core::fmt::Write;

use bstr::BStr;
use mimescan::{BoundaryScanner, BufferedSource, ScanError};

/// Splits `body` into its parts, reading each one to the end.
pub fn split_parts(body: &[u8], token: &str) -> Result<Vec<Vec<u8>>, ScanError> {
    let mut scanner = BoundaryScanner::new(BufferedSource::new(body), token);
    let mut parts = Vec::new();
    while scanner.advance()? {
        let mut part = Vec::new();
        scanner.read_part_to_end(&mut part)?;
        parts.push(part);
    }
    Ok(parts)
}

/// Renders every scanner call made while walking `body` with `dest`-byte
/// reads, one line per observable step.
pub fn transcript(body: &[u8], token: &str, dest: usize) -> String {
    let mut scanner = BoundaryScanner::new(BufferedSource::new(body), token);
    let mut buf = vec![0; dest];
    let mut out = String::new();
    loop {
        match scanner.advance() {
            Ok(true) => {
                writeln!(out, "part {}", scanner.parts_read()).unwrap();
                loop {
                    let r = scanner.read(&mut buf).expect("read failed");
                    if r.written > 0 {
                        writeln!(out, "  read {:?}", BStr::new(&buf[..r.written])).unwrap();
                    }
                    if r.end_of_part {
                        writeln!(out, "  end of part").unwrap();
                        break;
                    }
                    if r.written == 0 && scanner.truncated() {
                        writeln!(out, "  truncated").unwrap();
                        break;
                    }
                }
            }
            Ok(false) => {
                writeln!(out, "finished").unwrap();
                return out;
            }
            Err(e) => {
                writeln!(out, "error: {e}").unwrap();
                return out;
            }
        }
    }
}
