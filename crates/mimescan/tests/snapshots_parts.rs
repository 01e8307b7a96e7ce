#![allow(missing_docs)]

mod common;

use common::transcript;

#[test]
fn snapshot_preamble_and_short_reads() {
    insta::assert_snapshot!(transcript(b"preamble\r\n--XYZ\r\nhello\r\n--XYZ--\r\n", "XYZ", 4), @r#"
    part 1
      read "hell"
      read "o"
      end of part
    finished
    "#);
}

#[test]
fn snapshot_truncated_body() {
    insta::assert_snapshot!(transcript(b"--XYZ\r\nunterminated-content", "XYZ", 64), @r#"
    part 1
      read "unterminated-content"
      truncated
    error: unexpected end of input
    "#);
}

#[test]
fn snapshot_carriage_returns_and_empty_part() {
    let body = b"--XYZ\r\na\rb\r\n\r\n--XYZ\r\n\r\n--XYZ--";
    insta::assert_snapshot!(transcript(body, "XYZ", 64), @r#"
    part 1
      read "a\rb\r\n"
      end of part
    part 2
      end of part
    finished
    "#);
}
