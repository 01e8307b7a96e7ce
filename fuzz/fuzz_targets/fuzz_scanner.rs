#![no_main]
use std::cell::RefCell;

use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use mimescan::{BoundaryScanner, BufferedSource, ScanError, ScannerOptions, chunk_utils::ChunkedReader};
use rand::rngs::SmallRng; // faster than StdRng
use rand::{Rng, RngCore, SeedableRng};

const HEADER: usize = 5; // 1 flag + 4-byte seed
const TOKEN: &str = "XYZ";

thread_local! {
    // One SmallRng per thread, seeded once from the host OS
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Fragments that boundary lines, blank lines and near misses are made of.
static PIECE_TABLE: &[&[u8]] = &[
    b"\r\n",
    b"\n",
    b"\r",
    b"\r\n\r\n",
    b"--XYZ",
    b"--XYZ--",
    b"--XYZ\r\n",
    b"\r\n--XYZ\r\n",
    b"\r\n--XYZ--\r\n",
    b"--XY",
    b"-",
    b" ",
    b"\t",
    b"\xa0",
    b"content",
    b"Content-Type: text/plain\r\n",
];

/// Helper: borrow the thread-local RNG and run a closure with it.
fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed % 10 == 0 {
        data[0] = with_rng(|rng| rng.next_u32() as u8);

        // split-seed
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        let target = size.clamp(HEADER + 1, max_size);
        while prefix < target {
            prefix += append_piece(&mut data[prefix..max_size]);
        }

        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Append one fragment from the piece table to `buf`, truncated to fit.
/// Returns the number of bytes written.
fn append_piece(buf: &mut [u8]) -> usize {
    if buf.is_empty() {
        return 1;
    }
    let piece = with_rng(|rng| PIECE_TABLE[rng.random_range(0..PIECE_TABLE.len())]);
    let len = piece.len().min(buf.len());
    buf[..len].copy_from_slice(&piece[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

fn scan(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..5].try_into().unwrap());
    let body = &data[HEADER..];

    // Derive read sizes, buffer capacity and destination size from the header.
    let reads = split_seed
        .to_le_bytes()
        .iter()
        .map(|b| usize::from(b % 16) + 1)
        .collect();
    let capacity = usize::from(flags & 0x0f) + 1;
    let read_parts = flags & 0x10 != 0;
    let dest_len = usize::from(flags >> 5) * 7 + 1;

    let source = BufferedSource::with_capacity(capacity, ChunkedReader::new(body.to_vec(), reads));
    let options = ScannerOptions {
        discard_chunk: dest_len,
        panic_on_error: false,
    };
    let mut scanner = BoundaryScanner::with_options(source, TOKEN, options);
    let mut dest = vec![0u8; dest_len];
    let mut delivered = 0usize;
    let mut parts_read = 0usize;

    // Every successful advance consumes at least one line.
    for _ in 0..=body.len() + 1 {
        match scanner.advance() {
            Ok(true) => {
                assert_eq!(scanner.parts_read(), parts_read + 1);
                parts_read = scanner.parts_read();
                if !read_parts {
                    continue;
                }
                loop {
                    let r = scanner.read(&mut dest).expect("in-memory source cannot fail");
                    delivered += r.written;
                    if r.end_of_part || (r.written == 0 && scanner.truncated()) {
                        break;
                    }
                }
                assert!(delivered <= body.len());
            }
            Ok(false) => {
                assert!(scanner.is_finished());
                assert!(matches!(scanner.advance(), Ok(false)));
                return;
            }
            Err(ScanError::UnexpectedEof) => return,
            Err(ScanError::MissingBoundary { .. }) => {
                assert!(scanner.is_finished());
                return;
            }
            Err(e @ ScanError::Io { .. }) => panic!("in-memory source failed: {e}"),
        }
    }
    panic!("scanner did not terminate");
}

fuzz_target!(|data: &[u8]| scan(data));
