//! Content hashing using blake3.
//!
//! Used to tell whether two files hold identical bytes regardless of name.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read buffer size for streamed hashing.
const CHUNK_SIZE: usize = 64 * 1024;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Compute blake3 hash of file contents, streamed in fixed-size chunks.
pub fn file_hash(path: &Path) -> io::Result<ContentHash> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Whether two files hold identical bytes.
///
/// Sizes are compared first; digests only when sizes match. Any I/O
/// failure counts as "not identical".
pub fn same_content(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }

    let (Ok(meta_a), Ok(meta_b)) = (a.metadata(), b.metadata()) else {
        return false;
    };
    if meta_a.len() != meta_b.len() {
        return false;
    }

    match (file_hash(a), file_hash(b)) {
        (Ok(ha), Ok(hb)) => ha == hb,
        _ => false,
    }
}
