//! Page-cache warm-up for mapped files.
//!
//! The first random read of a cold page costs a disk seek. Reading a file
//! front to back once before mapping it turns those seeks into one
//! sequential scan. This is only a latency hint: a store opened without
//! warm-up returns exactly the same data.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use crate::error::Result;
use crate::variant::FilePair;

/// Read size used while warming up.
const WARMUP_CHUNK: usize = 1 << 20;

/// Reads `path` sequentially once and returns the number of bytes read.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if the file cannot be read.
pub fn warmup_file(path: &Path) -> Result<u64> {
    let start = Instant::now();
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; WARMUP_CHUNK];
    let mut total = 0u64;

    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => total += n as u64,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    debug!(
        path = %path.display(),
        bytes = total,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "warmed up file"
    );
    Ok(total)
}

/// Warms up the feature file and the mask file of a variant.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if either file cannot be read.
pub fn warmup_files(files: &FilePair) -> Result<u64> {
    Ok(warmup_file(&files.features)? + warmup_file(&files.mask)?)
}
