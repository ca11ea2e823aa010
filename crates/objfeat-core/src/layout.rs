//! File naming for a preprocessed dataset root.
//!
//! ```text
//! <dir>/sent_num.<split>            per-document sentence counts (.npy)
//! <dir>/offsets.<split>             per-document start offsets (.npy)
//! <dir>/object.<split>[.<K>]        f32 features, (records, K, dim)
//! <dir>/object_mask.<split>[.<K>]   u8 mask, (records, K)
//! ```
//!
//! The `.<K>` suffix names a truncation variant; the unsuffixed pair holds
//! [`DEFAULT_CAPACITY`](crate::variant::DEFAULT_CAPACITY) slots.

use std::path::{Path, PathBuf};

/// Sentence-count array of `split`.
#[must_use]
pub fn sent_num_file(dir: &Path, split: &str) -> PathBuf {
    dir.join(format!("sent_num.{split}"))
}

/// Document offset array of `split`.
#[must_use]
pub fn offsets_file(dir: &Path, split: &str) -> PathBuf {
    dir.join(format!("offsets.{split}"))
}

/// Base name of the feature file, without variant suffix.
#[must_use]
pub fn object_base_name(split: &str) -> String {
    format!("object.{split}")
}

/// Base name of the mask file, without variant suffix.
#[must_use]
pub fn object_mask_base_name(split: &str) -> String {
    format!("object_mask.{split}")
}

/// Feature file of `split`, truncated to `truncate` slots when given.
#[must_use]
pub fn object_file(dir: &Path, split: &str, truncate: Option<usize>) -> PathBuf {
    dir.join(with_suffix(object_base_name(split), truncate))
}

/// Mask file of `split`, truncated to `truncate` slots when given.
#[must_use]
pub fn object_mask_file(dir: &Path, split: &str, truncate: Option<usize>) -> PathBuf {
    dir.join(with_suffix(object_mask_base_name(split), truncate))
}

/// Parses the capacity out of `<base>.<K>`.
///
/// Returns `None` for the bare base name and for anything that is not
/// exactly the base followed by `.` and decimal digits.
#[must_use]
pub fn parse_variant_suffix(file_name: &str, base: &str) -> Option<usize> {
    let digits = file_name.strip_prefix(base)?.strip_prefix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn with_suffix(base: String, truncate: Option<usize>) -> String {
    match truncate {
        Some(k) => format!("{base}.{k}"),
        None => base,
    }
}
