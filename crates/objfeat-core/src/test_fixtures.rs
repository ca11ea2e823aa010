//! On-disk fixtures shared by unit tests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::layout;
use crate::npy::write_i64_array;

/// Deterministic feature value; identical across truncation variants.
pub(crate) fn feature_value(record: u64, slot: usize, d: usize) -> f32 {
    (record * 10_000 + slot as u64 * 100 + d as u64) as f32
}

/// Record `r` has `r % 4` real objects followed by padding.
pub(crate) fn mask_value(record: u64, slot: usize) -> bool {
    (slot as u64) < record % 4
}

/// Writes `sent_num.<split>` and contiguous `offsets.<split>`.
pub(crate) fn write_index(dir: &Path, split: &str, sent_num: &[i64]) {
    let offsets: Vec<i64> = sent_num
        .iter()
        .scan(0i64, |acc, &n| {
            let start = *acc;
            *acc += n;
            Some(start)
        })
        .collect();
    write_i64_array(&layout::sent_num_file(dir, split), sent_num).expect("write sent_num");
    write_i64_array(&layout::offsets_file(dir, split), &offsets).expect("write offsets");
}

/// Writes the feature and mask files of one variant.
pub(crate) fn write_variant(
    dir: &Path,
    split: &str,
    truncate: Option<usize>,
    records: u64,
    capacity: usize,
    dim: usize,
) {
    let mut features = BufWriter::new(
        File::create(layout::object_file(dir, split, truncate)).expect("create features"),
    );
    let mut mask = BufWriter::new(
        File::create(layout::object_mask_file(dir, split, truncate)).expect("create mask"),
    );
    for record in 0..records {
        for slot in 0..capacity {
            for d in 0..dim {
                features
                    .write_all(&feature_value(record, slot, d).to_le_bytes())
                    .expect("write feature");
            }
            mask.write_all(&[u8::from(mask_value(record, slot))])
                .expect("write mask");
        }
    }
    features.flush().expect("flush features");
    mask.flush().expect("flush mask");
}
