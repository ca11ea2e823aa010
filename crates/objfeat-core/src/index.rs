//! Record index: maps documents onto the flat global record space.
//!
//! A split is described by two parallel arrays, the number of sentences of
//! each document and the global index of its first sentence. Feature files
//! are laid out by global index, so the only thing the store needs from the
//! index is [`RecordIndex::total_records`]; [`RecordIndex::locate`] goes the
//! other way for callers that think in documents.

use std::ops::Range;
use std::path::Path;

use crate::error::{Error, Result};
use crate::layout;
use crate::npy;

/// Position of a global record inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocation {
    /// Document number.
    pub document: usize,
    /// Sentence number within the document.
    pub sentence: u64,
}

/// Validated sentence counts and offsets of one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIndex {
    sent_num: Vec<u64>,
    offsets: Vec<u64>,
    total_records: u64,
}

impl RecordIndex {
    /// Builds an index from per-document sentence counts and start offsets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptIndex`] if the arrays are empty, differ in
    /// length, contain negative values, or are not contiguous
    /// (`offsets[i] + sent_num[i] == offsets[i + 1]`).
    pub fn new(sent_num: Vec<u64>, offsets: Vec<u64>) -> Result<Self> {
        if sent_num.is_empty() || offsets.is_empty() {
            return Err(Error::CorruptIndex(
                "sentence counts and offsets must not be empty".into(),
            ));
        }
        if sent_num.len() != offsets.len() {
            return Err(Error::CorruptIndex(format!(
                "{} sentence counts but {} offsets",
                sent_num.len(),
                offsets.len()
            )));
        }

        for (doc, window) in offsets.windows(2).enumerate() {
            if window[1] < window[0] {
                return Err(Error::CorruptIndex(format!(
                    "offsets decrease at document {}: {} -> {}",
                    doc + 1,
                    window[0],
                    window[1]
                )));
            }
            let end = window[0].checked_add(sent_num[doc]).ok_or_else(|| {
                Error::CorruptIndex(format!("document {doc} overflows the record space"))
            })?;
            if end != window[1] {
                return Err(Error::CorruptIndex(format!(
                    "document {doc} ends at {end} but document {} starts at {}",
                    doc + 1,
                    window[1]
                )));
            }
        }

        let last = offsets.len() - 1;
        let total_records = offsets[last]
            .checked_add(sent_num[last])
            .ok_or_else(|| Error::CorruptIndex("record count overflows".into()))?;

        Ok(Self {
            sent_num,
            offsets,
            total_records,
        })
    }

    /// Loads `sent_num.<split>` and `offsets.<split>` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] / [`Error::Npy`] if either file is unreadable and
    /// [`Error::CorruptIndex`] if their contents are inconsistent.
    pub fn load(dir: &Path, split: &str) -> Result<Self> {
        let sent_num = to_unsigned(
            npy::read_i64_array(&layout::sent_num_file(dir, split))?,
            "sentence count",
        )?;
        let offsets = to_unsigned(
            npy::read_i64_array(&layout::offsets_file(dir, split))?,
            "offset",
        )?;
        Self::new(sent_num, offsets)
    }

    /// Number of records in the split (`offsets[last] + sent_num[last]`).
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// Number of documents.
    #[must_use]
    pub fn num_documents(&self) -> usize {
        self.sent_num.len()
    }

    /// Per-document sentence counts.
    #[must_use]
    pub fn sent_num(&self) -> &[u64] {
        &self.sent_num
    }

    /// Per-document start offsets.
    #[must_use]
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Global record range covered by `document`.
    #[must_use]
    pub fn document_range(&self, document: usize) -> Option<Range<u64>> {
        let start = *self.offsets.get(document)?;
        Some(start..start + self.sent_num[document])
    }

    /// Finds the document and sentence of global record `record`.
    ///
    /// Returns `None` when `record` is outside `[offsets[0], total_records)`.
    /// Empty documents never own a record.
    #[must_use]
    pub fn locate(&self, record: u64) -> Option<RecordLocation> {
        if record >= self.total_records || record < self.offsets[0] {
            return None;
        }
        // Last document whose start is <= record; skips empty documents that
        // share a start offset with a later one.
        let document = self.offsets.partition_point(|&start| start <= record) - 1;
        Some(RecordLocation {
            document,
            sentence: record - self.offsets[document],
        })
    }
}

fn to_unsigned(values: Vec<i64>, what: &str) -> Result<Vec<u64>> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            u64::try_from(v)
                .map_err(|_| Error::CorruptIndex(format!("negative {what} {v} at document {i}")))
        })
        .collect()
}
