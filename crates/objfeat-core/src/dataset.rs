//! Object feature dataset of one split.
//!
//! [`ObjectDataset`] ties the pieces together: it loads the record index,
//! picks the cheapest truncation variant that still holds `max_obj` slots,
//! optionally warms it up, and maps it.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ObjfeatConfig;
use crate::error::Result;
use crate::index::RecordIndex;
use crate::store::{FeatureRecord, FeatureStore, FEATURE_DIM};
use crate::variant::{Selection, VariantRegistry, DEFAULT_CAPACITY};
use crate::warmup;

/// Options for [`ObjectDataset::open_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOptions {
    /// Object slots returned per record.
    pub max_obj: usize,
    /// Floats per object slot.
    pub dim: usize,
    /// Read the selected files once before mapping them.
    pub warmup: bool,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            max_obj: DEFAULT_CAPACITY,
            dim: FEATURE_DIM,
            warmup: false,
        }
    }
}

/// Random-access object features of one dataset split.
#[derive(Debug)]
pub struct ObjectDataset {
    dir: PathBuf,
    split: String,
    index: RecordIndex,
    selection: Selection,
    store: FeatureStore,
}

impl ObjectDataset {
    /// Opens `split` in `dir`, returning `max_obj` slots per record.
    ///
    /// # Errors
    ///
    /// - [`Error::CorruptIndex`](crate::Error::CorruptIndex) for malformed
    ///   sentence counts or offsets.
    /// - [`Error::VariantNotFound`](crate::Error::VariantNotFound) if no
    ///   variant holds `max_obj` slots.
    /// - [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) if the selected
    ///   files disagree with the index.
    pub fn open(dir: impl AsRef<Path>, split: &str, max_obj: usize) -> Result<Self> {
        Self::open_with(
            dir,
            split,
            &DatasetOptions {
                max_obj,
                ..DatasetOptions::default()
            },
        )
    }

    /// Opens `split` in `dir` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`ObjectDataset::open`].
    pub fn open_with(
        dir: impl AsRef<Path>,
        split: &str,
        options: &DatasetOptions,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let index = RecordIndex::load(dir, split)?;
        let selection = VariantRegistry::scan(dir, split)?.select(options.max_obj)?;

        if options.warmup {
            if let Err(e) = warmup::warmup_files(&selection.files) {
                warn!(error = %e, "warm-up failed, continuing without it");
            }
        }

        let store = FeatureStore::open(
            &selection.files,
            index.total_records(),
            selection.capacity,
            options.dim,
            options.max_obj,
        )?;

        info!(
            dir = %dir.display(),
            split,
            records = index.total_records(),
            documents = index.num_documents(),
            max_obj = options.max_obj,
            truncate = selection.capacity,
            "opened object dataset"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            split: split.to_string(),
            index,
            selection,
            store,
        })
    }

    /// Opens the dataset described by the `[dataset]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for an invalid
    /// configuration, otherwise see [`ObjectDataset::open`].
    pub fn from_config(config: &ObjfeatConfig) -> Result<Self> {
        config.validate()?;
        let dataset = &config.dataset;
        Self::open_with(
            &dataset.data_dir,
            &dataset.split,
            &DatasetOptions {
                max_obj: dataset.max_obj,
                dim: dataset.dim,
                warmup: dataset.warmup,
            },
        )
    }

    /// Returns record `index` with `max_obj` slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) if
    /// `index >= len()`.
    #[inline]
    pub fn get(&self, index: u64) -> Result<FeatureRecord<'_>> {
        self.store.get(index)
    }

    /// Returns record `index` truncated to `min(slots, capacity)` slots.
    ///
    /// # Errors
    ///
    /// See [`FeatureStore::get_truncated`].
    #[inline]
    pub fn get_truncated(&self, index: u64, slots: usize) -> Result<FeatureRecord<'_>> {
        self.store.get_truncated(index, slots)
    }

    /// Number of records (utterances) in the split.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.store.len()
    }

    /// Returns true if the split has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Iterates all records in global order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureRecord<'_>> {
        self.store.iter()
    }

    /// Object slots returned per record.
    #[must_use]
    pub fn max_obj(&self) -> usize {
        self.store.requested()
    }

    /// Variant chosen at open time.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Document index of the split.
    #[must_use]
    pub fn index(&self) -> &RecordIndex {
        &self.index
    }

    /// Underlying mapped store.
    #[must_use]
    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    /// Dataset root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Split name.
    #[must_use]
    pub fn split(&self) -> &str {
        &self.split
    }
}
