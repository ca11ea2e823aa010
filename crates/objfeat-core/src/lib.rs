//! # `objfeat` Core
//!
//! Random-access object-detection features for dialogue datasets.
//!
//! Every utterance of a split owns one record: a `max_obj x 2048` matrix of
//! Faster R-CNN region features plus a mask telling real objects from
//! padding. Records live in flat files far larger than memory, so they are
//! memory-mapped and served by offset arithmetic.
//!
//! ## Features
//!
//! - **Validated index**: per-document sentence counts and offsets are
//!   checked when the dataset opens, never lazily.
//! - **Truncation variants**: `object.<split>.<K>` copies keep only `K`
//!   slots per record; the smallest copy that still holds `max_obj` slots is
//!   mapped.
//! - **Zero-copy reads**: records borrow straight from the mapping.
//! - **Lock-free**: stores are immutable, share them across threads freely.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use objfeat_core::ObjectDataset;
//!
//! let dataset = ObjectDataset::open("./preprocessed_data", "train", 10)?;
//! println!("{} records, variant {}", dataset.len(), dataset.selection().capacity);
//!
//! let record = dataset.get(42)?;
//! for (slot, features) in record.objects() {
//!     println!("object {slot}: {} floats", features.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// =============================================================================
// NUMERIC CAST LINTS
// =============================================================================
// Record indices are u64 on disk and usize in memory. `FeatureStore::open`
// checks that every mapped byte offset fits usize before any cast happens.
// =============================================================================
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod index;
pub mod layout;
pub mod npy;
pub mod store;
#[cfg(test)]
mod test_fixtures;
pub mod variant;
#[cfg(test)]
mod variant_tests;
pub mod warmup;

pub use config::{ConfigError, DatasetConfig, LoggingConfig, ObjfeatConfig};
pub use dataset::{DatasetOptions, ObjectDataset};
pub use error::{Error, Result};
pub use index::{RecordIndex, RecordLocation};
pub use store::{FeatureRecord, FeatureStore, MaskView, OwnedRecord, FEATURE_DIM};
pub use variant::{
    select_capacity, select_variant, FilePair, Selection, VariantRegistry, DEFAULT_CAPACITY,
};
pub use warmup::{warmup_file, warmup_files};
