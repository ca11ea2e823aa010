//! Truncation variant registry and selection.
//!
//! Mapping object features is I/O bound, so preprocessing can write several
//! copies of the same split that keep only the first `K` object slots per
//! record (`object.<split>.<K>`). Opening the smallest copy that still holds
//! the requested number of slots moves the least data through the page
//! cache.
//!
//! Selection is split in two halves:
//!
//! - [`VariantRegistry::scan`] turns a directory listing into a set of
//!   `(capacity, FilePair)` entries.
//! - [`VariantRegistry::select`] applies the minimum-sufficient-capacity rule
//!   to that set without touching the filesystem, so registries can also be
//!   built by hand with [`VariantRegistry::with_variant`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::layout;

/// Object slots stored per record in the unsuffixed files.
pub const DEFAULT_CAPACITY: usize = 20;

/// Feature file and mask file of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// `object.<split>[.<K>]`
    pub features: PathBuf,
    /// `object_mask.<split>[.<K>]`
    pub mask: PathBuf,
}

impl FilePair {
    /// Files of `split` in `dir`, suffixed with `truncate` when given.
    #[must_use]
    pub fn for_split(dir: &Path, split: &str, truncate: Option<usize>) -> Self {
        Self {
            features: layout::object_file(dir, split, truncate),
            mask: layout::object_mask_file(dir, split, truncate),
        }
    }
}

/// Outcome of variant selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Slots per record stored in the selected files.
    pub capacity: usize,
    /// Files to map.
    pub files: FilePair,
    /// `false` when the unsuffixed default files were picked.
    pub suffixed: bool,
}

/// Variants available for one dataset split.
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    dir: PathBuf,
    split: String,
    base: Option<FilePair>,
    variants: BTreeMap<usize, FilePair>,
}

impl VariantRegistry {
    /// Creates an empty registry for `split` in `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, split: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            split: split.into(),
            base: None,
            variants: BTreeMap::new(),
        }
    }

    /// Registers the unsuffixed pair, which holds [`DEFAULT_CAPACITY`] slots.
    #[must_use]
    pub fn with_base(mut self, files: FilePair) -> Self {
        self.base = Some(files);
        self
    }

    /// Registers a truncated pair holding `capacity` slots.
    #[must_use]
    pub fn with_variant(mut self, capacity: usize, files: FilePair) -> Self {
        self.variants.insert(capacity, files);
        self
    }

    /// Lists the variants of `split` present in `dir`.
    ///
    /// A variant is registered only when both its feature file and its mask
    /// file exist. Suffixes that are not a positive integer are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if `dir` cannot be listed.
    pub fn scan(dir: &Path, split: &str) -> Result<Self> {
        let base_name = layout::object_base_name(split);
        let mut registry = Self::new(dir, split);

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            let truncate = if name == base_name {
                None
            } else if let Some(k) = layout::parse_variant_suffix(name, &base_name) {
                Some(k)
            } else {
                continue;
            };
            if truncate == Some(0) {
                warn!(file = name, "ignoring zero-capacity variant");
                continue;
            }

            let files = FilePair::for_split(dir, split, truncate);
            if !files.features.is_file() {
                continue;
            }
            if !files.mask.is_file() {
                warn!(
                    file = name,
                    mask = %files.mask.display(),
                    "ignoring variant without mask file"
                );
                continue;
            }

            match truncate {
                Some(k) => {
                    registry.variants.insert(k, files);
                }
                None => registry.base = Some(files),
            }
        }

        Ok(registry)
    }

    /// Dataset root this registry describes.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Split name this registry describes.
    #[must_use]
    pub fn split(&self) -> &str {
        &self.split
    }

    /// The unsuffixed pair, if present.
    #[must_use]
    pub fn base(&self) -> Option<&FilePair> {
        self.base.as_ref()
    }

    /// Capacities of the suffixed variants, ascending.
    pub fn capacities(&self) -> impl Iterator<Item = usize> + '_ {
        self.variants.keys().copied()
    }

    /// Suffixed variants, ascending by capacity.
    pub fn variants(&self) -> impl Iterator<Item = (usize, &FilePair)> {
        self.variants.iter().map(|(k, files)| (*k, files))
    }

    /// Returns true if neither the base pair nor any variant is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_none() && self.variants.is_empty()
    }

    /// Picks the smallest suffixed variant holding at least `requested` slots.
    ///
    /// The base pair, which holds [`DEFAULT_CAPACITY`] slots, is used only
    /// when no suffixed variant is large enough.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] if `requested` is zero.
    /// - [`Error::VariantNotFound`] if no registered pair holds `requested`
    ///   slots.
    pub fn select(&self, requested: usize) -> Result<Selection> {
        if requested == 0 {
            return Err(Error::InvalidCapacity(requested));
        }

        let selection = if let Some(k) = select_capacity(self.capacities(), requested) {
            Selection {
                capacity: k,
                files: self.variants[&k].clone(),
                suffixed: true,
            }
        } else if let Some(files) = self.base.as_ref().filter(|_| requested <= DEFAULT_CAPACITY) {
            Selection {
                capacity: DEFAULT_CAPACITY,
                files: files.clone(),
                suffixed: false,
            }
        } else {
            return Err(Error::VariantNotFound {
                dir: self.dir.clone(),
                split: self.split.clone(),
                requested,
            });
        };

        debug!(
            dir = %self.dir.display(),
            split = %self.split,
            requested,
            capacity = selection.capacity,
            suffixed = selection.suffixed,
            "selected truncation variant"
        );
        Ok(selection)
    }
}

/// Smallest capacity in `capacities` that is `>= requested`.
#[must_use]
pub fn select_capacity(
    capacities: impl IntoIterator<Item = usize>,
    requested: usize,
) -> Option<usize> {
    capacities.into_iter().filter(|&k| k >= requested).min()
}

/// Scans `dir` and selects the variant of `split` for `requested` slots.
///
/// # Errors
///
/// See [`VariantRegistry::scan`] and [`VariantRegistry::select`].
pub fn select_variant(dir: &Path, split: &str, requested: usize) -> Result<Selection> {
    VariantRegistry::scan(dir, split)?.select(requested)
}
