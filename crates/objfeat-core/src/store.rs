//! Read-only memory-mapped feature store.
//!
//! Two flat files back a store:
//!
//! - features: little-endian `f32`, shape `(records, capacity, dim)`
//! - mask: one byte per slot, shape `(records, capacity)`, nonzero = object
//!
//! Both are mapped once at [`FeatureStore::open`] and unmapped when the store
//! is dropped. Reads are plain offset arithmetic into the maps; records
//! borrow from the store and cannot outlive it.
//!
//! # Safety Guarantees
//!
//! - File sizes are checked against the declared shape before mapping.
//! - Every record starts at a multiple of `dim * 4` bytes into the mapping,
//!   and the mapping itself is checked to be `f32` aligned at open.
//! - Mask bytes are never reinterpreted as `bool`; see [`MaskView`].

use std::fs::File;
use std::path::Path;
use std::slice::ChunksExact;

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::variant::FilePair;

#[cfg(target_endian = "big")]
compile_error!("feature files are little-endian f32; big-endian targets are not supported");

/// Feature dimensionality of the Faster R-CNN object features.
pub const FEATURE_DIM: usize = 2048;

const F32_SIZE: usize = std::mem::size_of::<f32>();

/// Memory-mapped features and masks of one truncation variant.
pub struct FeatureStore {
    features: Mmap,
    mask: Mmap,
    files: FilePair,
    len: u64,
    capacity: usize,
    dim: usize,
    requested: usize,
}

impl FeatureStore {
    /// Maps `files` as `len` records of `capacity` slots of `dim` floats.
    ///
    /// Records returned by [`get`](Self::get) are truncated to `requested`
    /// slots.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] if `requested` is zero or above `capacity`.
    /// - [`Error::Config`] if `dim` is zero.
    /// - [`Error::ShapeMismatch`] if a file's size differs from the shape.
    /// - [`Error::Io`] if a file cannot be opened or mapped.
    ///
    /// On error nothing stays mapped.
    pub fn open(
        files: &FilePair,
        len: u64,
        capacity: usize,
        dim: usize,
        requested: usize,
    ) -> Result<Self> {
        if requested == 0 || requested > capacity {
            return Err(Error::InvalidCapacity(requested));
        }
        if dim == 0 {
            return Err(Error::Config("feature dimension must be positive".into()));
        }

        let feature_bytes = shape_bytes(
            &files.features,
            &[len, capacity as u64, dim as u64, F32_SIZE as u64],
        )?;
        let mask_bytes = shape_bytes(&files.mask, &[len, capacity as u64])?;

        let features = map_exact(&files.features, feature_bytes)?;
        // `features` is dropped (unmapped) if the mask cannot be mapped.
        let mask = map_exact(&files.mask, mask_bytes)?;

        ensure_f32_aligned(&features, &files.features)?;

        debug!(
            features = %files.features.display(),
            records = len,
            capacity,
            dim,
            requested,
            "mapped feature store"
        );

        Ok(Self {
            features,
            mask,
            files: files.clone(),
            len,
            capacity,
            dim,
            requested,
        })
    }

    /// Returns record `index`, truncated to the requested slot count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    #[inline]
    pub fn get(&self, index: u64) -> Result<FeatureRecord<'_>> {
        self.get_truncated(index, self.requested)
    }

    /// Returns the first `min(slots, capacity)` slots of record `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] if `slots` is zero.
    /// - [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn get_truncated(&self, index: u64, slots: usize) -> Result<FeatureRecord<'_>> {
        if slots == 0 {
            return Err(Error::InvalidCapacity(slots));
        }
        if index >= self.len {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let slots = slots.min(self.capacity);
        // The whole file is mapped, so every in-range record index fits usize.
        let record = index as usize;

        let mask_start = record * self.capacity;
        let feature_start = mask_start * self.dim;

        Ok(FeatureRecord {
            index,
            features: &self.feature_data()[feature_start..feature_start + slots * self.dim],
            mask: MaskView(&self.mask[mask_start..mask_start + slots]),
            dim: self.dim,
        })
    }

    /// Iterates records `0..len()` in order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureRecord<'_>> {
        // Every index below `len` is valid, so `get` cannot fail here.
        (0..self.len).filter_map(move |i| self.get(i).ok())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots per record stored on disk.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots per record returned by [`get`](Self::get).
    #[must_use]
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Floats per slot.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Mapped files.
    #[must_use]
    pub fn files(&self) -> &FilePair {
        &self.files
    }

    /// Total bytes mapped (features + mask).
    #[must_use]
    pub fn mapped_bytes(&self) -> usize {
        self.features.len() + self.mask.len()
    }

    #[inline]
    fn feature_data(&self) -> &[f32] {
        if self.features.is_empty() {
            return &[];
        }
        // SAFETY: the mapping is f32 aligned (`ensure_f32_aligned` in `open`),
        // its length is a multiple of 4 (shape check), f32 has no invalid bit
        // patterns, and the slice borrows `self` so it cannot outlive the
        // mapping.
        unsafe {
            std::slice::from_raw_parts(
                self.features.as_ptr().cast::<f32>(),
                self.features.len() / F32_SIZE,
            )
        }
    }
}

impl std::fmt::Debug for FeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureStore")
            .field("files", &self.files)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("dim", &self.dim)
            .field("requested", &self.requested)
            .finish_non_exhaustive()
    }
}

/// Product of `dims` as a byte count, or a shape mismatch on overflow.
fn shape_bytes(path: &Path, dims: &[u64]) -> Result<u64> {
    dims.iter()
        .try_fold(1u64, |acc, &d| acc.checked_mul(d))
        .filter(|&bytes| usize::try_from(bytes).is_ok())
        .ok_or_else(|| Error::ShapeMismatch {
            path: path.to_path_buf(),
            expected: u64::MAX,
            actual: std::fs::metadata(path).map_or(0, |m| m.len()),
        })
}

/// Rejects a non-empty feature buffer that cannot be viewed as `f32`.
pub(crate) fn ensure_f32_aligned(bytes: &[u8], path: &Path) -> Result<()> {
    if bytes.is_empty() || bytes.as_ptr().align_offset(std::mem::align_of::<f32>()) == 0 {
        return Ok(());
    }
    Err(Error::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("{}: mapping is not f32 aligned", path.display()),
    )))
}

/// Maps `path` read-only after checking it is exactly `expected` bytes.
fn map_exact(path: &Path, expected: u64) -> Result<Mmap> {
    let file = File::open(path)?;
    let actual = file.metadata()?.len();
    if actual != expected {
        return Err(Error::ShapeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }

    // SAFETY: the file is opened read-only and only ever read through the
    // map. Feature files are immutable once preprocessing has written them;
    // truncating one while it is mapped is outside the supported contract.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

/// Borrowed view of one record.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRecord<'a> {
    index: u64,
    features: &'a [f32],
    mask: MaskView<'a>,
    dim: usize,
}

impl<'a> FeatureRecord<'a> {
    /// Global index of this record.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Row-major `num_slots() x dim()` feature matrix.
    #[must_use]
    pub fn features(&self) -> &'a [f32] {
        self.features
    }

    /// Object mask, one flag per slot.
    #[must_use]
    pub fn mask(&self) -> MaskView<'a> {
        self.mask
    }

    /// Number of slots (rows).
    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.mask.len()
    }

    /// Floats per slot (columns).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Features of slot `slot`.
    #[must_use]
    pub fn row(&self, slot: usize) -> Option<&'a [f32]> {
        let start = slot.checked_mul(self.dim)?;
        self.features.get(start..start + self.dim)
    }

    /// Iterates the feature rows of every slot, padding included.
    pub fn rows(&self) -> ChunksExact<'a, f32> {
        self.features.chunks_exact(self.dim)
    }

    /// Iterates `(slot, features)` of the slots marked as real objects.
    pub fn objects(&self) -> impl Iterator<Item = (usize, &'a [f32])> {
        let mask = self.mask;
        self.rows()
            .enumerate()
            .filter(move |(slot, _)| mask.get(*slot).unwrap_or(false))
    }

    /// Number of slots marked as real objects.
    #[must_use]
    pub fn num_objects(&self) -> usize {
        self.mask.count()
    }

    /// Copies the record out of the mapping.
    #[must_use]
    pub fn to_owned_record(&self) -> OwnedRecord {
        OwnedRecord {
            index: self.index,
            dim: self.dim,
            features: self.features.to_vec(),
            mask: self.mask.to_vec(),
        }
    }
}

/// Object mask of one record as stored on disk.
///
/// Each slot is one byte; any nonzero byte marks a real object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskView<'a>(&'a [u8]);

impl<'a> MaskView<'a> {
    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the view has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether slot `slot` holds a real object.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<bool> {
        self.0.get(slot).map(|&b| b != 0)
    }

    /// Iterates slot flags.
    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        self.0.iter().map(|&b| b != 0)
    }

    /// Number of real objects.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b != 0).count()
    }

    /// Raw mask bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Copies the flags into a `Vec<bool>`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<bool> {
        self.iter().collect()
    }
}

/// Owned copy of a [`FeatureRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedRecord {
    /// Global index of the record.
    pub index: u64,
    /// Floats per slot.
    pub dim: usize,
    /// Row-major feature matrix.
    pub features: Vec<f32>,
    /// One flag per slot.
    pub mask: Vec<bool>,
}
