//! Error types for `objfeat`.
//!
//! All failures of the feature store surface through a single [`Error`] enum.
//! Each variant carries a stable code of the form `OBJF-XXX`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for `objfeat` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening or reading a feature store.
#[derive(Error, Debug)]
pub enum Error {
    /// Sentence-count / offset arrays are malformed (OBJF-001).
    #[error("[OBJF-001] Corrupt record index: {0}")]
    CorruptIndex(String),

    /// No on-disk variant satisfies the request (OBJF-002).
    #[error(
        "[OBJF-002] No variant of '{split}' in {} holds {requested} object slots",
        dir.display()
    )]
    VariantNotFound {
        /// Dataset root that was scanned.
        dir: PathBuf,
        /// Split name.
        split: String,
        /// Requested capacity.
        requested: usize,
    },

    /// A mapped file does not match the declared shape (OBJF-003).
    #[error(
        "[OBJF-003] Shape mismatch for {}: expected {expected} bytes, found {actual}",
        path.display()
    )]
    ShapeMismatch {
        /// Offending file.
        path: PathBuf,
        /// Byte size implied by the index and selected capacity.
        expected: u64,
        /// Actual byte size on disk.
        actual: u64,
    },

    /// Record index outside `[0, len)` (OBJF-004).
    #[error("[OBJF-004] Record index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: u64,
        /// Number of records in the store.
        len: u64,
    },

    /// Requested capacity is zero or exceeds what the store holds (OBJF-005).
    #[error("[OBJF-005] Invalid object capacity: {0}")]
    InvalidCapacity(usize),

    /// Unreadable `.npy` array (OBJF-006).
    #[error("[OBJF-006] NPY error: {0}")]
    Npy(String),

    /// Configuration error (OBJF-007).
    #[error("[OBJF-007] Configuration error: {0}")]
    Config(String),

    /// IO error (OBJF-008).
    #[error("[OBJF-008] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error code (e.g., "OBJF-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CorruptIndex(_) => "OBJF-001",
            Self::VariantNotFound { .. } => "OBJF-002",
            Self::ShapeMismatch { .. } => "OBJF-003",
            Self::IndexOutOfRange { .. } => "OBJF-004",
            Self::InvalidCapacity(_) => "OBJF-005",
            Self::Npy(_) => "OBJF-006",
            Self::Config(_) => "OBJF-007",
            Self::Io(_) => "OBJF-008",
        }
    }

    /// Returns true if the store stays usable after this error.
    ///
    /// Only per-call argument errors are recoverable; everything else is
    /// raised while opening and leaves no store behind.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::InvalidCapacity(_)
        )
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
