//! Errors for epoch-keyed data stores (missing epochs/metadata, shape
//! consistency, and file round-trip failures).
//!
//! This module defines [`EpochError`], used across the epochal store, the
//! output transforms, and every consumer that looks values up by epoch
//! (convolution stacking, observation assembly, slip conversions).
//!
//! ## Conventions
//! - Epochs are `i64` days relative to the reference (coseismic) event.
//! - A requested epoch that is absent from a store is **never** treated as a
//!   zero array; it is a hard [`EpochError::MissingEpoch`] so that causality
//!   zeros (which are structural, not data) cannot be confused with data gaps.
//! - File-backed failures carry the offending path so sweep-level reporting
//!   can attribute them.

/// Result alias for epochal-store operations that may produce [`EpochError`].
pub type EpochResult<T> = Result<T, EpochError>;

/// Unified error type for epoch-keyed data access.
#[derive(Debug)]
pub enum EpochError {
    /// A requested epoch is absent from the store.
    MissingEpoch { epoch: i64, store: String },

    /// A requested info entry is absent from the store's side channel.
    MissingInfo { name: String, store: String },

    /// An info entry is not the finite scalar a consumer requires.
    NonScalarInfo { name: String, store: String },

    /// An info entry must be positive (a log10 is taken of it) but is not.
    NonPositiveInfo { name: String, store: String, value: f64 },

    /// Two stores report the same value for a differenced parameter, so the
    /// finite-difference denominator vanishes.
    DegenerateDifference { name: String, value: f64 },

    /// A stacked vector's length does not match the matrix it multiplies.
    LengthMismatch { context: &'static str, expected: usize, actual: usize },

    /// An inserted or loaded epoch value does not match the store's shape.
    ShapeMismatch { epoch: i64, expected: (usize, usize), actual: (usize, usize) },

    /// An epoch sequence is not strictly increasing at `index`.
    EpochsNotIncreasing { index: usize, prev: i64, next: i64 },

    /// An epoch sequence is empty where at least one epoch is required.
    EmptyEpochs,

    /// A site named in a filter is not present in the store's site list.
    UnknownSite { site: String, store: String },

    /// The store has no `sites` info entry but a site-based access was made.
    NoSiteList { store: String },

    /// Underlying file I/O failed.
    Io { path: String, source: std::io::Error },

    /// JSON (de)serialization of a store file failed.
    Serde { path: String, detail: String },
}

impl std::error::Error for EpochError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpochError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for EpochError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpochError::MissingEpoch { epoch, store } => {
                write!(f, "epoch {epoch} is not present in store '{store}'")
            }
            EpochError::MissingInfo { name, store } => {
                write!(f, "info entry '{name}' is not present in store '{store}'")
            }
            EpochError::NonScalarInfo { name, store } => {
                write!(f, "info entry '{name}' of store '{store}' is not a finite scalar")
            }
            EpochError::NonPositiveInfo { name, store, value } => write!(
                f,
                "info entry '{name}' of store '{store}' must be positive, got {value}"
            ),
            EpochError::DegenerateDifference { name, value } => write!(
                f,
                "both stores hold '{name}' = {value}; a finite difference needs distinct values"
            ),
            EpochError::LengthMismatch { context, expected, actual } => {
                write!(f, "{context}: expected length {expected}, got {actual}")
            }
            EpochError::ShapeMismatch { epoch, expected, actual } => write!(
                f,
                "value for epoch {epoch} has shape {actual:?}, but the store holds {expected:?}"
            ),
            EpochError::EpochsNotIncreasing { index, prev, next } => write!(
                f,
                "epoch sequence must be strictly increasing; epochs[{}] = {} follows {}",
                index, next, prev
            ),
            EpochError::EmptyEpochs => {
                write!(f, "epoch sequence is empty; at least one epoch is required")
            }
            EpochError::UnknownSite { site, store } => {
                write!(f, "site '{site}' is not in the site list of store '{store}'")
            }
            EpochError::NoSiteList { store } => {
                write!(f, "store '{store}' has no 'sites' info entry")
            }
            EpochError::Io { path, source } => {
                write!(f, "I/O failure on '{path}': {source}")
            }
            EpochError::Serde { path, detail } => {
                write!(f, "failed to (de)serialize store file '{path}': {detail}")
            }
        }
    }
}
