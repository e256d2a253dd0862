//! epochal::store — epoch-keyed array container with a metadata side channel.
//!
//! Purpose
//! -------
//! Provide the single storage abstraction the inversion engine reads and
//! writes: a mapping from an integer epoch (days since the reference event)
//! to a fixed-shape `f64` array, plus a named side channel of scalar/array
//! metadata (`sites`, `visM`, mesh dimensions, ...). Green's-function sets,
//! observation series, weight series, and slip histories are all instances
//! of this container.
//!
//! Key behaviors
//! -------------
//! - Ordered epoch access: `epochs()` returns the stored epochs in strictly
//!   increasing order.
//! - Strict lookup: `get_epoch_value` on an absent epoch is a
//!   [`EpochError::MissingEpoch`], never a silent zero.
//! - Shape discipline: every epoch value must share the shape of the first
//!   inserted value.
//! - Exact file round-trip: `save`/`open` use JSON with shortest-repr float
//!   formatting, so stored `f64` values survive a round trip bit-for-bit.
//!
//! Invariants & assumptions
//! ------------------------
//! - All values in one store have the same `(rows, cols)` shape.
//! - Epoch keys are unique; re-inserting an epoch overwrites its value.
//! - The info side channel is typed ([`InfoValue`]); consumers match on the
//!   variant they expect.
//!
//! Conventions
//! -----------
//! - Column observation vectors are stored as `(n, 1)` arrays, matching the
//!   stacked-matrix algebra downstream.
//! - A store that has never been associated with a file reports itself as
//!   `"<memory>"` in error messages.
//!
//! Downstream usage
//! ----------------
//! - `greens::stacking` reads lag-indexed responses through
//!   [`EpochValueSource`].
//! - `epochal::transform` wraps a store to filter output rows by site.
//! - `epochal::slip` converts between incremental and cumulative slip
//!   stores.
//!
//! Testing notes
//! -------------
//! - Unit tests cover strict lookup, shape enforcement, ordered epoch
//!   listing, and an exact save/open round trip through a temp file.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::epochal::errors::{EpochError, EpochResult};

/// Typed metadata value stored in the info side channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    Scalar(f64),
    Text(String),
    Array(Vec<f64>),
    TextList(Vec<String>),
}

/// Read access to epoch-keyed array values.
///
/// Implemented by [`EpochalStore`] and by output transforms that
/// post-process store values (see `epochal::transform`). Consumers such as
/// the convolution stacker are written against this trait so that filtered
/// and unfiltered data sources are interchangeable.
pub trait EpochValueSource {
    /// Value at `epoch`, or [`EpochError::MissingEpoch`] if absent.
    fn value_at(&self, epoch: i64) -> EpochResult<Array2<f64>>;
}

#[derive(Serialize, Deserialize)]
struct StoredArray {
    shape: (usize, usize),
    data: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    epochs: BTreeMap<i64, StoredArray>,
    info: BTreeMap<String, InfoValue>,
}

/// Epoch-keyed array store with a named metadata side channel.
#[derive(Debug, Clone, Default)]
pub struct EpochalStore {
    path: Option<PathBuf>,
    values: BTreeMap<i64, Array2<f64>>,
    info: BTreeMap<String, InfoValue>,
}

impl EpochalStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file written by [`EpochalStore::save`].
    ///
    /// Errors
    /// ------
    /// - `EpochError::Io` if the file cannot be read.
    /// - `EpochError::Serde` if the contents do not parse, or if a stored
    ///   array's data length does not match its recorded shape.
    pub fn open<P: AsRef<Path>>(path: P) -> EpochResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EpochError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: StoreFile = serde_json::from_str(&text).map_err(|e| EpochError::Serde {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

        let mut values = BTreeMap::new();
        for (epoch, stored) in file.epochs {
            let (rows, cols) = stored.shape;
            let arr = Array2::from_shape_vec((rows, cols), stored.data).map_err(|e| {
                EpochError::Serde {
                    path: path.display().to_string(),
                    detail: format!("epoch {epoch}: {e}"),
                }
            })?;
            values.insert(epoch, arr);
        }
        Ok(Self { path: Some(path.to_path_buf()), values, info: file.info })
    }

    /// Save the store to `path` as JSON.
    ///
    /// The write is atomic: content goes to a sibling temporary file that is
    /// renamed into place, so a concurrent reader (or a crashed writer)
    /// never observes a partially written store.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> EpochResult<()> {
        let path = path.as_ref();
        let file = StoreFile {
            epochs: self
                .values
                .iter()
                .map(|(&epoch, arr)| {
                    (epoch, StoredArray { shape: arr.dim(), data: arr.iter().cloned().collect() })
                })
                .collect(),
            info: self.info.clone(),
        };
        let text = serde_json::to_string(&file).map_err(|e| EpochError::Serde {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        let tmp = path.with_extension("tmp");
        let io_err = |source| EpochError::Io { path: path.display().to_string(), source };
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Store name used in error messages (file path or `"<memory>"`).
    pub fn label(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    /// Stored epochs in strictly increasing order.
    pub fn epochs(&self) -> Vec<i64> {
        self.values.keys().cloned().collect()
    }

    /// Number of stored epochs.
    pub fn num_epochs(&self) -> usize {
        self.values.len()
    }

    /// Shape shared by all epoch values, if any value has been inserted.
    pub fn value_shape(&self) -> Option<(usize, usize)> {
        self.values.values().next().map(|arr| arr.dim())
    }

    /// Insert (or overwrite) the value at `epoch`.
    ///
    /// Errors
    /// ------
    /// - `EpochError::ShapeMismatch` if the store already holds values of a
    ///   different shape.
    pub fn set_epoch_value(&mut self, epoch: i64, value: Array2<f64>) -> EpochResult<()> {
        if let Some(expected) = self.value_shape() {
            if value.dim() != expected {
                return Err(EpochError::ShapeMismatch { epoch, expected, actual: value.dim() });
            }
        }
        self.values.insert(epoch, value);
        Ok(())
    }

    /// Value at `epoch`.
    ///
    /// Errors
    /// ------
    /// - `EpochError::MissingEpoch` if the epoch is absent. Missing epochs
    ///   are never treated as zero arrays.
    pub fn get_epoch_value(&self, epoch: i64) -> EpochResult<Array2<f64>> {
        self.values
            .get(&epoch)
            .cloned()
            .ok_or_else(|| EpochError::MissingEpoch { epoch, store: self.label() })
    }

    /// Whether an info entry named `name` exists.
    pub fn has_info(&self, name: &str) -> bool {
        self.info.contains_key(name)
    }

    /// Info entry named `name`.
    pub fn get_info(&self, name: &str) -> EpochResult<&InfoValue> {
        self.info
            .get(name)
            .ok_or_else(|| EpochError::MissingInfo { name: name.to_string(), store: self.label() })
    }

    /// Insert (or overwrite) an info entry.
    pub fn set_info(&mut self, name: &str, value: InfoValue) {
        self.info.insert(name.to_string(), value);
    }

    /// All info entries as `(name, value)` pairs, in name order.
    pub fn info_entries(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.info.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The `sites` info entry as a list of site names.
    ///
    /// Errors
    /// ------
    /// - `EpochError::NoSiteList` if the entry is absent or not a text list.
    pub fn sites(&self) -> EpochResult<&[String]> {
        match self.info.get("sites") {
            Some(InfoValue::TextList(sites)) => Ok(sites),
            _ => Err(EpochError::NoSiteList { store: self.label() }),
        }
    }
}

impl EpochValueSource for EpochalStore {
    fn value_at(&self, epoch: i64) -> EpochResult<Array2<f64>> {
        self.get_epoch_value(epoch)
    }
}

/// Validate that an epoch sequence is non-empty and strictly increasing.
///
/// Every time discretization in the engine flows through this check before
/// any matrix assembly, so ordering violations fail at input-assembly time.
pub fn validate_epochs(epochs: &[i64]) -> EpochResult<()> {
    if epochs.is_empty() {
        return Err(EpochError::EmptyEpochs);
    }
    for (index, pair) in epochs.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(EpochError::EpochsNotIncreasing {
                index: index + 1,
                prev: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}
