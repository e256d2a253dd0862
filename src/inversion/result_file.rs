//! inversion::result_file — the per-solve JSON artifact.
//!
//! Purpose
//! -------
//! Persist one solved inversion as a self-describing JSON file: the
//! parameter vector, the basis-projected slip, the regularization values
//! that produced it, the epoch list, and the two trade-off diagnostics.
//! The sweep driver writes one of these per grid point and reads them back
//! for checkpointing, so the file is both an output and a resumable unit
//! of work.
//!
//! Key behaviors
//! -------------
//! - Writes are atomic (temp file + rename); a crashed worker never leaves
//!   a partially written artifact, and a rerun either sees a complete file
//!   or none.
//! - `f64` values round-trip exactly through JSON: serde_json emits the
//!   shortest representation that parses back to the identical bits.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::inversion::errors::{InvResult, InversionError};

/// One solved grid point, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InversionResult {
    /// Solved parameter vector `m`.
    pub params: Vec<f64>,
    /// Basis-projected slip `B m`, stacked over epochs.
    pub basis_slip: Vec<f64>,
    /// Spatial roughening strength of this grid point.
    pub reg_rough: f64,
    /// Temporal first-difference weight (fixed across the sweep).
    pub reg_temp: f64,
    /// Edge-epoch damping weight (fixed across the sweep).
    pub reg_edge: f64,
    /// Observation epochs, days since the mainshock.
    pub epochs: Vec<i64>,
    /// Weighted misfit norm `||W (G B m - d)||`.
    pub misfit_norm: f64,
    /// Squared roughness norm `||L B m||^2`.
    pub roughness_norm: f64,
}

impl InversionResult {
    /// Load an artifact written by [`InversionResult::save`].
    ///
    /// Errors
    /// ------
    /// - `InversionError::Artifact` if the file cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> InvResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| InversionError::Artifact {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| InversionError::Artifact {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    /// Save the artifact to `path` as JSON, atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> InvResult<()> {
        let path = path.as_ref();
        let artifact_err = |detail: String| InversionError::Artifact {
            path: path.display().to_string(),
            detail,
        };
        let text = serde_json::to_string(self).map_err(|e| artifact_err(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, text).map_err(|e| artifact_err(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| artifact_err(e.to_string()))?;
        Ok(())
    }
}
