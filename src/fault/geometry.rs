//! fault::geometry — subfault mesh description.
//!
//! Purpose
//! -------
//! Describe the rectangular subfault mesh the inversion parameterizes:
//! nominal subfault sizes along strike and dip, and the node coordinate
//! arrays bounding the subfault cells along each axis. The basis builder
//! reads spline spacings and node coordinates from here; the roughening
//! builder reads mesh dimensions and normalization lengths.
//!
//! Invariants & assumptions
//! ------------------------
//! - `xf` (along strike) and `yf` (along dip) each hold at least two node
//!   coordinates and are strictly increasing.
//! - A mesh of `xf.len() - 1` columns by `yf.len() - 1` rows of subfault
//!   cells; cell centers are the midpoints of adjacent nodes.
//! - Subfault sizes are strictly positive and finite.
//!
//! Conventions
//! -----------
//! - Subfault (and basis-node) linear indexing is row-major over
//!   (dip rows, strike columns), matching the flattened slip meshes
//!   produced by `basis::matrix`.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Result alias for fault-geometry operations.
pub type FaultResult<T> = Result<T, FaultError>;

/// Errors raised while loading or validating a fault geometry.
#[derive(Debug)]
pub enum FaultError {
    /// An axis has fewer than two node coordinates.
    TooFewNodes { axis: &'static str, len: usize },

    /// Node coordinates along an axis are not strictly increasing.
    NodesNotIncreasing { axis: &'static str, index: usize },

    /// A subfault size is non-positive or non-finite.
    InvalidSubfaultSize { axis: &'static str, value: f64 },

    /// Underlying file I/O failed.
    Io { path: String, source: std::io::Error },

    /// JSON deserialization of a geometry file failed.
    Serde { path: String, detail: String },
}

impl std::error::Error for FaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FaultError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for FaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultError::TooFewNodes { axis, len } => {
                write!(f, "axis '{axis}' needs at least 2 node coordinates, got {len}")
            }
            FaultError::NodesNotIncreasing { axis, index } => {
                write!(f, "axis '{axis}' node coordinates must be strictly increasing at index {index}")
            }
            FaultError::InvalidSubfaultSize { axis, value } => {
                write!(f, "subfault size along '{axis}' must be finite and > 0, got {value}")
            }
            FaultError::Io { path, source } => write!(f, "I/O failure on '{path}': {source}"),
            FaultError::Serde { path, detail } => {
                write!(f, "failed to parse geometry file '{path}': {detail}")
            }
        }
    }
}

/// Rectangular subfault mesh with nominal subfault sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultGeometry {
    /// Nominal subfault size along strike (also the spline spacing dx).
    pub subfault_size_strike: f64,
    /// Nominal subfault size along dip (also the spline spacing dy).
    pub subfault_size_dip: f64,
    /// Node coordinates along strike; `xf.len() - 1` subfault columns.
    pub xf: Vec<f64>,
    /// Node coordinates along dip; `yf.len() - 1` subfault rows.
    pub yf: Vec<f64>,
}

impl FaultGeometry {
    /// Construct and validate a geometry.
    pub fn new(
        subfault_size_strike: f64, subfault_size_dip: f64, xf: Vec<f64>, yf: Vec<f64>,
    ) -> FaultResult<Self> {
        let geometry = Self { subfault_size_strike, subfault_size_dip, xf, yf };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Load a geometry from a JSON file.
    pub fn open<P: AsRef<Path>>(path: P) -> FaultResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| FaultError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let geometry: FaultGeometry =
            serde_json::from_str(&text).map_err(|e| FaultError::Serde {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;
        geometry.validate()?;
        Ok(geometry)
    }

    fn validate(&self) -> FaultResult<()> {
        for (axis, nodes) in [("strike", &self.xf), ("dip", &self.yf)] {
            if nodes.len() < 2 {
                return Err(FaultError::TooFewNodes { axis, len: nodes.len() });
            }
            for (index, pair) in nodes.windows(2).enumerate() {
                if pair[1] <= pair[0] {
                    return Err(FaultError::NodesNotIncreasing { axis, index: index + 1 });
                }
            }
        }
        for (axis, value) in
            [("strike", self.subfault_size_strike), ("dip", self.subfault_size_dip)]
        {
            if !value.is_finite() || value <= 0.0 {
                return Err(FaultError::InvalidSubfaultSize { axis, value });
            }
        }
        Ok(())
    }

    /// Number of subfault columns (along strike).
    pub fn num_cols(&self) -> usize {
        self.xf.len() - 1
    }

    /// Number of subfault rows (along dip).
    pub fn num_rows(&self) -> usize {
        self.yf.len() - 1
    }

    /// Total number of subfault cells.
    pub fn num_subfaults(&self) -> usize {
        self.num_rows() * self.num_cols()
    }
}
