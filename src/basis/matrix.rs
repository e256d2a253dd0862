//! basis::matrix — assembly of the spatial basis matrix.
//!
//! Purpose
//! -------
//! Map a low-dimensional control-point vector to a full per-subfault slip
//! vector. Each control node (one per subfault cell) carries a smooth slip
//! mesh: the outer product of the 1-D cubic-B-spline sections along strike
//! and along dip. Flattening each mesh row-major gives one column of the
//! basis matrix, so the matrix has shape
//! `(num_subfaults, num_basis_params)`.
//!
//! Key behaviors
//! -------------
//! - `slip_mesh(m, n)` builds the dense (rows x cols) mesh of node (m, n).
//! - `dense()` assembles the full dense basis matrix; `sparse()` re-encodes
//!   the same dense result, so the two are numerically identical entry for
//!   entry (exact equality, not approximate).
//! - `sparse_for_epochs(k)` replicates the sparse basis block-diagonally
//!   for a k-epoch stacked parameter vector.
//!
//! Conventions
//! -----------
//! - Columns iterate dip-major: node (m, n) lands at column
//!   `n * num_cols + m`, matching the row-major flattening of the meshes
//!   and the subfault indexing in `fault::geometry`.
use ndarray::{Array1, Array2};
use sprs::{CsMat, TriMat};

use crate::basis::bsplines::CubicBSplines;
use crate::basis::errors::BasisResult;
use crate::fault::FaultGeometry;
use crate::sparse::block_diagonal;

/// Cubic-B-spline basis over a rectangular subfault mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisMatrix {
    strike: CubicBSplines,
    dip: CubicBSplines,
}

impl BasisMatrix {
    /// Build a basis from node coordinate arrays and spline spacings.
    pub fn new(
        dx_spline: f64, xf: Vec<f64>, dy_spline: f64, yf: Vec<f64>,
    ) -> BasisResult<Self> {
        Ok(Self {
            strike: CubicBSplines::new("strike", xf, dx_spline)?,
            dip: CubicBSplines::new("dip", yf, dy_spline)?,
        })
    }

    /// Build a basis from a fault geometry, using the subfault sizes as the
    /// spline spacings.
    pub fn from_geometry(geometry: &FaultGeometry) -> BasisResult<Self> {
        Self::new(
            geometry.subfault_size_strike,
            geometry.xf.clone(),
            geometry.subfault_size_dip,
            geometry.yf.clone(),
        )
    }

    /// Number of subfault cells (basis matrix rows).
    pub fn num_subfaults(&self) -> usize {
        self.strike.num_sections() * self.dip.num_sections()
    }

    /// Number of control nodes (basis matrix columns).
    pub fn num_params(&self) -> usize {
        self.num_subfaults()
    }

    /// Dense slip mesh of control node `(m, n)`: outer product of the dip
    /// section `n` and the strike section `m`, shape (dip rows, strike
    /// columns).
    pub fn slip_mesh(&self, m: usize, n: usize) -> BasisResult<Array2<f64>> {
        let xslip = self.strike.section_values(m)?;
        let yslip = self.dip.section_values(n)?;
        Ok(outer(&yslip, &xslip))
    }

    /// Dense basis matrix, shape `(num_subfaults, num_params)`.
    pub fn dense(&self) -> BasisResult<Array2<f64>> {
        let rows = self.num_subfaults();
        let cols = self.num_params();
        let num_strike = self.strike.num_sections();
        let mut basis = Array2::<f64>::zeros((rows, cols));
        for n in 0..self.dip.num_sections() {
            for m in 0..num_strike {
                let mesh = self.slip_mesh(m, n)?;
                let col = n * num_strike + m;
                for (row, &value) in mesh.iter().enumerate() {
                    basis[[row, col]] = value;
                }
            }
        }
        Ok(basis)
    }

    /// Sparse basis matrix, re-encoded from [`BasisMatrix::dense`].
    ///
    /// Every nonzero dense entry is carried over unchanged, so the sparse
    /// and dense variants are numerically identical.
    pub fn sparse(&self) -> BasisResult<CsMat<f64>> {
        let dense = self.dense()?;
        let mut tri = TriMat::new(dense.dim());
        for ((row, col), &value) in dense.indexed_iter() {
            if value != 0.0 {
                tri.add_triplet(row, col, value);
            }
        }
        Ok(tri.to_csr())
    }

    /// Sparse basis replicated block-diagonally across `num_epochs` epochs,
    /// shape `(num_subfaults * num_epochs, num_params * num_epochs)`.
    pub fn sparse_for_epochs(&self, num_epochs: usize) -> BasisResult<CsMat<f64>> {
        Ok(block_diagonal(&self.sparse()?, num_epochs))
    }
}

fn outer(column: &Array1<f64>, row: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((column.len(), row.len()), |(i, j)| column[i] * row[j])
}
