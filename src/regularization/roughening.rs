//! regularization::roughening — spatial second-difference roughening.
//!
//! Purpose
//! -------
//! Penalize spatial roughness of the slip field over the (rows x cols)
//! subfault mesh. Each penalty row is a 1-D second-difference stencil
//! `[1, -2, 1]` along one mesh direction, scaled by the reciprocal squared
//! normalization length of that direction, so that `||L_s m||^2` sums the
//! squared discrete second derivatives of the slip field in physical units.
//!
//! Key behaviors
//! -------------
//! - Row-direction (along dip) stencils exist for every cell with both
//!   vertical neighbors; column-direction (along strike) stencils for every
//!   cell with both horizontal neighbors. Boundary cells simply contribute
//!   fewer stencils; no one-sided differences are fabricated.
//! - Cell indexing is row-major (`i * cols + j`), matching the basis
//!   matrix's flattened slip meshes.
//!
//! Downstream usage
//! ----------------
//! - `regularization::composite` scales this block by `reg_rough`,
//!   replicates it per epoch, and stacks it with the temporal block.
use sprs::{CsMat, TriMat};

use crate::regularization::errors::{RegError, RegResult};

/// Spatial second-difference roughening over a subfault mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Roughening {
    rows: usize,
    cols: usize,
    row_norm_length: f64,
    col_norm_length: f64,
}

impl Roughening {
    /// Build a roughening stencil set for a (rows x cols) mesh with
    /// physical normalization lengths along each direction.
    ///
    /// Errors
    /// ------
    /// - `RegError::EmptyMesh` for a zero-dimension mesh.
    /// - `RegError::InvalidNormLength` for non-positive or non-finite
    ///   normalization lengths.
    pub fn new(
        rows: usize, cols: usize, row_norm_length: f64, col_norm_length: f64,
    ) -> RegResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(RegError::EmptyMesh { rows, cols });
        }
        for (direction, value) in [("row", row_norm_length), ("col", col_norm_length)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RegError::InvalidNormLength { direction, value });
            }
        }
        Ok(Self { rows, cols, row_norm_length, col_norm_length })
    }

    /// Number of mesh cells (stencil matrix columns).
    pub fn num_cells(&self) -> usize {
        self.rows * self.cols
    }

    fn cell(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    /// The sparse stencil matrix, shape
    /// `(num_row_stencils + num_col_stencils, num_cells)`.
    pub fn matrix(&self) -> CsMat<f64> {
        let row_stencils = self.rows.saturating_sub(2) * self.cols;
        let col_stencils = self.rows * self.cols.saturating_sub(2);
        let mut tri =
            TriMat::with_capacity((row_stencils + col_stencils, self.num_cells()), 0);

        let mut penalty_row = 0;
        let row_scale = 1.0 / (self.row_norm_length * self.row_norm_length);
        for i in 1..self.rows.saturating_sub(1) {
            for j in 0..self.cols {
                tri.add_triplet(penalty_row, self.cell(i - 1, j), row_scale);
                tri.add_triplet(penalty_row, self.cell(i, j), -2.0 * row_scale);
                tri.add_triplet(penalty_row, self.cell(i + 1, j), row_scale);
                penalty_row += 1;
            }
        }

        let col_scale = 1.0 / (self.col_norm_length * self.col_norm_length);
        for i in 0..self.rows {
            for j in 1..self.cols.saturating_sub(1) {
                tri.add_triplet(penalty_row, self.cell(i, j - 1), col_scale);
                tri.add_triplet(penalty_row, self.cell(i, j), -2.0 * col_scale);
                tri.add_triplet(penalty_row, self.cell(i, j + 1), col_scale);
                penalty_row += 1;
            }
        }

        tri.to_csr()
    }
}
