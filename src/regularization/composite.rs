//! regularization::composite — row-stacked penalty composition.
//!
//! Purpose
//! -------
//! Combine independent penalty terms into one roughening matrix `L` by
//! stacking their rows (never by elementwise addition), so that
//! `||L m||^2` decomposes exactly into the sum of the individual penalty
//! norms, each controlled by its own scalar weight. Also appends the
//! zero-penalty column block for nonlinear parameters (log-viscosity,
//! log-depth, rake corrections) tacked onto the slip parameter vector;
//! those columns are excluded from roughening entirely.
//!
//! Downstream usage
//! ----------------
//! - `temporal_edge_roughening` is the standard composition the Occam sweep
//!   rebuilds at every grid point: `reg_rough`-scaled spatial stencils
//!   replicated per epoch, stacked over the temporal block.
use sprs::{hstack, vstack, CsMat};

use crate::regularization::errors::{RegError, RegResult};
use crate::regularization::roughening::Roughening;
use crate::regularization::temporal::TemporalRegularization;
use crate::sparse::block_diagonal;

/// Row-stacked composition of penalty blocks over one parameter space.
#[derive(Debug, Clone)]
pub struct Composite {
    num_cols: usize,
    blocks: Vec<CsMat<f64>>,
}

impl Composite {
    /// An empty composite penalizing a `num_cols`-dimensional parameter
    /// vector.
    pub fn new(num_cols: usize) -> Self {
        Self { num_cols, blocks: Vec::new() }
    }

    /// Append a penalty block.
    ///
    /// Errors
    /// ------
    /// - `RegError::BlockColumnMismatch` if the block's column count does
    ///   not match the composite's parameter count.
    pub fn push(&mut self, block: CsMat<f64>) -> RegResult<()> {
        if block.cols() != self.num_cols {
            return Err(RegError::BlockColumnMismatch {
                expected: self.num_cols,
                actual: block.cols(),
            });
        }
        self.blocks.push(block);
        Ok(())
    }

    /// The stacked penalty matrix. With no blocks, a 0-row matrix (the
    /// no-op penalty).
    pub fn stacked(&self) -> CsMat<f64> {
        if self.blocks.is_empty() {
            return CsMat::zero((0, self.num_cols));
        }
        let views: Vec<_> = self.blocks.iter().map(|b| b.view()).collect();
        vstack(&views)
    }
}

/// Append `num_nonlinear` zero-penalty columns to a penalty matrix, for
/// nonlinear parameters appended to the slip parameter vector.
pub fn with_nonlinear_params(l: &CsMat<f64>, num_nonlinear: usize) -> CsMat<f64> {
    if num_nonlinear == 0 {
        return l.clone();
    }
    let zeros = CsMat::zero((l.rows(), num_nonlinear));
    hstack(&[l.view(), zeros.view()])
}

/// The standard spatio-temporal roughening of the Occam sweep.
///
/// Stacks, as rows over the epoch-major stacked slip vector:
/// - the spatial stencils of `roughening`, scaled by `reg_rough` and
///   replicated block-diagonally across `num_epochs` epochs, and
/// - the temporal first-difference/edge block built from `reg_temp` and
///   `reg_edge`,
///
/// then appends `num_nonlinear` zero-penalty columns.
///
/// Errors
/// ------
/// - `RegError::InvalidWeight` for a negative or non-finite `reg_rough`.
/// - Propagates temporal-block construction errors.
pub fn temporal_edge_roughening(
    roughening: &Roughening, num_epochs: usize, reg_rough: f64, reg_temp: f64, reg_edge: f64,
    num_nonlinear: usize,
) -> RegResult<CsMat<f64>> {
    if !reg_rough.is_finite() || reg_rough < 0.0 {
        return Err(RegError::InvalidWeight { name: "reg_rough", value: reg_rough });
    }
    let num_cells = roughening.num_cells();
    let spatial =
        block_diagonal(&roughening.matrix().map(|&v| v * reg_rough), num_epochs);
    let temporal =
        TemporalRegularization::new(num_epochs, num_cells, reg_temp, reg_edge)?.matrix();

    let mut composite = Composite::new(num_epochs * num_cells);
    composite.push(spatial)?;
    composite.push(temporal)?;
    Ok(with_nonlinear_params(&composite.stacked(), num_nonlinear))
}
