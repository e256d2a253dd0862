//! regularization::temporal — temporal roughening with edge damping.
//!
//! Purpose
//! -------
//! Penalize epoch-to-epoch change of each slip parameter. For a stacked
//! parameter vector laid out epoch-major (all parameters of epoch 0, then
//! epoch 1, ...), emit one first-difference row per parameter per adjacent
//! epoch pair, scaled by `reg_temp`, plus one single-sample row per
//! parameter at the first and last epochs scaled by `reg_edge`. The edge
//! rows keep the boundary time samples from drifting without letting the
//! first-difference weight over-penalize them.
use sprs::{CsMat, TriMat};

use crate::regularization::errors::{RegError, RegResult};

/// Temporal first-difference roughening with separate edge weights.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalRegularization {
    num_epochs: usize,
    params_per_epoch: usize,
    reg_temp: f64,
    reg_edge: f64,
}

impl TemporalRegularization {
    /// Build temporal roughening for `num_epochs` epochs of
    /// `params_per_epoch` parameters each.
    ///
    /// Errors
    /// ------
    /// - `RegError::TooFewEpochs` for fewer than two epochs.
    /// - `RegError::NoParams` for a zero per-epoch parameter count.
    /// - `RegError::InvalidWeight` for negative or non-finite weights.
    pub fn new(
        num_epochs: usize, params_per_epoch: usize, reg_temp: f64, reg_edge: f64,
    ) -> RegResult<Self> {
        if num_epochs < 2 {
            return Err(RegError::TooFewEpochs { num_epochs });
        }
        if params_per_epoch == 0 {
            return Err(RegError::NoParams);
        }
        for (name, value) in [("reg_temp", reg_temp), ("reg_edge", reg_edge)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RegError::InvalidWeight { name, value });
            }
        }
        Ok(Self { num_epochs, params_per_epoch, reg_temp, reg_edge })
    }

    /// Number of penalized parameters (matrix columns).
    pub fn num_params(&self) -> usize {
        self.num_epochs * self.params_per_epoch
    }

    /// The sparse temporal penalty matrix, shape
    /// `((num_epochs - 1 + 2) * params_per_epoch, num_params)`.
    pub fn matrix(&self) -> CsMat<f64> {
        let p = self.params_per_epoch;
        let diff_rows = (self.num_epochs - 1) * p;
        let mut tri = TriMat::with_capacity((diff_rows + 2 * p, self.num_params()), 0);

        let mut row = 0;
        for k in 0..self.num_epochs - 1 {
            for j in 0..p {
                tri.add_triplet(row, k * p + j, -self.reg_temp);
                tri.add_triplet(row, (k + 1) * p + j, self.reg_temp);
                row += 1;
            }
        }
        for j in 0..p {
            tri.add_triplet(row, j, self.reg_edge);
            row += 1;
        }
        let last = (self.num_epochs - 1) * p;
        for j in 0..p {
            tri.add_triplet(row, last + j, self.reg_edge);
            row += 1;
        }

        tri.to_csr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Matrix shape and the placement of difference vs edge rows.
    // - Zero penalty for a time-constant slip history when reg_edge == 0.
    // - Validation failures.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // For 3 epochs x 2 parameters: 2*2 difference rows plus 2*2 edge rows.
    fn shape_and_row_layout() {
        let temporal = TemporalRegularization::new(3, 2, 0.5, 0.25).unwrap();
        let l = temporal.matrix().to_dense();
        assert_eq!(l.dim(), (8, 6));

        // First difference row: parameter 0 between epochs 0 and 1.
        assert_eq!(l[[0, 0]], -0.5);
        assert_eq!(l[[0, 2]], 0.5);
        // First edge row: parameter 0 at epoch 0.
        assert_eq!(l[[4, 0]], 0.25);
        // Last edge row: parameter 1 at epoch 2.
        assert_eq!(l[[7, 5]], 0.25);
    }

    #[test]
    // Purpose
    // -------
    // With reg_edge == 0, a slip history constant in time incurs zero
    // temporal penalty; a time-varying one does not.
    fn constant_history_is_not_penalized() {
        let temporal = TemporalRegularization::new(4, 3, 1.0, 0.0).unwrap();
        let l = temporal.matrix().to_dense();

        let constant = Array1::from_shape_fn(12, |k| (k % 3) as f64 + 1.0);
        assert!(l.dot(&constant).iter().all(|&v| v == 0.0));

        let varying = Array1::from_shape_fn(12, |k| (k / 3) as f64);
        assert!(l.dot(&varying).iter().any(|&v| v != 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Construction rejects single-epoch sequences, empty parameter blocks,
    // and negative weights.
    fn construction_validation() {
        assert!(matches!(
            TemporalRegularization::new(1, 3, 0.1, 0.1).unwrap_err(),
            RegError::TooFewEpochs { num_epochs: 1 }
        ));
        assert!(matches!(
            TemporalRegularization::new(3, 0, 0.1, 0.1).unwrap_err(),
            RegError::NoParams
        ));
        assert!(matches!(
            TemporalRegularization::new(3, 2, -0.1, 0.1).unwrap_err(),
            RegError::InvalidWeight { name: "reg_temp", .. }
        ));
    }
}
