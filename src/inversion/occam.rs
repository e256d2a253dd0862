//! inversion::occam — the regularization-strength sweep.
//!
//! Purpose
//! -------
//! Run one constrained solve per spatial roughening strength over a fixed
//! temporal/edge weighting, persist each solve as a JSON artifact, and
//! return the `(reg_rough, misfit, roughness)` trade-off table for L-curve
//! corner picking. The engine's contract ends at the table; which point is
//! "the corner" is the caller's judgment.
//!
//! Key behaviors
//! -------------
//! - Grid points are independent and run in parallel (rayon). The returned
//!   table is always in grid order regardless of completion order.
//! - Checkpointing: when enabled, a grid point whose artifact already
//!   exists is not re-solved; its table row is read back from the file.
//!   Rerunning a completed sweep performs no solves and yields an
//!   identical table.
//! - A failed grid point (singular subsystem, solver non-convergence,
//!   artifact I/O) is logged at `warn` with its roughening value and
//!   skipped; the sweep continues. The table then simply lacks that row.
//!
//! Conventions
//! -----------
//! - Artifact files are named `nrough_{index:02}.json` under the output
//!   directory, indexed by grid position.
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::inversion::errors::{InvResult, InversionError};
use crate::inversion::formulation::InversionOperands;
use crate::inversion::least_squares::LeastSquares;
use crate::inversion::qp::QpOptions;
use crate::inversion::result_file::InversionResult;
use crate::regularization::{temporal_edge_roughening, Roughening};

/// The swept roughening strengths and the fixed temporal weights.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizationGrid {
    pub reg_roughs: Vec<f64>,
    pub reg_temp: f64,
    pub reg_edge: f64,
}

impl RegularizationGrid {
    /// A log-spaced grid of `num` roughening strengths from `10^lo_exp` to
    /// `10^hi_exp` inclusive.
    pub fn logspace(lo_exp: f64, hi_exp: f64, num: usize, reg_temp: f64, reg_edge: f64) -> Self {
        let reg_roughs = if num <= 1 {
            vec![10f64.powf(lo_exp)]
        } else {
            let step = (hi_exp - lo_exp) / (num - 1) as f64;
            (0..num).map(|k| 10f64.powf(lo_exp + step * k as f64)).collect()
        };
        Self { reg_roughs, reg_temp, reg_edge }
    }
}

/// One row of the trade-off table.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOffPoint {
    pub reg_rough: f64,
    /// Weighted misfit norm `||W (G B m - d)||`.
    pub misfit_norm: f64,
    /// Squared roughness norm `||L B m||^2`.
    pub roughness_norm: f64,
}

/// The sweep driver: shared operands plus per-sweep policy.
pub struct OccamSearch {
    operands: InversionOperands,
    roughening: Roughening,
    epochs: Vec<i64>,
    num_nonlinear: usize,
    out_dir: PathBuf,
    checkpoint: bool,
    qp_options: QpOptions,
}

impl OccamSearch {
    /// Assemble a sweep over already-validated operands.
    ///
    /// `operands` carries `G`, `d`, `W`, and `B`; the roughening matrix it
    /// holds is replaced per grid point. `roughening` describes the spatial
    /// stencils of one epoch; `epochs` is the observation epoch list (its
    /// length sets the temporal block).
    pub fn new(
        operands: InversionOperands, roughening: Roughening, epochs: Vec<i64>,
        num_nonlinear: usize, out_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            operands,
            roughening,
            epochs,
            num_nonlinear,
            out_dir: out_dir.as_ref().to_path_buf(),
            checkpoint: true,
            qp_options: QpOptions::default(),
        }
    }

    /// Disable (or re-enable) artifact-based checkpointing. With
    /// checkpointing off, every grid point is re-solved and its artifact
    /// deterministically overwritten.
    pub fn checkpoint(mut self, enabled: bool) -> Self {
        self.checkpoint = enabled;
        self
    }

    pub fn with_qp_options(mut self, qp_options: QpOptions) -> Self {
        self.qp_options = qp_options;
        self
    }

    /// Artifact path of grid point `index`.
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.out_dir.join(format!("nrough_{index:02}.json"))
    }

    /// Run the sweep, returning the trade-off table in grid order.
    ///
    /// Failed grid points are logged and omitted from the table; only a
    /// missing output directory aborts the whole sweep.
    pub fn run(&self, grid: &RegularizationGrid) -> InvResult<Vec<TradeOffPoint>> {
        if !self.out_dir.is_dir() {
            return Err(InversionError::Artifact {
                path: self.out_dir.display().to_string(),
                detail: "output directory does not exist".to_string(),
            });
        }
        info!(
            "regularization sweep: {} grid points, reg_temp = {}, reg_edge = {}",
            grid.reg_roughs.len(),
            grid.reg_temp,
            grid.reg_edge
        );

        let points: Vec<Option<TradeOffPoint>> = grid
            .reg_roughs
            .par_iter()
            .enumerate()
            .map(|(index, &reg_rough)| {
                match self.solve_point(index, reg_rough, grid.reg_temp, grid.reg_edge) {
                    Ok(point) => Some(point),
                    Err(e) => {
                        warn!("grid point {index} skipped: {}", e.with_reg_rough(reg_rough));
                        None
                    }
                }
            })
            .collect();
        Ok(points.into_iter().flatten().collect())
    }

    fn solve_point(
        &self, index: usize, reg_rough: f64, reg_temp: f64, reg_edge: f64,
    ) -> InvResult<TradeOffPoint> {
        let path = self.artifact_path(index);
        if self.checkpoint && path.exists() {
            let existing = InversionResult::open(&path)?;
            debug!("grid point {index} already solved, reusing {}", path.display());
            return Ok(TradeOffPoint {
                reg_rough: existing.reg_rough,
                misfit_norm: existing.misfit_norm,
                roughness_norm: existing.roughness_norm,
            });
        }

        let l = temporal_edge_roughening(
            &self.roughening,
            self.epochs.len(),
            reg_rough,
            reg_temp,
            reg_edge,
            self.num_nonlinear,
        )?;
        let operands = self.operands.with_regularization(l)?;
        let solver = LeastSquares::with_qp_options(operands, self.qp_options);
        let solution = solver.invert(true)?;

        let misfit_norm = solution.residual_norm_weighted();
        let roughness_norm = solution.solution_norm();
        InversionResult {
            params: solution.params().to_vec(),
            basis_slip: solution.basis_slip().to_vec(),
            reg_rough,
            reg_temp,
            reg_edge,
            epochs: self.epochs.clone(),
            misfit_norm,
            roughness_norm,
        }
        .save(&path)?;

        Ok(TradeOffPoint { reg_rough, misfit_norm, roughness_norm })
    }
}
