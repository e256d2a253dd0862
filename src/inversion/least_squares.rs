//! inversion::least_squares — the constrained least-squares solve.
//!
//! Purpose
//! -------
//! Solve `min ||W (G B m - d)||^2 + ||L B m||^2`, optionally subject to
//! `m >= 0`, over a validated [`InversionOperands`] set. The non-negative
//! branch goes through the QP backend; the unconstrained branch solves the
//! normal equations directly (both branches share the same `(P, q)`
//! formulation, so they cannot drift apart).
//!
//! Key behaviors
//! -------------
//! - A constrained solve that terminates non-optimal is a
//!   [`crate::inversion::errors::InversionError::SolverFailure`]; callers
//!   never receive a silently wrong vector.
//! - The returned [`Solution`] is immutable and borrows the operands; its
//!   diagnostic accessors (basis slip, residual norms, roughness norm) are
//!   recomputed from the stored parameter vector on every call, so they can
//!   never desynchronize from `m`.
//!
//! Conventions
//! -----------
//! - All norms are Euclidean. The weighted residual re-applies `W`
//!   explicitly, so an identity `W` makes `residual_norm` and
//!   `residual_norm_weighted` agree (regression invariant).
//! - `solution_norm` is the *squared* penalty norm `||L B m||^2`, matching
//!   the roughness axis of the L-curve.
use log::debug;

use ndarray::Array1;

use crate::inversion::errors::{InvResult, InversionError};
use crate::inversion::formulation::InversionOperands;
use crate::inversion::qp::{solve_nonnegative, solve_unconstrained, QpOptions, QpStatus};
use crate::sparse::mul_vec;

/// The regularized, weighted least-squares solver.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    operands: InversionOperands,
    qp_options: QpOptions,
}

impl LeastSquares {
    pub fn new(operands: InversionOperands) -> Self {
        Self { operands, qp_options: QpOptions::default() }
    }

    pub fn with_qp_options(operands: InversionOperands, qp_options: QpOptions) -> Self {
        Self { operands, qp_options }
    }

    pub fn operands(&self) -> &InversionOperands {
        &self.operands
    }

    /// Solve for `m`, constrained to `m >= 0` when `nonnegative` is true.
    ///
    /// Errors
    /// ------
    /// - `InversionError::SingularNormalMatrix` if the normal matrix (or an
    ///   active-set subsystem) admits no Cholesky factor.
    /// - `InversionError::SolverFailure` if the constrained solver stops
    ///   without reaching optimality.
    pub fn invert(&self, nonnegative: bool) -> InvResult<Solution<'_>> {
        let problem = self.operands.formulate()?;
        let m = if nonnegative {
            let solution = solve_nonnegative(&problem, &self.qp_options)?;
            if solution.status != QpStatus::Optimal {
                return Err(InversionError::SolverFailure {
                    status: solution.status.to_string(),
                    reg_rough: None,
                });
            }
            debug!(
                "constrained solve converged in {} iterations over {} parameters",
                solution.iterations,
                self.operands.num_params()
            );
            solution.x
        } else {
            solve_unconstrained(&problem)?
        };
        Ok(Solution { operands: &self.operands, m, nonnegative })
    }
}

/// An immutable solved inversion.
///
/// All diagnostics are derived, read-only quantities recomputed from the
/// stored parameter vector.
#[derive(Debug, Clone)]
pub struct Solution<'a> {
    operands: &'a InversionOperands,
    m: Array1<f64>,
    nonnegative: bool,
}

impl Solution<'_> {
    /// The solved parameter vector `m`.
    pub fn params(&self) -> &Array1<f64> {
        &self.m
    }

    /// Whether the non-negativity constraint was active in the solve.
    pub fn nonnegative(&self) -> bool {
        self.nonnegative
    }

    /// Basis-space slip `B m` (per-subfault, stacked over epochs).
    pub fn basis_slip(&self) -> Array1<f64> {
        mul_vec(self.operands.b(), &self.m)
    }

    /// Predicted observations `G B m`.
    pub fn predict(&self) -> Array1<f64> {
        self.operands.g().dot(&self.basis_slip())
    }

    /// Unweighted residual norm `||G B m - d||`.
    pub fn residual_norm(&self) -> f64 {
        let residual = self.predict() - self.operands.d();
        residual.dot(&residual).sqrt()
    }

    /// Weighted residual norm `||W (G B m - d)||`.
    pub fn residual_norm_weighted(&self) -> f64 {
        let residual = self.predict() - self.operands.d();
        let weighted = mul_vec(self.operands.w(), &residual);
        weighted.dot(&weighted).sqrt()
    }

    /// Squared penalty norm `||L B m||^2` (the roughness diagnostic).
    pub fn solution_norm(&self) -> f64 {
        let penalized = mul_vec(self.operands.l(), &self.basis_slip());
        penalized.dot(&penalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use sprs::{CsMat, TriMat};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The known-solution end-to-end case: G m_true = d with
    //   m_true = [1, 0], recovered by both solve branches.
    // - Exact non-negativity of the constrained solution.
    // - Agreement of constrained and unconstrained solves on the
    //   non-negative support when W = I and L = 0.
    // - The weighted-residual identity under identity W.
    // - Non-identity W changing the weighted residual only.
    //
    // They intentionally DO NOT cover the sweep driver (inversion::occam).
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-8;

    fn known_system() -> (Array2<f64>, Array1<f64>) {
        // d = G [1, 0]' exactly, so the true non-negative solution is known.
        let g = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, -1.0]];
        let m_true = array![1.0, 0.0];
        let d = g.dot(&m_true);
        (g, d)
    }

    #[test]
    // Purpose
    // -------
    // With W = I and L = 0 and consistent data, both branches recover the
    // analytically known solution, and the constrained branch is exactly
    // non-negative.
    //
    // Given
    // -----
    // - The 4x2 known system with m_true = [1, 0].
    //
    // Expect
    // ------
    // - Constrained and unconstrained m within solver tolerance of m_true.
    // - Constrained m >= 0 elementwise exactly.
    fn recovers_known_solution() {
        // Arrange
        let (g, d) = known_system();
        let operands = InversionOperands::new(g, d, None, None, None).unwrap();
        let solver = LeastSquares::new(operands);

        // Act
        let constrained = solver.invert(true).unwrap();
        let unconstrained = solver.invert(false).unwrap();

        // Assert
        for (solution, label) in [(&constrained, "constrained"), (&unconstrained, "free")] {
            assert!((solution.params()[0] - 1.0).abs() < TOL, "{label}");
            assert!(solution.params()[1].abs() < TOL, "{label}");
        }
        assert!(constrained.params().iter().all(|&v| v >= 0.0));
        assert!(constrained.residual_norm() < TOL);
    }

    #[test]
    // Purpose
    // -------
    // The unconstrained branch matches a directly computed normal-equations
    // solution for inconsistent (noisy) data.
    fn unconstrained_matches_normal_equations() {
        let g = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, -1.0]];
        let d = array![1.1, -0.2, 0.9, 2.3];
        let operands = InversionOperands::new(g.clone(), d.clone(), None, None, None).unwrap();

        let solver = LeastSquares::new(operands);
        let solution = solver.invert(false).unwrap();

        // Direct solve of (G'G) m = G'd via 2x2 inverse.
        let gtg = g.t().dot(&g);
        let gtd = g.t().dot(&d);
        let det = gtg[[0, 0]] * gtg[[1, 1]] - gtg[[0, 1]] * gtg[[1, 0]];
        let m0 = (gtg[[1, 1]] * gtd[0] - gtg[[0, 1]] * gtd[1]) / det;
        let m1 = (gtg[[0, 0]] * gtd[1] - gtg[[1, 0]] * gtd[0]) / det;
        assert!((solution.params()[0] - m0).abs() < TOL);
        assert!((solution.params()[1] - m1).abs() < TOL);
    }

    #[test]
    // Purpose
    // -------
    // With identity W, weighted and unweighted residual norms agree; a
    // non-identity W changes only the weighted one.
    //
    // Given
    // -----
    // - The known system with perturbed data so the residual is nonzero.
    //
    // Expect
    // ------
    // - residual_norm == residual_norm_weighted under identity W.
    // - Under W = 2 I, the weighted norm is twice the unweighted norm.
    fn weighted_residual_identity() {
        // Arrange
        let (g, mut d) = known_system();
        d[0] += 0.5;

        let identity = InversionOperands::new(g.clone(), d.clone(), None, None, None).unwrap();
        let solver = LeastSquares::new(identity);
        let solution = solver.invert(true).unwrap();
        assert!(
            (solution.residual_norm() - solution.residual_norm_weighted()).abs() < 1e-12,
            "identity W must make the two residual norms equal"
        );

        let mut tri = TriMat::new((4, 4));
        for i in 0..4 {
            tri.add_triplet(i, i, 2.0);
        }
        let w: CsMat<f64> = tri.to_csr();
        let weighted = InversionOperands::new(g, d, Some(w), None, None).unwrap();
        let solver_w = LeastSquares::new(weighted);
        let solution_w = solver_w.invert(true).unwrap();
        assert!(
            (solution_w.residual_norm_weighted() - 2.0 * solution_w.residual_norm()).abs()
                < 1e-10
        );
    }

    #[test]
    // Purpose
    // -------
    // When the unconstrained optimum has a negative coordinate, the
    // constrained solve zeroes it and re-fits the rest: the constrained
    // solution equals the unconstrained solution of the reduced system on
    // its non-negative support.
    fn constrained_matches_reduced_unconstrained() {
        // Column 1 wants a negative weight for this data.
        let g = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let d = array![2.0, -1.0, 1.0];
        let operands = InversionOperands::new(g.clone(), d.clone(), None, None, None).unwrap();

        let solver = LeastSquares::new(operands);
        let constrained = solver.invert(true).unwrap();
        assert_eq!(constrained.params()[1], 0.0);

        // Reduced problem over column 0 alone: m0 = (g0'd)/(g0'g0).
        let g0 = g.column(0);
        let m0 = g0.dot(&d) / g0.dot(&g0);
        assert!((constrained.params()[0] - m0).abs() < TOL);
    }

    #[test]
    // Purpose
    // -------
    // Roughness accounting: with a nonzero L, solution_norm equals the
    // hand-computed ||L B m||^2.
    fn solution_norm_is_recomputed_from_m() {
        let (g, d) = known_system();
        let mut tri = TriMat::new((1, 2));
        tri.add_triplet(0, 0, 1.0);
        tri.add_triplet(0, 1, -1.0);
        let l: CsMat<f64> = tri.to_csr();
        let operands = InversionOperands::new(g, d, None, None, Some(l)).unwrap();

        let solver = LeastSquares::new(operands);
        let solution = solver.invert(true).unwrap();
        let m = solution.params();
        let want = (m[0] - m[1]) * (m[0] - m[1]);
        assert!((solution.solution_norm() - want).abs() < 1e-12);
    }
}
