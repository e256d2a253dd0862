//! inversion::qp — convex quadratic-program backend.
//!
//! Purpose
//! -------
//! Solve the strictly convex quadratic programs produced by the
//! least-squares formulation: minimize `1/2 m' P m + q' m`, either
//! unconstrained or subject to element-wise non-negativity `m >= 0`. The
//! backend is deliberately black-box to its callers: they hand over
//! `(P, q)`, pick the constraint mode, and get back a primal vector plus a
//! status flag.
//!
//! Key behaviors
//! -------------
//! - Unconstrained: direct Cholesky solve of `P m = -q` (the normal
//!   equations). A failed factorization is a
//!   [`InversionError::SingularNormalMatrix`], never a garbage vector.
//! - Non-negative: active-set iteration in normal-equation form
//!   (Lawson-Hanson). The passive set grows by the most negative KKT
//!   gradient coordinate; each candidate subset is solved by Cholesky; a
//!   partial step to the feasibility boundary demotes variables that would
//!   go negative.
//! - Termination: optimal when no bound coordinate has gradient below
//!   `-tol`; the iteration cap produces [`QpStatus::IterationLimit`], which
//!   callers must treat as a solver failure rather than a usable solution.
//!
//! Invariants & assumptions
//! ------------------------
//! - `P` is symmetric positive semidefinite (it is a Gram matrix
//!   `(WGB)'(WGB) + (LB)'(LB)` by construction); the active-set subsystem
//!   must be positive definite for Cholesky to succeed.
//! - `m >= 0` holds exactly on return from the constrained path: demoted
//!   coordinates are set to literal zero.
//!
//! Testing notes
//! -------------
//! - Unit tests exercise the unconstrained path against hand-solvable
//!   systems, the constrained path against problems with known active
//!   sets, and the singular-matrix error path.
use log::debug;
use nalgebra::{Cholesky, DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::inversion::errors::{InvResult, InversionError};

/// A quadratic program `min 1/2 m' P m + q' m`.
#[derive(Debug, Clone, PartialEq)]
pub struct QpProblem {
    p: Array2<f64>,
    q: Array1<f64>,
}

impl QpProblem {
    /// Validate and wrap `(P, q)`.
    ///
    /// Errors
    /// ------
    /// - `InversionError::NonSquareSystem` if `P` is not square.
    /// - `InversionError::ShapeMismatch` if `q` disagrees with `P`.
    pub fn new(p: Array2<f64>, q: Array1<f64>) -> InvResult<Self> {
        let (rows, cols) = p.dim();
        if rows != cols {
            return Err(InversionError::NonSquareSystem { rows, cols });
        }
        if q.len() != rows {
            return Err(InversionError::ShapeMismatch {
                context: "q length vs P rows",
                expected: rows,
                actual: q.len(),
            });
        }
        Ok(Self { p, q })
    }

    /// Problem dimension.
    pub fn dim(&self) -> usize {
        self.q.len()
    }

    pub fn p(&self) -> &Array2<f64> {
        &self.p
    }

    pub fn q(&self) -> &Array1<f64> {
        &self.q
    }
}

/// Termination status of the constrained solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QpStatus {
    /// KKT conditions satisfied within tolerance.
    Optimal,
    /// Outer iteration cap reached before optimality.
    IterationLimit,
}

impl std::fmt::Display for QpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QpStatus::Optimal => write!(f, "optimal"),
            QpStatus::IterationLimit => write!(f, "iteration limit reached"),
        }
    }
}

/// Primal solution with its status flag.
#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    pub x: Array1<f64>,
    pub status: QpStatus,
    pub iterations: usize,
}

/// Solver configuration.
///
/// - `tol`: KKT gradient tolerance for declaring a bound coordinate
///   optimal.
/// - `max_iter`: outer iteration cap; `None` defaults to `3 n`, the usual
///   Lawson-Hanson bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QpOptions {
    pub tol: f64,
    pub max_iter: Option<usize>,
}

impl Default for QpOptions {
    fn default() -> Self {
        Self { tol: 1e-10, max_iter: None }
    }
}

/// Direct solve of the unconstrained problem `P m = -q`.
///
/// Errors
/// ------
/// - `InversionError::SingularNormalMatrix` if `P` has no Cholesky factor.
pub fn solve_unconstrained(problem: &QpProblem) -> InvResult<Array1<f64>> {
    let n = problem.dim();
    let p = DMatrix::from_fn(n, n, |i, j| problem.p[[i, j]]);
    let rhs = DVector::from_fn(n, |i, _| -problem.q[i]);
    let chol =
        Cholesky::new(p).ok_or(InversionError::SingularNormalMatrix { size: n })?;
    let x = chol.solve(&rhs);
    Ok(Array1::from_iter(x.iter().cloned()))
}

/// Active-set solve of the non-negativity-constrained problem.
///
/// Minimizes `1/2 m' P m + q' m` subject to `m >= 0` (the `-m <= 0`
/// inequality block of the QP form). Returns the primal vector with a
/// status flag; callers must reject [`QpStatus::IterationLimit`].
///
/// Errors
/// ------
/// - `InversionError::SingularNormalMatrix` if a passive-set subsystem has
///   no Cholesky factor.
pub fn solve_nonnegative(problem: &QpProblem, options: &QpOptions) -> InvResult<QpSolution> {
    let n = problem.dim();
    let max_iter = options.max_iter.unwrap_or(3 * n.max(1));

    let mut x = Array1::<f64>::zeros(n);
    let mut passive = vec![false; n];
    let mut iterations = 0;

    while iterations < max_iter {
        // KKT gradient; a bound coordinate with negative gradient would
        // decrease the objective by entering the passive set.
        let gradient = problem.p.dot(&x) + &problem.q;
        let entering = (0..n)
            .filter(|&i| !passive[i])
            .min_by(|&a, &b| gradient[a].total_cmp(&gradient[b]));
        match entering {
            Some(i) if gradient[i] < -options.tol => passive[i] = true,
            _ => {
                debug!(
                    "nnls: optimal after {iterations} iterations, {} passive of {n}",
                    passive.iter().filter(|&&p| p).count()
                );
                return Ok(QpSolution { x, status: QpStatus::Optimal, iterations });
            }
        }
        iterations += 1;

        // Inner loop: solve on the passive set; demote variables that the
        // unconstrained subsolution would drive negative.
        loop {
            let free: Vec<usize> = (0..n).filter(|&i| passive[i]).collect();
            let z = solve_subset(problem, &free)?;

            if z.iter().all(|&v| v > 0.0) {
                x.fill(0.0);
                for (&i, &v) in free.iter().zip(z.iter()) {
                    x[i] = v;
                }
                break;
            }

            // Step from x toward z up to the first coordinate hitting zero.
            let mut alpha = 1.0_f64;
            for (&i, &zi) in free.iter().zip(z.iter()) {
                if zi <= 0.0 {
                    let xi = x[i];
                    if xi - zi > 0.0 {
                        alpha = alpha.min(xi / (xi - zi));
                    }
                }
            }
            for (&i, &zi) in free.iter().zip(z.iter()) {
                x[i] += alpha * (zi - x[i]);
            }
            for &i in &free {
                if x[i] <= options.tol {
                    x[i] = 0.0;
                    passive[i] = false;
                }
            }
        }
    }

    debug!("nnls: iteration limit {max_iter} reached");
    Ok(QpSolution { x, status: QpStatus::IterationLimit, iterations })
}

/// Cholesky solve of `P[free, free] z = -q[free]`.
fn solve_subset(problem: &QpProblem, free: &[usize]) -> InvResult<Array1<f64>> {
    let k = free.len();
    let p = DMatrix::from_fn(k, k, |a, b| problem.p[[free[a], free[b]]]);
    let rhs = DVector::from_fn(k, |a, _| -problem.q[free[a]]);
    let chol =
        Cholesky::new(p).ok_or(InversionError::SingularNormalMatrix { size: k })?;
    let z = chol.solve(&rhs);
    Ok(Array1::from_iter(z.iter().cloned()))
}
