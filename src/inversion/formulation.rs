//! inversion::formulation — operand validation and (P, q) assembly.
//!
//! Purpose
//! -------
//! Hold the five operands of the regularized least-squares problem
//! `min ||W (G B m - d)||^2 + ||L B m||^2` as one immutable value, validate
//! every shared dimension eagerly at construction, and expose a pure
//! formulation step producing the quadratic program
//! `P = (WGB)'(WGB) + (LB)'(LB)`, `q = -(WGB)' W d`. Nothing here mutates:
//! the legacy pattern of assembling an inversion by setting attributes in a
//! required order is replaced by construct-then-formulate.
//!
//! Key behaviors
//! -------------
//! - Defaults: `W` and `B` default to identities, `L` to the 0-row no-op
//!   penalty, mirroring an unweighted, un-projected, unregularized fit.
//! - All shape checks run before any multiplication; each failure names
//!   the check and both dimensions.
//! - Sparse operands stay sparse through the products that allow it; only
//!   `WGB` and the Gram matrices are dense.
//!
//! Invariants & assumptions
//! ------------------------
//! - `W` is square in practice (diagonal inverse standard deviations); the
//!   checks only require what the algebra requires (`W cols == G rows`).
//! - Row ordering of `d` matches the row ordering of `G` exactly; the
//!   stacker guarantees this for multi-epoch assemblies.
use ndarray::{Array1, Array2};
use sprs::{CsMat, TriMat};

use crate::epochal::CHANNELS_PER_SITE;
use crate::inversion::errors::{InvResult, InversionError};
use crate::inversion::qp::QpProblem;
use crate::sparse::mul_vec;

/// Immutable operand set `{G, d, W, B, L}` with validated dimensions.
#[derive(Debug, Clone)]
pub struct InversionOperands {
    g: Array2<f64>,
    d: Array1<f64>,
    w: CsMat<f64>,
    b: CsMat<f64>,
    l: CsMat<f64>,
}

impl InversionOperands {
    /// Validate and assemble the operand set.
    ///
    /// Parameters
    /// ----------
    /// - `g`: dense stacked design matrix (rows = observation channels).
    /// - `d`: observation vector, one entry per row of `g`.
    /// - `w`: optional sparse weight matrix; identity when `None`.
    /// - `b`: optional sparse basis matrix; identity when `None`.
    /// - `l`: optional sparse roughening matrix; 0-row no-op when `None`.
    ///
    /// Errors
    /// ------
    /// - `InversionError::ShapeMismatch` for any dimension disagreement;
    ///   raised here, before any numerical work.
    pub fn new(
        g: Array2<f64>, d: Array1<f64>, w: Option<CsMat<f64>>, b: Option<CsMat<f64>>,
        l: Option<CsMat<f64>>,
    ) -> InvResult<Self> {
        let num_obs = g.nrows();
        if d.len() != num_obs {
            return Err(InversionError::ShapeMismatch {
                context: "d length vs G rows",
                expected: num_obs,
                actual: d.len(),
            });
        }

        let w = w.unwrap_or_else(|| CsMat::eye(num_obs));
        if w.cols() != num_obs {
            return Err(InversionError::ShapeMismatch {
                context: "W cols vs G rows",
                expected: num_obs,
                actual: w.cols(),
            });
        }

        let b = b.unwrap_or_else(|| CsMat::eye(g.ncols()));
        if b.rows() != g.ncols() {
            return Err(InversionError::ShapeMismatch {
                context: "B rows vs G cols",
                expected: g.ncols(),
                actual: b.rows(),
            });
        }

        let l = l.unwrap_or_else(|| CsMat::zero((0, b.rows())));
        if l.cols() != b.rows() {
            return Err(InversionError::ShapeMismatch {
                context: "L cols vs B rows",
                expected: b.rows(),
                actual: l.cols(),
            });
        }

        Ok(Self { g, d, w, b, l })
    }

    /// Number of stacked observation channels.
    pub fn num_obs(&self) -> usize {
        self.g.nrows()
    }

    /// Dimension of the parameter vector `m`.
    pub fn num_params(&self) -> usize {
        self.b.cols()
    }

    pub fn g(&self) -> &Array2<f64> {
        &self.g
    }

    pub fn d(&self) -> &Array1<f64> {
        &self.d
    }

    pub fn w(&self) -> &CsMat<f64> {
        &self.w
    }

    pub fn b(&self) -> &CsMat<f64> {
        &self.b
    }

    pub fn l(&self) -> &CsMat<f64> {
        &self.l
    }

    /// Replace the roughening matrix, revalidating its column count.
    ///
    /// The Occam sweep uses this to rebuild one operand set per grid point
    /// without re-copying `G`, `d`, `W`, and `B` semantics into mutation.
    pub fn with_regularization(&self, l: CsMat<f64>) -> InvResult<Self> {
        if l.cols() != self.b.rows() {
            return Err(InversionError::ShapeMismatch {
                context: "L cols vs B rows",
                expected: self.b.rows(),
                actual: l.cols(),
            });
        }
        Ok(Self { g: self.g.clone(), d: self.d.clone(), w: self.w.clone(), b: self.b.clone(), l })
    }

    /// The weighted, basis-projected design matrix `W G B`.
    pub fn weighted_design(&self) -> Array2<f64> {
        let wg: Array2<f64> = &self.w * &self.g;
        // Dense x sparse via (B' (WG)')'.
        let bt = self.b.transpose_view().to_csr();
        let product: Array2<f64> = &bt * &wg.t();
        product.reversed_axes()
    }

    /// Pure formulation step: the quadratic program `(P, q)`.
    pub fn formulate(&self) -> InvResult<QpProblem> {
        let wgb = self.weighted_design();
        let wd = mul_vec(&self.w, &self.d);

        let lb = &self.l * &self.b;
        let lbt = lb.transpose_view().to_csr();
        let penalty_gram: CsMat<f64> = &lbt * &lb;

        let mut p = wgb.t().dot(&wgb);
        p += &penalty_gram.to_dense();
        let q = -wgb.t().dot(&wd);

        QpProblem::new(p, q)
    }
}

/// Diagonal weight matrix `W = diag(1 / sigma)` from per-channel standard
/// deviations.
///
/// Errors
/// ------
/// - `InversionError::InvalidSigma` if any standard deviation is
///   non-positive or non-finite.
pub fn diagonal_weights(sigmas: &Array1<f64>) -> InvResult<CsMat<f64>> {
    let n = sigmas.len();
    let mut tri = TriMat::with_capacity((n, n), n);
    for (i, &sigma) in sigmas.iter().enumerate() {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(InversionError::InvalidSigma { index: i, value: sigma });
        }
        tri.add_triplet(i, i, 1.0 / sigma);
    }
    Ok(tri.to_csr())
}

/// Stacked per-channel standard deviations from per-component sigmas.
///
/// Builds the sigma vector matching the epoch-major, site-major row
/// ordering of the stacked observation vector: three channels per site,
/// the two horizontal channels (east, north) sharing `sigma_horizontal`
/// and the vertical channel using `sigma_vertical`, tiled over all
/// epochs. Feed the result to [`diagonal_weights`].
///
/// Errors
/// ------
/// - `InversionError::InvalidSigma` if either sigma is non-positive or
///   non-finite.
pub fn stacked_sigmas(
    num_sites: usize, num_epochs: usize, sigma_horizontal: f64, sigma_vertical: f64,
) -> InvResult<Array1<f64>> {
    for (index, value) in [(0, sigma_horizontal), (2, sigma_vertical)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(InversionError::InvalidSigma { index, value });
        }
    }
    let per_epoch = CHANNELS_PER_SITE * num_sites;
    Ok(Array1::from_shape_fn(per_epoch * num_epochs, |k| {
        if k % CHANNELS_PER_SITE == 2 {
            sigma_vertical
        } else {
            sigma_horizontal
        }
    }))
}
