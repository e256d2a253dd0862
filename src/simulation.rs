//! Synthetic-observation generation for experiments and end-to-end tests.
//!
//! Purpose
//! -------
//! Produce fake geodetic observations from a known slip history: stack the
//! Green's-function provider into the causal design matrix `G`, apply it to
//! the prescribed slip, and add independent Gaussian channel noise,
//! `d = G slip + eps`. Recovering the prescribed slip from `d` is the
//! standard closed-loop check on the whole deconvolution chain.
//!
//! Conventions
//! -----------
//! - Noise is seeded (`StdRng`), so a given seed always yields the same
//!   observation vector.
//! - `sigmas` gives one standard deviation per stacked observation channel;
//!   a zero entry leaves that channel noiseless.
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::epochal::store::EpochValueSource;
use crate::greens::conv_stack;
use crate::inversion::errors::{InvResult, InversionError};

/// A generated synthetic data set: the stacked design and the observation
/// vector, with and without noise.
#[derive(Debug, Clone)]
pub struct SyntheticObservations {
    /// Stacked design matrix assembled from the Green's provider.
    pub g: Array2<f64>,
    /// Noisy observations `G slip + eps`.
    pub d: Array1<f64>,
    /// Noise-free observations `G slip`.
    pub d_clean: Array1<f64>,
}

/// Generate observations from a Green's provider and a known slip history.
///
/// Parameters
/// ----------
/// - `greens`: per-lag impulse responses (see [`crate::greens::conv_stack`]).
/// - `epochs`: strictly increasing observation epochs.
/// - `slip`: prescribed incremental slip, stacked over epochs; its length
///   must match the stacked design's column count.
/// - `sigmas`: per-channel noise standard deviations, one per stacked row;
///   each must be finite and non-negative.
/// - `seed`: RNG seed for reproducible noise.
///
/// Errors
/// ------
/// - Propagates stacking errors (missing lags, bad epoch sequences).
/// - `InversionError::ShapeMismatch` if `slip` or `sigmas` disagree with
///   the stacked design.
/// - `InversionError::InvalidSigma` for a negative or non-finite sigma.
pub fn synthetic_observations<S: EpochValueSource>(
    greens: &S, epochs: &[i64], slip: &Array1<f64>, sigmas: &Array1<f64>, seed: u64,
) -> InvResult<SyntheticObservations> {
    let g = conv_stack(greens, epochs)?;
    if slip.len() != g.ncols() {
        return Err(InversionError::ShapeMismatch {
            context: "slip length vs G cols",
            expected: g.ncols(),
            actual: slip.len(),
        });
    }
    if sigmas.len() != g.nrows() {
        return Err(InversionError::ShapeMismatch {
            context: "sigmas length vs G rows",
            expected: g.nrows(),
            actual: sigmas.len(),
        });
    }

    for (index, &sigma) in sigmas.iter().enumerate() {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(InversionError::InvalidSigma { index, value: sigma });
        }
    }

    let d_clean = g.dot(slip);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut d = d_clean.clone();
    for (value, &sigma) in d.iter_mut().zip(sigmas.iter()) {
        let z: f64 = rng.sample(StandardNormal);
        *value += sigma * z;
    }
    Ok(SyntheticObservations { g, d, d_clean })
}
