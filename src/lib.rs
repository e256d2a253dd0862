//! afterslip — regularized deconvolution inversion of postseismic fault
//! slip from geodetic displacement time series.
//!
//! Purpose
//! -------
//! Estimate an incremental slip history on a gridded fault plane from
//! multi-epoch surface displacements. Observed cumulative displacement is
//! modeled as a causal convolution of slip with per-lag Green's functions;
//! the slip is expanded in a cubic-B-spline spatial basis, smoothed by
//! spatio-temporal Tikhonov roughening, and solved as a weighted,
//! non-negativity-constrained least-squares problem. An Occam-style sweep
//! over the roughening strength produces the misfit/roughness trade-off
//! table used to pick the preferred regularization.
//!
//! Key behaviors
//! -------------
//! - `epochal` holds the epoch-keyed data model: the file-backed array
//!   store, site/channel output filters, and exact incremental/cumulative
//!   slip conversions.
//! - `greens` assembles the block-lower-triangular stacked design matrix
//!   from per-lag impulse responses, plus finite-difference design columns
//!   for nonlinear earth-model parameters solved jointly with slip.
//! - `fault` and `basis` describe the subfault mesh and its B-spline
//!   expansion; `regularization` builds the row-stacked penalty.
//! - `inversion` validates operands, formulates the quadratic program,
//!   solves it (active-set NNLS or direct Cholesky), persists per-solve
//!   artifacts, and drives the parallel regularization sweep.
//! - `simulation` generates seeded synthetic observations for closed-loop
//!   checks.
//!
//! Invariants & assumptions
//! ------------------------
//! - Epochs are strictly increasing integer day offsets from the mainshock.
//! - Causality zeros in the stacked design are structural; a missing lag is
//!   always an error, never a silent zero.
//! - All precondition checks (shapes, weights, epoch sequences) run at
//!   construction or formulation time, before numerical work.
//!
//! Conventions
//! -----------
//! - Observation rows are epoch-major, then site-major with three channels
//!   (east, north, up) per site.
//! - Dense arrays are `ndarray`; sparse operators (`W`, `B`, `L`) are
//!   `sprs` CSR; factorizations go through `nalgebra`.
//! - Errors are per-domain enums converging into
//!   [`inversion::InversionError`].
//!
//! Downstream usage
//! ----------------
//! - Typical flow: load stores, stack `G` and `d`, build the basis and
//!   roughening, then run [`inversion::OccamSearch`] and read the artifact
//!   files it writes.
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests of its own contracts; the end-to-end
//!   recovery of a known slip history from synthetic observations lives in
//!   `tests/integration_deconvolution.rs`.

pub mod basis;
pub mod epochal;
pub mod fault;
pub mod greens;
pub mod inversion;
pub mod regularization;
pub mod simulation;
pub mod sparse;

pub use basis::BasisMatrix;
pub use epochal::{EpochValueSource, EpochalStore};
pub use fault::FaultGeometry;
pub use greens::{conv_stack, stacked_observation, vertical_stack, GreensDifference};
pub use inversion::{
    diagonal_weights, stacked_sigmas, InversionOperands, InversionResult, LeastSquares,
    OccamSearch, RegularizationGrid, TradeOffPoint,
};
pub use regularization::Roughening;
pub use simulation::{synthetic_observations, SyntheticObservations};
