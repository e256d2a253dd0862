//! Errors for inversion formulation, solving, and sweep bookkeeping.
//!
//! This module defines [`InversionError`], the error surface of the
//! least-squares engine and the Occam sweep. Precondition violations
//! (shape mismatches) are raised at formulation time, before any solve, so
//! failures are attributable to input assembly rather than the solver.
//! Solver failures carry the regularization value of the grid point that
//! triggered them when they occur inside a sweep.
use crate::basis::errors::BasisError;
use crate::epochal::errors::EpochError;
use crate::fault::geometry::FaultError;
use crate::regularization::errors::RegError;

/// Result alias for inversion operations that may produce
/// [`InversionError`].
pub type InvResult<T> = Result<T, InversionError>;

/// Unified error type for the inversion engine.
#[derive(Debug)]
pub enum InversionError {
    // ---- Formulation preconditions ----
    /// Two operands disagree on a shared dimension. `context` names the
    /// check (e.g. "W cols vs G rows").
    ShapeMismatch { context: &'static str, expected: usize, actual: usize },

    /// A per-channel standard deviation is non-positive or non-finite.
    InvalidSigma { index: usize, value: f64 },

    // ---- Solver ----
    /// The QP matrix is not square or disagrees with the linear term.
    NonSquareSystem { rows: usize, cols: usize },

    /// A (sub)system's normal matrix admits no Cholesky factor.
    SingularNormalMatrix { size: usize },

    /// The quadratic program did not reach an optimal status.
    SolverFailure { status: String, reg_rough: Option<f64> },

    // ---- Wrapped domain errors ----
    Epoch(EpochError),
    Basis(BasisError),
    Fault(FaultError),
    Regularization(RegError),

    // ---- Artifacts ----
    /// A result artifact could not be written or read.
    Artifact { path: String, detail: String },
}

impl std::error::Error for InversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InversionError::Epoch(e) => Some(e),
            InversionError::Basis(e) => Some(e),
            InversionError::Fault(e) => Some(e),
            InversionError::Regularization(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for InversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InversionError::ShapeMismatch { context, expected, actual } => {
                write!(f, "shape mismatch ({context}): expected {expected}, got {actual}")
            }
            InversionError::InvalidSigma { index, value } => {
                write!(f, "standard deviation at channel {index} must be finite and > 0, got {value}")
            }
            InversionError::NonSquareSystem { rows, cols } => {
                write!(f, "quadratic-program matrix must be square, got {rows} x {cols}")
            }
            InversionError::SingularNormalMatrix { size } => {
                write!(f, "normal matrix ({size} x {size}) is numerically singular")
            }
            InversionError::SolverFailure { status, reg_rough } => match reg_rough {
                Some(reg) => {
                    write!(f, "quadratic program failed at reg_rough = {reg:e}: {status}")
                }
                None => write!(f, "quadratic program failed: {status}"),
            },
            InversionError::Epoch(e) => write!(f, "epochal data error: {e}"),
            InversionError::Basis(e) => write!(f, "basis error: {e}"),
            InversionError::Fault(e) => write!(f, "fault geometry error: {e}"),
            InversionError::Regularization(e) => write!(f, "regularization error: {e}"),
            InversionError::Artifact { path, detail } => {
                write!(f, "result artifact failure on '{path}': {detail}")
            }
        }
    }
}

impl From<EpochError> for InversionError {
    fn from(e: EpochError) -> Self {
        InversionError::Epoch(e)
    }
}

impl From<BasisError> for InversionError {
    fn from(e: BasisError) -> Self {
        InversionError::Basis(e)
    }
}

impl From<FaultError> for InversionError {
    fn from(e: FaultError) -> Self {
        InversionError::Fault(e)
    }
}

impl From<RegError> for InversionError {
    fn from(e: RegError) -> Self {
        InversionError::Regularization(e)
    }
}

impl InversionError {
    /// Attach the regularization value of the sweep grid point that
    /// produced a solver failure; other variants pass through unchanged.
    pub fn with_reg_rough(self, reg: f64) -> Self {
        match self {
            InversionError::SolverFailure { status, .. } => {
                InversionError::SolverFailure { status, reg_rough: Some(reg) }
            }
            other => other,
        }
    }
}
