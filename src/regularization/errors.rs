//! Errors for roughening-matrix construction.

/// Result alias for regularization-builder operations.
pub type RegResult<T> = Result<T, RegError>;

/// Errors raised while building spatial/temporal roughening matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum RegError {
    /// The subfault mesh has zero rows or columns.
    EmptyMesh { rows: usize, cols: usize },

    /// A normalization length is non-positive or non-finite.
    InvalidNormLength { direction: &'static str, value: f64 },

    /// A regularization weight is negative or non-finite.
    InvalidWeight { name: &'static str, value: f64 },

    /// Temporal roughening needs at least two epochs.
    TooFewEpochs { num_epochs: usize },

    /// The per-epoch parameter count is zero.
    NoParams,

    /// A stacked penalty block disagrees with the composite's column count.
    BlockColumnMismatch { expected: usize, actual: usize },
}

impl std::error::Error for RegError {}

impl std::fmt::Display for RegError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegError::EmptyMesh { rows, cols } => {
                write!(f, "subfault mesh must be non-empty, got {rows} rows x {cols} cols")
            }
            RegError::InvalidNormLength { direction, value } => write!(
                f,
                "normalization length along '{direction}' must be finite and > 0, got {value}"
            ),
            RegError::InvalidWeight { name, value } => {
                write!(f, "regularization weight '{name}' must be finite and >= 0, got {value}")
            }
            RegError::TooFewEpochs { num_epochs } => {
                write!(f, "temporal roughening needs at least 2 epochs, got {num_epochs}")
            }
            RegError::NoParams => write!(f, "per-epoch parameter count must be > 0"),
            RegError::BlockColumnMismatch { expected, actual } => write!(
                f,
                "penalty block has {actual} columns, but the composite penalizes {expected} \
                 parameters"
            ),
        }
    }
}
