//! Errors for spatial basis construction (spline section range and axis
//! validation).

/// Result alias for basis-construction operations.
pub type BasisResult<T> = Result<T, BasisError>;

/// Errors raised while building B-spline sections or the basis matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum BasisError {
    /// A spline section index is outside `[0, num_sections - 1]`.
    SectionOutOfRange { axis: &'static str, index: usize, num_sections: usize },

    /// An axis node array has fewer than two coordinates.
    TooFewNodes { axis: &'static str, len: usize },

    /// A spline spacing is non-positive or non-finite.
    InvalidSpacing { axis: &'static str, value: f64 },
}

impl std::error::Error for BasisError {}

impl std::fmt::Display for BasisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BasisError::SectionOutOfRange { axis, index, num_sections } => write!(
                f,
                "spline section index {index} along '{axis}' is out of range \
                 (valid: 0..={})",
                num_sections - 1
            ),
            BasisError::TooFewNodes { axis, len } => {
                write!(f, "axis '{axis}' needs at least 2 node coordinates, got {len}")
            }
            BasisError::InvalidSpacing { axis, value } => {
                write!(f, "spline spacing along '{axis}' must be finite and > 0, got {value}")
            }
        }
    }
}
