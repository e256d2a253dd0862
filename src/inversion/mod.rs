//! The inversion engine: operand assembly, QP formulation and solve, the
//! solved-result artifact, and the Occam regularization sweep.
pub mod errors;
pub mod formulation;
pub mod least_squares;
pub mod occam;
pub mod qp;
pub mod result_file;

pub use errors::{InvResult, InversionError};
pub use formulation::{diagonal_weights, stacked_sigmas, InversionOperands};
pub use least_squares::{LeastSquares, Solution};
pub use occam::{OccamSearch, RegularizationGrid, TradeOffPoint};
pub use qp::{QpOptions, QpProblem, QpSolution, QpStatus};
pub use result_file::InversionResult;
