//! Green's-function handling: convolution stacking of per-lag impulse
//! responses into the multi-epoch design matrix, and finite-difference
//! design columns for nonlinear physical parameters.
pub mod nonlinear;
pub mod stacking;

pub use nonlinear::{extend_basis, jacobian_column, with_design_columns, GreensDifference};
pub use stacking::{conv_stack, stacked_observation, vertical_stack};
