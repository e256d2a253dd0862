//! Tikhonov-style roughening: spatial second-difference stencils, temporal
//! first differences with edge damping, and their row-stacked composition.
pub mod composite;
pub mod errors;
pub mod roughening;
pub mod temporal;

pub use composite::{temporal_edge_roughening, with_nonlinear_params, Composite};
pub use errors::{RegError, RegResult};
pub use roughening::Roughening;
pub use temporal::TemporalRegularization;
