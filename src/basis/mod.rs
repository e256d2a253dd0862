//! Spatial basis for slip: 1-D cubic-B-spline sections and their assembly
//! into the `(num_subfaults, num_basis_params)` basis matrix.
pub mod bsplines;
pub mod errors;
pub mod matrix;

pub use bsplines::{cubic_bspline_kernel, CubicBSplines};
pub use errors::{BasisError, BasisResult};
pub use matrix::BasisMatrix;
