//! Fault geometry: the mesh description consumed by the spatial basis and
//! the roughening builder.
pub mod geometry;

pub use geometry::{FaultError, FaultGeometry, FaultResult};
