//! basis::bsplines — 1-D cubic B-spline sections over a node axis.
//!
//! Purpose
//! -------
//! Evaluate the one-dimensional cubic-B-spline shape function attached to a
//! mesh section, sampled at the centers of all sections along the axis. Two
//! of these 1-D sections (one along strike, one along dip) are combined by
//! outer product into a smooth slip mesh in `basis::matrix`.
//!
//! Key behaviors
//! -------------
//! - The shape function for section `j` is the cardinal cubic B-spline
//!   kernel centered at section `j`'s midpoint, with the nominal spline
//!   spacing as its unit: support spans roughly four sections.
//! - Sampling happens at section midpoints, producing one value per
//!   subfault cell along the axis.
//!
//! Invariants & assumptions
//! ------------------------
//! - An axis of `n` nodes has `n - 1` sections; a section index outside
//!   `[0, n - 2]` is a [`BasisError::SectionOutOfRange`].
//! - The kernel is exactly zero for |t| >= 2 spacings, so distant sections
//!   contribute structural zeros (the sparse basis encoding relies on this).
use ndarray::Array1;

use crate::basis::errors::{BasisError, BasisResult};

/// Cardinal cubic B-spline kernel.
///
/// `t` is the distance from the section center in units of the spline
/// spacing. Piecewise:
/// - `|t| <= 1`: `2/3 - t^2 + |t|^3 / 2`
/// - `1 < |t| <= 2`: `(2 - |t|)^3 / 6`
/// - `|t| > 2`: `0`
pub fn cubic_bspline_kernel(t: f64) -> f64 {
    let a = t.abs();
    if a <= 1.0 {
        2.0 / 3.0 - a * a + a * a * a / 2.0
    } else if a <= 2.0 {
        let b = 2.0 - a;
        b * b * b / 6.0
    } else {
        0.0
    }
}

/// 1-D cubic B-spline sections along one mesh axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicBSplines {
    axis: &'static str,
    nodes: Vec<f64>,
    spacing: f64,
}

impl CubicBSplines {
    /// Build sections over `nodes` with nominal spline `spacing`.
    ///
    /// Errors
    /// ------
    /// - `BasisError::TooFewNodes` for fewer than two nodes.
    /// - `BasisError::InvalidSpacing` for non-positive or non-finite spacing.
    pub fn new(axis: &'static str, nodes: Vec<f64>, spacing: f64) -> BasisResult<Self> {
        if nodes.len() < 2 {
            return Err(BasisError::TooFewNodes { axis, len: nodes.len() });
        }
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(BasisError::InvalidSpacing { axis, value: spacing });
        }
        Ok(Self { axis, nodes, spacing })
    }

    /// Number of sections (subfault cells) along the axis.
    pub fn num_sections(&self) -> usize {
        self.nodes.len() - 1
    }

    fn section_center(&self, section: usize) -> f64 {
        0.5 * (self.nodes[section] + self.nodes[section + 1])
    }

    /// Shape function of `section`, sampled at every section midpoint.
    ///
    /// Returns one value per section along the axis (length
    /// [`CubicBSplines::num_sections`]).
    ///
    /// Errors
    /// ------
    /// - `BasisError::SectionOutOfRange` if `section > num_sections - 1`.
    pub fn section_values(&self, section: usize) -> BasisResult<Array1<f64>> {
        let num_sections = self.num_sections();
        if section >= num_sections {
            return Err(BasisError::SectionOutOfRange {
                axis: self.axis,
                index: section,
                num_sections,
            });
        }
        let center = self.section_center(section);
        Ok(Array1::from_shape_fn(num_sections, |i| {
            cubic_bspline_kernel((self.section_center(i) - center) / self.spacing)
        }))
    }
}
