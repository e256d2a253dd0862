//! greens::nonlinear — design columns for nonlinear physical parameters.
//!
//! Purpose
//! -------
//! The forward model is linear in slip but not in the physical parameters
//! of the earth model behind the Green's functions (asthenosphere
//! viscosity, elastic thickness, rake). Those parameters are estimated
//! jointly with slip by linearization: given two Green's-function stores
//! computed at two values of one parameter, [`GreensDifference`] is the
//! per-lag finite-difference sensitivity dG/dp, and [`jacobian_column`]
//! convolves it with an initial incremental slip history to produce the
//! design column for that parameter. [`with_design_columns`] appends the
//! columns to the stacked design matrix, and [`extend_basis`] widens a
//! basis matrix so the appended parameters pass through it untouched.
//!
//! Key behaviors
//! -------------
//! - The differenced parameter value is read from each store's info side
//!   channel under one name; differencing with respect to the log10 of a
//!   parameter (the viscosity convention) is a separate constructor.
//! - A vanishing denominator (both stores at the same parameter value) is
//!   a hard error, never a silent zero sensitivity.
//! - Appended design columns carry no roughening: the matching zero-penalty
//!   columns come from `regularization::with_nonlinear_params`, keyed by
//!   the same `num_nonlinear` count the sweep driver takes.
//!
//! Conventions
//! -----------
//! - One column per nonlinear parameter, appended after the slip columns;
//!   the solved parameter is the deviation from the linearization point.
//!
//! Downstream usage
//! ----------------
//! - `inversion::OccamSearch` with `num_nonlinear > 0` consumes a design
//!   built here; `extend_basis` keeps a B-spline basis compatible with the
//!   widened parameter vector.
use ndarray::{s, Array1, Array2};
use sprs::{hstack, vstack, CsMat};

use crate::epochal::errors::{EpochError, EpochResult};
use crate::epochal::store::{EpochValueSource, EpochalStore, InfoValue};
use crate::greens::stacking::conv_stack;

/// Per-lag finite-difference sensitivity of the Green's functions to one
/// physical parameter: `(G2(lag) - G1(lag)) / (p2 - p1)`.
#[derive(Debug)]
pub struct GreensDifference<'a> {
    lower: &'a EpochalStore,
    upper: &'a EpochalStore,
    denominator: f64,
}

impl<'a> GreensDifference<'a> {
    /// Difference with respect to the raw scalar info entry `name` (e.g. a
    /// rake angle).
    ///
    /// Errors
    /// ------
    /// - `EpochError::MissingInfo` / `EpochError::NonScalarInfo` if either
    ///   store lacks a finite scalar entry under `name`.
    /// - `EpochError::DegenerateDifference` if both stores hold the same
    ///   value.
    pub fn with_respect_to(
        lower: &'a EpochalStore, upper: &'a EpochalStore, name: &str,
    ) -> EpochResult<Self> {
        let p1 = scalar_info(lower, name)?;
        let p2 = scalar_info(upper, name)?;
        Self::from_values(lower, upper, name, p1, p2)
    }

    /// Difference with respect to `log10` of the scalar info entry `name`
    /// (the convention for viscosities and thicknesses).
    ///
    /// Errors
    /// ------
    /// - As [`GreensDifference::with_respect_to`], plus
    ///   `EpochError::NonPositiveInfo` if either value is not positive.
    pub fn with_respect_to_log10(
        lower: &'a EpochalStore, upper: &'a EpochalStore, name: &str,
    ) -> EpochResult<Self> {
        let p1 = positive_scalar_info(lower, name)?;
        let p2 = positive_scalar_info(upper, name)?;
        Self::from_values(lower, upper, name, p1.log10(), p2.log10())
    }

    fn from_values(
        lower: &'a EpochalStore, upper: &'a EpochalStore, name: &str, p1: f64, p2: f64,
    ) -> EpochResult<Self> {
        if p1 == p2 {
            return Err(EpochError::DegenerateDifference { name: name.to_string(), value: p1 });
        }
        Ok(Self { lower, upper, denominator: p2 - p1 })
    }
}

impl EpochValueSource for GreensDifference<'_> {
    fn value_at(&self, epoch: i64) -> EpochResult<Array2<f64>> {
        let a = self.lower.value_at(epoch)?;
        let b = self.upper.value_at(epoch)?;
        if a.dim() != b.dim() {
            return Err(EpochError::ShapeMismatch {
                epoch,
                expected: a.dim(),
                actual: b.dim(),
            });
        }
        Ok((b - a) / self.denominator)
    }
}

fn scalar_info(store: &EpochalStore, name: &str) -> EpochResult<f64> {
    match store.get_info(name)? {
        InfoValue::Scalar(value) if value.is_finite() => Ok(*value),
        _ => Err(EpochError::NonScalarInfo { name: name.to_string(), store: store.label() }),
    }
}

fn positive_scalar_info(store: &EpochalStore, name: &str) -> EpochResult<f64> {
    let value = scalar_info(store, name)?;
    if value <= 0.0 {
        return Err(EpochError::NonPositiveInfo {
            name: name.to_string(),
            store: store.label(),
            value,
        });
    }
    Ok(value)
}

/// The design column of one nonlinear parameter: the stacked sensitivity
/// applied to the initial incremental slip history,
/// `conv_stack(dG, epochs) . slip0`.
///
/// `incr_slip0` is the epoch-major stacked incremental slip at the
/// linearization point, one block of subfault values per epoch.
///
/// Errors
/// ------
/// - Propagates stacking errors (missing lag, shape mismatch, bad epochs).
/// - `EpochError::LengthMismatch` if `incr_slip0` does not match the
///   stacked sensitivity's column count.
pub fn jacobian_column<S: EpochValueSource>(
    sensitivity: &S, epochs: &[i64], incr_slip0: &Array1<f64>,
) -> EpochResult<Array1<f64>> {
    let stacked = conv_stack(sensitivity, epochs)?;
    if incr_slip0.len() != stacked.ncols() {
        return Err(EpochError::LengthMismatch {
            context: "initial slip length vs stacked sensitivity columns",
            expected: stacked.ncols(),
            actual: incr_slip0.len(),
        });
    }
    Ok(stacked.dot(incr_slip0))
}

/// Append one design column per nonlinear parameter to a stacked design
/// matrix.
///
/// Errors
/// ------
/// - `EpochError::LengthMismatch` if any column's length differs from the
///   design's row count.
pub fn with_design_columns(
    g: &Array2<f64>, columns: &[Array1<f64>],
) -> EpochResult<Array2<f64>> {
    for column in columns {
        if column.len() != g.nrows() {
            return Err(EpochError::LengthMismatch {
                context: "design column length vs G rows",
                expected: g.nrows(),
                actual: column.len(),
            });
        }
    }
    let mut out = Array2::<f64>::zeros((g.nrows(), g.ncols() + columns.len()));
    out.slice_mut(s![.., ..g.ncols()]).assign(g);
    for (offset, column) in columns.iter().enumerate() {
        out.column_mut(g.ncols() + offset).assign(column);
    }
    Ok(out)
}

/// Widen a basis matrix for `num_nonlinear` appended parameters: the block
/// diagonal of `B` with an identity, so nonlinear parameters bypass the
/// spatial basis unchanged.
pub fn extend_basis(b: &CsMat<f64>, num_nonlinear: usize) -> CsMat<f64> {
    if num_nonlinear == 0 {
        return b.clone();
    }
    let top = hstack(&[b.view(), CsMat::zero((b.rows(), num_nonlinear)).view()]);
    let bottom = hstack(&[
        CsMat::zero((num_nonlinear, b.cols())).view(),
        CsMat::<f64>::eye(num_nonlinear).view(),
    ]);
    vstack(&[top.view(), bottom.view()])
}
