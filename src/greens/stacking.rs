//! greens::stacking — design-matrix assembly from impulse responses.
//!
//! Purpose
//! -------
//! Express cumulative observed displacement as a causal convolution of
//! incremental slip. Given an ordered epoch sequence and a lag -> response
//! provider (a Green's-function [`EpochValueSource`] whose value at lag tau
//! is the instantaneous surface response to a unit slip impulse applied tau
//! epochs earlier), assemble the block-lower-triangular stacked design
//! matrix: block (m, n) holds the response at lag `epochs[m] - epochs[n]`
//! for n <= m, and is exactly zero for n > m.
//!
//! Key behaviors
//! -------------
//! - Causality by construction: future-slip blocks (n > m) are structural
//!   zeros; they are never looked up.
//! - Strict lag lookup: any lag the provider cannot supply (including
//!   lag 0, which every provider must define) surfaces as
//!   [`EpochError::MissingEpoch`], never as a silent zero block.
//! - All blocks must share one shape; a provider returning inconsistent
//!   shapes fails with [`EpochError::ShapeMismatch`].
//!
//! Downstream usage
//! ----------------
//! - `inversion::formulation` consumes the stacked matrix as `G`.
//! - `vertical_stack` / `stacked_observation` assemble the matching
//!   multi-epoch observation vector, so rows of `G` and entries of `d`
//!   correspond 1:1.
use ndarray::{s, Array1, Array2};

use crate::epochal::errors::{EpochError, EpochResult};
use crate::epochal::store::{validate_epochs, EpochValueSource};

/// Stacked block-lower-triangular design matrix.
///
/// For `N` epochs and per-lag block shape `(r, c)`, the result has shape
/// `(r * N, c * N)`.
///
/// Errors
/// ------
/// - `EpochError::EmptyEpochs` / `EpochError::EpochsNotIncreasing` for an
///   invalid epoch sequence.
/// - `EpochError::MissingEpoch` if any required lag (always including 0) is
///   absent from the provider.
/// - `EpochError::ShapeMismatch` if blocks differ in shape.
pub fn conv_stack<S: EpochValueSource>(source: &S, epochs: &[i64]) -> EpochResult<Array2<f64>> {
    validate_epochs(epochs)?;
    let n = epochs.len();

    let (rows, cols) = source.value_at(0)?.dim();
    let mut stacked = Array2::<f64>::zeros((rows * n, cols * n));

    for nth in 0..n {
        for mth in nth..n {
            let lag = epochs[mth] - epochs[nth];
            let block = source.value_at(lag)?;
            if block.dim() != (rows, cols) {
                return Err(EpochError::ShapeMismatch {
                    epoch: lag,
                    expected: (rows, cols),
                    actual: block.dim(),
                });
            }
            stacked
                .slice_mut(s![mth * rows..(mth + 1) * rows, nth * cols..(nth + 1) * cols])
                .assign(&block);
        }
    }
    Ok(stacked)
}

/// Vertically stacked epoch values: the provider's value at each epoch,
/// concatenated along rows in epoch order. Used to assemble the multi-epoch
/// observation vector matching [`conv_stack`]'s row ordering.
pub fn vertical_stack<S: EpochValueSource>(
    source: &S, epochs: &[i64],
) -> EpochResult<Array2<f64>> {
    validate_epochs(epochs)?;

    let first = source.value_at(epochs[0])?;
    let (rows, cols) = first.dim();
    let mut stacked = Array2::<f64>::zeros((rows * epochs.len(), cols));
    stacked.slice_mut(s![0..rows, ..]).assign(&first);

    for (index, &epoch) in epochs.iter().enumerate().skip(1) {
        let value = source.value_at(epoch)?;
        if value.dim() != (rows, cols) {
            return Err(EpochError::ShapeMismatch {
                epoch,
                expected: (rows, cols),
                actual: value.dim(),
            });
        }
        stacked.slice_mut(s![index * rows..(index + 1) * rows, ..]).assign(&value);
    }
    Ok(stacked)
}

/// The multi-epoch observation vector: [`vertical_stack`] of a store whose
/// epoch values are `(n, 1)` columns, flattened to the `Array1` shape the
/// inversion operands take as `d`.
///
/// Errors
/// ------
/// - As [`vertical_stack`], plus `EpochError::ShapeMismatch` if the epoch
///   values are not single-column.
pub fn stacked_observation<S: EpochValueSource>(
    source: &S, epochs: &[i64],
) -> EpochResult<Array1<f64>> {
    let stacked = vertical_stack(source, epochs)?;
    if stacked.ncols() != 1 {
        let rows = stacked.nrows() / epochs.len();
        return Err(EpochError::ShapeMismatch {
            epoch: epochs[0],
            expected: (rows, 1),
            actual: (rows, stacked.ncols()),
        });
    }
    Ok(stacked.column(0).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epochal::store::EpochalStore;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Block placement by lag and the lower-triangular causality structure.
    // - Strict failure on a missing lag (no silent zero blocks).
    // - Vertical observation stacking in epoch order, and its flattening to
    //   the observation vector shape.
    // -------------------------------------------------------------------------

    fn lag_store() -> EpochalStore {
        // Response at lag tau is [[tau + 1]] so each block is recognizable.
        let mut store = EpochalStore::new();
        for lag in [0_i64, 100, 900, 1000] {
            store.set_epoch_value(lag, array![[lag as f64 + 1.0]]).unwrap();
        }
        store
    }

    #[test]
    // Purpose
    // -------
    // Block (m, n) holds the response at lag epochs[m] - epochs[n], and
    // every block with n > m is exactly zero.
    //
    // Given
    // -----
    // - Epochs [0, 100, 1000] over a provider with 1x1 blocks valued
    //   lag + 1.
    //
    // Expect
    // ------
    // - A 3x3 stacked matrix:
    //   [[  1,    0,   0],
    //    [101,    1,   0],
    //    [1001, 901,   1]]
    fn blocks_are_placed_by_lag() {
        // Arrange
        let store = lag_store();
        let epochs = [0_i64, 100, 1000];

        // Act
        let g = conv_stack(&store, &epochs).unwrap();

        // Assert
        let want = array![[1.0, 0.0, 0.0], [101.0, 1.0, 0.0], [1001.0, 901.0, 1.0]];
        assert_eq!(g, want);
    }

    #[test]
    // Purpose
    // -------
    // A lag the provider does not supply is a MissingEpoch error; only
    // causality zeros (n > m) are allowed to be zero by construction.
    //
    // Given
    // -----
    // - Epochs [0, 100, 250]: lag 150 and 250 are absent from the provider.
    //
    // Expect
    // ------
    // - conv_stack fails with MissingEpoch rather than zero-filling.
    fn missing_lag_is_an_error() {
        let store = lag_store();
        let err = conv_stack(&store, &[0, 100, 250]).unwrap_err();
        assert!(matches!(err, EpochError::MissingEpoch { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Lag 0 must be defined: a provider without it fails immediately.
    fn lag_zero_is_required() {
        let mut store = EpochalStore::new();
        store.set_epoch_value(100, array![[1.0]]).unwrap();
        let err = conv_stack(&store, &[100]).unwrap_err();
        assert!(matches!(err, EpochError::MissingEpoch { epoch: 0, .. }));
    }

    #[test]
    // Purpose
    // -------
    // vertical_stack concatenates epoch values along rows in epoch order.
    fn vertical_stack_concatenates_in_order() {
        let mut store = EpochalStore::new();
        store.set_epoch_value(0, array![[1.0], [2.0]]).unwrap();
        store.set_epoch_value(100, array![[3.0], [4.0]]).unwrap();

        let d = vertical_stack(&store, &[0, 100]).unwrap();
        assert_eq!(d, array![[1.0], [2.0], [3.0], [4.0]]);
    }

    #[test]
    // Purpose
    // -------
    // stacked_observation flattens column-valued epochs into the vector
    // shape the inversion operands take, and rejects multi-column stores.
    fn stacked_observation_flattens_columns() {
        let mut store = EpochalStore::new();
        store.set_epoch_value(0, array![[1.0], [2.0]]).unwrap();
        store.set_epoch_value(100, array![[3.0], [4.0]]).unwrap();
        let d = stacked_observation(&store, &[0, 100]).unwrap();
        assert_eq!(d, array![1.0, 2.0, 3.0, 4.0]);

        let mut wide = EpochalStore::new();
        wide.set_epoch_value(0, array![[1.0, 2.0]]).unwrap();
        let err = stacked_observation(&wide, &[0]).unwrap_err();
        assert!(matches!(err, EpochError::ShapeMismatch { expected: (1, 1), .. }));
    }
}
