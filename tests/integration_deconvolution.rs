//! Integration tests for the slip deconvolution pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end chain: per-lag Green's functions through
//!   convolution stacking, weighting, B-spline basis projection,
//!   spatio-temporal roughening, the constrained solve, and the Occam
//!   regularization sweep with its artifact checkpointing.
//! - Exercise a realistic multi-epoch, multi-site geometry rather than
//!   single-block toys only.
//!
//! Coverage
//! --------
//! - `greens::stacking` + `simulation`: seeded synthetic observations from
//!   a lag-keyed `EpochalStore`.
//! - `inversion::formulation` / `least_squares`: the known-solution
//!   2-parameter system, constrained vs unconstrained branches, and the
//!   identity-weight residual equality.
//! - `basis` + `fault`: recovery of basis parameters through a square
//!   B-spline projection.
//! - `inversion::occam`: sweep over a log grid, per-point artifacts, and
//!   bit-identical tables on a checkpointed rerun.
//! - `greens::nonlinear`: joint recovery of slip and a viscosity
//!   perturbation from two Green's-function sets through a full sweep.
//!
//! Exclusions
//! ----------
//! - Fine-grained contracts of the building blocks (stencil counts, store
//!   round trips, QP edge cases), covered by unit tests in their modules.
use ndarray::{array, s, Array1, Array2, Axis};
use tempfile::tempdir;

use afterslip::basis::BasisMatrix;
use afterslip::epochal::{EpochalStore, InfoValue};
use afterslip::fault::FaultGeometry;
use afterslip::greens::{
    conv_stack, jacobian_column, stacked_observation, with_design_columns, GreensDifference,
};
use afterslip::inversion::{
    diagonal_weights, InversionOperands, InversionResult, LeastSquares, OccamSearch,
    RegularizationGrid,
};
use afterslip::regularization::{temporal_edge_roughening, Roughening};
use afterslip::simulation::synthetic_observations;

/// Observation epochs in days after the mainshock.
const EPOCHS: [i64; 3] = [0, 16, 30];

/// Purpose
/// -------
/// Build a lag-keyed Green's store for 3 sites (9 channels) over a 2x3
/// subfault mesh: a fixed full-column-rank base response whose amplitude
/// relaxes with lag. Every lag required by `EPOCHS` (0, 14, 16, 30) is
/// present.
fn greens_store() -> EpochalStore {
    let mut base = Array2::<f64>::zeros((9, 6));
    for i in 0..9 {
        for j in 0..6 {
            base[[i, j]] = 0.15 * ((i * 5 + j * 3) % 7) as f64 + if i == j { 2.0 } else { 0.0 };
        }
    }
    let mut store = EpochalStore::new();
    for lag in [0_i64, 14, 16, 30] {
        let relaxed = base.mapv(|v| v / (1.0 + lag as f64 / 30.0));
        store.set_epoch_value(lag, relaxed).unwrap();
    }
    store.set_info("visM", InfoValue::Scalar(1e18));
    store
}

/// Purpose
/// -------
/// The same mesh computed at a ten-fold higher viscosity: slower relaxation
/// plus a lag-growing pattern that is not proportional to the base response,
/// so the finite-difference sensitivity carries independent information.
fn stiffer_greens_store() -> EpochalStore {
    let mut store = EpochalStore::new();
    for lag in [0_i64, 14, 16, 30] {
        let value = Array2::from_shape_fn((9, 6), |(i, j)| {
            let base = 0.15 * ((i * 5 + j * 3) % 7) as f64 + if i == j { 2.0 } else { 0.0 };
            base / (1.0 + lag as f64 / 45.0)
                + 0.02 * ((i * 3 + j * 5) % 5) as f64 * lag as f64 / 30.0
        });
        store.set_epoch_value(lag, value).unwrap();
    }
    store.set_info("visM", InfoValue::Scalar(1e19));
    store
}

/// A prescribed positive incremental slip history, epoch-major over the 6
/// subfaults.
fn slip_true() -> Array1<f64> {
    Array1::from_shape_fn(18, |k| 0.5 + 0.1 * ((k * 3) % 7) as f64)
}

#[test]
// Purpose
// -------
// The binding 2-parameter scenario: identity B, known 4x2 G, and
// m_true = [1, 0]. The non-negative solve recovers m_true exactly (to
// solver tolerance) and the unconstrained solve matches a directly
// computed normal-equations solution.
fn known_two_parameter_system() {
    let g = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, -1.0]];
    let m_true = array![1.0, 0.0];
    let d = g.dot(&m_true);
    let operands = InversionOperands::new(g.clone(), d.clone(), None, None, None).unwrap();
    let solver = LeastSquares::new(operands);

    let constrained = solver.invert(true).unwrap();
    assert!((constrained.params()[0] - 1.0).abs() < 1e-9);
    assert!(constrained.params()[1].abs() < 1e-9);
    assert!(constrained.params().iter().all(|&v| v >= 0.0));

    // Normal equations solved by hand through the 2x2 inverse.
    let gtg = g.t().dot(&g);
    let gtd = g.t().dot(&d);
    let det = gtg[[0, 0]] * gtg[[1, 1]] - gtg[[0, 1]] * gtg[[1, 0]];
    let want = array![
        (gtg[[1, 1]] * gtd[0] - gtg[[0, 1]] * gtd[1]) / det,
        (gtg[[0, 0]] * gtd[1] - gtg[[1, 0]] * gtd[0]) / det,
    ];
    let free = solver.invert(false).unwrap();
    assert!((free.params()[0] - want[0]).abs() < 1e-9);
    assert!((free.params()[1] - want[1]).abs() < 1e-9);

    // Identity W: weighted and unweighted residual norms coincide.
    assert!((constrained.residual_norm() - constrained.residual_norm_weighted()).abs() < 1e-12);
}

#[test]
// Purpose
// -------
// Closed loop over the full pipeline: synthetic noisy observations from
// the Green's store, a weighted sweep over roughening strengths, and
// recovery of the prescribed slip at weak regularization.
//
// Also checks the sweep contract: one artifact per grid point, and a
// checkpointed rerun that reproduces the trade-off table bit for bit.
fn sweep_recovers_prescribed_slip_and_checkpoints() {
    // Arrange: 27 observation channels (9 per epoch), sigma 5e-4 noise.
    let store = greens_store();
    let slip = slip_true();
    let sigmas = Array1::from_elem(27, 5e-4);
    let synth = synthetic_observations(&store, &EPOCHS, &slip, &sigmas, 2011).unwrap();

    let w = diagonal_weights(&sigmas).unwrap();
    let operands =
        InversionOperands::new(synth.g.clone(), synth.d.clone(), Some(w), None, None).unwrap();
    let roughening = Roughening::new(2, 3, 1.0, 1.0).unwrap();
    let out_dir = tempdir().unwrap();
    let search =
        OccamSearch::new(operands, roughening, EPOCHS.to_vec(), 0, out_dir.path());
    let grid = RegularizationGrid::logspace(-4.0, -1.0, 4, 0.02, 0.06);

    // Act
    let table = search.run(&grid).unwrap();

    // Assert: every grid point solved and persisted.
    assert_eq!(table.len(), 4);
    for index in 0..4 {
        assert!(search.artifact_path(index).exists());
    }

    // Weak regularization recovers the prescribed slip from the noise.
    let weakest = InversionResult::open(search.artifact_path(0)).unwrap();
    assert_eq!(weakest.epochs, EPOCHS.to_vec());
    assert_eq!(weakest.basis_slip.len(), 18);
    for (got, want) in weakest.basis_slip.iter().zip(slip.iter()) {
        assert!((got - want).abs() < 0.05, "got {got}, want {want}");
    }
    assert!(weakest.params.iter().all(|&v| v >= 0.0));

    // Checkpointed rerun: identical table, read back from the artifacts.
    let rerun = search.run(&grid).unwrap();
    assert_eq!(rerun, table);
}

#[test]
// Purpose
// -------
// Basis-projected solve: with a square cubic-B-spline basis over a 2x3
// fault mesh and noise-free data generated from known basis parameters,
// the constrained solve at weak regularization recovers both the basis
// parameters and the subfault slip they project to.
fn basis_projection_round_trip() {
    // Arrange: mesh geometry matching the Green's store's 6 subfaults.
    let geometry = FaultGeometry::new(
        10.0,
        10.0,
        vec![0.0, 10.0, 20.0, 30.0],
        vec![0.0, 10.0, 20.0],
    )
    .unwrap();
    let basis = BasisMatrix::from_geometry(&geometry).unwrap();
    assert_eq!(basis.num_subfaults(), 6);
    let b = basis.sparse_for_epochs(EPOCHS.len()).unwrap();

    let store = greens_store();
    let m_true = Array1::from_shape_fn(18, |k| 0.4 + 0.05 * ((k * 5) % 6) as f64);
    let slip = {
        // d is generated from the basis-projected slip B m_true.
        let b_dense = b.to_dense();
        b_dense.dot(&m_true)
    };
    let sigmas = Array1::zeros(27);
    let synth = synthetic_observations(&store, &EPOCHS, &slip, &sigmas, 0).unwrap();

    let roughening = Roughening::new(2, 3, 1.0, 1.0).unwrap();
    let l = temporal_edge_roughening(&roughening, EPOCHS.len(), 1e-6, 1e-6, 1e-6, 0).unwrap();
    let operands =
        InversionOperands::new(synth.g, synth.d, None, Some(b), Some(l)).unwrap();

    // Act
    let solver = LeastSquares::new(operands);
    let solution = solver.invert(true).unwrap();

    // Assert
    for (got, want) in solution.params().iter().zip(m_true.iter()) {
        assert!((got - want).abs() < 1e-3, "params: got {got}, want {want}");
    }
    for (got, want) in solution.basis_slip().iter().zip(slip.iter()) {
        assert!((got - want).abs() < 1e-3, "slip: got {got}, want {want}");
    }
    assert!(solution.residual_norm() < 1e-6);
}

#[test]
// Purpose
// -------
// Joint slip + nonlinear-parameter inversion, end to end: two Green's
// stores computed at different viscosities yield a finite-difference
// sensitivity, its Jacobian column is appended to the stacked design, and
// a sweep with one unpenalized extra parameter recovers both the
// prescribed slip and the prescribed log10-viscosity deviation.
//
// Given
// -----
// - Noise-free data d = G m_true + column * 0.3, where the column is the
//   sensitivity convolved with the true incremental slip, assembled into
//   an observation store and flattened back through stacked_observation.
//
// Expect
// ------
// - The weakly regularized sweep point holds 19 parameters: the 18 slip
//   values near slip_true and the viscosity deviation near 0.3.
fn joint_slip_and_viscosity_sweep() {
    // Arrange: sensitivity column from the two viscosity runs.
    let g_low = greens_store();
    let g_high = stiffer_greens_store();
    let sensitivity = GreensDifference::with_respect_to_log10(&g_low, &g_high, "visM").unwrap();
    let slip = slip_true();
    let column = jacobian_column(&sensitivity, &EPOCHS, &slip).unwrap();

    let g = conv_stack(&g_low, &EPOCHS).unwrap();
    let design = with_design_columns(&g, &[column.clone()]).unwrap();
    assert_eq!(design.dim(), (27, 19));

    let dlog_vis = 0.3;
    let d_full = g.dot(&slip) + &column * dlog_vis;

    // Route the observations through an epoch-keyed store, as file-backed
    // data would arrive.
    let mut obs = EpochalStore::new();
    for (nth, &epoch) in EPOCHS.iter().enumerate() {
        let block = d_full.slice(s![nth * 9..(nth + 1) * 9]).to_owned();
        obs.set_epoch_value(epoch, block.insert_axis(Axis(1))).unwrap();
    }
    let d = stacked_observation(&obs, &EPOCHS).unwrap();
    assert_eq!(d, d_full);

    let operands = InversionOperands::new(design, d, None, None, None).unwrap();
    let roughening = Roughening::new(2, 3, 1.0, 1.0).unwrap();
    let out_dir = tempdir().unwrap();
    let search = OccamSearch::new(operands, roughening, EPOCHS.to_vec(), 1, out_dir.path());
    let grid = RegularizationGrid::logspace(-6.0, -5.0, 2, 1e-6, 1e-6);

    // Act
    let table = search.run(&grid).unwrap();

    // Assert
    assert_eq!(table.len(), 2);
    let weakest = InversionResult::open(search.artifact_path(0)).unwrap();
    assert_eq!(weakest.params.len(), 19);
    for (got, want) in weakest.params.iter().take(18).zip(slip.iter()) {
        assert!((got - want).abs() < 5e-3, "slip: got {got}, want {want}");
    }
    let got_dlog = weakest.params[18];
    assert!((got_dlog - dlog_vis).abs() < 5e-3, "viscosity deviation: got {got_dlog}");
}
