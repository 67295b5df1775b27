#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use muygps_rs::internals::algorithms::fast::{
    fast_nn_update, fast_posterior_mean, fast_posterior_mean_multimodel, fast_precompute,
};
use muygps_rs::internals::algorithms::solve::posterior_mean;
use muygps_rs::internals::primitives::errors::MuyGpsError;
use ndarray::{array, Array2, Array3};

// ============================================================================
// Neighbor Augmentation Tests
// ============================================================================

#[test]
fn test_fast_nn_update_prepends_self() {
    let nn_indices = array![[3, 1, 2], [0, 2, 3], [1, 0, 3]];
    let augmented = fast_nn_update(nn_indices.view());

    assert_eq!(augmented, array![[0, 3, 1], [1, 0, 2], [2, 1, 0]]);
}

#[test]
fn test_fast_nn_update_preserves_shape() {
    let nn_indices = Array2::<usize>::zeros((5, 4));
    let augmented = fast_nn_update(nn_indices.view());
    assert_eq!(augmented.dim(), (5, 4));
}

#[test]
fn test_fast_nn_update_drops_last_neighbor() {
    // The farthest (last) neighbor must not survive the rewrite.
    let nn_indices = array![[7, 8, 9]];
    let augmented = fast_nn_update(nn_indices.view());
    assert!(!augmented.row(0).iter().any(|&i| i == 9));
}

// ============================================================================
// Precompute Tests
// ============================================================================

#[test]
fn test_precompute_identity_returns_targets() {
    // With K = I per training point, coefficients equal the targets.
    let mut k: Array3<f64> = Array3::zeros((2, 2, 2));
    for t in 0..2 {
        for i in 0..2 {
            k[[t, i, i]] = 1.0;
        }
    }
    let targets = Array3::from_shape_vec((2, 2, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

    let coeffs = fast_precompute(&k, &targets).unwrap();
    assert_relative_eq!(coeffs[[0, 0, 0]], 1.0);
    assert_relative_eq!(coeffs[[0, 1, 0]], 2.0);
    assert_relative_eq!(coeffs[[1, 0, 0]], 3.0);
    assert_relative_eq!(coeffs[[1, 1, 0]], 4.0);
}

#[test]
fn test_precompute_singular_system_rejected() {
    let k: Array3<f64> = Array3::from_elem((1, 2, 2), 1.0); // rank-1
    let targets = Array3::from_elem((1, 2, 1), 1.0);
    assert_eq!(
        fast_precompute(&k, &targets).unwrap_err(),
        MuyGpsError::SingularSystem { batch_index: 0 }
    );
}

#[test]
fn test_precompute_shape_mismatch_rejected() {
    let k: Array3<f64> = Array3::from_elem((2, 3, 3), 1.0);
    let targets = Array3::from_elem((1, 3, 1), 1.0); // wrong train extent
    assert!(matches!(
        fast_precompute(&k, &targets),
        Err(MuyGpsError::ShapeMismatch { .. })
    ));
}

// ============================================================================
// Amortized Contraction Tests
// ============================================================================

#[test]
fn test_fast_mean_reproduces_direct_solve() {
    // The contraction against precomputed coefficients must match the direct
    // solve over the same tensors.
    let k = Array3::from_shape_vec(
        (2, 2, 2),
        vec![
            1.001, 0.5, 0.5, 1.001, //
            1.001, 0.3, 0.3, 1.001,
        ],
    )
    .unwrap();
    let targets = Array3::from_shape_vec((2, 2, 1), vec![1.0, -2.0, 0.5, 3.0]).unwrap();
    let kcross = array![[0.8, 0.4], [0.2, 0.9]];

    let direct = posterior_mean(&k, &kcross, &targets).unwrap();

    let coeffs = fast_precompute(&k, &targets).unwrap();
    let fast = fast_posterior_mean(&kcross, &coeffs).unwrap();

    for b in 0..2 {
        assert_relative_eq!(fast[[b, 0]], direct[[b, 0]], epsilon = 1e-10);
    }
}

#[test]
fn test_fast_mean_shape_mismatch_rejected() {
    let kcross = array![[0.5, 0.5]];
    let coeffs: Array3<f64> = Array3::zeros((2, 2, 1)); // wrong batch extent
    assert!(matches!(
        fast_posterior_mean(&kcross, &coeffs),
        Err(MuyGpsError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_multimodel_contraction_per_response() {
    // Response 0 sees Kcross = [1, 0], response 1 sees [0, 1].
    let mut kcross: Array3<f64> = Array3::zeros((1, 2, 2));
    kcross[[0, 0, 0]] = 1.0;
    kcross[[0, 1, 1]] = 1.0;
    let coeffs = Array3::from_shape_vec((1, 2, 2), vec![10.0, 20.0, 30.0, 40.0]).unwrap();

    let mean = fast_posterior_mean_multimodel(&kcross, &coeffs).unwrap();
    assert_relative_eq!(mean[[0, 0]], 10.0);
    assert_relative_eq!(mean[[0, 1]], 40.0);
}

#[test]
fn test_multimodel_matches_single_model_when_shared() {
    // Replicating the same Kcross across the response axis must agree with
    // the single-model contraction.
    let kcross2 = array![[0.7, 0.3]];
    let coeffs = Array3::from_shape_vec((1, 2, 2), vec![1.0, 5.0, 2.0, 6.0]).unwrap();

    let single = fast_posterior_mean(&kcross2, &coeffs).unwrap();

    let mut kcross3: Array3<f64> = Array3::zeros((1, 2, 2));
    for r in 0..2 {
        kcross3[[0, 0, r]] = 0.7;
        kcross3[[0, 1, r]] = 0.3;
    }
    let multi = fast_posterior_mean_multimodel(&kcross3, &coeffs).unwrap();

    for r in 0..2 {
        assert_relative_eq!(single[[0, r]], multi[[0, r]], epsilon = 1e-12);
    }
}
