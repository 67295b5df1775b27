#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use muygps_rs::internals::algorithms::scale::analytic_scale;
use muygps_rs::internals::primitives::errors::MuyGpsError;
use ndarray::Array3;

// ============================================================================
// Analytic Scale Tests
// ============================================================================

#[test]
fn test_scale_identity_covariance() {
    // With K = I, sigma^2_r = sum(Y^2) / (nn * batch).
    let mut k: Array3<f64> = Array3::zeros((2, 2, 2));
    for b in 0..2 {
        for i in 0..2 {
            k[[b, i, i]] = 1.0;
        }
    }
    let targets =
        Array3::from_shape_vec((2, 2, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

    let scale = analytic_scale(&k, &targets).unwrap();
    // (1 + 4 + 9 + 16) / 4 = 7.5
    assert_relative_eq!(scale[0], 7.5, epsilon = 1e-12);
}

#[test]
fn test_scale_scales_quadratically_with_targets() {
    // Doubling the targets quadruples the scale estimate.
    let mut k: Array3<f64> = Array3::zeros((1, 3, 3));
    for i in 0..3 {
        k[[0, i, i]] = 2.0;
        for j in 0..3 {
            if i != j {
                k[[0, i, j]] = 0.5;
            }
        }
    }
    let targets = Array3::from_shape_vec((1, 3, 1), vec![1.0, -2.0, 0.5]).unwrap();
    let doubled = targets.mapv(|y| 2.0 * y);

    let base = analytic_scale(&k, &targets).unwrap();
    let scaled = analytic_scale(&k, &doubled).unwrap();
    assert_relative_eq!(scaled[0], 4.0 * base[0], epsilon = 1e-10);
}

#[test]
fn test_scale_per_response_independence() {
    // Each response column gets its own estimate.
    let mut k: Array3<f64> = Array3::zeros((1, 2, 2));
    k[[0, 0, 0]] = 1.0;
    k[[0, 1, 1]] = 1.0;
    let targets =
        Array3::from_shape_vec((1, 2, 2), vec![1.0, 10.0, 1.0, 10.0]).unwrap();

    let scale = analytic_scale(&k, &targets).unwrap();
    assert_eq!(scale.len(), 2);
    // Response 0: (1 + 1) / 2 = 1. Response 1: (100 + 100) / 2 = 100.
    assert_relative_eq!(scale[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(scale[1], 100.0, epsilon = 1e-12);
}

#[test]
fn test_scale_positive_for_spd_covariance() {
    // Y . K^-1 Y is a positive quadratic form for nonzero Y.
    let k = Array3::from_shape_vec(
        (1, 2, 2),
        vec![1.5, 0.4, 0.4, 1.5],
    )
    .unwrap();
    let targets = Array3::from_shape_vec((1, 2, 1), vec![0.3, -0.7]).unwrap();

    let scale = analytic_scale(&k, &targets).unwrap();
    assert!(scale[0] > 0.0);
}

#[test]
fn test_scale_singular_covariance_rejected() {
    let k: Array3<f64> = Array3::from_elem((1, 2, 2), 1.0);
    let targets = Array3::from_elem((1, 2, 1), 1.0);
    assert_eq!(
        analytic_scale(&k, &targets).unwrap_err(),
        MuyGpsError::SingularSystem { batch_index: 0 }
    );
}

#[test]
fn test_scale_shape_mismatch_rejected() {
    let k: Array3<f64> = Array3::from_elem((2, 2, 2), 1.0);
    let targets = Array3::from_elem((2, 3, 1), 1.0); // wrong neighbor extent
    assert!(matches!(
        analytic_scale(&k, &targets),
        Err(MuyGpsError::ShapeMismatch { .. })
    ));
}
