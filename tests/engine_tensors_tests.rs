#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use muygps_rs::internals::engine::tensors::{
    make_fast_regress_tensors, make_regress_tensors, make_train_tensors,
};
use muygps_rs::internals::engine::validator::Validator;
use muygps_rs::internals::math::distance::DistanceMetric;
use muygps_rs::internals::primitives::errors::MuyGpsError;
use ndarray::{array, Array1, Array2};

fn train_data() -> (Array2<f64>, Array2<f64>) {
    let features = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    let targets = array![[0.0], [1.0], [2.0], [3.0]];
    (features, targets)
}

// ============================================================================
// Regression Assembly Tests
// ============================================================================

#[test]
fn test_regress_tensor_shapes() {
    let (features, targets) = train_data();
    let test_features = array![[0.5, 0.5], [0.2, 0.8]];
    let batch_indices = array![0, 1];
    let batch_nn_indices = array![[0, 1, 2], [2, 3, 0]];

    let tensors = make_regress_tensors(
        DistanceMetric::L2,
        batch_indices.view(),
        batch_nn_indices.view(),
        Some(test_features.view()),
        features.view(),
        targets.view(),
    )
    .unwrap();

    assert_eq!(tensors.crosswise_dists.dim(), (2, 3));
    assert_eq!(tensors.pairwise_dists.dim(), (2, 3, 3));
    assert_eq!(tensors.batch_nn_targets.dim(), (2, 3, 1));
}

#[test]
fn test_regress_gathers_targets_by_neighbor() {
    let (features, targets) = train_data();
    let batch_indices = array![0];
    let batch_nn_indices = array![[3, 1, 0]];

    let tensors = make_regress_tensors(
        DistanceMetric::L2,
        batch_indices.view(),
        batch_nn_indices.view(),
        None,
        features.view(),
        targets.view(),
    )
    .unwrap();

    assert_relative_eq!(tensors.batch_nn_targets[[0, 0, 0]], 3.0);
    assert_relative_eq!(tensors.batch_nn_targets[[0, 1, 0]], 1.0);
    assert_relative_eq!(tensors.batch_nn_targets[[0, 2, 0]], 0.0);
}

#[test]
fn test_regress_self_reference_without_test_features() {
    // Without a test matrix, queries index the training matrix; a query's
    // distance to itself is zero.
    let (features, targets) = train_data();
    let batch_indices = array![2];
    let batch_nn_indices = array![[2, 0, 1]];

    let tensors = make_regress_tensors(
        DistanceMetric::L2,
        batch_indices.view(),
        batch_nn_indices.view(),
        None,
        features.view(),
        targets.view(),
    )
    .unwrap();

    assert_eq!(tensors.crosswise_dists[[0, 0]], 0.0);
}

#[test]
fn test_regress_rejects_out_of_bounds_neighbor() {
    let (features, targets) = train_data();
    let batch_indices = array![0];
    let batch_nn_indices = array![[0, 1, 9]];

    let err = make_regress_tensors(
        DistanceMetric::L2,
        batch_indices.view(),
        batch_nn_indices.view(),
        None,
        features.view(),
        targets.view(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        MuyGpsError::IndexOutOfBounds {
            index: 9,
            point_count: 4
        }
    );
}

#[test]
fn test_regress_rejects_batch_index_disagreement() {
    let (features, targets) = train_data();
    let batch_indices = array![0, 1]; // two queries
    let batch_nn_indices = array![[0, 1, 2]]; // one neighbor row

    assert!(matches!(
        make_regress_tensors(
            DistanceMetric::L2,
            batch_indices.view(),
            batch_nn_indices.view(),
            None,
            features.view(),
            targets.view(),
        ),
        Err(MuyGpsError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_regress_rejects_feature_axis_disagreement() {
    let (features, targets) = train_data();
    let test_features = array![[0.5], [0.2]]; // 1-D queries against 2-D training
    let batch_indices = array![0, 1];
    let batch_nn_indices = array![[0, 1], [2, 3]];

    assert!(matches!(
        make_regress_tensors(
            DistanceMetric::L2,
            batch_indices.view(),
            batch_nn_indices.view(),
            Some(test_features.view()),
            features.view(),
            targets.view(),
        ),
        Err(MuyGpsError::ShapeMismatch { .. })
    ));
}

// ============================================================================
// Training Assembly Tests
// ============================================================================

#[test]
fn test_train_tensors_include_batch_targets() {
    let (features, targets) = train_data();
    let batch_indices = array![1, 3];
    let batch_nn_indices = array![[0, 2], [2, 0]];

    let tensors = make_train_tensors(
        DistanceMetric::L2,
        batch_indices.view(),
        batch_nn_indices.view(),
        features.view(),
        targets.view(),
    )
    .unwrap();

    assert_eq!(tensors.batch_targets.dim(), (2, 1));
    assert_relative_eq!(tensors.batch_targets[[0, 0]], 1.0);
    assert_relative_eq!(tensors.batch_targets[[1, 0]], 3.0);
}

// ============================================================================
// Fast Assembly Tests
// ============================================================================

#[test]
fn test_fast_tensors_use_augmented_rows() {
    let (features, targets) = train_data();
    // One neighbor row per training point.
    let nn_indices = array![[1, 2, 3], [0, 3, 2], [0, 3, 1], [1, 2, 0]];

    let tensors = make_fast_regress_tensors(
        DistanceMetric::L2,
        nn_indices.view(),
        features.view(),
        targets.view(),
    )
    .unwrap();

    // Row t starts with t itself.
    for t in 0..4 {
        assert_eq!(tensors.nn_indices_fast[[t, 0]], t);
    }
    // The gathered targets follow the augmented ordering.
    assert_relative_eq!(tensors.batch_nn_targets[[0, 0, 0]], 0.0);
    assert_relative_eq!(tensors.batch_nn_targets[[0, 1, 0]], 1.0);
    assert_eq!(tensors.pairwise_dists.dim(), (4, 3, 3));
}

#[test]
fn test_fast_tensors_require_full_neighbor_rows() {
    let (features, targets) = train_data();
    let nn_indices = array![[1, 2], [0, 3]]; // 2 rows for 4 training points

    assert!(matches!(
        make_fast_regress_tensors(
            DistanceMetric::L2,
            nn_indices.view(),
            features.view(),
            targets.view(),
        ),
        Err(MuyGpsError::ShapeMismatch { .. })
    ));
}

// ============================================================================
// Validator Tests
// ============================================================================

#[test]
fn test_validator_rejects_empty_features() {
    let features = Array2::<f64>::zeros((0, 2));
    assert!(matches!(
        Validator::validate_features(features.view()),
        Err(MuyGpsError::EmptyTensor(_))
    ));

    let featureless = Array2::<f64>::zeros((3, 0));
    assert!(matches!(
        Validator::validate_features(featureless.view()),
        Err(MuyGpsError::EmptyTensor(_))
    ));
}

#[test]
fn test_validator_rejects_empty_neighborhood() {
    let nn_indices = Array2::<usize>::zeros((2, 0));
    assert!(matches!(
        Validator::validate_nn_indices(nn_indices.view(), 10),
        Err(MuyGpsError::EmptyTensor(_))
    ));
}

#[test]
fn test_validator_bounds_scan() {
    let nn_indices = array![[0, 1], [2, 5]];
    assert!(Validator::validate_nn_indices(nn_indices.view(), 6).is_ok());
    assert!(matches!(
        Validator::validate_nn_indices(nn_indices.view(), 5),
        Err(MuyGpsError::IndexOutOfBounds { index: 5, .. })
    ));
}

#[test]
fn test_validator_batch_indices() {
    let batch_indices: Array1<usize> = array![0, 4];
    assert!(Validator::validate_batch_indices(batch_indices.view(), 2, 5).is_ok());
    assert!(Validator::validate_batch_indices(batch_indices.view(), 3, 5).is_err());
    assert!(Validator::validate_batch_indices(batch_indices.view(), 2, 4).is_err());
}

#[test]
fn test_validator_targets() {
    let targets = Array2::<f64>::zeros((4, 2));
    assert!(Validator::validate_targets(targets.view(), 4).is_ok());
    assert!(Validator::validate_targets(targets.view(), 5).is_err());

    let responseless = Array2::<f64>::zeros((4, 0));
    assert!(matches!(
        Validator::validate_targets(responseless.view(), 4),
        Err(MuyGpsError::EmptyTensor(_))
    ));
}
