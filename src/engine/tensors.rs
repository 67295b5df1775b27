//! Tensor-tuple assembly for the training, regression, and fast call paths.
//!
//! ## Purpose
//!
//! This module stitches raw feature matrices, target matrices, and
//! neighbor-index tensors into the argument bundles consumed by the kernel
//! evaluator and the batched solver. Three call patterns exist: training
//! (batch drawn from the training set itself), regression (queries against a
//! held-out test set), and fast regression (the self-augmented precompute
//! scheme).
//!
//! ## Design notes
//!
//! * **Validation first**: Every assembly function validates shapes and index
//!   bounds through the [`Validator`] before gathering, so downstream code
//!   never panics on a bad index.
//! * **Fresh tensors**: All outputs are freshly allocated per call and never
//!   alias their inputs; assembly is a pure function of its arguments.
//! * **Self-reference**: When no test feature matrix is supplied to the
//!   regression assembly, queries index the training matrix itself (the
//!   training call pattern).
//!
//! ## Non-goals
//!
//! * This module does not evaluate kernels or solve systems.
//! * This module does not sample batches or search for neighbors.

// External dependencies
use ndarray::{Array2, Array3, ArrayView1, ArrayView2};
use num_traits::Float;

// Internal dependencies
use crate::algorithms::fast::fast_nn_update;
use crate::engine::validator::Validator;
use crate::math::distance::{crosswise_distances, pairwise_distances, DistanceMetric};
use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Tensor Bundles
// ============================================================================

/// Distance and target tensors for a regression batch.
#[derive(Debug, Clone)]
pub struct RegressTensors<T> {
    /// Query-to-neighbor distances, shape `(batch, nn)`.
    pub crosswise_dists: Array2<T>,
    /// Neighbor-to-neighbor distances, shape `(batch, nn, nn)`.
    pub pairwise_dists: Array3<T>,
    /// Targets gathered by neighbor index, shape `(batch, nn, response)`.
    pub batch_nn_targets: Array3<T>,
}

/// Regression tensors plus the batch's own targets, for training loops.
#[derive(Debug, Clone)]
pub struct TrainTensors<T> {
    /// Query-to-neighbor distances, shape `(batch, nn)`.
    pub crosswise_dists: Array2<T>,
    /// Neighbor-to-neighbor distances, shape `(batch, nn, nn)`.
    pub pairwise_dists: Array3<T>,
    /// Targets of the batch points themselves, shape `(batch, response)`.
    pub batch_targets: Array2<T>,
    /// Targets gathered by neighbor index, shape `(batch, nn, response)`.
    pub batch_nn_targets: Array3<T>,
}

/// Tensors for the fast-precompute path under the augmented neighbor scheme.
#[derive(Debug, Clone)]
pub struct FastRegressTensors<T> {
    /// Augmented neighbor indices (`[self] ++ all-but-last` per row).
    pub nn_indices_fast: Array2<usize>,
    /// Pairwise distances over the augmented rows, shape `(train, nn, nn)`.
    pub pairwise_dists: Array3<T>,
    /// Targets gathered by augmented index, shape `(train, nn, response)`.
    pub batch_nn_targets: Array3<T>,
}

// ============================================================================
// Assembly Functions
// ============================================================================

/// Assemble distance and target tensors for a regression batch.
///
/// Queries are rows `batch_indices` of `test_features` when supplied, and of
/// `train_features` otherwise. Neighbors always index `train_features`.
pub fn make_regress_tensors<'a, T: Float>(
    metric: DistanceMetric,
    batch_indices: ArrayView1<'_, usize>,
    batch_nn_indices: ArrayView2<'_, usize>,
    test_features: Option<ArrayView2<'a, T>>,
    train_features: ArrayView2<'a, T>,
    train_targets: ArrayView2<'_, T>,
) -> Result<RegressTensors<T>, MuyGpsError> {
    let query_features = test_features.unwrap_or(train_features);

    Validator::validate_features(train_features)?;
    Validator::validate_features(query_features)?;
    Validator::validate_feature_axes(query_features, train_features)?;
    Validator::validate_nn_indices(batch_nn_indices, train_features.dim().0)?;
    Validator::validate_batch_indices(
        batch_indices,
        batch_nn_indices.dim().0,
        query_features.dim().0,
    )?;
    Validator::validate_targets(train_targets, train_features.dim().0)?;

    let crosswise_dists = crosswise_distances(
        query_features,
        train_features,
        batch_indices,
        batch_nn_indices,
        metric,
    );
    let pairwise_dists = pairwise_distances(train_features, batch_nn_indices, metric);
    let batch_nn_targets = gather_neighbor_targets(train_targets, batch_nn_indices);

    Ok(RegressTensors {
        crosswise_dists,
        pairwise_dists,
        batch_nn_targets,
    })
}

/// Assemble tensors for a training batch drawn from the training set.
///
/// Identical to the regression assembly with the training matrix as the
/// query matrix, plus the batch points' own targets for loss evaluation.
pub fn make_train_tensors<T: Float>(
    metric: DistanceMetric,
    batch_indices: ArrayView1<'_, usize>,
    batch_nn_indices: ArrayView2<'_, usize>,
    train_features: ArrayView2<'_, T>,
    train_targets: ArrayView2<'_, T>,
) -> Result<TrainTensors<T>, MuyGpsError> {
    let regress = make_regress_tensors(
        metric,
        batch_indices,
        batch_nn_indices,
        None,
        train_features,
        train_targets,
    )?;
    let batch_targets = gather_point_targets(train_targets, batch_indices);

    Ok(TrainTensors {
        crosswise_dists: regress.crosswise_dists,
        pairwise_dists: regress.pairwise_dists,
        batch_targets,
        batch_nn_targets: regress.batch_nn_targets,
    })
}

/// Assemble tensors for the fast-precompute path.
///
/// Applies the self-prepend/drop-last augmentation to every training point's
/// neighbor row, then builds the pairwise distances and gathered targets the
/// coefficient precompute consumes. `nn_indices` must carry one row per
/// training point.
pub fn make_fast_regress_tensors<T: Float>(
    metric: DistanceMetric,
    nn_indices: ArrayView2<'_, usize>,
    train_features: ArrayView2<'_, T>,
    train_targets: ArrayView2<'_, T>,
) -> Result<FastRegressTensors<T>, MuyGpsError> {
    let train_count = train_features.dim().0;

    Validator::validate_features(train_features)?;
    Validator::validate_nn_indices(nn_indices, train_count)?;
    if nn_indices.dim().0 != train_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "fast neighbor rows",
            expected: train_count,
            got: nn_indices.dim().0,
        });
    }
    Validator::validate_targets(train_targets, train_count)?;

    let nn_indices_fast = fast_nn_update(nn_indices);
    let pairwise_dists = pairwise_distances(train_features, nn_indices_fast.view(), metric);
    let batch_nn_targets = gather_neighbor_targets(train_targets, nn_indices_fast.view());

    Ok(FastRegressTensors {
        nn_indices_fast,
        pairwise_dists,
        batch_nn_targets,
    })
}

// ============================================================================
// Target Gathers
// ============================================================================

/// Gather targets by neighbor index into a `(batch, nn, response)` tensor.
pub fn gather_neighbor_targets<T: Float>(
    targets: ArrayView2<'_, T>,
    nn_indices: ArrayView2<'_, usize>,
) -> Array3<T> {
    let (batch_count, nn_count) = nn_indices.dim();
    let response_count = targets.dim().1;
    let mut gathered = Array3::zeros((batch_count, nn_count, response_count));

    for (b, neighbors) in nn_indices.outer_iter().enumerate() {
        for (i, &index) in neighbors.iter().enumerate() {
            for r in 0..response_count {
                gathered[[b, i, r]] = targets[[index, r]];
            }
        }
    }

    gathered
}

/// Gather targets by point index into a `(batch, response)` matrix.
pub fn gather_point_targets<T: Float>(
    targets: ArrayView2<'_, T>,
    indices: ArrayView1<'_, usize>,
) -> Array2<T> {
    let response_count = targets.dim().1;
    let mut gathered = Array2::zeros((indices.len(), response_count));

    for (b, &index) in indices.iter().enumerate() {
        for r in 0..response_count {
            gathered[[b, r]] = targets[[index, r]];
        }
    }

    gathered
}
