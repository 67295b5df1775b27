//! Distance tensor construction for neighborhood-local kriging.
//!
//! ## Purpose
//!
//! This module builds the two distance tensors the MuyGPs pipeline consumes:
//! the *pairwise* tensor of distances among each batch element's neighbors,
//! and the *crosswise* tensor of distances between each query point and its
//! neighbors. Both gather rows from a feature matrix through neighbor-index
//! tensors and reduce along the feature axis only.
//!
//! ## Design notes
//!
//! * **Decoupling**: Distance construction is separated from kernel
//!   evaluation; kernels consume the tensors built here.
//! * **Metric closure**: Only `l2` (Euclidean) and `F2` (squared Euclidean)
//!   are supported. `F2` skips the square root for kernels that consume
//!   squared distances directly (RBF). Selector strings are parsed once at
//!   the configuration boundary, never on the hot path.
//! * **Symmetry by construction**: The pairwise tensor computes each `(i, j)`
//!   pair once and mirrors it, so symmetry and the zero diagonal hold exactly.
//!
//! ## Invariants
//!
//! * `pairwise[b, i, j] == pairwise[b, j, i]` and `pairwise[b, i, i] == 0`.
//! * `F2` distances equal squared `l2` distances elementwise.
//! * Every index gathered must lie in `[0, point_count)`; callers validate
//!   bounds before invoking these functions (see the engine validator).
//!
//! ## Non-goals
//!
//! * This module does not search for nearest neighbors; index tensors are
//!   supplied by the caller.
//! * This module does not evaluate covariance kernels.

use core::str::FromStr;

// External dependencies
use ndarray::{Array2, Array3, ArrayView1, ArrayView2};
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Distance Metric Enum
// ============================================================================

/// Distance reduction applied along the feature axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Euclidean distance: `sqrt(sum((x_i - y_i)^2))`.
    #[default]
    L2,

    /// Squared Euclidean distance: `sum((x_i - y_i)^2)`.
    ///
    /// Avoids the square root where the kernel itself consumes squared
    /// distance (RBF).
    F2,
}

impl DistanceMetric {
    /// Parse a metric selector string (`"l2"` or `"F2"`).
    ///
    /// Any other value is a configuration error naming the rejected string.
    pub fn parse(name: &str) -> Result<Self, MuyGpsError> {
        match name {
            "l2" => Ok(DistanceMetric::L2),
            "F2" => Ok(DistanceMetric::F2),
            other => Err(MuyGpsError::UnsupportedMetric(other.to_string())),
        }
    }

    /// Selector string for this metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::F2 => "F2",
        }
    }

    /// Apply the metric's reduction to an accumulated squared difference.
    #[inline]
    fn finalize<T: Float>(&self, squared: T) -> T {
        match self {
            DistanceMetric::L2 => squared.sqrt(),
            DistanceMetric::F2 => squared,
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = MuyGpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Distance Tensor Builders
// ============================================================================

/// Build the pairwise distance tensor among each batch element's neighbors.
///
/// Gathers `data[nn_indices]` into a `(batch_count, nn_count, feature_count)`
/// block and reduces all neighbor pairs along the feature axis, producing a
/// `(batch_count, nn_count, nn_count)` tensor that is symmetric in its last
/// two axes with a zero diagonal.
pub fn pairwise_distances<T: Float>(
    data: ArrayView2<'_, T>,
    nn_indices: ArrayView2<'_, usize>,
    metric: DistanceMetric,
) -> Array3<T> {
    let (batch_count, nn_count) = nn_indices.dim();
    let mut dists = Array3::zeros((batch_count, nn_count, nn_count));

    for (b, neighbors) in nn_indices.outer_iter().enumerate() {
        for i in 0..nn_count {
            let point_i = data.row(neighbors[i]);
            for j in (i + 1)..nn_count {
                let squared = squared_difference(point_i, data.row(neighbors[j]));
                let d = metric.finalize(squared);
                dists[[b, i, j]] = d;
                dists[[b, j, i]] = d;
            }
        }
    }

    dists
}

/// Build the crosswise distance tensor between query points and neighbors.
///
/// Gathers query locations `data[data_indices]` and neighbor points
/// `nn_data[nn_indices]`, then reduces their elementwise differences along
/// the feature axis into a `(batch_count, nn_count)` tensor.
pub fn crosswise_distances<T: Float>(
    data: ArrayView2<'_, T>,
    nn_data: ArrayView2<'_, T>,
    data_indices: ArrayView1<'_, usize>,
    nn_indices: ArrayView2<'_, usize>,
    metric: DistanceMetric,
) -> Array2<T> {
    let (batch_count, nn_count) = nn_indices.dim();
    let mut dists = Array2::zeros((batch_count, nn_count));

    for b in 0..batch_count {
        let query = data.row(data_indices[b]);
        let neighbors = nn_indices.row(b);
        for i in 0..nn_count {
            let squared = squared_difference(query, nn_data.row(neighbors[i]));
            dists[[b, i]] = metric.finalize(squared);
        }
    }

    dists
}

// ============================================================================
// Feature-Axis Reduction
// ============================================================================

/// Accumulate the squared difference of two feature vectors.
#[inline]
fn squared_difference<T: Float>(a: ArrayView1<'_, T>, b: ArrayView1<'_, T>) -> T {
    debug_assert_eq!(a.len(), b.len(), "feature counts must match");
    a.iter()
        .zip(b.iter())
        .map(|(&ai, &bi)| {
            let diff = ai - bi;
            diff * diff
        })
        .fold(T::zero(), |acc, x| acc + x)
}
