//! Amortized ("fast") posterior prediction.
//!
//! ## Purpose
//!
//! Standard MuyGPs inference solves a fresh `nn_count x nn_count` system per
//! query. For repeated or streaming queries over a fixed training set, this
//! module amortizes that cost: a one-time precompute solves
//! `K · coeffs = targets` for every training point under a self-augmented
//! neighbor scheme, after which each query is a single tensor contraction
//! against the precomputed coefficients.
//!
//! ## Design notes
//!
//! * **Self-augmentation**: Each training point's neighbor row is rewritten
//!   as `[self] ++ neighbors[..nn_count-1]` — the point's own index is
//!   prepended and the farthest neighbor dropped, keeping the row length
//!   fixed. The identical transform must be applied when resolving a query's
//!   neighborhood, or the contraction pairs coefficients with the wrong
//!   covariances and predictions are invalid.
//! * **Contractions**: The single-model path contracts
//!   `Kcross[i, j] · coeffs[i, j, k]` over the neighbor axis `j`. The
//!   multi-model path adds a per-response axis to `Kcross` and contracts
//!   `Kcross[i, j, k] · coeffs[i, j, k]` over `j` for each response `k`,
//!   covering independently-fit kernels per output dimension.
//!
//! ## Invariants
//!
//! * `fast_nn_update` preserves row length and keeps every index in range.
//! * Precomputed coefficients have shape `(train_count, nn_count,
//!   response_count)`.
//!
//! ## Non-goals
//!
//! * This module does not compute variances; the fast path is a mean-only
//!   amortization.

// External dependencies
use ndarray::{Array2, Array3, ArrayView2, Axis};
use num_traits::Float;

// Internal dependencies
use crate::math::linalg::FloatLinalg;
use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Neighbor Index Augmentation
// ============================================================================

/// Rewrite each training point's neighbor row as `[self] ++ all-but-last`.
///
/// Row `t` of the result is `[t, nn_indices[t, 0], ..,
/// nn_indices[t, nn_count - 2]]`. Applied identically at precompute and
/// query time.
pub fn fast_nn_update(nn_indices: ArrayView2<'_, usize>) -> Array2<usize> {
    let (train_count, nn_count) = nn_indices.dim();
    let mut augmented = Array2::zeros((train_count, nn_count));

    for (t, row) in nn_indices.outer_iter().enumerate() {
        augmented[[t, 0]] = t;
        for i in 1..nn_count {
            augmented[[t, i]] = row[i - 1];
        }
    }

    augmented
}

// ============================================================================
// Coefficient Precompute
// ============================================================================

/// Solve `K · coeffs = targets` for every training point.
///
/// `k` is the `(train_count, nn_count, nn_count)` pairwise covariance built
/// under the augmented neighbor scheme and `train_nn_targets` the matching
/// `(train_count, nn_count, response_count)` gathered targets. The result is
/// the precomputed coefficient tensor consumed by [`fast_posterior_mean`].
pub fn fast_precompute<T: FloatLinalg>(
    k: &Array3<T>,
    train_nn_targets: &Array3<T>,
) -> Result<Array3<T>, MuyGpsError> {
    let (train_count, nn_count, nn_count2) = k.dim();
    if nn_count != nn_count2 {
        return Err(MuyGpsError::ShapeMismatch {
            context: "covariance neighbor axes",
            expected: nn_count,
            got: nn_count2,
        });
    }
    let (target_train, target_nn, response_count) = train_nn_targets.dim();
    if target_train != train_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "neighbor target train axis",
            expected: train_count,
            got: target_train,
        });
    }
    if target_nn != nn_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "neighbor target neighbor axis",
            expected: nn_count,
            got: target_nn,
        });
    }

    let mut coeffs = Array3::zeros((train_count, nn_count, response_count));
    for t in 0..train_count {
        let a: Vec<T> = k.index_axis(Axis(0), t).iter().copied().collect();
        let rhs: Vec<T> = train_nn_targets
            .index_axis(Axis(0), t)
            .iter()
            .copied()
            .collect();
        let solved = T::solve_spd(&a, &rhs, nn_count, response_count)
            .ok_or(MuyGpsError::SingularSystem { batch_index: t })?;
        for i in 0..nn_count {
            for j in 0..response_count {
                coeffs[[t, i, j]] = solved[i * response_count + j];
            }
        }
    }

    Ok(coeffs)
}

// ============================================================================
// Amortized Query Contractions
// ============================================================================

/// Single-model amortized prediction: contract `Kcross[i, j] · coeffs[i, j, k]`
/// over the neighbor axis `j`.
pub fn fast_posterior_mean<T: Float>(
    kcross: &Array2<T>,
    coeffs: &Array3<T>,
) -> Result<Array2<T>, MuyGpsError> {
    let (batch_count, nn_count) = kcross.dim();
    let (coeff_batch, coeff_nn, response_count) = coeffs.dim();
    if coeff_batch != batch_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "coefficient batch axis",
            expected: batch_count,
            got: coeff_batch,
        });
    }
    if coeff_nn != nn_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "coefficient neighbor axis",
            expected: nn_count,
            got: coeff_nn,
        });
    }

    let mut mean = Array2::zeros((batch_count, response_count));
    for b in 0..batch_count {
        for r in 0..response_count {
            let mut acc = T::zero();
            for i in 0..nn_count {
                acc = acc + kcross[[b, i]] * coeffs[[b, i, r]];
            }
            mean[[b, r]] = acc;
        }
    }
    Ok(mean)
}

/// Multi-model amortized prediction: contract `Kcross[i, j, k] · coeffs[i, j, k]`
/// over the neighbor axis `j`, with a distinct cross-covariance per response.
pub fn fast_posterior_mean_multimodel<T: Float>(
    kcross: &Array3<T>,
    coeffs: &Array3<T>,
) -> Result<Array2<T>, MuyGpsError> {
    let (batch_count, nn_count, response_count) = kcross.dim();
    if coeffs.dim() != (batch_count, nn_count, response_count) {
        return Err(MuyGpsError::ShapeMismatch {
            context: "multi-model coefficient tensor",
            expected: batch_count * nn_count * response_count,
            got: coeffs.len(),
        });
    }

    let mut mean = Array2::zeros((batch_count, response_count));
    for b in 0..batch_count {
        for r in 0..response_count {
            let mut acc = T::zero();
            for i in 0..nn_count {
                acc = acc + kcross[[b, i, r]] * coeffs[[b, i, r]];
            }
            mean[[b, r]] = acc;
        }
    }
    Ok(mean)
}
