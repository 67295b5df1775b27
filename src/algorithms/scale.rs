//! Analytic variance-scale (σ²) estimation.
//!
//! ## Purpose
//!
//! The MuyGPs posterior variance is computed under a kernel normalized to
//! unit prior variance. This module provides the closed-form estimate of the
//! variance scale σ² that maps the normalized posterior onto the data's
//! scale, one value per response dimension:
//!
//! ```text
//! σ²_r = Σ_b Σ_i Y[b, i, r] · (K_b⁻¹ Y_b)[i, r] / (nn_count · batch_count)
//! ```
//!
//! ## Design notes
//!
//! * Reuses the same per-element SPD solve as the posterior; the double
//!   contraction over the neighbor axis matches the multivariate solver's
//!   einsum-style reduction.
//! * Callers multiply the diagonal posterior variance by σ²_r to obtain
//!   calibrated predictive variances.
//!
//! ## Non-goals
//!
//! * This module does not optimize kernel hyperparameters; it only rescales
//!   the prior variance given a fixed kernel.

// External dependencies
use ndarray::{Array1, Array3, Axis};

// Internal dependencies
use crate::math::linalg::FloatLinalg;
use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Analytic Scale Optimization
// ============================================================================

/// Estimate the variance scale σ² per response dimension.
///
/// `k` is the `(batch, nn, nn)` local covariance tensor (already nugget
/// perturbed) and `batch_nn_targets` the `(batch, nn, response)` gathered
/// neighbor targets.
pub fn analytic_scale<T: FloatLinalg>(
    k: &Array3<T>,
    batch_nn_targets: &Array3<T>,
) -> Result<Array1<T>, MuyGpsError> {
    let (batch_count, nn_count, nn_count2) = k.dim();
    if nn_count != nn_count2 {
        return Err(MuyGpsError::ShapeMismatch {
            context: "covariance neighbor axes",
            expected: nn_count,
            got: nn_count2,
        });
    }
    let (target_batch, target_nn, response_count) = batch_nn_targets.dim();
    if target_batch != batch_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "neighbor target batch axis",
            expected: batch_count,
            got: target_batch,
        });
    }
    if target_nn != nn_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "neighbor target neighbor axis",
            expected: nn_count,
            got: target_nn,
        });
    }
    if batch_count == 0 || nn_count == 0 {
        return Err(MuyGpsError::EmptyTensor("covariance"));
    }

    let mut scale: Array1<T> = Array1::zeros(response_count);
    for b in 0..batch_count {
        let a: Vec<T> = k.index_axis(Axis(0), b).iter().copied().collect();
        let rhs: Vec<T> = batch_nn_targets
            .index_axis(Axis(0), b)
            .iter()
            .copied()
            .collect();
        let solved = T::solve_spd(&a, &rhs, nn_count, response_count)
            .ok_or(MuyGpsError::SingularSystem { batch_index: b })?;
        for r in 0..response_count {
            let mut acc = T::zero();
            for i in 0..nn_count {
                acc = acc + batch_nn_targets[[b, i, r]] * solved[i * response_count + r];
            }
            scale[r] = scale[r] + acc;
        }
    }

    let normalizer = T::from(nn_count * batch_count).unwrap_or_else(T::one);
    Ok(scale.mapv(|s| s / normalizer))
}
