//! Batched local posterior solves.
//!
//! ## Purpose
//!
//! This module computes the MuyGPs posterior from kernel tensors: for each
//! batch element, the prediction `Kcross · K⁻¹ · targets` and the diagonal
//! posterior variance `1 − Kcross · K⁻¹ · Kcross`, where `K` is that
//! element's local `nn_count x nn_count` covariance and `Kcross` its
//! query-to-neighbor cross-covariance.
//!
//! ## Design notes
//!
//! * **Solve, never invert**: Each batch element solves `K x = rhs` through
//!   the `FloatLinalg` bridge (Cholesky with LU fallback); no explicit
//!   matrix inverse is ever formed.
//! * **Shared factorization**: When mean and variance are both requested,
//!   the targets and `Kcross` are stacked into a single right-hand side so
//!   each local matrix is factored exactly once.
//! * **Fail-fast shapes**: All tensor extents are cross-checked before any
//!   arithmetic; disagreement is a `ShapeMismatch`, never a silent broadcast.
//! * **Numerical precondition**: A singular `K` is surfaced as
//!   `SingularSystem` naming the batch element. Callers regularize via the
//!   nugget (`homoscedastic_perturb`) before solving.
//!
//! ## Invariants
//!
//! * Predictions have shape `(batch_count, response_count)`; variances have
//!   shape `(batch_count,)`.
//! * Variance lies in `[0, 1]` for a valid correlation-normalized `K` with
//!   unit diagonal and Cauchy–Schwarz-bounded `Kcross`.
//!
//! ## Non-goals
//!
//! * This module does not build kernel tensors (see the math layer) and does
//!   not amortize solves across queries (see the fast path).

// External dependencies
use ndarray::{Array1, Array2, Array3};
use num_traits::Float;

// Internal dependencies
use crate::math::linalg::FloatLinalg;
use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Nugget Perturbation
// ============================================================================

/// Add a homoscedastic noise nugget `eps` to each local covariance diagonal.
///
/// Produces `K + eps·I` per batch element, the standard regularization that
/// keeps the local solve well-posed.
pub fn homoscedastic_perturb<T: Float>(k: &Array3<T>, eps: T) -> Array3<T> {
    let mut perturbed = k.clone();
    let nn_count = perturbed.dim().1;
    for mut block in perturbed.outer_iter_mut() {
        for i in 0..nn_count {
            block[[i, i]] = block[[i, i]] + eps;
        }
    }
    perturbed
}

// ============================================================================
// Posterior Mean and Variance
// ============================================================================

/// Compute the posterior mean `Kcross · K⁻¹ · targets` per batch element.
///
/// Shapes: `k` is `(batch, nn, nn)`, `kcross` is `(batch, nn)`, and
/// `batch_nn_targets` is `(batch, nn, response)`; the result is
/// `(batch, response)`.
pub fn posterior_mean<T: FloatLinalg>(
    k: &Array3<T>,
    kcross: &Array2<T>,
    batch_nn_targets: &Array3<T>,
) -> Result<Array2<T>, MuyGpsError> {
    check_solve_shapes(k, kcross, Some(batch_nn_targets))?;
    let (batch_count, nn_count, response_count) = batch_nn_targets.dim();

    let mut mean = Array2::zeros((batch_count, response_count));
    for b in 0..batch_count {
        let solved = solve_block(k, batch_nn_targets.index_axis(ndarray::Axis(0), b), b)?;
        for j in 0..response_count {
            let mut acc = T::zero();
            for i in 0..nn_count {
                acc = acc + kcross[[b, i]] * solved[i * response_count + j];
            }
            mean[[b, j]] = acc;
        }
    }
    Ok(mean)
}

/// Compute the diagonal posterior variance `1 − Kcross · K⁻¹ · Kcross`.
///
/// Returns one scalar per batch element, assuming the kernel's prior
/// self-covariance is normalized to 1.
pub fn diagonal_variance<T: FloatLinalg>(
    k: &Array3<T>,
    kcross: &Array2<T>,
) -> Result<Array1<T>, MuyGpsError> {
    check_solve_shapes(k, kcross, None)?;
    let (batch_count, nn_count) = kcross.dim();

    let mut variance = Array1::zeros(batch_count);
    for b in 0..batch_count {
        let rhs: Vec<T> = kcross.row(b).iter().copied().collect();
        let a: Vec<T> = k.index_axis(ndarray::Axis(0), b).iter().copied().collect();
        let solved = T::solve_spd(&a, &rhs, nn_count, 1)
            .ok_or(MuyGpsError::SingularSystem { batch_index: b })?;
        let quad = kcross
            .row(b)
            .iter()
            .zip(solved.iter())
            .fold(T::zero(), |acc, (&kc, &x)| acc + kc * x);
        variance[b] = T::one() - quad;
    }
    Ok(variance)
}

/// Compute posterior mean and diagonal variance with one factorization each.
///
/// Stacks the neighbor targets and `Kcross` into a single right-hand side of
/// `response_count + 1` columns, so each local covariance is solved once.
pub fn posterior<T: FloatLinalg>(
    k: &Array3<T>,
    kcross: &Array2<T>,
    batch_nn_targets: &Array3<T>,
) -> Result<(Array2<T>, Array1<T>), MuyGpsError> {
    check_solve_shapes(k, kcross, Some(batch_nn_targets))?;
    let (batch_count, nn_count, response_count) = batch_nn_targets.dim();
    let nrhs = response_count + 1;

    let mut mean = Array2::zeros((batch_count, response_count));
    let mut variance = Array1::zeros(batch_count);

    let mut rhs = vec![T::zero(); nn_count * nrhs];
    for b in 0..batch_count {
        // Columns [0, response_count) hold targets; the last column holds Kcross.
        for i in 0..nn_count {
            for j in 0..response_count {
                rhs[i * nrhs + j] = batch_nn_targets[[b, i, j]];
            }
            rhs[i * nrhs + response_count] = kcross[[b, i]];
        }
        let a: Vec<T> = k.index_axis(ndarray::Axis(0), b).iter().copied().collect();
        let solved = T::solve_spd(&a, &rhs, nn_count, nrhs)
            .ok_or(MuyGpsError::SingularSystem { batch_index: b })?;

        for j in 0..response_count {
            let mut acc = T::zero();
            for i in 0..nn_count {
                acc = acc + kcross[[b, i]] * solved[i * nrhs + j];
            }
            mean[[b, j]] = acc;
        }
        let mut quad = T::zero();
        for i in 0..nn_count {
            quad = quad + kcross[[b, i]] * solved[i * nrhs + response_count];
        }
        variance[b] = T::one() - quad;
    }

    Ok((mean, variance))
}

// ============================================================================
// Helpers
// ============================================================================

/// Solve one batch element's system against a matrix right-hand side.
fn solve_block<T: FloatLinalg>(
    k: &Array3<T>,
    rhs: ndarray::ArrayView2<'_, T>,
    batch_index: usize,
) -> Result<Vec<T>, MuyGpsError> {
    let (nn_count, nrhs) = rhs.dim();
    let a: Vec<T> = k
        .index_axis(ndarray::Axis(0), batch_index)
        .iter()
        .copied()
        .collect();
    let b: Vec<T> = rhs.iter().copied().collect();
    T::solve_spd(&a, &b, nn_count, nrhs).ok_or(MuyGpsError::SingularSystem { batch_index })
}

/// Cross-check the solve tensor extents, failing fast on disagreement.
fn check_solve_shapes<T>(
    k: &Array3<T>,
    kcross: &Array2<T>,
    batch_nn_targets: Option<&Array3<T>>,
) -> Result<(), MuyGpsError> {
    let (batch_count, nn_count, nn_count2) = k.dim();
    if batch_count == 0 || nn_count == 0 {
        return Err(MuyGpsError::EmptyTensor("covariance"));
    }
    if nn_count != nn_count2 {
        return Err(MuyGpsError::ShapeMismatch {
            context: "covariance neighbor axes",
            expected: nn_count,
            got: nn_count2,
        });
    }
    if kcross.dim().0 != batch_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "cross-covariance batch axis",
            expected: batch_count,
            got: kcross.dim().0,
        });
    }
    if kcross.dim().1 != nn_count {
        return Err(MuyGpsError::ShapeMismatch {
            context: "cross-covariance neighbor axis",
            expected: nn_count,
            got: kcross.dim().1,
        });
    }
    if let Some(targets) = batch_nn_targets {
        if targets.dim().0 != batch_count {
            return Err(MuyGpsError::ShapeMismatch {
                context: "neighbor target batch axis",
                expected: batch_count,
                got: targets.dim().0,
            });
        }
        if targets.dim().1 != nn_count {
            return Err(MuyGpsError::ShapeMismatch {
                context: "neighbor target neighbor axis",
                expected: nn_count,
                got: targets.dim().1,
            });
        }
        if targets.dim().2 == 0 {
            return Err(MuyGpsError::EmptyTensor("response"));
        }
    }
    Ok(())
}
