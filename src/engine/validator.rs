//! Input validation for tensor assembly.
//!
//! ## Purpose
//!
//! This module provides fail-fast validation of the feature matrices, index
//! tensors, and target tensors handed to the tensor assembly functions.
//! Shape disagreement and out-of-range neighbor indices are rejected before
//! any gather or distance computation runs, so no silent broadcasting or
//! panicking indexing can occur downstream.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first violation.
//! * **Ordering**: Checks run cheap to expensive; extent comparisons precede
//!   the full index-bounds scan.
//! * **Placement**: Validation lives at the assembly boundary; the math and
//!   algorithm layers assume validated inputs and use debug assertions only.
//!
//! ## Invariants
//!
//! * Validated index tensors contain only indices in `[0, point_count)`.
//! * Validation is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not validate hyperparameters (the builder does).
//! * This module does not scan tensors for NaN/Inf; numerical validity is
//!   the caller's contract.

// External dependencies
use ndarray::{ArrayView1, ArrayView2};

// Internal dependencies
use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for tensor-assembly inputs.
///
/// All methods return `Result<(), MuyGpsError>` and fail fast on the first
/// violation.
pub struct Validator;

impl Validator {
    /// Validate a feature matrix: at least one point and one feature.
    pub fn validate_features<T>(features: ArrayView2<'_, T>) -> Result<(), MuyGpsError> {
        let (point_count, feature_count) = features.dim();
        if point_count == 0 {
            return Err(MuyGpsError::EmptyTensor("feature matrix"));
        }
        if feature_count == 0 {
            return Err(MuyGpsError::EmptyTensor("feature axis"));
        }
        Ok(())
    }

    /// Validate a neighbor index tensor against the indexed point count.
    pub fn validate_nn_indices(
        nn_indices: ArrayView2<'_, usize>,
        point_count: usize,
    ) -> Result<(), MuyGpsError> {
        let (batch_count, nn_count) = nn_indices.dim();
        if batch_count == 0 {
            return Err(MuyGpsError::EmptyTensor("batch"));
        }
        if nn_count == 0 {
            return Err(MuyGpsError::EmptyTensor("neighborhood"));
        }
        for &index in nn_indices.iter() {
            if index >= point_count {
                return Err(MuyGpsError::IndexOutOfBounds { index, point_count });
            }
        }
        Ok(())
    }

    /// Validate batch query indices against the neighbor tensor's batch axis
    /// and the queried matrix's point count.
    pub fn validate_batch_indices(
        batch_indices: ArrayView1<'_, usize>,
        batch_count: usize,
        point_count: usize,
    ) -> Result<(), MuyGpsError> {
        if batch_indices.len() != batch_count {
            return Err(MuyGpsError::ShapeMismatch {
                context: "batch index count",
                expected: batch_count,
                got: batch_indices.len(),
            });
        }
        for &index in batch_indices.iter() {
            if index >= point_count {
                return Err(MuyGpsError::IndexOutOfBounds { index, point_count });
            }
        }
        Ok(())
    }

    /// Validate a training target matrix against the training point count.
    pub fn validate_targets<T>(
        targets: ArrayView2<'_, T>,
        train_count: usize,
    ) -> Result<(), MuyGpsError> {
        let (target_count, response_count) = targets.dim();
        if target_count != train_count {
            return Err(MuyGpsError::ShapeMismatch {
                context: "target point count",
                expected: train_count,
                got: target_count,
            });
        }
        if response_count == 0 {
            return Err(MuyGpsError::EmptyTensor("response axis"));
        }
        Ok(())
    }

    /// Validate that two feature matrices share a feature axis.
    pub fn validate_feature_axes<T>(
        a: ArrayView2<'_, T>,
        b: ArrayView2<'_, T>,
    ) -> Result<(), MuyGpsError> {
        if a.dim().1 != b.dim().1 {
            return Err(MuyGpsError::ShapeMismatch {
                context: "feature axis",
                expected: a.dim().1,
                got: b.dim().1,
            });
        }
        Ok(())
    }
}
