//! Error types for MuyGPs tensor construction and solving.
//!
//! ## Purpose
//!
//! This module defines the single error enum surfaced by every fallible
//! operation in the crate. Errors fall into three groups: configuration
//! errors (unsupported metric or kernel selectors, invalid hyperparameters),
//! shape errors (inconsistent tensor dimensions, out-of-range neighbor
//! indices), and numerical errors (a singular local covariance matrix).
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Every error is raised synchronously at the call site that
//!   detected it; no operation retries or partially recovers.
//! * **Named offenders**: Configuration errors carry the offending value so
//!   callers can report exactly what was rejected.
//! * **Numerical preconditions**: A singular local system is reported with
//!   the batch element that failed; regularizing the covariance (nugget) is
//!   the caller's responsibility.
//!
//! ## Non-goals
//!
//! * This module does not classify or recover from NaN propagation inside
//!   tensors; only the solve primitive reports numerical failure.

use thiserror::Error;

// ============================================================================
// Error Enum
// ============================================================================

/// Errors raised by MuyGPs tensor construction, kernel evaluation, and solves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MuyGpsError {
    /// A distance metric selector that is not `"l2"` or `"F2"`.
    #[error("metric {0:?} is not supported")]
    UnsupportedMetric(String),

    /// A kernel family selector outside the supported set.
    #[error("kernel {0:?} is not supported")]
    UnsupportedKernel(String),

    /// A hyperparameter outside its valid range (e.g. non-positive ν).
    #[error("invalid hyperparameter {name}={value}")]
    InvalidHyperparameter {
        /// Hyperparameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// The selected kernel family and distance metric disagree (RBF consumes
    /// squared distances, Matérn consumes Euclidean distances).
    #[error("kernel {kernel} requires the {required:?} metric, got {got:?}")]
    IncompatibleMetric {
        /// Kernel family name.
        kernel: &'static str,
        /// Metric the kernel consumes.
        required: &'static str,
        /// Metric that was configured.
        got: &'static str,
    },

    /// Tensor dimensions inconsistent across arguments.
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Which dimension disagreed.
        context: &'static str,
        /// Expected extent.
        expected: usize,
        /// Observed extent.
        got: usize,
    },

    /// A neighbor index outside the feature matrix.
    #[error("neighbor index {index} out of bounds for {point_count} points")]
    IndexOutOfBounds {
        /// Offending index value.
        index: usize,
        /// Number of rows in the indexed feature matrix.
        point_count: usize,
    },

    /// An empty batch or neighborhood where at least one element is required.
    #[error("empty {0} tensor")]
    EmptyTensor(&'static str),

    /// The local covariance matrix of one batch element is singular or not
    /// positive definite, so the linear system has no stable solution.
    #[error("singular local covariance for batch element {batch_index}")]
    SingularSystem {
        /// Batch element whose solve failed.
        batch_index: usize,
    },

    /// A builder parameter was set more than once.
    #[error("parameter {parameter} was set multiple times")]
    DuplicateParameter {
        /// Name of the duplicated parameter.
        parameter: &'static str,
    },
}
