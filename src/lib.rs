//! # MuyGPs — Nearest-Neighbor-Localized Gaussian Process Regression for Rust
//!
//! A scalable approximate Gaussian process implementation that replaces the
//! global `O(n³)` GP solve with many small local solves: each prediction
//! conditions only on the query's `k` nearest training neighbors, so cost
//! grows linearly in the number of queries and cubically only in the (small)
//! neighborhood size.
//!
//! ## How MuyGPs works
//!
//! 1. For each query, gather its nearest training neighbors (indices are
//!    supplied by the caller; any neighbor search library works).
//! 2. Build the *pairwise* distances among the neighbors and the *crosswise*
//!    distances from the query to them.
//! 3. Map both through a covariance kernel (RBF or Matérn) to get the local
//!    covariance `K` and cross-covariance `Kcross`.
//! 4. Solve `K x = targets` and contract: the posterior mean is
//!    `Kcross · K⁻¹ · targets` and the diagonal posterior variance
//!    `1 − Kcross · K⁻¹ · Kcross`.
//!
//! For repeated queries over a fixed training set, a precompute pass solves
//! the local systems once per training point; each prediction then reduces to
//! a single tensor contraction.
//!
//! ## Quick Start
//!
//! ```rust
//! use muygps_rs::prelude::*;
//! use ndarray::{array, Array1, Array2};
//!
//! // Four 1-D training points with a scalar response each.
//! let train_features: Array2<f64> = array![[0.0], [1.0], [2.0], [3.0]];
//! let train_targets: Array2<f64> = array![[0.0], [1.0], [4.0], [9.0]];
//!
//! // Two queries with their 3 nearest training neighbors (precomputed).
//! let test_features: Array2<f64> = array![[0.5], [2.5]];
//! let batch_indices: Array1<usize> = array![0, 1];
//! let batch_nn_indices: Array2<usize> = array![[0, 1, 2], [2, 3, 1]];
//!
//! // Build the model
//! let model: MuyGps<f64> = MuyGps::builder()
//!     .kernel_name("matern_1.5", None, 1.0)
//!     .eps(1e-5)
//!     .build()?;
//!
//! // Predict means and diagonal variances
//! let (mean, variance) = model.regress(
//!     batch_indices.view(),
//!     batch_nn_indices.view(),
//!     Some(test_features.view()),
//!     train_features.view(),
//!     train_targets.view(),
//! )?;
//!
//! assert_eq!(mean.dim(), (2, 1));
//! assert_eq!(variance.len(), 2);
//! # Result::<(), MuyGpsError>::Ok(())
//! ```
//!
//! ## Fast prediction
//!
//! Amortize the solve cost across many queries over a fixed training set:
//!
//! ```rust
//! use muygps_rs::prelude::*;
//! use ndarray::{array, Array1, Array2};
//! # let train_features: Array2<f64> = array![[0.0], [1.0], [2.0], [3.0]];
//! # let train_targets: Array2<f64> = array![[0.0], [1.0], [4.0], [9.0]];
//!
//! // One neighbor row per training point.
//! let nn_indices: Array2<usize> = array![[1, 2, 3], [0, 2, 3], [1, 3, 0], [2, 1, 0]];
//!
//! let model: MuyGps<f64> = MuyGps::builder()
//!     .kernel_name("matern_0.5", None, 1.0)
//!     .build()?;
//!
//! // One-time precompute over the training set.
//! let coeffs = model.fast_coefficients(
//!     nn_indices.view(),
//!     train_features.view(),
//!     train_targets.view(),
//! )?;
//!
//! // Per-query: the closest training point and the augmented neighborhoods.
//! let nn_indices_fast = muygps_rs::prelude::fast_nn_update(nn_indices.view());
//! let test_features: Array2<f64> = array![[0.4], [2.6]];
//! let closest_train: Array1<usize> = array![0, 3];
//!
//! let mean = model.fast_regress(
//!     &coeffs,
//!     closest_train.view(),
//!     nn_indices_fast.view(),
//!     test_features.view(),
//!     train_features.view(),
//! )?;
//! assert_eq!(mean.dim(), (2, 1));
//! # Result::<(), MuyGpsError>::Ok(())
//! ```
//!
//! ## Kernels
//!
//! | Selector          | Form                                            | Metric |
//! |-------------------|-------------------------------------------------|--------|
//! | `"rbf"`           | `exp(-d²/2)`                                    | `F2`   |
//! | `"matern_0.5"`    | `exp(-d)`                                       | `l2`   |
//! | `"matern_1.5"`    | `(1 + √3 d) exp(-√3 d)`                         | `l2`   |
//! | `"matern_2.5"`    | `(1 + √5 d + 5d²/3) exp(-√5 d)`                 | `l2`   |
//! | `"matern_inf"`    | `exp(-d²/2)`                                    | `l2`   |
//! | `"matern_general"`| `2^(1-ν)/Γ(ν) · t^ν K_ν(t)`, `t = √(2ν) d`      | `l2`   |
//!
//! The general Matérn evaluates the modified Bessel function of the second
//! kind at arbitrary real order, so any smoothness ν > 0 is usable, not just
//! the closed-form values.
//!
//! ## Variance calibration
//!
//! Posterior variances are computed under a unit-variance prior. The
//! closed-form scale estimate [`MuyGps::scale`] returns the per-response σ²
//! that maps them onto the data's scale.
//!
//! ## References
//!
//! - Muyskens, A. et al. (2021). "MuyGPs: Scalable Gaussian Process
//!   Hyperparameter Estimation Using Local Cross-Validation"
//! - Dunton, A. et al. (2022). "Fast Gaussian Process Posterior Mean
//!   Prediction via Local Cross Validation and Precomputation"

#![deny(missing_docs)]

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - fundamental shared types.
//
// Contains the crate-wide error enum.
mod primitives;

// Layer 2: Math - pure mathematical functions.
//
// Contains distance tensor builders, covariance kernels, the dense linear
// solve bridge, and special functions (ln Γ, Bessel K_ν).
mod math;

// Layer 3: Algorithms - core MuyGPs solves.
//
// Contains the batched posterior mean/variance solves, the amortized fast
// prediction path, and analytic variance-scale estimation.
mod algorithms;

// Layer 4: Engine - validation and tensor assembly.
//
// Contains input validation and the assembly of the distance/target tensor
// bundles the algorithm layer consumes.
mod engine;

// High-level fluent API for MuyGPs regression.
//
// Provides the `MuyGps` builder for configuring and running regression.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard MuyGPs prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use muygps_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algorithms::fast::fast_nn_update;
    pub use crate::api::{
        make_fast_regress_tensors, make_regress_tensors, make_train_tensors, DistanceMetric,
        FastRegressTensors, FloatLinalg, FloatSpecial, KernelFunction, MultivariateMuyGps,
        MuyGps, MuyGpsBuilder, MuyGpsError, RegressTensors, Smoothness, TrainTensors,
    };
}

pub use crate::api::{
    DistanceMetric, FloatLinalg, FloatSpecial, KernelFunction, MultivariateMuyGps, MuyGps,
    MuyGpsBuilder, MuyGpsError, Smoothness,
};

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing purposes.
/// It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
/// Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal core algorithms.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal validation and tensor assembly.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
