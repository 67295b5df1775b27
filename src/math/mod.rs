//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides the pure mathematical building blocks of the MuyGPs
//! pipeline:
//! - Distance tensor construction (pairwise and crosswise)
//! - Covariance kernel evaluation (RBF and the Matérn family)
//! - Special functions for the general Matérn (log-gamma, Bessel `K_nu`)
//! - The linear algebra bridge for local covariance solves
//!
//! These are reusable mathematical functions with no orchestration logic.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Distance metrics and distance tensor builders.
pub mod distance;

/// Covariance kernel families and elementwise evaluation.
pub mod kernel;

/// Linear algebra bridge to the nalgebra backend.
pub mod linalg;

/// Special functions (log-gamma, modified Bessel `K_nu`).
pub mod special;
