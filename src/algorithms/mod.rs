//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer implements the core MuyGPs solves on top of the math layer:
//! - Batched local posterior mean and diagonal variance
//! - The amortized fast-prediction path (self-augmented precompute)
//! - Analytic variance-scale (σ²) estimation
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Amortized fast-prediction path.
pub mod fast;

/// Analytic variance-scale estimation.
pub mod scale;

/// Batched local posterior solves.
pub mod solve;
