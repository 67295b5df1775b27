//! Layer 4: Engine
//!
//! # Purpose
//!
//! This layer sits between the public API and the algorithm layer. It owns
//! input validation and the assembly of distance/target tensor bundles that
//! the algorithm layer consumes.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Tensor-tuple assembly for the training, regression, and fast paths.
pub mod tensors;

/// Fail-fast input validation.
pub mod validator;
