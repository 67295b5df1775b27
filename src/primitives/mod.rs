//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the fundamental types shared by every other layer:
//! the crate-wide error enum.
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Error types surfaced by all fallible operations.
pub mod errors;
