//! Linear algebra backend abstraction for local covariance solves.
//!
//! ## Purpose
//!
//! This module provides a trait-based bridge from generic `Float` code to the
//! optimized nalgebra backend for the small dense systems at the heart of the
//! MuyGPs solve: one `nn_count x nn_count` symmetric positive-definite
//! covariance matrix per batch element, solved against one or more
//! right-hand-side columns.
//!
//! ## Design notes
//!
//! * Uses Cholesky factorization first (the covariance is SPD when the
//!   kernel and nugget are valid), falling back to LU with partial pivoting
//!   for borderline-conditioned matrices.
//! * Never forms an explicit inverse; all paths solve the linear system.
//! * A singular matrix yields `None`; callers map it to a numerical error
//!   naming the batch element. Regularization (nugget) is the caller's job.
//! * Generic over `FloatLinalg` types (f32 and f64) which delegate to
//!   nalgebra, mirroring the bridge used for special functions.
//!
//! ## Non-goals
//!
//! * This module does not batch across elements itself; the solver layer
//!   iterates batch elements and calls in per element.

// External dependencies
use num_traits::Float;

// ============================================================================
// FloatLinalg Trait
// ============================================================================

/// Helper trait bridging generic `Float` types to the nalgebra backend.
pub trait FloatLinalg: Float + 'static {
    /// Solve `A X = B` for symmetric positive-definite `A`.
    ///
    /// `a` is row-major `n x n`, `b` is row-major `n x nrhs`. Returns the
    /// row-major solution, or `None` when `A` is singular.
    fn solve_spd(a: &[Self], b: &[Self], n: usize, nrhs: usize) -> Option<Vec<Self>>;
}

impl FloatLinalg for f64 {
    #[inline]
    fn solve_spd(a: &[Self], b: &[Self], n: usize, nrhs: usize) -> Option<Vec<Self>> {
        nalgebra_backend::solve_spd_f64(a, b, n, nrhs)
    }
}

impl FloatLinalg for f32 {
    #[inline]
    fn solve_spd(a: &[Self], b: &[Self], n: usize, nrhs: usize) -> Option<Vec<Self>> {
        nalgebra_backend::solve_spd_f32(a, b, n, nrhs)
    }
}

// ============================================================================
// Nalgebra Backend Implementation
// ============================================================================

/// Nalgebra-based dense solve routines.
pub mod nalgebra_backend {
    use nalgebra::DMatrix;

    /// Solve `A X = B` using f64 precision (Cholesky, LU fallback).
    pub fn solve_spd_f64(a: &[f64], b: &[f64], n: usize, nrhs: usize) -> Option<Vec<f64>> {
        let matrix = DMatrix::from_row_slice(n, n, a);
        let rhs = DMatrix::from_row_slice(n, nrhs, b);

        let solution = match matrix.clone().cholesky() {
            Some(chol) => chol.solve(&rhs),
            None => matrix.lu().solve(&rhs)?,
        };

        Some(row_major(&solution, n, nrhs))
    }

    /// Solve `A X = B` using f32 precision (Cholesky, LU fallback).
    pub fn solve_spd_f32(a: &[f32], b: &[f32], n: usize, nrhs: usize) -> Option<Vec<f32>> {
        let matrix = DMatrix::from_row_slice(n, n, a);
        let rhs = DMatrix::from_row_slice(n, nrhs, b);

        let solution = match matrix.clone().cholesky() {
            Some(chol) => chol.solve(&rhs),
            None => matrix.lu().solve(&rhs)?,
        };

        Some(row_major(&solution, n, nrhs))
    }

    /// Flatten a column-major nalgebra matrix into a row-major vector.
    fn row_major<T: nalgebra::Scalar + Copy>(m: &DMatrix<T>, n: usize, nrhs: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(n * nrhs);
        for i in 0..n {
            for j in 0..nrhs {
                out.push(m[(i, j)]);
            }
        }
        out
    }
}
