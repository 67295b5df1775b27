//! Covariance kernel evaluation over distance tensors.
//!
//! ## Purpose
//!
//! This module maps distance tensors elementwise to covariance tensors under
//! a chosen kernel family: RBF, Matérn at the standard closed-form smoothness
//! values (ν = 1/2, 3/2, 5/2, ∞), or the general Matérn at arbitrary ν via
//! the modified Bessel function of the second kind.
//!
//! ## Design notes
//!
//! * **Tagged strategy**: The kernel family is a closed enum selected once at
//!   model construction; the hot path dispatches on the variant, never on
//!   strings. Selector strings (`"rbf"`, `"matern_0.5"`, ...) are parsed only
//!   at the configuration boundary.
//! * **Metric contract**: RBF (and the ν = ∞ limit via its Matérn spelling)
//!   consumes squared (`F2`) distances; every finite-ν Matérn consumes
//!   Euclidean (`l2`) distances. `compatible_metric` exposes the pairing so
//!   the builder can reject mismatched configurations.
//! * **Singularity handling**: The general Matérn has a removable singularity
//!   at distance zero (`t^ν K_ν(t)` as `t → 0`). Zero-distance entries
//!   short-circuit to the limit value 1 before any Bessel evaluation, and the
//!   pairwise tensor's diagonal is forced to exactly 1 afterwards, so no
//!   NaN/Inf from the singular point can propagate.
//! * **Uniform signature**: Every variant evaluates through the same
//!   `crosswise`/`pairwise` entry points; hyperparameters irrelevant to a
//!   family (ν for RBF) are simply absent from its variant.
//!
//! ## Invariants
//!
//! * Every kernel evaluates to exactly 1 at distance zero.
//! * Output tensors have the same shape as their input distance tensors.
//!
//! ## Non-goals
//!
//! * This module does not build distance tensors or apply the noise nugget.
//! * This module does not optimize hyperparameters.

// External dependencies
use ndarray::{Array2, Array3};
use num_traits::Float;

// Internal dependencies
use crate::math::distance::DistanceMetric;
use crate::math::special::FloatSpecial;
use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Smoothness
// ============================================================================

/// Matérn smoothness parameter ν.
///
/// The closed-form values dispatch to specialized expressions; `General`
/// evaluates the Bessel-function form at arbitrary ν > 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothness<T> {
    /// ν = 1/2: the exponential kernel `exp(-d)`.
    Half,

    /// ν = 3/2: `(1 + √3 d) exp(-√3 d)`.
    ThreeHalves,

    /// ν = 5/2: `(1 + √5 d + 5 d²/3) exp(-√5 d)`.
    FiveHalves,

    /// ν → ∞: the Gaussian limit `exp(-d²/2)`.
    Infinite,

    /// Arbitrary ν > 0 via the modified Bessel function `K_ν`.
    General(T),
}

// ============================================================================
// Kernel Function Enum
// ============================================================================

/// Covariance kernel family, fixed at model construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelFunction<T> {
    /// Radial basis function `exp(-d² / 2)` over squared distances.
    Rbf {
        /// Distance scale divisor (squared for `F2` inputs).
        length_scale: T,
    },

    /// Matérn family at the configured smoothness.
    Matern {
        /// Smoothness parameter ν.
        smoothness: Smoothness<T>,
        /// Distance scale divisor.
        length_scale: T,
    },
}

impl<T: Float + FloatSpecial> KernelFunction<T> {
    /// Parse a kernel selector string.
    ///
    /// Recognizes `"rbf"`, `"matern_0.5"`, `"matern_1.5"`, `"matern_2.5"`,
    /// `"matern_inf"`, and `"matern_general"` (which requires `nu`). Unknown
    /// selectors are configuration errors naming the rejected value.
    pub fn parse(name: &str, nu: Option<T>, length_scale: T) -> Result<Self, MuyGpsError> {
        let kernel = match name {
            "rbf" => KernelFunction::Rbf { length_scale },
            "matern_0.5" => KernelFunction::Matern {
                smoothness: Smoothness::Half,
                length_scale,
            },
            "matern_1.5" => KernelFunction::Matern {
                smoothness: Smoothness::ThreeHalves,
                length_scale,
            },
            "matern_2.5" => KernelFunction::Matern {
                smoothness: Smoothness::FiveHalves,
                length_scale,
            },
            "matern_inf" => KernelFunction::Matern {
                smoothness: Smoothness::Infinite,
                length_scale,
            },
            "matern_general" => {
                let nu = nu.ok_or(MuyGpsError::InvalidHyperparameter {
                    name: "nu",
                    value: f64::NAN,
                })?;
                KernelFunction::Matern {
                    smoothness: Smoothness::General(nu),
                    length_scale,
                }
            }
            other => return Err(MuyGpsError::UnsupportedKernel(other.to_string())),
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Check hyperparameter ranges (positive length scale, positive ν).
    pub fn validate(&self) -> Result<(), MuyGpsError> {
        let length_scale = match self {
            KernelFunction::Rbf { length_scale } => *length_scale,
            KernelFunction::Matern { length_scale, .. } => *length_scale,
        };
        if !length_scale.is_finite() || length_scale <= T::zero() {
            return Err(MuyGpsError::InvalidHyperparameter {
                name: "length_scale",
                value: length_scale.to_f64().unwrap_or(f64::NAN),
            });
        }
        if let KernelFunction::Matern {
            smoothness: Smoothness::General(nu),
            ..
        } = self
        {
            if !nu.is_finite() || *nu <= T::zero() {
                return Err(MuyGpsError::InvalidHyperparameter {
                    name: "nu",
                    value: nu.to_f64().unwrap_or(f64::NAN),
                });
            }
        }
        Ok(())
    }

    /// The distance metric this kernel consumes.
    ///
    /// RBF expects squared (`F2`) distances; the Matérn forms expect
    /// Euclidean (`l2`) distances.
    pub fn compatible_metric(&self) -> DistanceMetric {
        match self {
            KernelFunction::Rbf { .. } => DistanceMetric::F2,
            KernelFunction::Matern { .. } => DistanceMetric::L2,
        }
    }

    /// Selector name of this kernel family.
    pub fn name(&self) -> &'static str {
        match self {
            KernelFunction::Rbf { .. } => "rbf",
            KernelFunction::Matern { smoothness, .. } => match smoothness {
                Smoothness::Half => "matern_0.5",
                Smoothness::ThreeHalves => "matern_1.5",
                Smoothness::FiveHalves => "matern_2.5",
                Smoothness::Infinite => "matern_inf",
                Smoothness::General(_) => "matern_general",
            },
        }
    }

    /// Evaluate the crosswise covariance tensor `(batch_count, nn_count)`.
    pub fn crosswise(&self, dists: &Array2<T>) -> Array2<T> {
        dists.mapv(|d| self.evaluate(d))
    }

    /// Evaluate the pairwise covariance tensor `(batch, nn_count, nn_count)`.
    ///
    /// For the general Matérn, the `[., i, i]` diagonal is forced to exactly
    /// 1 after evaluation; zero-distance entries already short-circuit to 1
    /// inside `evaluate`, so the Bessel series never sees its singular point.
    pub fn pairwise(&self, dists: &Array3<T>) -> Array3<T> {
        let mut cov = dists.mapv(|d| self.evaluate(d));
        if let KernelFunction::Matern {
            smoothness: Smoothness::General(_),
            ..
        } = self
        {
            let nn_count = cov.dim().1;
            for mut block in cov.outer_iter_mut() {
                for i in 0..nn_count {
                    block[[i, i]] = T::one();
                }
            }
        }
        cov
    }

    // ------------------------------------------------------------------------
    // Elementwise Evaluation
    // ------------------------------------------------------------------------

    /// Evaluate the kernel at a single distance.
    #[inline]
    fn evaluate(&self, dist: T) -> T {
        match self {
            KernelFunction::Rbf { length_scale } => {
                // Input is a squared (F2) distance; scale by length_scale^2.
                let scaled = dist / (*length_scale * *length_scale);
                (-scaled / (T::one() + T::one())).exp()
            }
            KernelFunction::Matern {
                smoothness,
                length_scale,
            } => {
                let r = dist / *length_scale;
                match smoothness {
                    Smoothness::Half => (-r).exp(),
                    Smoothness::ThreeHalves => {
                        let k = r * T::from(3.0).unwrap().sqrt();
                        (T::one() + k) * (-k).exp()
                    }
                    Smoothness::FiveHalves => {
                        let k = r * T::from(5.0).unwrap().sqrt();
                        (T::one() + k + k * k / T::from(3.0).unwrap()) * (-k).exp()
                    }
                    Smoothness::Infinite => (-r * r / (T::one() + T::one())).exp(),
                    Smoothness::General(nu) => matern_general(r, *nu),
                }
            }
        }
    }
}

// ============================================================================
// General Matérn
// ============================================================================

/// General Matérn correlation `2^(1-ν)/Γ(ν) · t^ν · K_ν(t)`, `t = √(2ν) d`.
///
/// The removable singularity at `t = 0` evaluates to the limit value 1.
#[inline]
fn matern_general<T: Float + FloatSpecial>(dist: T, nu: T) -> T {
    if dist <= T::zero() {
        return T::one();
    }
    let two = T::one() + T::one();
    let t = (two * nu).sqrt() * dist;
    let log_const = (T::one() - nu) * two.ln() - nu.ln_gamma();
    let value = log_const.exp() * t.powf(nu) * T::bessel_kv(nu, t);
    // At extreme arguments t^nu overflows while K_nu underflows; the product
    // becomes inf * 0 = NaN even though the true tail value is 0.
    if value.is_nan() {
        T::zero()
    } else {
        value
    }
}
