//! High-level API for MuyGPs regression.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point for
//! nearest-neighbor-localized Gaussian process regression. It implements a
//! fluent builder pattern for configuring the kernel, distance metric, and
//! noise nugget, and exposes the regression, fast-prediction, and variance
//! calibration flows on the constructed model.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: Hyperparameters, metric/kernel compatibility, and
//!   duplicate assignments are checked when `.build()` is called.
//! * **Type-Safe**: Generic over `Float` types for flexible precision.
//!
//! ## Key concepts
//!
//! * **Caller-supplied neighborhoods**: The model consumes precomputed
//!   nearest-neighbor index tensors; it never searches for neighbors itself.
//! * **Configuration Flow**: `MuyGps::builder().kernel(..).build()?`, then
//!   `regress`, `fast_coefficients`/`fast_regress`, or `scale` on the model.
//! * **Multivariate models**: [`MultivariateMuyGps`] fits one kernel per
//!   response dimension over a shared distance metric.

use core::fmt::Debug;

// External dependencies
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};

// Internal dependencies
use crate::algorithms::fast::{
    fast_posterior_mean, fast_posterior_mean_multimodel, fast_precompute,
};
use crate::algorithms::scale::analytic_scale;
use crate::algorithms::solve::{homoscedastic_perturb, posterior, posterior_mean};

// Publicly re-exported types
pub use crate::engine::tensors::{
    make_fast_regress_tensors, make_regress_tensors, make_train_tensors, FastRegressTensors,
    RegressTensors, TrainTensors,
};
pub use crate::math::distance::DistanceMetric;
pub use crate::math::kernel::{KernelFunction, Smoothness};
pub use crate::math::linalg::FloatLinalg;
pub use crate::math::special::FloatSpecial;
pub use crate::primitives::errors::MuyGpsError;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for configuring a [`MuyGps`] model.
#[derive(Debug, Clone)]
pub struct MuyGpsBuilder<T: FloatLinalg + FloatSpecial + Debug> {
    /// Covariance kernel family.
    pub kernel: Option<KernelFunction<T>>,

    /// Distance metric (defaults to the kernel's compatible metric).
    pub metric: Option<DistanceMetric>,

    /// Homoscedastic noise nugget added to each local covariance diagonal.
    pub eps: Option<T>,

    /// Kernel selector string, parsed at build time.
    pub(crate) kernel_selector: Option<(String, Option<T>, T)>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: FloatLinalg + FloatSpecial + Debug> Default for MuyGpsBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatLinalg + FloatSpecial + Debug> MuyGpsBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            kernel: None,
            metric: None,
            eps: None,
            kernel_selector: None,
            duplicate_param: None,
        }
    }

    /// Set the covariance kernel.
    pub fn kernel(mut self, kernel: KernelFunction<T>) -> Self {
        if self.kernel.is_some() || self.kernel_selector.is_some() {
            self.duplicate_param = Some("kernel");
        }
        self.kernel = Some(kernel);
        self
    }

    /// Set the kernel by selector string (`"rbf"`, `"matern_0.5"`, ...).
    ///
    /// The selector is parsed when `.build()` is called, so an unknown name
    /// surfaces as a configuration error from `build` rather than a panic.
    pub fn kernel_name(mut self, name: &str, nu: Option<T>, length_scale: T) -> Self {
        if self.kernel.is_some() || self.kernel_selector.is_some() {
            self.duplicate_param = Some("kernel");
        }
        self.kernel_selector = Some((name.to_string(), nu, length_scale));
        self
    }

    /// Set the distance metric explicitly.
    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        if self.metric.is_some() {
            self.duplicate_param = Some("metric");
        }
        self.metric = Some(metric);
        self
    }

    /// Set the homoscedastic noise nugget.
    pub fn eps(mut self, eps: T) -> Self {
        if self.eps.is_some() {
            self.duplicate_param = Some("eps");
        }
        self.eps = Some(eps);
        self
    }

    /// Validate the configuration and construct the model.
    pub fn build(self) -> Result<MuyGps<T>, MuyGpsError> {
        if let Some(parameter) = self.duplicate_param {
            return Err(MuyGpsError::DuplicateParameter { parameter });
        }

        let kernel = match (self.kernel, self.kernel_selector) {
            (Some(kernel), _) => kernel,
            (None, Some((name, nu, length_scale))) => {
                KernelFunction::parse(&name, nu, length_scale)?
            }
            (None, None) => KernelFunction::Matern {
                smoothness: Smoothness::Half,
                length_scale: T::one(),
            },
        };
        kernel.validate()?;

        let metric = self.metric.unwrap_or_else(|| kernel.compatible_metric());
        if metric != kernel.compatible_metric() {
            return Err(MuyGpsError::IncompatibleMetric {
                kernel: kernel.name(),
                required: kernel.compatible_metric().name(),
                got: metric.name(),
            });
        }

        let eps = self.eps.unwrap_or_else(|| {
            T::from(1e-5).unwrap_or_else(T::epsilon)
        });
        if !eps.is_finite() || eps < T::zero() {
            return Err(MuyGpsError::InvalidHyperparameter {
                name: "eps",
                value: eps.to_f64().unwrap_or(f64::NAN),
            });
        }

        Ok(MuyGps { kernel, metric, eps })
    }
}

// ============================================================================
// Model
// ============================================================================

/// A configured MuyGPs model: kernel, metric, and noise nugget.
///
/// The model owns no data. All regression methods take feature matrices,
/// target matrices, and nearest-neighbor index tensors per call, so one model
/// serves any number of datasets.
#[derive(Debug, Clone)]
pub struct MuyGps<T: FloatLinalg + FloatSpecial + Debug> {
    kernel: KernelFunction<T>,
    metric: DistanceMetric,
    eps: T,
}

impl<T: FloatLinalg + FloatSpecial + Debug> MuyGps<T> {
    /// Start configuring a model.
    pub fn builder() -> MuyGpsBuilder<T> {
        MuyGpsBuilder::new()
    }

    /// The configured kernel.
    pub fn kernel(&self) -> &KernelFunction<T> {
        &self.kernel
    }

    /// The configured distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The configured noise nugget.
    pub fn eps(&self) -> T {
        self.eps
    }

    // ------------------------------------------------------------------------
    // Kernel Tensors
    // ------------------------------------------------------------------------

    /// Evaluate the nugget-perturbed local covariance tensor `K + eps·I`.
    pub fn covariance(&self, pairwise_dists: &Array3<T>) -> Array3<T> {
        let k = self.kernel.pairwise(pairwise_dists);
        homoscedastic_perturb(&k, self.eps)
    }

    /// Evaluate the query-to-neighbor cross-covariance tensor.
    pub fn cross_covariance(&self, crosswise_dists: &Array2<T>) -> Array2<T> {
        self.kernel.crosswise(crosswise_dists)
    }

    // ------------------------------------------------------------------------
    // Regression
    // ------------------------------------------------------------------------

    /// Predict posterior means and diagonal variances for a query batch.
    ///
    /// `batch_indices` selects query rows of `test_features` (or of
    /// `train_features` when `test_features` is `None`), and
    /// `batch_nn_indices` their nearest training neighbors. Returns the
    /// `(batch, response)` means and `(batch,)` variances.
    pub fn regress<'a>(
        &self,
        batch_indices: ArrayView1<'_, usize>,
        batch_nn_indices: ArrayView2<'_, usize>,
        test_features: Option<ArrayView2<'a, T>>,
        train_features: ArrayView2<'a, T>,
        train_targets: ArrayView2<'_, T>,
    ) -> Result<(Array2<T>, Array1<T>), MuyGpsError> {
        let tensors = make_regress_tensors(
            self.metric,
            batch_indices,
            batch_nn_indices,
            test_features,
            train_features,
            train_targets,
        )?;
        let k = self.covariance(&tensors.pairwise_dists);
        let kcross = self.cross_covariance(&tensors.crosswise_dists);
        posterior(&k, &kcross, &tensors.batch_nn_targets)
    }

    /// Predict posterior means only for a query batch.
    pub fn regress_mean<'a>(
        &self,
        batch_indices: ArrayView1<'_, usize>,
        batch_nn_indices: ArrayView2<'_, usize>,
        test_features: Option<ArrayView2<'a, T>>,
        train_features: ArrayView2<'a, T>,
        train_targets: ArrayView2<'_, T>,
    ) -> Result<Array2<T>, MuyGpsError> {
        let tensors = make_regress_tensors(
            self.metric,
            batch_indices,
            batch_nn_indices,
            test_features,
            train_features,
            train_targets,
        )?;
        let k = self.covariance(&tensors.pairwise_dists);
        let kcross = self.cross_covariance(&tensors.crosswise_dists);
        posterior_mean(&k, &kcross, &tensors.batch_nn_targets)
    }

    /// Estimate the variance scale σ² per response dimension over a batch.
    ///
    /// Multiply the diagonal variances returned by [`MuyGps::regress`] by
    /// σ²_r to obtain calibrated predictive variances.
    pub fn scale(
        &self,
        batch_indices: ArrayView1<'_, usize>,
        batch_nn_indices: ArrayView2<'_, usize>,
        train_features: ArrayView2<'_, T>,
        train_targets: ArrayView2<'_, T>,
    ) -> Result<Array1<T>, MuyGpsError> {
        let tensors = make_regress_tensors(
            self.metric,
            batch_indices,
            batch_nn_indices,
            None,
            train_features,
            train_targets,
        )?;
        let k = self.covariance(&tensors.pairwise_dists);
        analytic_scale(&k, &tensors.batch_nn_targets)
    }

    // ------------------------------------------------------------------------
    // Fast Prediction
    // ------------------------------------------------------------------------

    /// Precompute the per-training-point coefficient tensor for fast
    /// prediction.
    ///
    /// `nn_indices` must carry one neighbor row per training point. Returns
    /// the `(train, nn, response)` coefficient tensor consumed by
    /// [`MuyGps::fast_regress`].
    pub fn fast_coefficients(
        &self,
        nn_indices: ArrayView2<'_, usize>,
        train_features: ArrayView2<'_, T>,
        train_targets: ArrayView2<'_, T>,
    ) -> Result<Array3<T>, MuyGpsError> {
        let tensors: FastRegressTensors<T> =
            make_fast_regress_tensors(self.metric, nn_indices, train_features, train_targets)?;
        let k = self.covariance(&tensors.pairwise_dists);
        fast_precompute(&k, &tensors.batch_nn_targets)
    }

    /// Predict posterior means for queries from precomputed coefficients.
    ///
    /// For each query, `closest_train` names its single nearest training
    /// point and `nn_indices_fast` the augmented neighbor tensor returned
    /// alongside the coefficients (row `t` begins with `t` itself). The
    /// query's cross-covariance is taken against the augmented neighborhood
    /// of its closest training point and contracted with that point's
    /// coefficients.
    pub fn fast_regress(
        &self,
        coeffs: &Array3<T>,
        closest_train: ArrayView1<'_, usize>,
        nn_indices_fast: ArrayView2<'_, usize>,
        test_features: ArrayView2<'_, T>,
        train_features: ArrayView2<'_, T>,
    ) -> Result<Array2<T>, MuyGpsError> {
        let kcross = self.fast_cross_covariance(
            closest_train,
            nn_indices_fast,
            test_features,
            train_features,
        )?;
        let gathered = gather_coefficients(coeffs, closest_train)?;
        fast_posterior_mean(&kcross, &gathered)
    }

    /// Cross-covariance between queries and their closest training point's
    /// augmented neighborhood.
    fn fast_cross_covariance(
        &self,
        closest_train: ArrayView1<'_, usize>,
        nn_indices_fast: ArrayView2<'_, usize>,
        test_features: ArrayView2<'_, T>,
        train_features: ArrayView2<'_, T>,
    ) -> Result<Array2<T>, MuyGpsError> {
        if closest_train.len() != test_features.dim().0 {
            return Err(MuyGpsError::ShapeMismatch {
                context: "query count",
                expected: test_features.dim().0,
                got: closest_train.len(),
            });
        }
        let train_count = train_features.dim().0;
        for &t in closest_train.iter() {
            if t >= nn_indices_fast.dim().0 || t >= train_count {
                return Err(MuyGpsError::IndexOutOfBounds {
                    index: t,
                    point_count: train_count.min(nn_indices_fast.dim().0),
                });
            }
        }

        // Gather each query's neighborhood row, then measure crosswise
        // distances from the query itself.
        let nn_count = nn_indices_fast.dim().1;
        let mut query_neighbors = Array2::zeros((closest_train.len(), nn_count));
        for (b, &t) in closest_train.iter().enumerate() {
            for i in 0..nn_count {
                query_neighbors[[b, i]] = nn_indices_fast[[t, i]];
            }
        }
        let query_indices: Array1<usize> = (0..closest_train.len()).collect();

        let crosswise_dists = crate::math::distance::crosswise_distances(
            test_features,
            train_features,
            query_indices.view(),
            query_neighbors.view(),
            self.metric,
        );
        Ok(self.cross_covariance(&crosswise_dists))
    }
}

// ============================================================================
// Multivariate Model
// ============================================================================

/// A multivariate MuyGPs model: one independently-configured kernel per
/// response dimension, sharing a distance metric and neighbor structure.
#[derive(Debug, Clone)]
pub struct MultivariateMuyGps<T: FloatLinalg + FloatSpecial + Debug> {
    models: Vec<MuyGps<T>>,
}

impl<T: FloatLinalg + FloatSpecial + Debug> MultivariateMuyGps<T> {
    /// Construct from one model per response dimension.
    ///
    /// All models must share a distance metric, since a single pair of
    /// distance tensors feeds every per-response kernel.
    pub fn new(models: Vec<MuyGps<T>>) -> Result<Self, MuyGpsError> {
        if models.is_empty() {
            return Err(MuyGpsError::EmptyTensor("model list"));
        }
        let metric = models[0].metric();
        for model in &models[1..] {
            if model.metric() != metric {
                return Err(MuyGpsError::IncompatibleMetric {
                    kernel: model.kernel().name(),
                    required: metric.name(),
                    got: model.metric().name(),
                });
            }
        }
        Ok(Self { models })
    }

    /// Number of response dimensions.
    pub fn response_count(&self) -> usize {
        self.models.len()
    }

    /// The per-response models.
    pub fn models(&self) -> &[MuyGps<T>] {
        &self.models
    }

    /// Predict posterior means and diagonal variances for a query batch.
    ///
    /// Each response dimension is regressed under its own kernel; means are
    /// `(batch, response)` and variances `(batch, response)`.
    pub fn regress<'a>(
        &self,
        batch_indices: ArrayView1<'_, usize>,
        batch_nn_indices: ArrayView2<'_, usize>,
        test_features: Option<ArrayView2<'a, T>>,
        train_features: ArrayView2<'a, T>,
        train_targets: ArrayView2<'_, T>,
    ) -> Result<(Array2<T>, Array2<T>), MuyGpsError> {
        self.check_targets(train_targets)?;
        let metric = self.models[0].metric();
        let tensors = make_regress_tensors(
            metric,
            batch_indices,
            batch_nn_indices,
            test_features,
            train_features,
            train_targets,
        )?;

        let batch_count = tensors.crosswise_dists.dim().0;
        let mut mean = Array2::zeros((batch_count, self.models.len()));
        let mut variance = Array2::zeros((batch_count, self.models.len()));

        for (r, model) in self.models.iter().enumerate() {
            let k = model.covariance(&tensors.pairwise_dists);
            let kcross = model.cross_covariance(&tensors.crosswise_dists);
            let targets_r = tensors
                .batch_nn_targets
                .index_axis(Axis(2), r)
                .insert_axis(Axis(2))
                .to_owned();
            let (mean_r, variance_r) = posterior(&k, &kcross, &targets_r)?;
            for b in 0..batch_count {
                mean[[b, r]] = mean_r[[b, 0]];
                variance[[b, r]] = variance_r[b];
            }
        }

        Ok((mean, variance))
    }

    /// Precompute per-training-point coefficients for every response model.
    pub fn fast_coefficients(
        &self,
        nn_indices: ArrayView2<'_, usize>,
        train_features: ArrayView2<'_, T>,
        train_targets: ArrayView2<'_, T>,
    ) -> Result<Array3<T>, MuyGpsError> {
        self.check_targets(train_targets)?;
        let metric = self.models[0].metric();
        let tensors =
            make_fast_regress_tensors(metric, nn_indices, train_features, train_targets)?;

        let (train_count, nn_count, response_count) = tensors.batch_nn_targets.dim();
        let mut coeffs = Array3::zeros((train_count, nn_count, response_count));

        for (r, model) in self.models.iter().enumerate() {
            let k = model.covariance(&tensors.pairwise_dists);
            let targets_r = tensors
                .batch_nn_targets
                .index_axis(Axis(2), r)
                .insert_axis(Axis(2))
                .to_owned();
            let coeffs_r = fast_precompute(&k, &targets_r)?;
            for t in 0..train_count {
                for i in 0..nn_count {
                    coeffs[[t, i, r]] = coeffs_r[[t, i, 0]];
                }
            }
        }

        Ok(coeffs)
    }

    /// Predict posterior means from precomputed multivariate coefficients.
    ///
    /// Each response dimension contracts its own cross-covariance against its
    /// own coefficient slice.
    pub fn fast_regress(
        &self,
        coeffs: &Array3<T>,
        closest_train: ArrayView1<'_, usize>,
        nn_indices_fast: ArrayView2<'_, usize>,
        test_features: ArrayView2<'_, T>,
        train_features: ArrayView2<'_, T>,
    ) -> Result<Array2<T>, MuyGpsError> {
        let batch_count = closest_train.len();
        let nn_count = nn_indices_fast.dim().1;
        let response_count = self.models.len();

        let mut kcross = Array3::zeros((batch_count, nn_count, response_count));
        for (r, model) in self.models.iter().enumerate() {
            let kcross_r = model.fast_cross_covariance(
                closest_train,
                nn_indices_fast,
                test_features,
                train_features,
            )?;
            for b in 0..batch_count {
                for i in 0..nn_count {
                    kcross[[b, i, r]] = kcross_r[[b, i]];
                }
            }
        }

        let gathered = gather_coefficients(coeffs, closest_train)?;
        fast_posterior_mean_multimodel(&kcross, &gathered)
    }

    /// Check that the target matrix carries one column per model.
    fn check_targets(&self, train_targets: ArrayView2<'_, T>) -> Result<(), MuyGpsError> {
        if train_targets.dim().1 != self.models.len() {
            return Err(MuyGpsError::ShapeMismatch {
                context: "response axis",
                expected: self.models.len(),
                got: train_targets.dim().1,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Gather each query's coefficient block by its closest training point.
fn gather_coefficients<T: FloatLinalg>(
    coeffs: &Array3<T>,
    closest_train: ArrayView1<'_, usize>,
) -> Result<Array3<T>, MuyGpsError> {
    let (train_count, nn_count, response_count) = coeffs.dim();
    let mut gathered = Array3::zeros((closest_train.len(), nn_count, response_count));
    for (b, &t) in closest_train.iter().enumerate() {
        if t >= train_count {
            return Err(MuyGpsError::IndexOutOfBounds {
                index: t,
                point_count: train_count,
            });
        }
        for i in 0..nn_count {
            for r in 0..response_count {
                gathered[[b, i, r]] = coeffs[[t, i, r]];
            }
        }
    }
    Ok(gathered)
}
