#![deny(missing_docs)]
#![doc = "Core traits and data types for the SBI toolkit: distributions, simulators, conditional density estimators, and the aligned simulation record set they exchange."]

use ndarray::{Array2, ArrayView1, ArrayView2};

pub mod errors;
pub mod provenance;
pub mod records;
pub mod rng;

pub use errors::{ErrorInfo, SbiError};
pub use provenance::{utc_timestamp, RunProvenance, SchemaVersion};
pub use records::SimulationSet;
pub use rng::{derive_substream_seed, RngHandle};

/// A density over parameter vectors supporting log-density queries.
///
/// `log_prob` returns the natural logarithm of the density at `theta`;
/// implementations return `f64::NEG_INFINITY` outside their support rather
/// than erroring, so callers can use the value directly in accept/reject
/// arithmetic. Shape violations are errors.
pub trait Density: Send + Sync {
    /// Dimensionality of the parameter vectors this density is defined over.
    fn dim(&self) -> usize;

    /// Evaluates the log-density at a single parameter vector.
    fn log_prob(&self, theta: ArrayView1<'_, f64>) -> Result<f64, SbiError>;
}

/// A distribution that can also be sampled and tested for support membership.
///
/// Priors and proposals implement this trait; the simulation driver only
/// requires `sample`, while the posterior wrapper additionally relies on
/// `contains` for its rejection policy.
pub trait Distribution: Density {
    /// Draws `num_samples` independent parameter vectors, one per row.
    fn sample(&self, num_samples: usize, rng: &mut RngHandle) -> Result<Array2<f64>, SbiError>;

    /// Returns whether `theta` lies within the support of the distribution.
    fn contains(&self, theta: ArrayView1<'_, f64>) -> bool;
}

/// Batched mapping from parameter vectors to simulated observation vectors.
///
/// Given N input rows the simulator must return exactly N aligned output
/// rows. A failure for any row fails the whole batch; no partial results are
/// defined. Implementations draw any internal noise from the provided RNG
/// handle so that runs are reproducible from a seed.
pub trait Simulator: Send + Sync {
    /// Dimensionality of the parameter vectors the simulator accepts.
    fn theta_dim(&self) -> usize;

    /// Dimensionality of the observation vectors the simulator produces.
    fn obs_dim(&self) -> usize;

    /// Maps a batch of parameter vectors to aligned observation vectors.
    fn simulate_batch(
        &self,
        thetas: ArrayView2<'_, f64>,
        rng: &mut RngHandle,
    ) -> Result<Array2<f64>, SbiError>;
}

/// A fitted conditional density model p(θ | x).
///
/// The artifact is immutable once built; a new training call produces a new
/// model. Sampling and log-density queries condition on an observation
/// vector of the dimensionality the model was trained with.
pub trait ConditionalDensity: Send + Sync + std::fmt::Debug {
    /// Dimensionality of the parameter vectors.
    fn theta_dim(&self) -> usize;

    /// Dimensionality of the conditioning observation vectors.
    fn x_dim(&self) -> usize;

    /// Draws `num_samples` parameter vectors conditioned on `x`, one per row.
    fn sample(
        &self,
        num_samples: usize,
        x: ArrayView1<'_, f64>,
        rng: &mut RngHandle,
    ) -> Result<Array2<f64>, SbiError>;

    /// Evaluates the conditional log-density of `theta` given `x`.
    fn log_prob(&self, theta: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>)
        -> Result<f64, SbiError>;

    /// Short label naming the model family for diagnostic display.
    fn family(&self) -> &'static str;
}

/// Fits a conditional density model from an accumulated record set.
///
/// The estimator is the seam to the density-estimation machinery: the
/// inference engine never inspects the fitted artifact beyond the
/// [`ConditionalDensity`] contract.
pub trait DensityEstimator: Send + Sync {
    /// Fits a model on the full record set.
    fn fit(&self, records: &SimulationSet, seed: u64)
        -> Result<Box<dyn ConditionalDensity>, SbiError>;

    /// Short label naming the estimator for manifests and summaries.
    fn name(&self) -> &'static str;
}
