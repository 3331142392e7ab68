use std::fmt;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use sbi_core::errors::ErrorInfo;
use sbi_core::{ConditionalDensity, Density, Distribution, RngHandle, SbiError};

/// Acceptance rate below which a sampling round is flagged in the report.
const LOW_ACCEPTANCE_THRESHOLD: f64 = 0.05;

/// Minimum candidate batch drawn per rejection round.
const MIN_CANDIDATE_BATCH: usize = 512;

/// Diagnostics describing one posterior sampling call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    /// Samples the caller asked for.
    pub requested: usize,
    /// Candidate draws taken from the model.
    pub drawn: usize,
    /// Fraction of candidates that fell inside the prior support.
    pub acceptance_rate: f64,
    /// Whether the acceptance rate fell below the diagnostic threshold.
    pub low_acceptance: bool,
}

/// Conditional distribution over parameters given a fixed observation.
///
/// Binds one fitted model to the prior it was trained under. Sampling
/// rejects model draws outside the prior support and redraws until the
/// requested count is reached; the loop has no timeout, but terminates
/// almost surely whenever the model places mass inside the support.
pub struct Posterior {
    model: Box<dyn ConditionalDensity>,
    prior: Box<dyn Distribution>,
}

impl Posterior {
    /// Binds a trained model and the matching prior.
    pub fn new(
        model: Box<dyn ConditionalDensity>,
        prior: Box<dyn Distribution>,
    ) -> Result<Self, SbiError> {
        if model.theta_dim() != prior.dim() {
            return Err(SbiError::Posterior(
                ErrorInfo::new(
                    "model-prior-dim",
                    "model and prior disagree on parameter dimensionality",
                )
                .with_context("model", model.theta_dim().to_string())
                .with_context("prior", prior.dim().to_string()),
            ));
        }
        Ok(Self { model, prior })
    }

    /// Parameter dimensionality of the posterior.
    pub fn theta_dim(&self) -> usize {
        self.model.theta_dim()
    }

    /// Observation dimensionality the posterior conditions on.
    pub fn x_dim(&self) -> usize {
        self.model.x_dim()
    }

    /// Draws exactly `num_samples` accepted samples conditioned on `x_observed`.
    ///
    /// Returns the accepted rows in acceptance order together with a
    /// [`SampleReport`]. `num_samples == 0` returns an empty batch without
    /// touching the model.
    pub fn sample(
        &self,
        num_samples: usize,
        x_observed: ArrayView1<'_, f64>,
        rng: &mut RngHandle,
    ) -> Result<(Array2<f64>, SampleReport), SbiError> {
        self.check_observation(x_observed)?;
        if num_samples == 0 {
            return Ok((
                Array2::zeros((0, self.theta_dim())),
                SampleReport {
                    requested: 0,
                    drawn: 0,
                    acceptance_rate: 1.0,
                    low_acceptance: false,
                },
            ));
        }

        let mut accepted = Array2::zeros((num_samples, self.theta_dim()));
        let mut num_accepted = 0;
        let mut drawn = 0usize;
        while num_accepted < num_samples {
            let remaining = num_samples - num_accepted;
            let chunk = remaining.max(MIN_CANDIDATE_BATCH);
            let candidates = self.model.sample(chunk, x_observed, rng)?;
            drawn += chunk;
            for candidate in candidates.rows() {
                if num_accepted == num_samples {
                    break;
                }
                if self.prior.contains(candidate) {
                    accepted.row_mut(num_accepted).assign(&candidate);
                    num_accepted += 1;
                }
            }
        }

        let acceptance_rate = num_samples as f64 / drawn as f64;
        Ok((
            accepted,
            SampleReport {
                requested: num_samples,
                drawn,
                acceptance_rate,
                low_acceptance: acceptance_rate < LOW_ACCEPTANCE_THRESHOLD,
            },
        ))
    }

    /// Conditional log-density of `theta` given `x_observed`.
    ///
    /// Out-of-support parameters are an error under the rejection policy
    /// rather than `-∞`; callers probing support should ask the prior.
    pub fn log_prob(
        &self,
        theta: ArrayView1<'_, f64>,
        x_observed: ArrayView1<'_, f64>,
    ) -> Result<f64, SbiError> {
        self.check_observation(x_observed)?;
        if theta.len() != self.theta_dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("theta-dim", "parameter has unexpected dimensionality")
                    .with_context("expected", self.theta_dim().to_string())
                    .with_context("got", theta.len().to_string()),
            ));
        }
        if !self.prior.contains(theta) {
            return Err(SbiError::Posterior(
                ErrorInfo::new(
                    "outside-prior-support",
                    "log-density queried outside the prior support",
                )
                .with_hint("posterior mass outside the support is rejected, not evaluated"),
            ));
        }
        self.model.log_prob(theta, x_observed)
    }

    /// Monte-Carlo estimate of the model mass inside the prior support.
    ///
    /// This is the acceptance fraction of the rejection sampler; values near
    /// one mean almost no leakage.
    pub fn leakage(
        &self,
        x_observed: ArrayView1<'_, f64>,
        num_draws: usize,
        rng: &mut RngHandle,
    ) -> Result<f64, SbiError> {
        self.check_observation(x_observed)?;
        if num_draws == 0 {
            return Err(SbiError::Posterior(ErrorInfo::new(
                "zero-draws",
                "leakage estimation needs at least one draw",
            )));
        }
        let candidates = self.model.sample(num_draws, x_observed, rng)?;
        let inside = candidates
            .rows()
            .into_iter()
            .filter(|row| self.prior.contains(*row))
            .count();
        Ok(inside as f64 / num_draws as f64)
    }

    /// Prior log-density helper exposed for analysis tooling.
    pub fn prior_log_prob(&self, theta: ArrayView1<'_, f64>) -> Result<f64, SbiError> {
        self.prior.log_prob(theta)
    }

    /// Pins the observation, yielding a [`Density`] over θ for analysis tooling.
    ///
    /// Unlike [`Posterior::log_prob`], the pinned view reports `-∞` outside
    /// the prior support so grid evaluators can sweep whole axis ranges.
    pub fn pinned(&self, x_observed: ArrayView1<'_, f64>) -> Result<PinnedPosterior<'_>, SbiError> {
        self.check_observation(x_observed)?;
        Ok(PinnedPosterior {
            posterior: self,
            x_observed: x_observed.to_owned(),
        })
    }

    fn check_observation(&self, x: ArrayView1<'_, f64>) -> Result<(), SbiError> {
        if x.len() != self.x_dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("x-dim", "observation has unexpected dimensionality")
                    .with_context("expected", self.x_dim().to_string())
                    .with_context("got", x.len().to_string()),
            ));
        }
        Ok(())
    }
}

/// Posterior density over θ with the observation fixed.
pub struct PinnedPosterior<'a> {
    posterior: &'a Posterior,
    x_observed: ndarray::Array1<f64>,
}

impl Density for PinnedPosterior<'_> {
    fn dim(&self) -> usize {
        self.posterior.theta_dim()
    }

    fn log_prob(&self, theta: ArrayView1<'_, f64>) -> Result<f64, SbiError> {
        if theta.len() != self.dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("theta-dim", "parameter has unexpected dimensionality")
                    .with_context("expected", self.dim().to_string())
                    .with_context("got", theta.len().to_string()),
            ));
        }
        if !self.posterior.prior.contains(theta) {
            return Ok(f64::NEG_INFINITY);
        }
        self.posterior.model.log_prob(theta, self.x_observed.view())
    }
}

impl fmt::Display for Posterior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Posterior over {}-dimensional parameters built from a {} conditional density \
             estimator. Draws are accepted by rejection against the prior support: \
             out-of-support candidates are discarded and redrawn until the requested count \
             is reached.",
            self.theta_dim(),
            self.model.family()
        )
    }
}
