//! Inference engine handle accumulating simulations and producing models.

use ndarray::ArrayView2;

use sbi_core::errors::ErrorInfo;
use sbi_core::{ConditionalDensity, DensityEstimator, Distribution, SbiError, SimulationSet};

/// Lifecycle states of an [`InferenceEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Records may be appended; no model has been produced yet.
    Accumulating,
    /// At least one model has been produced; appending remains valid.
    Trained,
}

/// Owns the accumulated record set and the estimator seam.
///
/// Appending is valid in both states; training consumes the full cumulative
/// record set every time, so a retrain after further appends sees strictly
/// more data. The handle is not internally synchronised: concurrent appends
/// must be serialised by the caller.
pub struct InferenceEngine {
    prior: Box<dyn Distribution>,
    estimator: Box<dyn DensityEstimator>,
    records: SimulationSet,
    state: EngineState,
    trained_on: Vec<usize>,
}

impl InferenceEngine {
    /// Creates an engine in the accumulating state with an empty record set.
    pub fn new(prior: Box<dyn Distribution>, estimator: Box<dyn DensityEstimator>) -> Self {
        Self {
            prior,
            estimator,
            records: SimulationSet::new(),
            state: EngineState::Accumulating,
            trained_on: Vec::new(),
        }
    }

    /// Appends aligned (θ, x) batches to the record set.
    ///
    /// The parameter width must match the prior; all other validation is the
    /// record set's. A rejected append mutates nothing.
    pub fn append_simulations(
        &mut self,
        thetas: ArrayView2<'_, f64>,
        xs: ArrayView2<'_, f64>,
    ) -> Result<(), SbiError> {
        if thetas.ncols() != self.prior.dim() {
            return Err(SbiError::Shape(
                ErrorInfo::new("theta-prior-dim", "parameter width disagrees with the prior")
                    .with_context("prior", self.prior.dim().to_string())
                    .with_context("got", thetas.ncols().to_string()),
            ));
        }
        self.records.append(thetas, xs)
    }

    /// Appends a whole record set, e.g. the output of the simulation driver.
    pub fn append_set(&mut self, records: &SimulationSet) -> Result<(), SbiError> {
        if records.is_empty() {
            return Ok(());
        }
        self.append_simulations(records.thetas().view(), records.xs().view())
    }

    /// Trains a density model on the full accumulated record set.
    ///
    /// Each call retrains from scratch; there is no incremental fine-tuning.
    pub fn train(&mut self, seed: u64) -> Result<Box<dyn ConditionalDensity>, SbiError> {
        if self.records.is_empty() {
            return Err(SbiError::Train(
                ErrorInfo::new("empty-records", "train called before any append")
                    .with_hint("run the simulation driver and append its records first"),
            ));
        }
        let model = self.estimator.fit(&self.records, seed)?;
        self.trained_on.push(self.records.len());
        self.state = EngineState::Trained;
        Ok(model)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Read access to the accumulated records.
    pub fn records(&self) -> &SimulationSet {
        &self.records
    }

    /// Record counts consumed by each completed training call, in order.
    pub fn training_history(&self) -> &[usize] {
        &self.trained_on
    }

    /// The prior the engine was constructed with.
    pub fn prior(&self) -> &dyn Distribution {
        self.prior.as_ref()
    }

    /// The estimator behind the training seam.
    pub fn estimator(&self) -> &dyn DensityEstimator {
        self.estimator.as_ref()
    }
}
