use ndarray::{s, Array2, Axis};
use rayon::prelude::*;

use sbi_core::errors::ErrorInfo;
use sbi_core::{Distribution, RngHandle, SbiError, SimulationSet, Simulator};

use crate::config::SimulateConfig;
use crate::seeds;

/// Snapshot of driver progress handed to the optional callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressInfo {
    /// Simulations finished so far.
    pub completed: usize,
    /// Total simulations requested.
    pub total: usize,
}

/// Draws parameters from `proposal` and simulates them in aligned batches.
///
/// The returned record set preserves draw order: row `i` of the parameter
/// block is the `i`-th proposal draw and row `i` of the observation block is
/// its simulation. Results are identical for any `workers` setting because
/// each batch consumes its own RNG substream.
pub fn simulate(
    proposal: &dyn Distribution,
    simulator: &dyn Simulator,
    config: &SimulateConfig,
) -> Result<SimulationSet, SbiError> {
    simulate_with_progress(proposal, simulator, config, |_info: &ProgressInfo| {})
}

/// Same as [`simulate`], reporting progress after completed batches.
///
/// With `workers > 0` the callback fires once after the parallel fan-out
/// finishes; progress reporting is diagnostic only and never affects the
/// returned records.
pub fn simulate_with_progress<F>(
    proposal: &dyn Distribution,
    simulator: &dyn Simulator,
    config: &SimulateConfig,
    mut progress: F,
) -> Result<SimulationSet, SbiError>
where
    F: FnMut(&ProgressInfo),
{
    if config.num_simulations == 0 {
        return Err(SbiError::Simulator(ErrorInfo::new(
            "no-simulations",
            "requested zero simulations",
        )));
    }
    if config.batch_size == 0 {
        return Err(SbiError::Simulator(ErrorInfo::new(
            "zero-batch",
            "batch size must be at least one",
        )));
    }
    if proposal.dim() != simulator.theta_dim() {
        return Err(SbiError::Shape(
            ErrorInfo::new(
                "proposal-simulator-dim",
                "proposal and simulator disagree on parameter dimensionality",
            )
            .with_context("proposal", proposal.dim().to_string())
            .with_context("simulator", simulator.theta_dim().to_string()),
        ));
    }

    let master_seed = config.seed_policy.master_seed;
    let total = config.num_simulations;
    let mut draw_rng = RngHandle::from_seed(seeds::draw_seed(master_seed));
    let thetas = proposal.sample(total, &mut draw_rng)?;

    let mut batches = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + config.batch_size).min(total);
        batches.push((batches.len(), start, end));
        start = end;
    }

    let run_batch = |&(index, start, end): &(usize, usize, usize)| {
        let mut rng = RngHandle::from_seed(seeds::batch_seed(master_seed, index));
        let xs = simulator.simulate_batch(thetas.slice(s![start..end, ..]), &mut rng)?;
        if xs.nrows() != end - start {
            return Err(SbiError::Simulator(
                ErrorInfo::new("batch-arity", "simulator returned a misaligned batch")
                    .with_context("batch", index.to_string())
                    .with_context("expected", (end - start).to_string())
                    .with_context("got", xs.nrows().to_string()),
            ));
        }
        Ok((index, xs))
    };

    let mut outputs: Vec<(usize, Array2<f64>)> = if config.workers == 0 {
        let mut collected = Vec::with_capacity(batches.len());
        for batch in &batches {
            collected.push(run_batch(batch)?);
            let completed = batch.2;
            progress(&ProgressInfo { completed, total });
        }
        collected
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|err| {
                SbiError::Simulator(ErrorInfo::new("worker-pool", err.to_string()))
            })?;
        let collected =
            pool.install(|| batches.par_iter().map(run_batch).collect::<Result<Vec<_>, _>>())?;
        progress(&ProgressInfo {
            completed: total,
            total,
        });
        collected
    };

    // Workers may finish out of order; reassemble into draw order.
    outputs.sort_by_key(|(index, _)| *index);
    let views: Vec<_> = outputs.iter().map(|(_, xs)| xs.view()).collect();
    let xs = ndarray::concatenate(Axis(0), &views).map_err(|err| {
        SbiError::Shape(ErrorInfo::new("batch-concat", err.to_string()))
    })?;

    let mut records = SimulationSet::new();
    records.append(thetas.view(), xs.view())?;
    Ok(records)
}
