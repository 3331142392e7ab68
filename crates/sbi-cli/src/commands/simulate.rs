use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};

use sbi_core::utc_timestamp;
use sbi_prior::PriorSpec;
use sbi_sim::{simulate_with_progress, SimulateConfig, SimulatorSpec};

use crate::manifest::RunManifest;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// YAML configuration describing the prior, simulator and driver.
    #[arg(long)]
    pub config: PathBuf,
    /// Output path for the records JSON file.
    #[arg(long, default_value = "records.json")]
    pub out: PathBuf,
    /// Optional manifest path; skipped when absent.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// Print per-batch progress to stderr.
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

/// YAML schema of the `simulate` command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRunConfig {
    /// Prior the parameters are drawn from.
    pub prior: PriorSpec,
    /// Simulator mapping parameters to observations.
    pub simulator: SimulatorSpec,
    /// Driver settings (simulation count, batching, workers, seed).
    #[serde(flatten)]
    pub driver: SimulateConfig,
}

#[derive(Debug, Serialize)]
struct SimulateReport {
    records_file: String,
    num_simulations: usize,
    records_hash: String,
    seed: u64,
}

pub fn run(args: &SimulateArgs) -> Result<(), Box<dyn Error>> {
    let raw = fs::read_to_string(&args.config)
        .map_err(|err| format!("cannot read {}: {err}", args.config.display()))?;
    let config: SimulationRunConfig = serde_yaml::from_str(&raw)?;

    let prior = config.prior.build()?;
    let simulator = config.simulator.build()?;

    let show_progress = args.progress;
    let records = simulate_with_progress(
        prior.as_ref(),
        simulator.as_ref(),
        &config.driver,
        |info| {
            if show_progress {
                eprintln!("simulated {}/{}", info.completed, info.total);
            }
        },
    )?;
    records.store(&args.out)?;
    let records_hash = records.canonical_hash()?;

    if let Some(manifest_path) = &args.manifest {
        let manifest = RunManifest {
            schema_version: Default::default(),
            seed: config.driver.seed_policy.master_seed,
            seed_label: config.driver.seed_policy.label.clone(),
            num_simulations: records.len(),
            records_file: args.out.clone(),
            records_hash: records_hash.clone(),
            created_at: utc_timestamp(),
        };
        manifest.write(manifest_path)?;
    }

    let report = SimulateReport {
        records_file: args.out.display().to_string(),
        num_simulations: records.len(),
        records_hash,
        seed: config.driver.seed_policy.master_seed,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
