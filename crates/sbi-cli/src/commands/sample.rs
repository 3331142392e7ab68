use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use ndarray::Array1;
use serde::Serialize;

use sbi_core::RngHandle;
use sbi_infer::LinearGaussianModel;
use sbi_post::{Posterior, SampleReport};
use sbi_prior::PriorSpec;

use super::parse_vector;

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Fitted model JSON file produced by the `train` command.
    #[arg(long)]
    pub model: PathBuf,
    /// YAML file holding the prior specification used during training.
    #[arg(long)]
    pub prior: PathBuf,
    /// Observation to condition on, e.g. `0,0,0`.
    #[arg(long = "x-observed")]
    pub x_observed: String,
    /// Number of accepted posterior samples to draw.
    #[arg(long, default_value_t = 10_000)]
    pub num_samples: usize,
    /// Seed for the sampling RNG.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Output path for the samples CSV.
    #[arg(long, default_value = "samples.csv")]
    pub out: PathBuf,
    /// Draws used for the leakage estimate.
    #[arg(long, default_value_t = 1000)]
    pub leakage_draws: usize,
}

#[derive(Debug, Serialize)]
struct SampleSummary {
    samples_file: String,
    posterior: String,
    report: SampleReport,
    leakage: f64,
    posterior_mean: Vec<f64>,
}

pub fn run(args: &SampleArgs) -> Result<(), Box<dyn Error>> {
    let model = LinearGaussianModel::load(&args.model)?;
    let prior_raw = fs::read_to_string(&args.prior)
        .map_err(|err| format!("cannot read {}: {err}", args.prior.display()))?;
    let prior_spec: PriorSpec = serde_yaml::from_str(&prior_raw)?;
    let posterior = Posterior::new(Box::new(model), prior_spec.build()?)?;

    let x_observed = Array1::from(parse_vector(&args.x_observed)?);
    let mut rng = RngHandle::from_seed(args.seed);
    let (draws, report) = posterior.sample(args.num_samples, x_observed.view(), &mut rng)?;
    let leakage = posterior.leakage(x_observed.view(), args.leakage_draws.max(1), &mut rng)?;

    let mut writer = csv::Writer::from_path(&args.out)
        .map_err(|err| format!("cannot open {}: {err}", args.out.display()))?;
    let header: Vec<String> = (0..posterior.theta_dim())
        .map(|index| format!("theta{index}"))
        .collect();
    writer.write_record(&header)?;
    for row in draws.rows() {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    writer.flush()?;

    let posterior_mean = if draws.nrows() == 0 {
        vec![0.0; posterior.theta_dim()]
    } else {
        (0..posterior.theta_dim())
            .map(|dim| draws.column(dim).sum() / draws.nrows() as f64)
            .collect()
    };

    let summary = SampleSummary {
        samples_file: args.out.display().to_string(),
        posterior: posterior.to_string(),
        report,
        leakage,
        posterior_mean,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
