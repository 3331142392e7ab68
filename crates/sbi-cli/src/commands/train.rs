use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use sbi_core::SimulationSet;
use sbi_infer::LinearGaussian;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Records JSON file produced by the `simulate` command.
    #[arg(long)]
    pub records: PathBuf,
    /// Output path for the fitted model JSON file.
    #[arg(long, default_value = "model.json")]
    pub out: PathBuf,
    /// Ridge strength for the least-squares fit.
    #[arg(long, default_value_t = 1e-6)]
    pub ridge: f64,
    /// Diagonal jitter for the residual covariance.
    #[arg(long, default_value_t = 1e-9)]
    pub jitter: f64,
    /// Seed recorded in the model provenance.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Debug, Serialize)]
struct TrainReport {
    model_file: String,
    num_records: usize,
    records_hash: String,
    estimator: &'static str,
}

pub fn run(args: &TrainArgs) -> Result<(), Box<dyn Error>> {
    let records = SimulationSet::load(&args.records)?;
    let estimator = LinearGaussian {
        ridge: args.ridge,
        jitter: args.jitter,
    };
    let model = estimator.fit_model(&records, args.seed)?;
    model.store(&args.out)?;

    let report = TrainReport {
        model_file: args.out.display().to_string(),
        num_records: records.len(),
        records_hash: model.provenance().records_hash.clone(),
        estimator: "linear-gaussian",
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
