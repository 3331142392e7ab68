use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use indexmap::IndexMap;
use ndarray::Array1;
use serde::Serialize;

use sbi_analysis::{pairplot as build_pairplot, render_svg, PairplotConfig};
use sbi_core::RngHandle;
use sbi_infer::{InferenceEngine, LinearGaussian};
use sbi_post::{Posterior, SampleReport};
use sbi_prior::BoxUniform;
use sbi_sim::{simulate, GaussianShift, SimulateConfig};

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Master seed for simulation, training provenance and sampling.
    #[arg(long, default_value_t = 2024)]
    pub seed: u64,
    /// Number of simulations to run before training.
    #[arg(long, default_value_t = 500)]
    pub num_simulations: usize,
    /// Number of accepted posterior samples to draw.
    #[arg(long, default_value_t = 10_000)]
    pub num_samples: usize,
    /// Optional SVG path for a pairplot of the posterior samples.
    #[arg(long)]
    pub pairplot: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DemoProvenance {
    seed: u64,
    num_simulations: usize,
    prior: String,
    simulator: String,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    provenance: DemoProvenance,
    records_hash: String,
    posterior: String,
    sampling: SampleReport,
    leakage: f64,
    posterior_mean: Vec<f64>,
    pairplot_file: Option<String>,
}

pub fn run(args: &DemoArgs) -> Result<(), Box<dyn Error>> {
    let report = build_demo_report(args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_demo_report(args: &DemoArgs) -> Result<DemoReport, Box<dyn Error>> {
    let prior = BoxUniform::symmetric(2.0, 3)?;
    let simulator = GaussianShift::new(3, 1.0, 0.1)?;
    let mut config = SimulateConfig::default();
    config.num_simulations = args.num_simulations;
    config.seed_policy.master_seed = args.seed;

    let records = simulate(&prior, &simulator, &config)?;
    let records_hash = records.canonical_hash()?;

    let mut engine = InferenceEngine::new(
        Box::new(prior.clone()),
        Box::new(LinearGaussian::default()),
    );
    engine.append_set(&records)?;
    let model = engine.train(args.seed)?;
    let posterior = Posterior::new(model, Box::new(prior))?;

    let x_observed = Array1::zeros(3);
    let mut rng = RngHandle::from_seed(args.seed);
    let (draws, sampling) = posterior.sample(args.num_samples, x_observed.view(), &mut rng)?;
    let leakage = posterior.leakage(x_observed.view(), 1000, &mut rng)?;

    let posterior_mean: Vec<f64> = (0..posterior.theta_dim())
        .map(|dim| {
            if draws.nrows() == 0 {
                0.0
            } else {
                draws.column(dim).sum() / draws.nrows() as f64
            }
        })
        .collect();

    let pairplot_file = match &args.pairplot {
        Some(path) => {
            let axes: IndexMap<String, (f64, f64)> = (0..3)
                .map(|index| (format!("theta{index}"), (-2.0, 2.0)))
                .collect();
            let grid = build_pairplot(draws.view(), &PairplotConfig::new(axes))?;
            render_svg(&grid, path)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    Ok(DemoReport {
        provenance: DemoProvenance {
            seed: args.seed,
            num_simulations: args.num_simulations,
            prior: "box-uniform [-2, 2]^3".to_string(),
            simulator: "gaussian-shift (+1, sigma 0.1)".to_string(),
        },
        records_hash,
        posterior: posterior.to_string(),
        sampling,
        leakage,
        posterior_mean,
        pairplot_file,
    })
}
