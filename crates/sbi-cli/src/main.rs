use clap::{Parser, Subcommand};

use commands::{
    demo::{self, DemoArgs},
    pairplot::{self, PairplotArgs},
    sample::{self, SampleArgs},
    simulate::{self, SimulateArgs},
    train::{self, TrainArgs},
};

mod commands;
mod manifest;

#[derive(Parser, Debug)]
#[command(name = "sbi-cli", about = "Simulation-based inference workflow CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the end-to-end shift-recovery scenario and print a JSON report.
    Demo(DemoArgs),
    /// Draw parameters from a prior and simulate them into a records file.
    Simulate(SimulateArgs),
    /// Fit the reference density estimator on a records file.
    Train(TrainArgs),
    /// Sample a posterior conditioned on an observation and export CSV.
    Sample(SampleArgs),
    /// Render a pairwise-marginal SVG from a samples CSV.
    Pairplot(PairplotArgs),
}

fn main() {
    let cli = Cli::parse();
    let outcome = match &cli.command {
        Command::Demo(args) => demo::run(args),
        Command::Simulate(args) => simulate::run(args),
        Command::Train(args) => train::run(args),
        Command::Sample(args) => sample::run(args),
        Command::Pairplot(args) => pairplot::run(args),
    };
    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
