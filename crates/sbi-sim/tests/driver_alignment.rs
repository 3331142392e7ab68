use ndarray::ArrayView1;

use sbi_core::{RngHandle, SbiError};
use sbi_prior::BoxUniform;
use sbi_sim::{simulate, simulate_with_progress, SimulateConfig, SimulatorFn};

type RowFn = fn(ArrayView1<'_, f64>, &mut RngHandle) -> Result<Vec<f64>, SbiError>;

fn identity_row(theta: ArrayView1<'_, f64>, _rng: &mut RngHandle) -> Result<Vec<f64>, SbiError> {
    Ok(theta.to_vec())
}

fn identity_simulator() -> SimulatorFn<RowFn> {
    SimulatorFn::new(2, 2, identity_row as RowFn)
}

fn config(num_simulations: usize) -> SimulateConfig {
    let mut config = SimulateConfig::default();
    config.num_simulations = num_simulations;
    config.batch_size = 7;
    config
}

#[test]
fn records_preserve_draw_alignment() {
    let prior = BoxUniform::symmetric(1.0, 2).unwrap();
    let simulator = identity_simulator();
    let records = simulate(&prior, &simulator, &config(25)).unwrap();
    assert_eq!(records.len(), 25);
    assert_eq!(records.thetas(), records.xs());
}

#[test]
fn progress_reaches_total_in_draw_order() {
    let prior = BoxUniform::symmetric(1.0, 2).unwrap();
    let simulator = identity_simulator();
    let mut seen = Vec::new();
    simulate_with_progress(&prior, &simulator, &config(20), |info| {
        seen.push(info.completed);
    })
    .unwrap();
    assert_eq!(seen.last(), Some(&20));
    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn zero_simulations_is_an_error() {
    let prior = BoxUniform::symmetric(1.0, 2).unwrap();
    let simulator = identity_simulator();
    let err = simulate(&prior, &simulator, &config(0)).unwrap_err();
    assert_eq!(err.info().code, "no-simulations");
}

#[test]
fn dimension_disagreement_is_rejected_up_front() {
    let prior = BoxUniform::symmetric(1.0, 3).unwrap();
    let simulator = identity_simulator();
    let err = simulate(&prior, &simulator, &config(5)).unwrap_err();
    assert_eq!(err.info().code, "proposal-simulator-dim");
}
