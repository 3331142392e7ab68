use ndarray::array;

use sbi_core::{RngHandle, SbiError};
use sbi_infer::{InferenceEngine, LinearGaussian};
use sbi_post::Posterior;
use sbi_prior::BoxUniform;
use sbi_sim::{simulate, GaussianShift, SimulateConfig};

fn trained_posterior(seed: u64) -> Posterior {
    let prior = BoxUniform::symmetric(2.0, 3).unwrap();
    let simulator = GaussianShift::new(3, 1.0, 0.1).unwrap();
    let mut config = SimulateConfig::default();
    config.num_simulations = 300;
    config.seed_policy.master_seed = seed;
    let records = simulate(&prior, &simulator, &config).unwrap();

    let mut engine = InferenceEngine::new(
        Box::new(prior.clone()),
        Box::new(LinearGaussian::default()),
    );
    engine.append_set(&records).unwrap();
    let model = engine.train(seed).unwrap();
    Posterior::new(model, Box::new(prior)).unwrap()
}

#[test]
fn sample_returns_exactly_n_rows_inside_support() {
    let posterior = trained_posterior(101);
    let prior = BoxUniform::symmetric(2.0, 3).unwrap();
    let mut rng = RngHandle::from_seed(7);
    let (draws, report) = posterior
        .sample(257, array![0.0, 0.0, 0.0].view(), &mut rng)
        .unwrap();
    assert_eq!(draws.nrows(), 257);
    assert!(report.drawn >= 257);
    assert!(report.acceptance_rate > 0.0 && report.acceptance_rate <= 1.0);
    for row in draws.rows() {
        assert!(sbi_core::Distribution::contains(&prior, row));
    }
}

#[test]
fn sample_zero_is_empty() {
    let posterior = trained_posterior(102);
    let mut rng = RngHandle::from_seed(8);
    let (draws, report) = posterior
        .sample(0, array![0.0, 0.0, 0.0].view(), &mut rng)
        .unwrap();
    assert_eq!(draws.nrows(), 0);
    assert_eq!(report.drawn, 0);
    assert!(!report.low_acceptance);
}

#[test]
fn log_prob_outside_support_is_an_error() {
    let posterior = trained_posterior(103);
    let err = posterior
        .log_prob(array![5.0, 0.0, 0.0].view(), array![0.0, 0.0, 0.0].view())
        .unwrap_err();
    assert_eq!(err.info().code, "outside-prior-support");
    assert!(matches!(err, SbiError::Posterior(_)));
}

#[test]
fn log_prob_inside_support_is_finite() {
    let posterior = trained_posterior(104);
    let value = posterior
        .log_prob(array![-1.0, -1.0, -1.0].view(), array![0.0, 0.0, 0.0].view())
        .unwrap();
    assert!(value.is_finite());
}

#[test]
fn leakage_is_high_for_a_well_supported_model() {
    let posterior = trained_posterior(105);
    let mut rng = RngHandle::from_seed(9);
    let leakage = posterior
        .leakage(array![0.0, 0.0, 0.0].view(), 2000, &mut rng)
        .unwrap();
    assert!(leakage > 0.9, "acceptance fraction {leakage} unexpectedly low");
}

#[test]
fn display_names_the_model_family_and_policy() {
    let posterior = trained_posterior(106);
    let summary = posterior.to_string();
    assert!(summary.contains("linear-gaussian"));
    assert!(summary.contains("rejection"));
}

#[test]
fn mismatched_observation_width_is_rejected() {
    let posterior = trained_posterior(107);
    let mut rng = RngHandle::from_seed(10);
    let err = posterior
        .sample(5, array![0.0, 0.0].view(), &mut rng)
        .unwrap_err();
    assert_eq!(err.info().code, "x-dim");
}
