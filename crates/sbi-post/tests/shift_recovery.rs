//! End-to-end check: simulate, train, build, sample, recover the shift.

use ndarray::array;

use sbi_core::{Distribution, RngHandle};
use sbi_infer::{InferenceEngine, LinearGaussian};
use sbi_post::Posterior;
use sbi_prior::BoxUniform;
use sbi_sim::{simulate, GaussianShift, SimulateConfig};

#[test]
fn posterior_concentrates_on_the_inverse_shift() {
    let prior = BoxUniform::symmetric(2.0, 3).unwrap();
    let simulator = GaussianShift::new(3, 1.0, 0.1).unwrap();
    let mut config = SimulateConfig::default();
    config.num_simulations = 500;
    config.seed_policy.master_seed = 2024;

    let records = simulate(&prior, &simulator, &config).unwrap();
    assert_eq!(records.len(), 500);

    let mut engine = InferenceEngine::new(
        Box::new(prior.clone()),
        Box::new(LinearGaussian::default()),
    );
    engine.append_set(&records).unwrap();
    let model = engine.train(2024).unwrap();
    let posterior = Posterior::new(model, Box::new(prior.clone())).unwrap();

    let x_observed = array![0.0, 0.0, 0.0];
    let mut rng = RngHandle::from_seed(2024);
    let (draws, report) = posterior
        .sample(10_000, x_observed.view(), &mut rng)
        .unwrap();

    assert_eq!(draws.nrows(), 10_000);
    assert!(!report.low_acceptance);
    for row in draws.rows() {
        assert!(prior.contains(row));
    }

    // x = θ + 1, so conditioning on the origin puts the mass near -1.
    for dim in 0..3 {
        let mean = draws.column(dim).sum() / draws.nrows() as f64;
        assert!(
            (mean + 1.0).abs() < 0.1,
            "dimension {dim} posterior mean {mean} not near -1"
        );
    }
}
