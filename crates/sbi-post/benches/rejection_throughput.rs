use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::array;

use sbi_core::RngHandle;
use sbi_infer::{InferenceEngine, LinearGaussian};
use sbi_post::Posterior;
use sbi_prior::BoxUniform;
use sbi_sim::{simulate, GaussianShift, SimulateConfig};

fn bench_rejection(c: &mut Criterion) {
    let prior = BoxUniform::symmetric(2.0, 3).unwrap();
    let simulator = GaussianShift::new(3, 1.0, 0.1).unwrap();
    let mut config = SimulateConfig::default();
    config.num_simulations = 500;

    let records = simulate(&prior, &simulator, &config).unwrap();
    let mut engine = InferenceEngine::new(
        Box::new(prior.clone()),
        Box::new(LinearGaussian::default()),
    );
    engine.append_set(&records).unwrap();
    let model = engine.train(42).unwrap();
    let posterior = Posterior::new(model, Box::new(prior)).unwrap();
    let x_observed = array![0.0, 0.0, 0.0];

    c.bench_function("posterior_sample_1k", |b| {
        b.iter(|| {
            let mut rng = RngHandle::from_seed(42);
            let _ = posterior
                .sample(1000, x_observed.view(), &mut rng)
                .unwrap();
        })
    });
}

criterion_group!(benches, bench_rejection);
criterion_main!(benches);
