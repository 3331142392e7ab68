use criterion::{criterion_group, criterion_main, Criterion};

use sbi_prior::BoxUniform;
use sbi_sim::{simulate, GaussianShift, SimulateConfig};

fn bench_driver(c: &mut Criterion) {
    let prior = BoxUniform::symmetric(2.0, 3).unwrap();
    let simulator = GaussianShift::new(3, 1.0, 0.1).unwrap();
    let mut config = SimulateConfig::default();
    config.num_simulations = 512;
    config.batch_size = 64;

    c.bench_function("simulate_serial", |b| {
        b.iter(|| {
            let _ = simulate(&prior, &simulator, &config).unwrap();
        })
    });

    let mut parallel = config.clone();
    parallel.workers = 4;
    c.bench_function("simulate_workers4", |b| {
        b.iter(|| {
            let _ = simulate(&prior, &simulator, &parallel).unwrap();
        })
    });
}

criterion_group!(benches, bench_driver);
criterion_main!(benches);
