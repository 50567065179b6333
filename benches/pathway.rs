//! Criterion benchmarks for the songpath learning core.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use songpath::landscape::RewardLandscape;
use songpath::learning::{LearningLoop, LoopConfig};
use songpath::pathway::{PathwayConfig, PathwayModel};

fn cue(width: usize) -> Vec<f32> {
    let mut v = vec![0.0; width];
    v[1] = 1.0;
    v
}

/// Benchmark forward() with growing hidden layers (two channels).
fn bench_forward_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_size");

    for hidden in [50usize, 100, 200, 400].iter() {
        group.throughput(Throughput::Elements((*hidden * *hidden * 2) as u64));

        group.bench_with_input(BenchmarkId::new("one_hot", hidden), hidden, |b, &hidden| {
            let cfg = PathwayConfig::default()
                .with_layers(100, hidden, hidden * 2)
                .with_seed(42);
            let mut model = PathwayModel::new(cfg).unwrap();
            let input = cue(100);

            b.iter(|| black_box(model.forward(&input).unwrap()));
        });
    }

    group.finish();
}

/// Dense input touches every row of the plastic projection.
fn bench_forward_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_dense");

    group.bench_function("reference_dense_input", |b| {
        let mut model = PathwayModel::new(PathwayConfig::default().with_seed(42)).unwrap();
        let input: Vec<f32> = (0..100).map(|i| (i as f32 * 0.37).sin()).collect();

        b.iter(|| black_box(model.forward(&input).unwrap()));
    });

    group.finish();
}

/// Benchmark whole trials: forward, reward, baseline, Hebbian update.
fn bench_trials(c: &mut Criterion) {
    let mut group = c.benchmark_group("trials");

    for trials in [100usize, 1000].iter() {
        group.throughput(Throughput::Elements(*trials as u64));

        group.bench_with_input(BenchmarkId::new("reference", trials), trials, |b, &trials| {
            let input = cue(100);
            b.iter(|| {
                let mut lp = LearningLoop::new(
                    PathwayConfig::default().with_seed(42),
                    RewardLandscape::reference(),
                    LoopConfig::default(),
                )
                .unwrap();
                black_box(lp.run(trials, 0.1, &input).unwrap().mean_reward)
            });
        });
    }

    group.finish();
}

/// Benchmark landscape grid evaluation (the plotting path).
fn bench_landscape(c: &mut Criterion) {
    let mut group = c.benchmark_group("landscape");

    group.bench_function("grid_50", |b| {
        let land = RewardLandscape::reference_with_decoy();
        b.iter(|| black_box(land.reward_grid((-2.0, 2.0), (-2.0, 2.0), 50).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_forward_sizes,
    bench_forward_dense,
    bench_trials,
    bench_landscape,
);

criterion_main!(benches);
