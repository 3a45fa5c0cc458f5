use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use goal2goal::analytic::{exact_outcomes, logistic_btts};
use goal2goal::rate::estimate_rates;
use goal2goal::simulation::{build_sim_pool, with_sim_pool};
use goal2goal::{SimulationRun, TeamMatchStats, predict, simulate};

fn sample_teams() -> (TeamMatchStats, TeamMatchStats) {
    (
        TeamMatchStats::new(2.3, 0.9, 61.5, 6.8),
        TeamMatchStats::new(2.1, 1.0, 58.4, 6.1),
    )
}

fn bench_rate_estimate(c: &mut Criterion) {
    let (a, b) = sample_teams();
    c.bench_function("rate_estimate", |bch| {
        bch.iter(|| {
            let rates = estimate_rates(black_box(&a), black_box(&b), 1.5).unwrap();
            black_box(rates);
        })
    });
}

fn bench_analytic(c: &mut Criterion) {
    let (a, b) = sample_teams();
    c.bench_function("analytic_models", |bch| {
        bch.iter(|| {
            let exact = exact_outcomes(black_box(2.03), black_box(1.52));
            let logistic = logistic_btts(black_box(&a), black_box(&b));
            black_box((exact, logistic));
        })
    });
}

fn bench_simulate_10k(c: &mut Criterion) {
    c.bench_function("simulate_10k", |bch| {
        bch.iter(|| {
            let report = simulate(black_box(1.5), black_box(1.2), 10_000, 42).unwrap();
            black_box(report.btts.probability);
        })
    });
}

fn bench_simulate_1m(c: &mut Criterion) {
    let pool = build_sim_pool(1);
    let mut group = c.benchmark_group("simulate_1m");
    group.sample_size(10);
    group.bench_function("single_thread", |bch| {
        bch.iter(|| {
            let report =
                with_sim_pool(&pool, || simulate(black_box(1.5), black_box(1.2), 1_000_000, 42))
                    .unwrap();
            black_box(report.btts.probability);
        })
    });
    group.bench_function("global_pool", |bch| {
        bch.iter(|| {
            let report = simulate(black_box(1.5), black_box(1.2), 1_000_000, 42).unwrap();
            black_box(report.btts.probability);
        })
    });
    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let (a, b) = sample_teams();
    let run = SimulationRun::default().with_seed(7);
    c.bench_function("predict_default_run", |bch| {
        bch.iter(|| {
            let p = predict(black_box(&a), black_box(&b), &run).unwrap();
            black_box(p.models.final_probability);
        })
    });
}

criterion_group!(
    benches,
    bench_rate_estimate,
    bench_analytic,
    bench_simulate_10k,
    bench_simulate_1m,
    bench_predict
);
criterion_main!(benches);
