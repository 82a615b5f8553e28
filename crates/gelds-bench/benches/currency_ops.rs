//! Criterion micro-benchmarks for currency arithmetic, formatting, and cost curves.

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use gelds_bench::big_currency;
use gelds_core::{CostCurve, Currency, Growth};

fn bench_add_small(c: &mut Criterion) {
    let a = Currency::from(123_456u64);
    let b = Currency::from(789u64);
    c.bench_function("currency_add_small", |bench| {
        bench.iter(|| black_box(&a) + black_box(&b));
    });
}

fn bench_add_large(c: &mut Criterion) {
    let a = big_currency(120);
    let b = big_currency(119);
    c.bench_function("currency_add_120_digits", |bench| {
        bench.iter(|| black_box(&a) + black_box(&b));
    });
}

fn bench_try_subtract(c: &mut Criterion) {
    let a = big_currency(60);
    let b = big_currency(59);
    c.bench_function("currency_try_subtract_60_digits", |bench| {
        bench.iter(|| black_box(&a).try_subtract(black_box(&b)));
    });
}

fn bench_human_readable(c: &mut Criterion) {
    let values: Vec<Currency> = [4, 10, 25, 37, 60].into_iter().map(big_currency).collect();
    c.bench_function("currency_to_human_readable_mixed", |bench| {
        bench.iter(|| {
            for v in &values {
                black_box(v.to_human_readable());
            }
        });
    });
}

fn bench_curve_cost(c: &mut Criterion) {
    let curve = CostCurve::new(1000u64, 200u64, Duration::from_secs(5))
        .with_cost_growth(Growth::new(5, 2))
        .with_duration_decay(90, Duration::from_secs(2));
    c.bench_function("curve_tier_level_200", |bench| {
        bench.iter(|| curve.tier(black_box(200)));
    });
}

criterion_group!(
    benches,
    bench_add_small,
    bench_add_large,
    bench_try_subtract,
    bench_human_readable,
    bench_curve_cost
);
criterion_main!(benches);
