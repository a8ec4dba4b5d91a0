use RustedFuncAnalysis::Examples::analysis_examples::EXAMPLE_FUNCTIONS;
use RustedFuncAnalysis::{AnalysisConfig, analyze, analyze_parallel, compile, normalize, sample};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_full_reports(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let mut group = c.benchmark_group("full report");
    for input in EXAMPLE_FUNCTIONS {
        group.bench_function(input, |b| b.iter(|| analyze(black_box(input), &config)));
    }
    group.finish();
}

fn bench_parallel_vs_sequential(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    c.bench_function("sequential x*sin(x) + x^2", |b| {
        b.iter(|| analyze(black_box("x*sin(x) + x^2"), &config))
    });
    c.bench_function("parallel x*sin(x) + x^2", |b| {
        b.iter(|| analyze_parallel(black_box("x*sin(x) + x^2"), &config))
    });
}

fn bench_sampling(c: &mut Criterion) {
    let Ok(expr) = normalize("log(x - 1)/(x^2 - 4)") else { return };
    let Ok(callable) = compile(&expr) else { return };
    c.bench_function("sample 401 points", |b| {
        b.iter(|| sample(&callable, black_box((-10.0, 10.0)), 0.05))
    });
}

criterion_group!(
    benches,
    bench_full_reports,
    bench_parallel_vs_sequential,
    bench_sampling
);
criterion_main!(benches);
