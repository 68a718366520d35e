use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quality_gate::config::{GateConfig, KsMethod};
use quality_gate::drift::ks::ks_2samp;
use quality_gate::drift::DriftDetector;
use quality_gate::gate::QualityGate;
use quality_gate::schema::validate;
use quality_gate::dataset::Dataset;
use quality_gate::test_fixtures::{employee_schema, uniform_features};

fn benchmark_ks_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("ks_2samp");

    for n in [100, 500, 1000] {
        let a = uniform_features(1, n, 0.0, 1);
        let b = uniform_features(1, n, 5.0, 2);
        let a = a.columns()[0].data().as_f64_vec().unwrap();
        let b = b.columns()[0].data().as_f64_vec().unwrap();
        group.throughput(Throughput::Elements((2 * n) as u64));

        for method in [KsMethod::Exact, KsMethod::Asymptotic] {
            group.bench_with_input(
                BenchmarkId::new(format!("{method:?}").to_lowercase(), n),
                &(&a, &b),
                |bench, (a, b)| {
                    bench.iter(|| ks_2samp(std::hint::black_box(a), std::hint::black_box(b), method));
                },
            );
        }
    }

    group.finish();
}

fn benchmark_detector_parallelism(c: &mut Criterion) {
    let mut group = c.benchmark_group("drift_detector");
    let reference = uniform_features(32, 5000, 0.0, 11);
    let current = uniform_features(32, 5000, 2.0, 12);

    for parallel in [false, true] {
        let detector =
            DriftDetector::from_config(&GateConfig::default().with_parallel(parallel)).unwrap();
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(BenchmarkId::new(label, "32x5000"), |b| {
            b.iter(|| detector.detect(&reference, &current));
        });
    }

    group.finish();
}

fn benchmark_gate_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_run");
    let schema = employee_schema();

    for rows in [1_000usize, 10_000] {
        let reference = employees(rows, 0);
        let shifted = employees(rows, 25_000);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(BenchmarkId::new("validate", rows), &reference, |b, data| {
            b.iter(|| validate(data, &schema));
        });

        let gate = QualityGate::new(GateConfig::default()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("full", rows),
            &(&reference, &shifted),
            |b, (reference, current)| {
                b.iter(|| gate.run(reference, current, &schema));
            },
        );
    }

    group.finish();
}

fn employees(rows: usize, salary_offset: i64) -> Dataset {
    let countries = ["US", "UK", "IN", "CA", "DE"];
    Dataset::builder()
        .int_column("age", (0..rows).map(|i| 18 + (i % 60) as i64).collect())
        .float_column(
            "salary",
            (0..rows)
                .map(|i| (30_000 + salary_offset + (i as i64 * 37) % 90_000) as f64)
                .collect(),
        )
        .text_column("country", (0..rows).map(|i| countries[i % 5]).collect())
        .build()
        .unwrap()
}

criterion_group!(
    benches,
    benchmark_ks_methods,
    benchmark_detector_parallelism,
    benchmark_gate_run
);
criterion_main!(benches);
