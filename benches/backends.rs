use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csv_backend_bench::backend::{BackendLoader, InterpretedBackend, NativeBackend, ParseBackend};
use csv_backend_bench::execution::Harness;
use csv_backend_bench::types::Backend;
use futures::executor::block_on;

fn people_csv(rows: usize) -> String {
    let mut out = String::with_capacity(rows * 24);
    out.push_str("id,name,age\n");
    for i in 0..rows {
        if i % 50 == 0 {
            out.push_str(&format!("{i},\"Last, First\",unknown\n"));
        } else {
            out.push_str(&format!("{i},user{i},{}\n", i % 90));
        }
    }
    out
}

fn bench_backends(c: &mut Criterion) {
    let native = Arc::new(NativeBackend::default());
    native.load().expect("native backend load");
    let interpreted = InterpretedBackend::default();

    let mut group = c.benchmark_group("parse");
    for rows in [1_000usize, 50_000] {
        let text = people_csv(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("native", rows), &text, |b, text| {
            b.iter(|| block_on(native.parse(black_box(text))).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("interpreted", rows), &text, |b, text| {
            b.iter(|| block_on(interpreted.parse(black_box(text))).unwrap())
        });
    }
    group.finish();
}

fn bench_harness(c: &mut Criterion) {
    let native = Arc::new(NativeBackend::default());
    native.load().expect("native backend load");
    let mut harness = Harness::new(native, InterpretedBackend::default());
    let text = people_csv(10_000);

    c.bench_function("harness_run_native_10k", |b| {
        b.iter(|| harness.run_blocking(black_box(&text), Backend::Native).records.len())
    });
}

criterion_group!(benches, bench_backends, bench_harness);
criterion_main!(benches);
