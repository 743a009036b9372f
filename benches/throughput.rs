use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use calclog::{
    core::{
        adapter::{DocumentAdapter, RelationalAdapter},
        coordinator::PersistenceCoordinator,
    },
    persist::sqlite::{SqliteDocumentStore, SqliteRelationalStore},
    types::Flavor,
};

fn coordinator() -> PersistenceCoordinator {
    PersistenceCoordinator::new(
        RelationalAdapter::new(SqliteRelationalStore::open_in_memory().expect("rel")),
        DocumentAdapter::new(SqliteDocumentStore::open_in_memory().expect("doc")),
    )
}

fn bench_saves(c: &mut Criterion) {
    c.bench_function("coordinator_save_1k", |b| {
        b.iter(|| {
            let coord = coordinator();
            for i in 0..1_000i64 {
                coord.save(Flavor::Independent, "plus", i + 1, &[i, 1]);
            }
        });
    });
}

fn bench_fetch(c: &mut Criterion) {
    let mut group = c.benchmark_group("fetch_all");
    for n in [100usize, 1_000, 10_000] {
        let coord = coordinator();
        for i in 0..n as i64 {
            coord.save(Flavor::Stack, "times", i * 2, &[i, 2]);
        }
        for selector in ["POSTGRES", "MONGO"] {
            group.bench_with_input(BenchmarkId::new(selector, n), &n, |b, _| {
                b.iter(|| {
                    let _ = coord.fetch(selector);
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_saves, bench_fetch);
criterion_main!(benches);
