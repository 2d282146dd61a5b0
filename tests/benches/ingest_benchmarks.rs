//! # TerraClaim Ingest Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Cell-key canonicalization | < 1µs per key |
//! | 50-entry batch validation | < 50µs |
//! | 50-cell claim batch on a fresh node | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use serde_json::{json, Value};
use shared_types::CellKey;
use tc_03_batch_validation::BatchValidator;
use tc_04_claim_ledger::ClaimLedgerApi;
use tc_tests::harness::{test_config, TestNode};

fn batch(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("46.{:04},2.{:04}", i * 7, i * 11)).collect()
}

fn bench_cell_key_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("tc-03-cell-keys");
    group.bench_function("parse_canonical", |b| {
        b.iter(|| black_box(CellKey::parse(black_box("48.8566,2.3522"))))
    });
    group.bench_function("parse_rounding", |b| {
        b.iter(|| black_box(CellKey::parse(black_box("-33.868820,151.209290"))))
    });
    group.finish();
}

fn bench_batch_validation(c: &mut Criterion) {
    let validator = BatchValidator::default();
    let mut cells: Vec<Value> = batch(45).into_iter().map(Value::from).collect();
    cells.extend((0..5).map(|i| json!(format!("bad-{i}"))));
    let cells = Value::Array(cells);

    let mut group = c.benchmark_group("tc-03-batch-validation");
    group.throughput(Throughput::Elements(50));
    group.bench_function("validate_cells_50", |b| {
        b.iter(|| black_box(validator.validate_cells(&cells)))
    });
    group.finish();
}

fn bench_claim_batch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let cells: Vec<CellKey> = batch(50)
        .iter()
        .map(|raw| CellKey::parse(raw).unwrap())
        .collect();

    let mut group = c.benchmark_group("tc-04-claim-ledger");
    group.throughput(Throughput::Elements(50));
    group.bench_function("claim_batch_50", |b| {
        b.to_async(&runtime).iter_batched(
            || TestNode::new(test_config()),
            |node| {
                let cells = cells.clone();
                async move {
                    black_box(node.container.ledger.claim_batch(&cells, "bench").await)
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_cell_key_parse,
    bench_batch_validation,
    bench_claim_batch
);
criterion_main!(benches);
