//! Encode/decode throughput over a tabular-heavy document, the shape TOON
//! is optimized for.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use std::hint::black_box;
use toondb_core::{decode, encode};

fn product_catalog(rows: usize) -> Value {
    let products: Vec<Value> = (0..rows)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("Product {i}"),
                "price": (i as f64) * 1.5 + 0.99,
                "stock": i % 37,
                "category": if i % 2 == 0 { "hardware" } else { "software" }
            })
        })
        .collect();
    json!({"products": products})
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for rows in [10, 100, 1000] {
        let data = product_catalog(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| encode(black_box(data)));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for rows in [10, 100, 1000] {
        let toon = encode(&product_catalog(rows));
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &toon, |b, toon| {
            b.iter(|| decode(black_box(toon)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
