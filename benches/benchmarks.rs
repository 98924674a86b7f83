//! Throughput benchmarks for the parse/stringify/binarize/unbinarize
//! façades, retargeted from the teacher's cross-format comparison
//! harness (`benches/benchmarks.rs`, `benches/scenarios/*`) at our own
//! codecs instead of a protobuf/msgpack/cbor shootout.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jsonvalue::{binarize, parse, stringify, unbinarize, KeyValue, Value};
use std::hint::black_box;

fn small_object() -> Value {
    Value::object(vec![
        KeyValue::new("name", "my-service"),
        KeyValue::new("version", 42),
        KeyValue::new("enabled", true),
        KeyValue::new("threshold", 0.85),
    ])
}

fn large_array(count: usize) -> Value {
    Value::array((0..count).map(|i| {
        Value::object(vec![
            KeyValue::new("x", i as f64 * 0.1),
            KeyValue::new("y", i as f64 * 0.2),
            KeyValue::new("z", i as f64 * 0.3),
        ])
    }))
}

fn nested_structs(count: usize) -> Value {
    Value::array((0..count).map(|i| {
        Value::object(vec![
            KeyValue::new("id", i as i64),
            KeyValue::new("name", format!("person-{i}")),
            KeyValue::new(
                "employer",
                Value::object(vec![
                    KeyValue::new("name", "TechCorp"),
                    KeyValue::new("employee_count", 500),
                ]),
            ),
        ])
    }))
}

fn mixed_types() -> Value {
    Value::object(vec![
        KeyValue::new("id", 12345678901234i64),
        KeyValue::new("name", "Test Record"),
        KeyValue::new(
            "tags",
            Value::array(vec![Value::from("alpha"), Value::from("beta"), Value::from("gamma")]),
        ),
        KeyValue::new(
            "scores",
            Value::array(vec![Value::from(98.5), Value::from(87.3), Value::from(92.1), Value::from(88.8)]),
        ),
        KeyValue::new(
            "metadata",
            Value::object(vec![
                KeyValue::new("source", "api"),
                KeyValue::new("version", "v2"),
                KeyValue::new("region", "us-west"),
            ]),
        ),
        KeyValue::new("active", true),
    ])
}

fn tabular(count: usize) -> Value {
    Value::array((0..count).map(|i| {
        Value::object(vec![
            KeyValue::new("id", i as i64),
            KeyValue::new("username", format!("user_{i}")),
            KeyValue::new("created_at", 1_700_000_000i64 + i as i64 * 1000),
            KeyValue::new("is_admin", i % 20 == 0),
        ])
    }))
}

fn bench_scenario(c: &mut Criterion, group_name: &str, v: &Value) {
    let mut group = c.benchmark_group(group_name);
    let text = stringify(v);
    let bin = binarize(v);

    group.bench_function(BenchmarkId::new("encode", "text"), |b| {
        b.iter(|| stringify(black_box(v)));
    });
    group.bench_function(BenchmarkId::new("encode", "binary"), |b| {
        b.iter(|| binarize(black_box(v)));
    });
    group.bench_function(BenchmarkId::new("decode", "text"), |b| {
        b.iter(|| parse(black_box(&text)).unwrap());
    });
    group.bench_function(BenchmarkId::new("decode", "binary"), |b| {
        b.iter(|| unbinarize(black_box(&bin)).unwrap());
    });
    group.finish();
}

fn small_object_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "small_object", &small_object());
}

fn large_array_100_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "large_array_100", &large_array(100));
}

fn large_array_1000_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "large_array_1000", &large_array(1000));
}

fn large_array_10000_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "large_array_10000", &large_array(10_000));
}

fn nested_structs_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "nested_structs", &nested_structs(2));
}

fn nested_structs_100_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "nested_structs_100", &nested_structs(100));
}

fn mixed_types_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "mixed_types", &mixed_types());
}

fn tabular_100_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "tabular_100", &tabular(100));
}

fn tabular_1000_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "tabular_1000", &tabular(1000));
}

fn tabular_5000_benchmarks(c: &mut Criterion) {
    bench_scenario(c, "tabular_5000", &tabular(5000));
}

criterion_group!(
    benches,
    small_object_benchmarks,
    large_array_100_benchmarks,
    large_array_1000_benchmarks,
    large_array_10000_benchmarks,
    nested_structs_benchmarks,
    nested_structs_100_benchmarks,
    mixed_types_benchmarks,
    tabular_100_benchmarks,
    tabular_1000_benchmarks,
    tabular_5000_benchmarks,
);

criterion_main!(benches);
