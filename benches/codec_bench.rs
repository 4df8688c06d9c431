// In: benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arrow::array::ArrayRef;
use schemaferry::vector::codec::{decode_column, encode_column};
use schemaferry::vector::{vectors_to_array, NumericVector};

// --- Mock Data Generation ---

/// Rows where roughly one coordinate in ten is non-zero; decode picks sparse.
fn generate_mostly_zero_rows(rows: usize, size: usize) -> Vec<Option<NumericVector>> {
    (0..rows)
        .map(|r| {
            let indices: Vec<u32> = (0..size as u32).filter(|i| (*i as usize + r) % 10 == 0).collect();
            let values = indices.iter().map(|i| *i as f64 * 0.5 + 1.0).collect();
            NumericVector::sparse(size, indices, values).ok()
        })
        .collect()
}

/// Rows with every coordinate non-zero; decode picks dense.
fn generate_full_rows(rows: usize, size: usize) -> Vec<Option<NumericVector>> {
    (0..rows)
        .map(|r| Some(NumericVector::dense((0..size).map(|i| (i + r) as f64 + 0.25).collect())))
        .collect()
}

// --- Benchmark Suite ---

const BENCH_ROWS: usize = 4096;
const BENCH_VECTOR_SIZE: usize = 128;

fn bench_vector_codec(c: &mut Criterion) {
    let inputs: Vec<(&str, ArrayRef)> = vec![
        (
            "Mostly Zero",
            vectors_to_array(generate_mostly_zero_rows(BENCH_ROWS, BENCH_VECTOR_SIZE)).unwrap(),
        ),
        (
            "Full",
            vectors_to_array(generate_full_rows(BENCH_ROWS, BENCH_VECTOR_SIZE)).unwrap(),
        ),
    ];

    let mut group = c.benchmark_group("Vector Column Codec");
    group.throughput(criterion::Throughput::Elements(BENCH_ROWS as u64));

    for (label, column) in &inputs {
        let encoded = encode_column(column.as_ref()).unwrap();

        group.bench_function(format!("Encode ({})", label), |b| {
            b.iter(|| black_box(encode_column(black_box(column.as_ref()))))
        });
        group.bench_function(format!("Decode ({})", label), |b| {
            b.iter(|| black_box(decode_column(black_box(encoded.as_ref()))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vector_codec);
criterion_main!(benches);
