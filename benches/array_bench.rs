//! Benchmarks for `Array` against the standard `Vec`.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use xqarray::prelude::*;

const SIZES: [usize; 3] = [100, 1000, 10000];

// =============================================================================
// snoc / cons Benchmark
// =============================================================================

fn benchmark_snoc(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("snoc");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("Array", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut array = Array::new();
                for index in 0..size {
                    array = array.snoc(black_box(index));
                }
                black_box(array)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for index in 0..size {
                    vector.push(black_box(index));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

fn benchmark_cons(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("cons");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("Array", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut array = Array::new();
                for index in 0..size {
                    array = array.cons(black_box(index));
                }
                black_box(array)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in SIZES {
        let array: Array<usize> = (0..size).collect();
        let vector: Vec<usize> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("Array", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0;
                for index in 0..size {
                    if let Ok(&value) = array.get(black_box(index)) {
                        sum += value;
                    }
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0;
                for index in 0..size {
                    if let Some(&value) = vector.get(black_box(index)) {
                        sum += value;
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Structural Benchmarks
// =============================================================================

fn benchmark_concat(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("concat");

    for size in SIZES {
        let first: Array<usize> = (0..size).collect();
        let second: Array<usize> = (size..size * 2).collect();

        group.bench_with_input(BenchmarkId::new("Array", size), &size, |bencher, _| {
            bencher.iter(|| black_box(first.concat(black_box(&second))));
        });
    }

    group.finish();
}

fn benchmark_sub_array(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("sub_array");

    for size in SIZES {
        let array: Array<usize> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("Array", size), &size, |bencher, &size| {
            bencher.iter(|| black_box(array.sub_array(black_box(size / 4), size / 2)));
        });
    }

    group.finish();
}

fn benchmark_builder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("builder");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("ArrayBuilder", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut builder = ArrayBuilder::new();
                for index in 0..size {
                    builder.append(black_box(index));
                }
                black_box(builder.finish())
            });
        });
    }

    group.finish();
}

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in SIZES {
        let array: Array<usize> = (0..size).collect();
        let vector: Vec<usize> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("Array", size), &size, |bencher, _| {
            bencher.iter(|| black_box(array.iter().sum::<usize>()));
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, _| {
            bencher.iter(|| black_box(vector.iter().sum::<usize>()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_snoc,
    benchmark_cons,
    benchmark_get,
    benchmark_concat,
    benchmark_sub_array,
    benchmark_builder,
    benchmark_iteration
);
criterion_main!(benches);
