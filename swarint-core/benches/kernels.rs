//! Bulk kernels over slices of packed words against their plain-integer
//! counterparts. Each packed input holds the same number of logical lanes as
//! the scalar baseline, so throughput is comparable element for element.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use swarint_core::{Packed15x64, Packed7x32, PackedInt, Word};

const SIZES: &[usize] = &[1 << 10, 1 << 14, 1 << 18];

fn packed_operands<const BITS: u32, W: Word>(
    len: usize,
) -> (Vec<PackedInt<BITS, W>>, Vec<PackedInt<BITS, W>>) {
    let x = PackedInt::<BITS, W>::encode([1]);
    let mut y = PackedInt::<BITS, W>::new();
    for lane in 0..PackedInt::<BITS, W>::LANES as usize {
        y.set(lane, 2);
    }
    (vec![x; len], vec![y; len])
}

fn scalar_operands(len: usize, lanes: usize) -> (Vec<i32>, Vec<i32>) {
    (vec![1; len * lanes], vec![2; len * lanes])
}

fn bench_xpy(c: &mut Criterion) {
    let mut group = c.benchmark_group("xpy");
    for &len in SIZES {
        group.throughput(Throughput::Elements((len * 4) as u64));

        let (x, y) = scalar_operands(len, 4);
        group.bench_with_input(BenchmarkId::new("i32x4", len), &len, |b, _| {
            b.iter(|| {
                let z: Vec<i32> = x.iter().zip(&y).map(|(a, b)| a + b).collect();
                black_box(z)
            })
        });

        let (x, y) = packed_operands::<7, u32>(len);
        group.bench_with_input(BenchmarkId::new("packed7x32", len), &len, |b, _| {
            b.iter(|| {
                let z: Vec<Packed7x32> = x.iter().zip(&y).map(|(&a, &b)| a + b).collect();
                black_box(z)
            })
        });
    }
    group.finish();
}

fn bench_elemwise_max(c: &mut Criterion) {
    let mut group = c.benchmark_group("elemwise_max");
    for &len in SIZES {
        group.throughput(Throughput::Elements((len * 4) as u64));

        let (x, y) = scalar_operands(len, 4);
        group.bench_with_input(BenchmarkId::new("i32x4", len), &len, |b, _| {
            b.iter(|| {
                let z: Vec<i32> = x.iter().zip(&y).map(|(a, b)| *a.max(b)).collect();
                black_box(z)
            })
        });

        let (x, y) = packed_operands::<7, u32>(len);
        group.bench_with_input(BenchmarkId::new("packed7x32", len), &len, |b, _| {
            b.iter(|| {
                let z: Vec<Packed7x32> = x.iter().zip(&y).map(|(&a, &b)| a.max(b)).collect();
                black_box(z)
            })
        });
    }
    group.finish();
}

fn bench_sum_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_reduction");
    for &len in SIZES {
        group.throughput(Throughput::Elements((len * 4) as u64));

        let (x, _) = scalar_operands(len, 4);
        group.bench_with_input(BenchmarkId::new("i32x4", len), &len, |b, _| {
            b.iter(|| black_box(x.iter().fold(0i64, |acc, &v| acc + i64::from(v))))
        });

        // packed adds all the way down, one horizontal sum at the end
        let (x, _) = packed_operands::<15, u64>(len);
        group.bench_with_input(BenchmarkId::new("packed15x64", len), &len, |b, _| {
            b.iter(|| {
                let total = x
                    .iter()
                    .fold(Packed15x64::new(), |acc, &v| acc + v)
                    .sum();
                black_box(total)
            })
        });

        // per-word horizontal sums into a plain accumulator
        let (x, _) = packed_operands::<15, u64>(len);
        group.bench_with_input(BenchmarkId::new("packed15x64_horizontal", len), &len, |b, _| {
            b.iter(|| black_box(x.iter().fold(0i64, |acc, v| acc + v.sum())))
        });
    }
    group.finish();
}

fn bench_max_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("max_reduction");
    for &len in SIZES {
        group.throughput(Throughput::Elements((len * 4) as u64));

        let (x, _) = scalar_operands(len, 4);
        group.bench_with_input(BenchmarkId::new("i32x4", len), &len, |b, _| {
            b.iter(|| black_box(x.iter().copied().fold(i32::MIN, i32::max)))
        });

        let (x, _) = packed_operands::<7, u32>(len);
        group.bench_with_input(BenchmarkId::new("packed7x32", len), &len, |b, _| {
            b.iter(|| {
                let folded = x
                    .iter()
                    .fold(Packed7x32::min_value(), |acc, &v| acc.max(v));
                black_box(folded.max_element())
            })
        });
    }
    group.finish();
}

fn bench_promoted_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("promoted_sum_reduction");
    for &len in SIZES {
        group.throughput(Throughput::Elements((len * 2) as u64));

        let (x, _) = scalar_operands(len, 2);
        group.bench_with_input(BenchmarkId::new("i32x2", len), &len, |b, _| {
            b.iter(|| black_box(x.iter().fold(0i64, |acc, &v| acc + i64::from(v))))
        });

        // narrow stream, double-width accumulator, no per-word unpacking
        let (x, _) = packed_operands::<15, u32>(len);
        group.bench_with_input(BenchmarkId::new("packed15x32_to_31x64", len), &len, |b, _| {
            b.iter(|| {
                let total = x
                    .iter()
                    .fold(PackedInt::<31, u64>::new(), |acc, &v| acc + v)
                    .sum();
                black_box(total)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_xpy,
    bench_elemwise_max,
    bench_sum_reduction,
    bench_max_reduction,
    bench_promoted_reduction
);
criterion_main!(benches);
