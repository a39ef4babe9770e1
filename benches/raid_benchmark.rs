use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use raidcore::raid::RaidEngine;

const SIZE: usize = 64 * 1024;

fn make_buffers(nd: usize, np: usize) -> Vec<Vec<u8>> {
    (0..nd + np)
        .map(|i| vec![(0x11u8).wrapping_mul((i + 1) as u8); SIZE])
        .collect()
}

fn as_refs(buffers: &mut [Vec<u8>]) -> Vec<&mut [u8]> {
    buffers.iter_mut().map(|b| b.as_mut_slice()).collect()
}

/// Benchmarks `raid_gen` across a spread of parity counts.
fn bench_gen(c: &mut Criterion) {
    let mut group = c.benchmark_group("raid_gen");
    let engine = RaidEngine::new();
    let nd = 16;

    for np in [1usize, 2, 3, 6] {
        group.bench_with_input(BenchmarkId::from_parameter(np), &np, |b, &np| {
            let mut buffers = make_buffers(nd, np);
            b.iter(|| {
                let mut v = as_refs(&mut buffers);
                engine.gen(black_box(nd), black_box(np), black_box(SIZE), &mut v).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmarks `raid_rec` recovering a single failed data block, across parity counts.
fn bench_rec_single_failure(c: &mut Criterion) {
    let mut group = c.benchmark_group("raid_rec_single_failure");
    let mut engine = RaidEngine::new();
    let zero = vec![0u8; SIZE];
    engine.bind_zero(&zero);
    let nd = 16;

    for np in [1usize, 2, 3, 6] {
        group.bench_with_input(BenchmarkId::from_parameter(np), &np, |b, &np| {
            let mut buffers = make_buffers(nd, np);
            {
                let mut v = as_refs(&mut buffers);
                engine.gen(nd, np, SIZE, &mut v).unwrap();
            }
            b.iter(|| {
                buffers[0].fill(0);
                let mut v = as_refs(&mut buffers);
                engine.rec(black_box(&[0]), black_box(nd), black_box(np), black_box(SIZE), &mut v).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(raid_benches, bench_gen, bench_rec_single_failure);
criterion_main!(raid_benches);
