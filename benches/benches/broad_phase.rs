// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use sortlane_index::{Aabb2D, Backend, Index, IndexGeneric};

const CARD: u64 = 0b01;
const LANE: u64 = 0b10;

/// A board of `lanes` columns, each holding `per_lane` stacked cards. Every
/// lane is followed by its cards.
fn gen_board(lanes: usize, per_lane: usize) -> Vec<(Aabb2D<f64>, u64)> {
    let mut out = Vec::with_capacity(lanes * (per_lane + 1));
    for l in 0..lanes {
        let x0 = l as f64 * 300.0;
        out.push((
            Aabb2D::from_xywh(x0, 0.0, 280.0, per_lane as f64 * 60.0),
            LANE,
        ));
        for c in 0..per_lane {
            let y0 = c as f64 * 60.0;
            out.push((Aabb2D::from_xywh(x0 + 10.0, y0 + 5.0, 260.0, 50.0), CARD));
        }
    }
    out
}

/// Drag boxes sweeping diagonally across the board.
fn gen_drags(count: usize, width: f64, height: f64) -> Vec<Aabb2D<f64>> {
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            Aabb2D::from_xywh(t * width, t * height, 260.0, 50.0)
        })
        .collect()
}

fn fill<B: Backend<f64, u64>>(
    idx: &mut IndexGeneric<f64, u32, B, u64>,
    board: &[(Aabb2D<f64>, u64)],
) {
    for (i, &(r, mask)) in board.iter().enumerate() {
        idx.insert_with_summary(r, i as u32, mask);
    }
}

fn bench_rebuild(c: &mut Criterion) {
    fn bench<F, B>(b: &mut criterion::Bencher, board: &[(Aabb2D<f64>, u64)], make_index: F)
    where
        F: Fn() -> IndexGeneric<f64, u32, B, u64> + Clone + 'static,
        B: Backend<f64, u64> + 'static,
    {
        b.iter_batched(
            make_index,
            |mut idx| {
                fill(&mut idx, board);
                idx
            },
            BatchSize::SmallInput,
        );
    }

    let mut group = c.benchmark_group("rebuild_board");
    for &lanes in &[4_usize, 16, 64] {
        let board = gen_board(lanes, 40);
        group.throughput(Throughput::Elements(board.len() as u64));
        group.bench_function(BenchmarkId::new("FlatVec", lanes), |b| {
            bench(b, &board, Index::<f64, u32, u64>::new);
        });
        group.bench_function(BenchmarkId::new("Grid(128.)", lanes), |b| {
            bench(b, &board, || IndexGeneric::with_grid(128.0));
        });
    }
    group.finish();
}

fn bench_filtered_query(c: &mut Criterion) {
    fn bench<F, B>(
        b: &mut criterion::Bencher,
        board: &[(Aabb2D<f64>, u64)],
        drags: &[Aabb2D<f64>],
        make_index: F,
    ) where
        F: Fn() -> IndexGeneric<f64, u32, B, u64>,
        B: Backend<f64, u64>,
    {
        let mut idx = make_index();
        fill(&mut idx, board);
        b.iter(|| {
            let mut total = 0_usize;
            for drag in drags {
                idx.visit_rect_filtered(*drag, &CARD, &(), |_, _| total += 1);
            }
            black_box(total)
        });
    }

    let mut group = c.benchmark_group("filtered_query_board");
    for &lanes in &[4_usize, 16, 64] {
        let board = gen_board(lanes, 40);
        let drags = gen_drags(256, lanes as f64 * 300.0, 40.0 * 60.0);
        group.throughput(Throughput::Elements(drags.len() as u64));
        group.bench_function(BenchmarkId::new("FlatVec", lanes), |b| {
            bench(b, &board, &drags, Index::<f64, u32, u64>::new);
        });
        group.bench_function(BenchmarkId::new("Grid(128.)", lanes), |b| {
            bench(b, &board, &drags, || IndexGeneric::with_grid(128.0));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_filtered_query);
criterion_main!(benches);
