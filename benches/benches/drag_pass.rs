// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kurbo::{Point, Rect, Vec2};
use sortlane::{
    Axis, BroadPhase, EntityDesc, EntityId, Measure, PointerId, RegionId, ScopeId, ScrollDriver,
    ScrollState, Stage, StageConfig,
};

struct NullHost;

impl Measure for NullHost {
    fn entity_rect(&self, _: EntityId) -> Option<Rect> {
        None
    }

    fn region_rect(&self, _: RegionId) -> Option<Rect> {
        None
    }
}

impl ScrollDriver for NullHost {
    fn scroll_by(&mut self, _: RegionId, _: Vec2) -> Option<ScrollState> {
        None
    }
}

/// A board of `lanes` scrolling lanes with `per_lane` cards each.
fn board(lanes: u32, per_lane: u32, broad_phase: BroadPhase) -> Stage {
    let mut stage = Stage::new(StageConfig::default().with_broad_phase(broad_phase));
    let lane_kind = stage.intern_type("lane").unwrap();
    let card_kind = stage.intern_type("card").unwrap();
    let board_group = stage.create_sort_group(Axis::Horizontal);
    let mut next = 0_u64;
    for l in 0..lanes {
        let x0 = f64::from(l) * 300.0;
        let rect = Rect::new(x0, 0.0, x0 + 280.0, 800.0);
        let region = stage
            .create_region(ScopeId(0), card_kind.into(), None, Some(rect))
            .unwrap();
        let lane_group = stage.create_sort_group(Axis::Vertical);
        let lane = EntityId(next);
        next += 1;
        let desc = EntityDesc::new(ScopeId(0), lane_kind)
            .with_accepts(lane_kind.into())
            .with_index(l)
            .with_sort_group(board_group);
        stage.register_entity(lane, desc, ());
        stage.notify_visible(lane, rect);
        for c in 0..per_lane {
            let id = EntityId(next);
            next += 1;
            let desc = EntityDesc::new(ScopeId(0), card_kind)
                .with_accepts(card_kind.into())
                .with_index(c)
                .with_parent(lane)
                .with_region(region)
                .with_sort_group(lane_group);
            stage.register_entity(id, desc, ());
            let y0 = f64::from(c) * 60.0;
            stage.notify_visible(id, Rect::new(x0 + 10.0, y0 + 5.0, x0 + 270.0, y0 + 55.0));
        }
    }
    stage
}

fn bench_drag_across_board(c: &mut Criterion) {
    const STEPS: u32 = 64;
    let mut group = c.benchmark_group("drag_across_board");
    for &lanes in &[4_u32, 16] {
        for (name, broad_phase) in [
            ("FlatVec", BroadPhase::FlatVec),
            ("Grid(128.)", BroadPhase::Grid { cell: 128.0 }),
        ] {
            group.throughput(Throughput::Elements(u64::from(STEPS)));
            group.bench_function(BenchmarkId::new(name, lanes), |b| {
                b.iter_batched(
                    || board(lanes, 40, broad_phase),
                    |mut stage| {
                        let mut host = NullHost;
                        let pointer = PointerId(0);
                        // The first card of the first lane.
                        stage.drag_start(pointer, EntityId(1), Point::new(140.0, 30.0), &host);
                        let width = f64::from(lanes) * 300.0;
                        for step in 0..STEPS {
                            let t = f64::from(step) / f64::from(STEPS);
                            let pos = Point::new(140.0 + t * width, 30.0 + t * 700.0);
                            stage.pointer_move(pointer, pos);
                            stage.frame(Duration::from_millis(u64::from(step) * 16), &mut host);
                        }
                        stage.drag_end(pointer, Point::new(140.0 + width, 730.0))
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_drag_across_board);
criterion_main!(benches);
