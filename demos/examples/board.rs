// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A three-lane board driven from the terminal.
//!
//! Drags a card down its lane, past the bottom edge so the lane auto-scrolls,
//! and drops it; then moves a whole lane. Every event is printed.
//!
//! Run:
//! - `cargo run -p sortlane_demos --example board`
//! - `RUST_LOG=sortlane=trace cargo run -p sortlane_demos --example board`

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use kurbo::{Point, Rect, Vec2};
use sortlane::{
    Axis, DropOutcome, EntityDesc, EntityId, Event, Measure, PointerId, RegionId, ScopeId,
    ScrollDriver, ScrollState, Stage, StageError,
};

/// Stands in for a real layout: fixed rectangles and a scroll offset per lane.
#[derive(Default)]
struct Layout {
    rects: HashMap<EntityId, Rect>,
    viewports: HashMap<RegionId, Rect>,
    scroll: HashMap<RegionId, ScrollState>,
}

impl Measure for Layout {
    fn entity_rect(&self, id: EntityId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    fn region_rect(&self, id: RegionId) -> Option<Rect> {
        self.viewports.get(&id).copied()
    }
}

impl ScrollDriver for Layout {
    fn scroll_by(&mut self, region: RegionId, delta: Vec2) -> Option<ScrollState> {
        let state = self.scroll.get_mut(&region)?;
        let next = state.offset + delta;
        state.offset = Vec2::new(
            next.x.clamp(0.0, state.max_offset.x),
            next.y.clamp(0.0, state.max_offset.y),
        );
        Some(*state)
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::DragStart(s) | Event::DragMove(s) | Event::DragEnd(s) => {
            format!("{} {} at ({:.0}, {:.0})", event.name(), s.entity, s.position.x, s.position.y)
        }
        Event::BeginDragIntersect { target, .. } | Event::EndDragIntersect { target, .. } => {
            format!("{} {target}", event.name())
        }
        Event::BeginDragScroll { zone, strength, .. }
        | Event::UpdateDragScroll { zone, strength, .. }
        | Event::EndDragScroll { zone, strength, .. } => {
            format!("{} {} {:?} strength {strength:.1}", event.name(), zone.region, zone.side)
        }
        Event::ShiftEntity { entity, offset, .. } => {
            format!("{} {entity} by ({:.0}, {:.0})", event.name(), offset.x, offset.y)
        }
    }
}

fn main() -> Result<(), StageError> {
    env_logger::init();

    let mut stage: Stage<&'static str> = Stage::default();
    let mut layout = Layout::default();
    let lane_kind = stage.intern_type("lane")?;
    let card_kind = stage.intern_type("card")?;
    let board = stage.create_sort_group(Axis::Horizontal);

    let mut cards_of_first_lane = Vec::new();
    for l in 0..3_u32 {
        let x0 = f64::from(l) * 300.0;
        let viewport = Rect::new(x0, 0.0, x0 + 280.0, 400.0);
        let region = stage.create_region(ScopeId(0), card_kind.into(), None, Some(viewport))?;
        layout.viewports.insert(region, viewport);
        let scroll = ScrollState::new(Vec2::ZERO, Vec2::new(0.0, 200.0));
        layout.scroll.insert(region, scroll);
        stage.notify_scroll(region, scroll);

        let lane = EntityId(u64::from(l) * 100);
        let desc = EntityDesc::new(ScopeId(0), lane_kind)
            .with_accepts(lane_kind.into())
            .with_index(l)
            .with_sort_group(board);
        stage.try_register_entity(lane, desc, "lane")?;
        stage.notify_visible(lane, viewport);
        layout.rects.insert(lane, viewport);

        let cards = stage.create_sort_group(Axis::Vertical);
        for c in 0..10_u32 {
            let id = EntityId(lane.0 + 1 + u64::from(c));
            let desc = EntityDesc::new(ScopeId(0), card_kind)
                .with_accepts(card_kind.into())
                .with_index(c)
                .with_parent(lane)
                .with_region(region)
                .with_sort_group(cards);
            stage.try_register_entity(id, desc, "card")?;
            let y0 = f64::from(c) * 60.0;
            let rect = Rect::new(x0 + 10.0, y0 + 5.0, x0 + 270.0, y0 + 55.0);
            stage.notify_visible(id, rect);
            layout.rects.insert(id, rect);
            if l == 0 {
                cards_of_first_lane.push(id);
            }
        }
    }

    log::info!("board ready with {} entities", stage.entity_count());
    let _printer = stage.subscribe(|e: &Event| println!("  {}", describe(e)));
    let drops: Rc<RefCell<Vec<DropOutcome>>> = Rc::default();
    let sink = Rc::clone(&drops);
    stage.set_drop_handler(move |d: &DropOutcome| sink.borrow_mut().push(*d));

    let pointer = PointerId(0);
    let mut now = Duration::ZERO;
    let mut frame = |stage: &mut Stage<&'static str>, layout: &mut Layout| {
        now += Duration::from_millis(16);
        stage.frame(now, layout);
    };

    println!("Drag the first card to the bottom edge of its lane:");
    let first = cards_of_first_lane[0];
    stage.try_drag_start(pointer, first, Point::new(140.0, 30.0), &layout)?;
    for y in [120.0, 250.0, 370.0, 390.0] {
        stage.pointer_move(pointer, Point::new(140.0, y));
        frame(&mut stage, &mut layout);
    }
    for _ in 0..10 {
        frame(&mut stage, &mut layout);
    }
    println!("Scroll state after auto-scroll: {:?}", layout.scroll.values().next());
    stage.pointer_move(pointer, Point::new(140.0, 200.0));
    frame(&mut stage, &mut layout);
    let outcome = stage.try_drag_end(pointer, Point::new(140.0, 200.0))?;
    println!("Dropped {} on {:?}", outcome.dragged, outcome.target);
    for _ in 0..40 {
        frame(&mut stage, &mut layout);
    }

    println!("Move the first lane after the third:");
    stage.try_drag_start(pointer, EntityId(0), Point::new(140.0, 200.0), &layout)?;
    stage.pointer_move(pointer, Point::new(740.0, 200.0));
    frame(&mut stage, &mut layout);
    let outcome = stage.try_drag_end(pointer, Point::new(740.0, 200.0))?;
    println!("Dropped {} on {:?}", outcome.dragged, outcome.target);

    println!("{} drop(s) reported to the handler", drops.borrow().len());
    Ok(())
}
