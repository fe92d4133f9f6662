// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures: a recording host and a three-lane board.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use kurbo::{Insets, Point, Rect, Vec2};
use sortlane::{
    Axis, DropOutcome, EntityDesc, EntityId, Event, Measure, PointerId, RegionId, ScopeId,
    ScrollDriver, ScrollState, SortGroupId, Stage, StageConfig,
};

pub const POINTER: PointerId = PointerId(1);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Answers measurements from tables and applies scrolls, recording both.
#[derive(Debug, Default)]
pub struct TestHost {
    pub entities: HashMap<EntityId, Rect>,
    pub regions: HashMap<RegionId, Rect>,
    pub margins: HashMap<EntityId, Insets>,
    pub scroll: HashMap<RegionId, ScrollState>,
    pub scroll_calls: Vec<(RegionId, Vec2)>,
    pub measure_calls: Cell<usize>,
}

impl Measure for TestHost {
    fn entity_rect(&self, id: EntityId) -> Option<Rect> {
        self.measure_calls.set(self.measure_calls.get() + 1);
        self.entities.get(&id).copied()
    }

    fn region_rect(&self, id: RegionId) -> Option<Rect> {
        self.regions.get(&id).copied()
    }

    fn entity_margins(&self, id: EntityId) -> Insets {
        self.margins.get(&id).copied().unwrap_or(Insets::ZERO)
    }
}

impl ScrollDriver for TestHost {
    fn scroll_by(&mut self, region: RegionId, delta: Vec2) -> Option<ScrollState> {
        self.scroll_calls.push((region, delta));
        let state = self.scroll.get_mut(&region)?;
        let max = state.max_offset;
        let next = state.offset + delta;
        state.offset = Vec2::new(next.x.clamp(0.0, max.x), next.y.clamp(0.0, max.y));
        Some(*state)
    }
}

/// Records every event and every drop outcome.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub events: Rc<RefCell<Vec<Event>>>,
    pub drops: Rc<RefCell<Vec<DropOutcome>>>,
}

impl Recorder {
    pub fn attach<D>(stage: &mut Stage<D>) -> Self {
        let rec = Self::default();
        let events = Rc::clone(&rec.events);
        let _subscription = stage.subscribe(move |e: &Event| events.borrow_mut().push(e.clone()));
        let drops = Rc::clone(&rec.drops);
        stage.set_drop_handler(move |d: &DropOutcome| drops.borrow_mut().push(*d));
        rec
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(Event::name).collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// `(entity, offset)` of every shift, in order.
    pub fn shifts(&self) -> Vec<(EntityId, Vec2)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::ShiftEntity { entity, offset, .. } => Some((*entity, *offset)),
                _ => None,
            })
            .collect()
    }
}

pub const LANES: [EntityId; 3] = [EntityId(1), EntityId(2), EntityId(3)];
pub const ITEMS: [EntityId; 2] = [EntityId(10), EntityId(11)];

pub const LANE_RECTS: [Rect; 3] = [
    Rect::new(0.0, 0.0, 280.0, 800.0),
    Rect::new(300.0, 0.0, 580.0, 800.0),
    Rect::new(600.0, 0.0, 880.0, 800.0),
];
pub const ITEM_RECTS: [Rect; 2] = [
    Rect::new(360.0, 10.0, 520.0, 60.0),
    Rect::new(360.0, 70.0, 520.0, 120.0),
];

/// Three lanes `[0] [1] [2]` in a horizontal sort group; lane `[1]` scrolls
/// and holds items `[1, 0]` and `[1, 1]` in a vertical sort group.
pub struct Board {
    pub stage: Stage<&'static str>,
    pub host: TestHost,
    pub rec: Recorder,
    pub region: RegionId,
    pub board_group: SortGroupId,
    pub lane_group: SortGroupId,
    pub now: Duration,
}

impl Board {
    pub fn new() -> Self {
        Self::with_config(StageConfig::default())
    }

    pub fn with_config(config: StageConfig) -> Self {
        init_logging();
        let mut stage = Stage::new(config);
        let mut host = TestHost::default();
        let lane = stage.intern_type("lane").unwrap();
        let card = stage.intern_type("card").unwrap();
        let board_group = stage.create_sort_group(Axis::Horizontal);
        let lane_group = stage.create_sort_group(Axis::Vertical);
        let region = stage
            .create_region(ScopeId(0), card.into(), None, Some(LANE_RECTS[1]))
            .unwrap();
        host.regions.insert(region, LANE_RECTS[1]);
        host.scroll.insert(region, ScrollState::default());

        for (i, (&id, &rect)) in LANES.iter().zip(LANE_RECTS.iter()).enumerate() {
            let desc = EntityDesc::new(ScopeId(0), lane)
                .with_accepts(lane.into())
                .with_index(u32::try_from(i).unwrap())
                .with_sort_group(board_group);
            stage.try_register_entity(id, desc, "lane").unwrap();
            stage.notify_visible(id, rect);
            host.entities.insert(id, rect);
        }
        for (i, (&id, &rect)) in ITEMS.iter().zip(ITEM_RECTS.iter()).enumerate() {
            let desc = EntityDesc::new(ScopeId(0), card)
                .with_accepts(card.into())
                .with_index(u32::try_from(i).unwrap())
                .with_parent(LANES[1])
                .with_region(region)
                .with_sort_group(lane_group);
            stage.try_register_entity(id, desc, "card").unwrap();
            stage.notify_visible(id, rect);
            host.entities.insert(id, rect);
        }
        let rec = Recorder::attach(&mut stage);
        Self {
            stage,
            host,
            rec,
            region,
            board_group,
            lane_group,
            now: Duration::ZERO,
        }
    }

    /// Advances the clock by `ms` and runs one frame.
    pub fn frame(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
        self.stage.frame(self.now, &mut self.host);
    }

    /// Buffers a pointer move and runs one 16 ms frame.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.stage.pointer_move(POINTER, Point::new(x, y));
        self.frame(16);
    }

    pub fn set_scrollable(&mut self, max: Vec2) {
        let state = ScrollState::new(Vec2::ZERO, max);
        self.host.scroll.insert(self.region, state);
        self.stage.notify_scroll(self.region, state);
    }
}
