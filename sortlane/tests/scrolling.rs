// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Auto-scroll driven by edge zones, and hitboxes inside nested regions.

mod common;

use common::{Board, ITEMS, POINTER, TestHost, init_logging};
use kurbo::{Point, Rect, Vec2};
use sortlane::{EntityDesc, EntityId, Event, ScopeId, ScrollState, Side, Stage, ZoneId};

fn zone_events(b: &Board) -> Vec<(&'static str, Side, f64)> {
    b.rec
        .events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Event::BeginDragScroll { zone, strength, .. }
            | Event::UpdateDragScroll { zone, strength, .. }
            | Event::EndDragScroll { zone, strength, .. } => {
                Some((e.name(), zone.side, *strength))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn bottom_zone_begins_updates_and_ends() {
    let mut b = Board::new();
    b.set_scrollable(Vec2::new(0.0, 1000.0));
    let bottom = ZoneId {
        region: b.region,
        side: Side::Bottom,
    };
    b.stage.drag_start(POINTER, ITEMS[0], Point::new(400.0, 35.0), &b.host);

    // Card bottom edge 5 px above the region's bottom edge.
    b.move_to(400.0, 770.0);
    assert!(b.stage.is_auto_scrolling(bottom));
    assert_eq!(b.host.scroll_calls.len(), 1, "scrolled in the same frame");
    let (region, delta) = b.host.scroll_calls[0];
    assert_eq!(region, b.region);
    assert!(delta.x == 0.0 && delta.y > 11.0 && delta.y < 11.2, "{delta:?}");

    b.frame(16);
    assert_eq!(b.host.scroll_calls.len(), 2);
    assert!(b.stage.region_shift(b.region).unwrap().y > 22.0);

    // Touching the inner edge of the band: zero speed.
    b.move_to(400.0, 740.0);
    let calls = b.host.scroll_calls.len();
    b.frame(16);
    assert_eq!(b.host.scroll_calls.len(), calls);

    b.move_to(400.0, 400.0);
    assert!(!b.stage.is_auto_scrolling(bottom));
    assert_eq!(
        zone_events(&b),
        [
            ("beginDragScroll", Side::Bottom, 5.0),
            ("updateDragScroll", Side::Bottom, 35.0),
            ("endDragScroll", Side::Bottom, 35.0),
        ]
    );
}

#[test]
fn auto_scroll_stops_at_the_end_of_the_region() {
    let mut b = Board::new();
    b.set_scrollable(Vec2::new(0.0, 20.0));
    let bottom = ZoneId {
        region: b.region,
        side: Side::Bottom,
    };
    b.stage.drag_start(POINTER, ITEMS[0], Point::new(400.0, 35.0), &b.host);
    b.move_to(400.0, 770.0);
    b.frame(16);
    assert_eq!(
        b.stage.scroll_state(b.region).unwrap().offset,
        Vec2::new(0.0, 20.0)
    );
    b.frame(16);
    b.frame(16);
    assert_eq!(b.host.scroll_calls.len(), 2);
    assert!(!b.stage.is_auto_scrolling(bottom));

    // The zone is still under the drag until it ends.
    b.stage.drag_end(POINTER, Point::new(400.0, 770.0)).unwrap();
    assert_eq!(zone_events(&b).last().map(|e| e.0), Some("endDragScroll"));
}

#[test]
fn unscrollable_regions_never_scroll() {
    let mut b = Board::new();
    b.set_scrollable(Vec2::ZERO);
    b.stage.drag_start(POINTER, ITEMS[0], Point::new(400.0, 35.0), &b.host);
    b.move_to(400.0, 770.0);
    b.frame(16);
    assert!(b.host.scroll_calls.is_empty());
    assert_eq!(zone_events(&b).len(), 1, "the zone still reports the hit");
}

#[test]
fn scroll_by_answers_seed_unreported_regions() {
    let mut b = Board::new();
    // The host never calls `notify_scroll`; it only answers `scroll_by`.
    let content = ScrollState::new(Vec2::ZERO, Vec2::new(0.0, 1000.0));
    b.host.scroll.insert(b.region, content);
    assert_eq!(b.stage.scroll_state(b.region), None);
    let bottom = ZoneId {
        region: b.region,
        side: Side::Bottom,
    };
    b.stage.drag_start(POINTER, ITEMS[0], Point::new(400.0, 35.0), &b.host);

    b.move_to(400.0, 770.0);
    assert!(b.stage.is_auto_scrolling(bottom));
    assert_eq!(b.host.scroll_calls.len(), 1);
    let state = b.stage.scroll_state(b.region).unwrap();
    assert_eq!(state.max_offset, Vec2::new(0.0, 1000.0));
    assert!(state.offset.y > 11.0, "{state:?}");

    b.frame(16);
    b.frame(16);
    assert_eq!(b.host.scroll_calls.len(), 3);
    assert!(b.stage.region_shift(b.region).unwrap().y > 33.0);
}

#[test]
fn drag_end_stops_every_loop() {
    let mut b = Board::new();
    b.set_scrollable(Vec2::new(0.0, 1000.0));
    b.stage.drag_start(POINTER, ITEMS[0], Point::new(400.0, 35.0), &b.host);
    b.move_to(400.0, 770.0);
    b.stage.drag_end(POINTER, Point::new(400.0, 770.0)).unwrap();
    let calls = b.host.scroll_calls.len();
    b.frame(16);
    b.frame(16);
    assert_eq!(b.host.scroll_calls.len(), calls);
    assert!(b.stage.debug_info().zones.iter().all(|z| !z.scrolling));
}

#[test]
fn scrolling_moves_cards_under_a_still_pointer() {
    let mut b = Board::new();
    b.set_scrollable(Vec2::new(0.0, 1000.0));
    let scrolled = ScrollState::new(Vec2::new(0.0, 60.0), Vec2::new(0.0, 1000.0));
    b.stage.notify_scroll(b.region, scrolled);
    assert_eq!(b.stage.hitbox(ITEMS[1]), Some(Rect::new(360.0, 10.0, 520.0, 60.0)));

    b.stage.drag_start(POINTER, ITEMS[0], Point::new(400.0, -25.0), &b.host);
    b.move_to(400.0, 95.0);
    assert_eq!(b.stage.drag_snapshot().unwrap().primary, None);

    // Scrolling back to the top slides the second card under the drag.
    b.stage.notify_scroll(b.region, ScrollState::new(Vec2::ZERO, Vec2::new(0.0, 1000.0)));
    assert_eq!(b.stage.hitbox(ITEMS[1]), Some(Rect::new(360.0, 70.0, 520.0, 120.0)));
    b.frame(16);
    assert_eq!(b.stage.drag_snapshot().unwrap().primary, Some(ITEMS[1]));
}

#[test]
fn destroying_a_region_ends_its_zones() {
    let mut b = Board::new();
    b.set_scrollable(Vec2::new(0.0, 1000.0));
    b.stage.drag_start(POINTER, ITEMS[0], Point::new(400.0, 35.0), &b.host);
    b.move_to(400.0, 770.0);
    b.stage.destroy_region(b.region);
    assert_eq!(zone_events(&b).last().map(|e| e.0), Some("endDragScroll"));
    assert!(b.stage.drag_snapshot().unwrap().scroll_zones.is_empty());
    assert_eq!(b.stage.region_shift(b.region), None);
}

#[test]
fn nested_region_shifts_compose() {
    init_logging();
    let mut stage: Stage = Stage::default();
    let card = stage.intern_type("card").unwrap();
    let outer = stage
        .create_region(ScopeId(0), card.into(), None, Some(Rect::new(0.0, 0.0, 400.0, 400.0)))
        .unwrap();
    let inner = stage
        .create_region(ScopeId(0), card.into(), Some(outer), None)
        .unwrap();
    stage.notify_region_visible(inner, Rect::new(0.0, 200.0, 400.0, 400.0));

    let item = EntityId(1);
    stage.register_entity(item, EntityDesc::new(ScopeId(0), card).with_region(inner), ());
    stage.notify_visible(item, Rect::new(10.0, 300.0, 110.0, 340.0));

    stage.notify_scroll(outer, ScrollState::new(Vec2::new(0.0, 30.0), Vec2::new(0.0, 500.0)));
    stage.notify_scroll(inner, ScrollState::new(Vec2::new(0.0, 20.0), Vec2::new(0.0, 500.0)));
    assert_eq!(stage.region_shift(inner), Some(Vec2::new(0.0, 50.0)));
    assert_eq!(stage.region_rect(inner), Some(Rect::new(0.0, 170.0, 400.0, 370.0)));
    assert_eq!(stage.hitbox(item), Some(Rect::new(10.0, 250.0, 110.0, 290.0)));

    // Reporting the current rectangle again changes nothing.
    stage.notify_visible(item, Rect::new(10.0, 250.0, 110.0, 290.0));
    assert_eq!(stage.hitbox(item), Some(Rect::new(10.0, 250.0, 110.0, 290.0)));

    stage.destroy_region(outer);
    assert_eq!(stage.region_shift(inner), None, "nested regions go with their parent");
}

#[test]
fn hidden_regions_expose_no_zones() {
    init_logging();
    let mut stage: Stage = Stage::default();
    let mut host = TestHost::default();
    let card = stage.intern_type("card").unwrap();
    let region = stage
        .create_region(ScopeId(0), card.into(), None, Some(Rect::new(0.0, 0.0, 400.0, 400.0)))
        .unwrap();
    assert_eq!(stage.debug_info().zones.len(), 4);

    stage.notify_region_hidden(region);
    assert!(stage.debug_info().zones.is_empty());

    let item = EntityId(1);
    stage.register_entity(item, EntityDesc::new(ScopeId(0), card), ());
    stage.notify_visible(item, Rect::new(100.0, 100.0, 200.0, 140.0));
    stage.drag_start(POINTER, item, Point::new(150.0, 120.0), &host);
    stage.pointer_move(POINTER, Point::new(150.0, 10.0));
    stage.frame(std::time::Duration::from_millis(16), &mut host);
    assert!(stage.drag_snapshot().unwrap().scroll_zones.is_empty());
}
