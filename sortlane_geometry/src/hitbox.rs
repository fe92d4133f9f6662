// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame conversion and construction helpers for hitboxes.

use kurbo::{Insets, Point, Rect, Vec2};

use crate::side::Side;

/// Returns `rect` with `x0 <= x1` and `y0 <= y1`.
#[must_use]
pub fn normalize(rect: Rect) -> Rect {
    rect.abs()
}

/// Converts a rectangle measured in viewport space into the scroll-independent
/// *initial* frame.
///
/// - `scroll_shift` is the effective scroll offset of the region chain that
///   contained the element when it was measured.
/// - `sort_shift` is any sort displacement that was applied to the element (or
///   its ancestors) at measurement time; it is removed so that the initial
///   rectangle describes the resting position.
#[must_use]
pub fn measured_to_initial(measured: Rect, scroll_shift: Vec2, sort_shift: Vec2) -> Rect {
    normalize(measured) + scroll_shift - sort_shift
}

/// Projects an initial rectangle into the current viewport frame.
///
/// This is the inverse of [`measured_to_initial`] evaluated with the shifts in
/// effect *now*.
#[must_use]
pub fn initial_to_current(initial: Rect, scroll_shift: Vec2, sort_shift: Vec2) -> Rect {
    initial - scroll_shift + sort_shift
}

/// Translates a hitbox by the pointer movement `position - origin`.
#[must_use]
pub fn translate_for_movement(hitbox: Rect, origin: Point, position: Point) -> Rect {
    hitbox + (position - origin)
}

/// Clips `rect` to a band of `width` along one edge.
///
/// The band never extends outside `rect`; a region thinner than `width`
/// yields the whole region.
#[must_use]
pub fn edge_band(rect: Rect, side: Side, width: f64) -> Rect {
    let rect = normalize(rect);
    let w = width.max(0.0);
    match side {
        Side::Top => Rect::new(rect.x0, rect.y0, rect.x1, (rect.y0 + w).min(rect.y1)),
        Side::Right => Rect::new((rect.x1 - w).max(rect.x0), rect.y0, rect.x1, rect.y1),
        Side::Bottom => Rect::new(rect.x0, (rect.y1 - w).max(rect.y0), rect.x1, rect.y1),
        Side::Left => Rect::new(rect.x0, rect.y0, (rect.x0 + w).min(rect.x1), rect.y1),
    }
}

/// Expands a border box by its margins.
///
/// The result's width and height are the space an element occupies in flow,
/// which is the gap a sort group must open for it.
#[must_use]
pub fn margin_box(border_box: Rect, margins: Insets) -> Rect {
    normalize(border_box) + margins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measured_and_current_round_trip_with_same_shift() {
        let measured = Rect::new(5.0, 5.0, 25.0, 45.0);
        let scroll = Vec2::new(12.0, 300.0);
        let sort = Vec2::new(0.0, 48.0);
        let initial = measured_to_initial(measured, scroll, sort);
        assert_eq!(initial_to_current(initial, scroll, sort), measured);
    }

    #[test]
    fn sort_shift_is_removed_from_initial() {
        let measured = Rect::new(0.0, 50.0, 100.0, 80.0);
        let initial = measured_to_initial(measured, Vec2::ZERO, Vec2::new(0.0, 50.0));
        assert_eq!(initial, Rect::new(0.0, 0.0, 100.0, 30.0));
    }

    #[test]
    fn measured_rect_is_normalized() {
        let inverted = Rect::new(10.0, 10.0, 0.0, 0.0);
        let initial = measured_to_initial(inverted, Vec2::ZERO, Vec2::ZERO);
        assert!(initial.x0 <= initial.x1 && initial.y0 <= initial.y1);
    }

    #[test]
    fn movement_translation() {
        let hitbox = Rect::new(0.0, 0.0, 10.0, 10.0);
        let moved =
            translate_for_movement(hitbox, Point::new(100.0, 100.0), Point::new(130.0, 90.0));
        assert_eq!(moved, Rect::new(30.0, -10.0, 40.0, 0.0));
    }

    #[test]
    fn edge_bands() {
        let r = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(edge_band(r, Side::Top, 35.0), Rect::new(0.0, 0.0, 200.0, 35.0));
        assert_eq!(edge_band(r, Side::Right, 35.0), Rect::new(165.0, 0.0, 200.0, 100.0));
        assert_eq!(edge_band(r, Side::Bottom, 35.0), Rect::new(0.0, 65.0, 200.0, 100.0));
        assert_eq!(edge_band(r, Side::Left, 35.0), Rect::new(0.0, 0.0, 35.0, 100.0));
    }

    #[test]
    fn edge_band_is_clipped_to_thin_regions() {
        let r = Rect::new(0.0, 0.0, 20.0, 20.0);
        assert_eq!(edge_band(r, Side::Bottom, 35.0), r);
        assert_eq!(edge_band(r, Side::Left, 35.0), r);
    }

    #[test]
    fn margin_box_adds_all_four_margins() {
        let b = margin_box(Rect::new(10.0, 10.0, 110.0, 40.0), Insets::new(4.0, 2.0, 6.0, 8.0));
        assert_eq!(b.width(), 110.0);
        assert_eq!(b.height(), 40.0);
    }
}
