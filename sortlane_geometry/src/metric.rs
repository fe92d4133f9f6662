// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar metrics between hitboxes.
//!
//! These are the building blocks for drop-target resolution and auto-scroll
//! strength. All functions are pure and take rectangles in the same frame.
//!
//! ```rust
//! use kurbo::Rect;
//! use sortlane_geometry::metric::{biased_center_distance, center_distance};
//!
//! let drag = Rect::new(0.0, 100.0, 100.0, 140.0);
//! let above = Rect::new(0.0, 60.0, 100.0, 100.0);
//! let below = Rect::new(0.0, 140.0, 100.0, 180.0);
//!
//! // Equal raw distance, but the candidate above the drag center is penalized.
//! assert_eq!(center_distance(drag, above), center_distance(drag, below));
//! let penalty = 10_000.0;
//! let (up, down) = (
//!     biased_center_distance(drag, above, penalty),
//!     biased_center_distance(drag, below, penalty),
//! );
//! assert!(up > down);
//! ```

use kurbo::{Point, Rect};

use crate::side::Side;

/// Euclidean distance between the centers of two rectangles.
#[must_use]
pub fn center_distance(a: Rect, b: Rect) -> f64 {
    a.center().distance(b.center())
}

/// Center distance from `drag` to `candidate`, plus `penalty` when the
/// candidate's center lies strictly above the drag center.
///
/// Among candidates at near-equal distance this prefers the one at or below
/// the pointer.
#[must_use]
pub fn biased_center_distance(drag: Rect, candidate: Rect, penalty: f64) -> f64 {
    let drag_center = drag.center();
    let center = candidate.center();
    let modifier = if drag_center.y > center.y { penalty } else { 0.0 };
    drag_center.distance(center) + modifier
}

/// Intersection over union of two rectangles, in `[0, 1]`.
///
/// Touching or disjoint rectangles yield `0.0`.
#[must_use]
pub fn overlap_ratio(a: Rect, b: Rect) -> f64 {
    let left = a.x0.max(b.x0);
    let top = a.y0.max(b.y0);
    let right = a.x1.min(b.x1);
    let bottom = a.y1.min(b.y1);
    if left >= right || top >= bottom {
        return 0.0;
    }
    let intersection = (right - left) * (bottom - top);
    let union = a.area() + b.area() - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

/// Corners in the order top-left, top-right, bottom-left, bottom-right.
#[must_use]
pub fn corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x1, rect.y1),
    ]
}

/// Mean distance between corresponding corners of two rectangles.
#[must_use]
pub fn closest_corners_distance(a: Rect, b: Rect) -> f64 {
    let sum: f64 = corners(a)
        .iter()
        .zip(corners(b).iter())
        .map(|(p, q)| p.distance(*q))
        .sum();
    sum / 4.0
}

/// Distance between the `side` edge of `drag` and the same edge of `zone`.
///
/// Top and bottom compare Y edges; left and right compare X edges. For a
/// trigger zone this is the scroll strength: `0.0` when the dragged box is
/// flush with the region edge.
#[must_use]
pub fn edge_distance(drag: Rect, zone: Rect, side: Side) -> f64 {
    let d = match side {
        Side::Top => drag.y0 - zone.y0,
        Side::Right => drag.x1 - zone.x1,
        Side::Bottom => drag.y1 - zone.y1,
        Side::Left => drag.x0 - zone.x0,
    };
    d.abs()
}

/// Auto-scroll speed for a given edge distance.
///
/// `max_speed` at distance `0`, decreasing linearly to exactly `0.0` at
/// `band_width` and beyond.
#[must_use]
pub fn scroll_speed(strength: f64, band_width: f64, max_speed: f64) -> f64 {
    if band_width <= 0.0 {
        return 0.0;
    }
    (max_speed - (max_speed * strength) / band_width).max(0.0)
}
