// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Vec2;

use crate::side::Side;

/// Scroll position of a single scrollable region.
///
/// `offset` is the current scroll offset and `max_offset` the largest offset
/// the region can reach on each axis (content size minus viewport size). Both
/// are reported by the host after every scroll.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ScrollState {
    /// Current scroll offset.
    pub offset: Vec2,
    /// Maximum reachable offset per axis. Non-positive means "not scrollable".
    pub max_offset: Vec2,
}

impl ScrollState {
    /// Creates a scroll state from an offset and the maximum offset.
    #[must_use]
    pub const fn new(offset: Vec2, max_offset: Vec2) -> Self {
        Self { offset, max_offset }
    }

    /// Horizontal scroll progress in `[0, 1]`.
    ///
    /// A region that cannot scroll horizontally reports `1.0`, so both
    /// directions are treated as exhausted.
    #[must_use]
    pub fn x_pct(&self) -> f64 {
        pct(self.offset.x, self.max_offset.x)
    }

    /// Vertical scroll progress in `[0, 1]`.
    #[must_use]
    pub fn y_pct(&self) -> f64 {
        pct(self.offset.y, self.max_offset.y)
    }

    /// Returns `true` once scrolling toward `side` cannot make progress.
    #[must_use]
    pub fn is_done_scrolling(&self, side: Side) -> bool {
        let (offset, max) = match side {
            Side::Top | Side::Bottom => (self.offset.y, self.max_offset.y),
            Side::Left | Side::Right => (self.offset.x, self.max_offset.x),
        };
        if max <= 0.0 {
            return true;
        }
        match side {
            Side::Top | Side::Left => offset <= 0.0,
            Side::Bottom | Side::Right => offset >= max,
        }
    }
}

fn pct(offset: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    (offset / max).clamp(0.0, 1.0)
}
