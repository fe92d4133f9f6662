// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary traits implemented by the embedding layer.

use kurbo::{Insets, Rect, Vec2};
use sortlane_geometry::ScrollState;

use crate::ids::{EntityId, RegionId};

/// Reads layout from the host.
///
/// All rectangles are border boxes in viewport space, as the host would
/// report them right now (including any scroll or transform in effect).
pub trait Measure {
    /// Current rectangle of an entity, or `None` if it is not laid out.
    fn entity_rect(&self, id: EntityId) -> Option<Rect>;

    /// Current rectangle of a scroll region's viewport.
    fn region_rect(&self, id: RegionId) -> Option<Rect>;

    /// Margins around an entity's border box.
    ///
    /// The margin box of the dragged entity is the gap a sort group opens.
    fn entity_margins(&self, id: EntityId) -> Insets {
        let _ = id;
        Insets::ZERO
    }
}

/// Applies auto-scroll steps.
pub trait ScrollDriver {
    /// Scrolls `region` by `delta`.
    ///
    /// Hosts that apply the scroll synchronously may return the new state;
    /// otherwise they report it later through
    /// [`Stage::notify_scroll`](crate::Stage::notify_scroll).
    fn scroll_by(&mut self, region: RegionId, delta: Vec2) -> Option<ScrollState>;
}

/// Everything [`Stage::frame`](crate::Stage::frame) needs from the host.
pub trait Host: Measure + ScrollDriver {}

impl<T: Measure + ScrollDriver + ?Sized> Host for T {}
