// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events emitted to subscribers and the drop handler.

use kurbo::{Insets, Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::ids::{EntityId, PointerId, SortGroupId, ZoneId};

/// State of the drag session at the time an event was emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSnapshot {
    /// Dragged entity.
    pub entity: EntityId,
    /// Pointer driving the drag.
    pub pointer: PointerId,
    /// Pointer position at drag start.
    pub origin: Point,
    /// Latest pointer position.
    pub position: Point,
    /// Dragged hitbox, translated by the pointer movement.
    pub hitbox: Rect,
    /// Margins of the dragged entity, sampled at drag start.
    pub margins: Insets,
    /// Current primary intersection.
    pub primary: Option<EntityId>,
    /// Active trigger zones with their edge distance.
    pub scroll_zones: SmallVec<[(ZoneId, f64); 2]>,
}

/// Animation hint carried by [`Event::ShiftEntity`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShiftTransition {
    /// Jump without animating. Used when the drag starts, so the gap under
    /// the lifted item appears immediately.
    Instant,
    /// Animate out of the way.
    OutOfTheWay,
}

/// High-level drag, intersection, scroll and sort events.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A drag session started.
    DragStart(DragSnapshot),
    /// The pointer moved during a drag.
    DragMove(DragSnapshot),
    /// The drag ended or was cancelled. `primary` holds the final intersection.
    DragEnd(DragSnapshot),
    /// A new primary intersection.
    BeginDragIntersect {
        /// Dragged entity.
        drag: EntityId,
        /// Entity now under the drag.
        target: EntityId,
    },
    /// The primary intersection was lost or replaced.
    EndDragIntersect {
        /// Dragged entity.
        drag: EntityId,
        /// Entity no longer under the drag.
        target: EntityId,
    },
    /// The drag entered a trigger zone.
    BeginDragScroll {
        /// Dragged entity.
        drag: EntityId,
        /// Zone entered.
        zone: ZoneId,
        /// Edge distance; `0` when flush with the region edge.
        strength: f64,
    },
    /// The edge distance inside a trigger zone changed.
    UpdateDragScroll {
        /// Dragged entity.
        drag: EntityId,
        /// Zone.
        zone: ZoneId,
        /// New edge distance.
        strength: f64,
    },
    /// The drag left a trigger zone, or the drag ended inside it.
    EndDragScroll {
        /// Dragged entity.
        drag: EntityId,
        /// Zone left.
        zone: ZoneId,
        /// Last edge distance.
        strength: f64,
    },
    /// A sort group member moved. A zero `offset` means "back in place".
    ShiftEntity {
        /// Member to displace.
        entity: EntityId,
        /// Group that decided the displacement.
        group: SortGroupId,
        /// Displacement from the resting position.
        offset: Vec2,
        /// How to animate the change.
        transition: ShiftTransition,
    },
}

impl Event {
    /// Short name, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DragStart(_) => "dragStart",
            Self::DragMove(_) => "dragMove",
            Self::DragEnd(_) => "dragEnd",
            Self::BeginDragIntersect { .. } => "beginDragIntersect",
            Self::EndDragIntersect { .. } => "endDragIntersect",
            Self::BeginDragScroll { .. } => "beginDragScroll",
            Self::UpdateDragScroll { .. } => "updateDragScroll",
            Self::EndDragScroll { .. } => "endDragScroll",
            Self::ShiftEntity { .. } => "shiftEntity",
        }
    }
}

/// Result of a drag, passed to the drop handler.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropOutcome {
    /// Dragged entity.
    pub dragged: EntityId,
    /// Where to drop it: in front of this entity.
    ///
    /// `None` when the drag was cancelled, ended over nothing, or ended over
    /// the dragged entity itself or its next sibling.
    pub target: Option<EntityId>,
    /// Final pointer position.
    pub position: Point,
    /// `true` when ended through [`Stage::drag_cancel`](crate::Stage::drag_cancel).
    pub cancelled: bool,
}
