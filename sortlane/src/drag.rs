// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag session and the intersection pass run on every move.

use kurbo::{Insets, Point, Rect, Size};
use smallvec::SmallVec;
use sortlane_geometry::{margin_box, translate_for_movement};

use crate::config::StageConfig;
use crate::event::{DragSnapshot, Event};
use crate::ids::{EntityId, PointerId, ScopeId, ZoneId};
use crate::pointer::PointerTrack;
use crate::resolve::{ZoneHits, best_target, diff_zones, zone_strengths};
use crate::types::TypeTag;

/// Live state between drag start and drag end.
#[derive(Clone, Debug)]
pub(crate) struct DragSession {
    pub(crate) entity: EntityId,
    pub(crate) kind: TypeTag,
    pub(crate) scope: ScopeId,
    pub(crate) track: PointerTrack,
    pub(crate) margins: Insets,
    /// Hitbox of the dragged entity when the drag started.
    pub(crate) start_hitbox: Rect,
    pub(crate) primary: Option<EntityId>,
    pub(crate) zones: ZoneHits,
}

impl DragSession {
    pub(crate) fn new(
        entity: EntityId,
        kind: TypeTag,
        scope: ScopeId,
        pointer: PointerId,
        origin: Point,
        margins: Insets,
        start_hitbox: Rect,
    ) -> Self {
        Self {
            entity,
            kind,
            scope,
            track: PointerTrack::start(pointer, origin),
            margins,
            start_hitbox,
            primary: None,
            zones: SmallVec::new(),
        }
    }

    pub(crate) fn pointer(&self) -> PointerId {
        self.track.pointer
    }

    pub(crate) fn position(&self) -> Point {
        self.track.last
    }

    /// The dragged hitbox, following the pointer.
    pub(crate) fn hitbox(&self) -> Rect {
        translate_for_movement(self.start_hitbox, self.track.origin, self.track.last)
    }

    /// Size of the gap the dragged entity leaves behind.
    pub(crate) fn gap(&self) -> Size {
        margin_box(self.start_hitbox, self.margins).size()
    }

    pub(crate) fn snapshot(&self) -> DragSnapshot {
        DragSnapshot {
            entity: self.entity,
            pointer: self.track.pointer,
            origin: self.track.origin,
            position: self.track.last,
            hitbox: self.hitbox(),
            margins: self.margins,
            primary: self.primary,
            scroll_zones: self.zones.clone(),
        }
    }

    /// Applies one pass of candidate hits and returns the resulting events:
    /// intersection changes first, then zone begins, updates and ends.
    pub(crate) fn resolve(
        &mut self,
        config: &StageConfig,
        targets: &[(EntityId, Rect)],
        zones: &[(ZoneId, Rect)],
    ) -> SmallVec<[Event; 4]> {
        let drag = self.hitbox();
        let mut events = SmallVec::new();

        let primary = best_target(config, drag, targets);
        if primary != self.primary {
            if let Some(old) = self.primary.take() {
                events.push(Event::EndDragIntersect {
                    drag: self.entity,
                    target: old,
                });
            }
            if let Some(new) = primary {
                events.push(Event::BeginDragIntersect {
                    drag: self.entity,
                    target: new,
                });
            }
            self.primary = primary;
        }

        let next = zone_strengths(drag, zones);
        let diff = diff_zones(&self.zones, &next);
        let drag_id = self.entity;
        events.extend(diff.begin.iter().map(|&(zone, strength)| Event::BeginDragScroll {
            drag: drag_id,
            zone,
            strength,
        }));
        events.extend(diff.update.iter().map(|&(zone, strength)| Event::UpdateDragScroll {
            drag: drag_id,
            zone,
            strength,
        }));
        events.extend(diff.end.iter().map(|&(zone, strength)| Event::EndDragScroll {
            drag: drag_id,
            zone,
            strength,
        }));
        self.zones = next;
        events
    }
}
