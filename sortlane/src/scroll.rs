// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll regions, their edge trigger zones, and auto-scroll loops.
//!
//! A region's box is stored scroll-independent: the measured rectangle plus
//! the effective shift of its parent at measurement time. Its current box is
//! recovered by subtracting the parent's current shift, and each of the four
//! trigger zones is a band of that box along one edge.
//!
//! Auto-scroll loops are keyed by [`ZoneId`] and advanced once per frame by
//! [`ScrollCoordinator::step`].

use hashbrown::HashMap;
use kurbo::{Rect, Vec2};
use smallvec::SmallVec;
use sortlane_geometry::{ScrollState, Side, edge_band, metric::scroll_speed};

use crate::config::StageConfig;
use crate::error::StageError;
use crate::host::ScrollDriver;
use crate::ids::{RegionId, ScopeId, ZoneId};
use crate::types::TypeSet;

#[derive(Clone, Debug)]
pub(crate) struct Region {
    pub(crate) scope: ScopeId,
    pub(crate) accepts: TypeSet,
    pub(crate) parent: Option<RegionId>,
    children: SmallVec<[RegionId; 4]>,
    /// Last scroll state reported by the host, if any.
    pub(crate) state: Option<ScrollState>,
    initial: Option<Rect>,
    pub(crate) visible: bool,
}

impl Region {
    fn is_active(&self) -> bool {
        self.visible && self.initial.is_some()
    }

    fn offset(&self) -> Vec2 {
        self.state.map_or(Vec2::ZERO, |s| s.offset)
    }

    /// A region that never reported is assumed to rest at its origin, with
    /// room to scroll toward the bottom and the right.
    fn is_done_scrolling(&self, side: Side) -> bool {
        match self.state {
            Some(state) => state.is_done_scrolling(side),
            None => matches!(side, Side::Top | Side::Left),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct ScrollLoop {
    zone: ZoneId,
    strength: f64,
}

#[derive(Debug, Default)]
pub(crate) struct ScrollCoordinator {
    next: u32,
    regions: HashMap<RegionId, Region>,
    loops: Vec<ScrollLoop>,
}

impl ScrollCoordinator {
    /// Creates a region. A root region created with a rectangle is active
    /// immediately; others wait for [`Self::set_visible`].
    pub(crate) fn create(
        &mut self,
        scope: ScopeId,
        accepts: TypeSet,
        parent: Option<RegionId>,
        rect: Option<Rect>,
    ) -> Result<RegionId, StageError> {
        if let Some(p) = parent
            && !self.regions.contains_key(&p)
        {
            return Err(StageError::UnknownRegion(p));
        }
        let id = RegionId(self.next);
        self.next += 1;
        let parent_shift = parent.map_or(Vec2::ZERO, |p| self.shift(p));
        self.regions.insert(
            id,
            Region {
                scope,
                accepts,
                parent,
                children: SmallVec::new(),
                state: None,
                initial: rect.map(|r| r.abs() + parent_shift),
                visible: parent.is_none() && rect.is_some(),
            },
        );
        if let Some(p) = parent.and_then(|p| self.regions.get_mut(&p)) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Removes `id` and every nested region, with their loops. Returns the
    /// removed ids, `id` first.
    pub(crate) fn destroy(&mut self, id: RegionId) -> Vec<RegionId> {
        let Some(parent) = self.regions.get(&id).map(|r| r.parent) else {
            return Vec::new();
        };
        if let Some(p) = parent.and_then(|p| self.regions.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        let mut removed = vec![id];
        let mut i = 0;
        while let Some(&next) = removed.get(i) {
            if let Some(region) = self.regions.remove(&next) {
                removed.extend(region.children);
            }
            i += 1;
        }
        self.loops.retain(|l| !removed.contains(&l.zone.region));
        removed
    }

    pub(crate) fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Region ids in creation order.
    pub(crate) fn ids(&self) -> Vec<RegionId> {
        let mut ids: Vec<_> = self.regions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn set_visible(&mut self, id: RegionId, rect: Rect) -> bool {
        if !self.remeasure(id, rect) {
            return false;
        }
        if let Some(region) = self.regions.get_mut(&id) {
            region.visible = true;
        }
        true
    }

    pub(crate) fn set_hidden(&mut self, id: RegionId) -> bool {
        match self.regions.get_mut(&id) {
            Some(region) => {
                region.visible = false;
                true
            }
            None => false,
        }
    }

    /// Replaces the stored box from a fresh measurement.
    pub(crate) fn remeasure(&mut self, id: RegionId, rect: Rect) -> bool {
        let Some(parent) = self.regions.get(&id).map(|r| r.parent) else {
            return false;
        };
        let parent_shift = parent.map_or(Vec2::ZERO, |p| self.shift(p));
        match self.regions.get_mut(&id) {
            Some(region) => {
                region.initial = Some(rect.abs() + parent_shift);
                true
            }
            None => false,
        }
    }

    /// Records a scroll position. Returns `true` if it changed.
    pub(crate) fn set_state(&mut self, id: RegionId, state: ScrollState) -> bool {
        match self.regions.get_mut(&id) {
            Some(region) if region.state != Some(state) => {
                region.state = Some(state);
                true
            }
            _ => false,
        }
    }

    /// Effective shift: own offset plus the parent's effective shift.
    pub(crate) fn shift(&self, id: RegionId) -> Vec2 {
        let mut total = Vec2::ZERO;
        let mut next = Some(id);
        let mut budget = self.regions.len();
        while let Some(current) = next {
            let Some(region) = self.regions.get(&current) else {
                break;
            };
            if budget == 0 {
                break;
            }
            budget -= 1;
            total += region.offset();
            next = region.parent;
        }
        total
    }

    fn parent_shift(&self, region: &Region) -> Vec2 {
        region.parent.map_or(Vec2::ZERO, |p| self.shift(p))
    }

    /// Current box of the region.
    pub(crate) fn current_rect(&self, id: RegionId) -> Option<Rect> {
        let region = self.regions.get(&id)?;
        Some(region.initial? - self.parent_shift(region))
    }

    pub(crate) fn zone_rect(&self, zone: ZoneId, width: f64) -> Option<Rect> {
        Some(edge_band(self.current_rect(zone.region)?, zone.side, width))
    }

    /// Zones of active regions in `scope`, with the kinds they accept.
    pub(crate) fn active_zones(
        &self,
        scope: ScopeId,
        width: f64,
    ) -> impl Iterator<Item = (ZoneId, TypeSet, Rect)> + '_ {
        self.ids().into_iter().flat_map(move |id| {
            let zones = self
                .regions
                .get(&id)
                .filter(|r| r.scope == scope && r.is_active())
                .and_then(|r| Some((r.accepts, self.current_rect(id)?)));
            zones.into_iter().flat_map(move |(accepts, rect)| {
                ZoneId::all(id).map(|zone| (zone, accepts, edge_band(rect, zone.side, width)))
            })
        })
    }

    pub(crate) fn begin_loop(&mut self, zone: ZoneId, strength: f64) {
        match self.loops.iter_mut().find(|l| l.zone == zone) {
            Some(l) => l.strength = strength,
            None => self.loops.push(ScrollLoop { zone, strength }),
        }
    }

    /// Changes the strength of a running loop. No-op if none is running.
    pub(crate) fn update_loop(&mut self, zone: ZoneId, strength: f64) {
        if let Some(l) = self.loops.iter_mut().find(|l| l.zone == zone) {
            l.strength = strength;
        }
    }

    pub(crate) fn end_loop(&mut self, zone: ZoneId) -> bool {
        let before = self.loops.len();
        self.loops.retain(|l| l.zone != zone);
        self.loops.len() != before
    }

    pub(crate) fn end_all_loops(&mut self) {
        self.loops.clear();
    }

    pub(crate) fn is_scrolling(&self, zone: ZoneId) -> bool {
        self.loops.iter().any(|l| l.zone == zone)
    }

    /// Advances every loop by one frame. Returns `true` if any region's scroll
    /// position changed.
    ///
    /// A loop stops once its region can scroll no further toward its side.
    pub(crate) fn step<S: ScrollDriver + ?Sized>(
        &mut self,
        driver: &mut S,
        config: &StageConfig,
    ) -> bool {
        let mut changed = false;
        let mut finished: SmallVec<[ZoneId; 4]> = SmallVec::new();
        for l in &self.loops {
            let ZoneId { region, side } = l.zone;
            let Some(r) = self.regions.get(&region) else {
                finished.push(l.zone);
                continue;
            };
            if r.is_done_scrolling(side) {
                finished.push(l.zone);
                continue;
            }
            let speed = scroll_speed(l.strength, config.trigger_width, config.max_scroll_speed);
            if speed <= 0.0 {
                continue;
            }
            let delta = side.outward() * speed;
            log::trace!("auto-scroll {} by {delta:?}", l.zone);
            if let Some(next) = driver.scroll_by(region, delta)
                && let Some(r) = self.regions.get_mut(&region)
                && r.state != Some(next)
            {
                r.state = Some(next);
                changed = true;
            }
        }
        if !finished.is_empty() {
            log::trace!("auto-scroll finished for {finished:?}");
            self.loops.retain(|l| !finished.contains(&l.zone));
        }
        changed
    }
}
