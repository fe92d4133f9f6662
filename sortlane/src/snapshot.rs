// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pass layout state: effective region shifts and sort offsets.
//!
//! Composing nested scroll offsets walks the region chain, so it is done once
//! per pass for every region and then looked up per entity.

use hashbrown::HashMap;
use kurbo::{Rect, Vec2};
use sortlane_geometry::{initial_to_current, measured_to_initial};

use crate::ids::{EntityId, RegionId};
use crate::registry::Registry;
use crate::scroll::ScrollCoordinator;
use crate::sort::SortCoordinator;

#[derive(Debug, Default)]
pub(crate) struct LayoutSnapshot {
    region_shift: HashMap<RegionId, Vec2>,
    sort_offset: HashMap<EntityId, Vec2>,
}

impl LayoutSnapshot {
    pub(crate) fn capture(scroll: &ScrollCoordinator, sort: &SortCoordinator) -> Self {
        Self {
            region_shift: scroll.ids().into_iter().map(|id| (id, scroll.shift(id))).collect(),
            sort_offset: sort.offsets().collect(),
        }
    }

    /// Effective scroll shift of `region`; zero outside any region.
    pub(crate) fn region_shift(&self, region: Option<RegionId>) -> Vec2 {
        region
            .and_then(|r| self.region_shift.get(&r).copied())
            .unwrap_or(Vec2::ZERO)
    }

    pub(crate) fn sort_offset(&self, entity: EntityId) -> Vec2 {
        self.sort_offset.get(&entity).copied().unwrap_or(Vec2::ZERO)
    }

    /// Sum of the sort offsets of the strict ancestors of `entity`.
    pub(crate) fn ancestor_sort_shift<D>(&self, registry: &Registry<D>, entity: EntityId) -> Vec2 {
        if self.sort_offset.is_empty() {
            return Vec2::ZERO;
        }
        registry
            .ancestors(entity)
            .map(|a| self.sort_offset(a))
            .fold(Vec2::ZERO, |acc, v| acc + v)
    }

    /// Current hitbox of a measured entity.
    ///
    /// Its own sort offset is not applied: a displaced entity keeps accepting
    /// drops at its resting place.
    pub(crate) fn hitbox<D>(&self, registry: &Registry<D>, entity: EntityId) -> Option<Rect> {
        let rec = registry.get(entity)?;
        let initial = rec.initial?;
        Some(initial_to_current(
            initial,
            self.region_shift(rec.desc.region),
            self.ancestor_sort_shift(registry, entity),
        ))
    }

    /// Converts a rectangle measured now into the entity's stored form,
    /// removing scroll and every sort displacement present at measurement.
    pub(crate) fn to_initial<D>(
        &self,
        registry: &Registry<D>,
        entity: EntityId,
        measured: Rect,
    ) -> Option<Rect> {
        let rec = registry.get(entity)?;
        let sort = self.sort_offset(entity) + self.ancestor_sort_shift(registry, entity);
        Some(measured_to_initial(measured, self.region_shift(rec.desc.region), sort))
    }
}
