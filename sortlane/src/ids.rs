// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifier types.
//!
//! [`EntityId`], [`ScopeId`] and [`PointerId`] are chosen by the host.
//! [`RegionId`] and [`SortGroupId`] are allocated by the [`Stage`](crate::Stage).

use core::fmt;

use sortlane_geometry::Side;

/// Host-chosen identifier of a registered entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Host-chosen drag scope. Entities only interact within one scope.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u64);

/// Host-chosen pointer identifier, as reported by the input system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

/// Scrollable region handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub(crate) u32);

/// Sort group handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortGroupId(pub(crate) u32);

/// One of the four edge trigger zones of a region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId {
    /// Region owning the zone.
    pub region: RegionId,
    /// Edge of the region.
    pub side: Side,
}

impl ZoneId {
    /// The four zones of `region`, clockwise from the top.
    #[must_use]
    pub fn all(region: RegionId) -> [Self; 4] {
        Side::ALL.map(|side| Self { region, side })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

impl fmt::Display for SortGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sort-group#{}", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}", self.region, self.side)
    }
}
