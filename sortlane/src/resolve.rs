// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop-target and trigger-zone resolution.
//!
//! Candidates are gathered through a broad-phase index whose per-slot summary
//! is the accepted [`TypeSet`]; the query carries the dragged kind, so
//! candidates that would refuse the drag are never visited. The narrow phase
//! then picks one primary target and measures every zone hit.

use kurbo::Rect;
use smallvec::SmallVec;
use sortlane_geometry::metric::{
    biased_center_distance, closest_corners_distance, edge_distance, overlap_ratio,
};
use sortlane_index::backends::Grid;
use sortlane_index::{Aabb2D, Index, IndexGeneric, Key};

use crate::config::{BroadPhase, IntersectionStrategy, StageConfig};
use crate::ids::{EntityId, ZoneId};
use crate::types::{TypeSet, TypeTag};

fn aabb(r: Rect) -> Aabb2D<f64> {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

/// Broad-phase index over one kind of candidate, with the backend chosen at
/// runtime from [`BroadPhase`].
#[derive(Debug)]
pub(crate) enum BroadPhaseIndex<P: Copy> {
    Flat(Index<f64, (P, Rect), TypeSet>),
    Grid(IndexGeneric<f64, (P, Rect), Grid<TypeSet>, TypeSet>),
}

impl<P: Copy + Ord> BroadPhaseIndex<P> {
    pub(crate) fn new(kind: BroadPhase) -> Self {
        match kind {
            BroadPhase::FlatVec => Self::Flat(Index::new()),
            BroadPhase::Grid { cell } => Self::Grid(IndexGeneric::with_grid(cell)),
        }
    }

    pub(crate) fn clear(&mut self) {
        match self {
            Self::Flat(i) => i.clear(),
            Self::Grid(i) => i.clear(),
        }
    }

    pub(crate) fn insert(&mut self, payload: P, rect: Rect, accepts: TypeSet) {
        match self {
            Self::Flat(i) => {
                i.insert_with_summary(aabb(rect), (payload, rect), accepts);
            }
            Self::Grid(i) => {
                i.insert_with_summary(aabb(rect), (payload, rect), accepts);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Flat(i) => i.len(),
            Self::Grid(i) => i.len(),
        }
    }

    /// Candidates overlapping `rect` that accept `kind`, ordered by payload.
    pub(crate) fn query(&self, rect: Rect, kind: TypeTag) -> Vec<(P, Rect)> {
        let mut out = Vec::new();
        let push = |_: Key, hit: &(P, Rect)| out.push(*hit);
        match self {
            Self::Flat(i) => i.visit_rect_filtered(aabb(rect), &kind, &(), push),
            Self::Grid(i) => i.visit_rect_filtered(aabb(rect), &kind, &(), push),
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// Picks the primary intersection among `hits`.
///
/// Ties keep the earliest candidate, so the result is stable for a stable
/// candidate order.
pub(crate) fn best_target(
    config: &StageConfig,
    drag: Rect,
    hits: &[(EntityId, Rect)],
) -> Option<EntityId> {
    // Lower score is better for every strategy.
    let score = |r: Rect| match config.strategy {
        IntersectionStrategy::CenterDistanceBiased => {
            biased_center_distance(drag, r, config.above_center_penalty)
        }
        // Touching without overlap is not a hit for this strategy.
        IntersectionStrategy::OverlapRatio => match overlap_ratio(drag, r) {
            ratio if ratio > 0.0 => -ratio,
            _ => f64::NAN,
        },
        IntersectionStrategy::ClosestCorners => closest_corners_distance(drag, r),
    };
    let mut best: Option<(EntityId, f64)> = None;
    for &(id, rect) in hits {
        let s = score(rect);
        if s.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| s < b) {
            best = Some((id, s));
        }
    }
    best.map(|(id, _)| id)
}

pub(crate) type ZoneHits = SmallVec<[(ZoneId, f64); 2]>;

/// Edge distance for every zone hit.
pub(crate) fn zone_strengths(drag: Rect, hits: &[(ZoneId, Rect)]) -> ZoneHits {
    hits.iter()
        .map(|&(zone, rect)| (zone, edge_distance(drag, rect, zone.side)))
        .collect()
}

/// Difference between two sets of zone hits, keyed by zone.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ZoneDiff {
    pub(crate) begin: ZoneHits,
    pub(crate) update: ZoneHits,
    pub(crate) end: ZoneHits,
}

pub(crate) fn diff_zones(prev: &[(ZoneId, f64)], next: &[(ZoneId, f64)]) -> ZoneDiff {
    let mut diff = ZoneDiff::default();
    for &(zone, strength) in next {
        match prev.iter().find(|(z, _)| *z == zone) {
            None => diff.begin.push((zone, strength)),
            Some(&(_, old)) if old != strength => diff.update.push((zone, strength)),
            Some(_) => {}
        }
    }
    for &(zone, strength) in prev {
        if !next.iter().any(|(z, _)| *z == zone) {
            diff.end.push((zone, strength));
        }
    }
    diff
}
