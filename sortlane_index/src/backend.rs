// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait and summary/filter abstractions for broad-phase queries.

use core::fmt::Debug;

use crate::types::Aabb2D;

/// Aggregate value cached per slot (and per bucket, for bucketed backends).
///
/// The `()` summary stores nothing and never prunes. The `u64` summary is a
/// bitmask combined with `|`, which is how Sortlane tags each slot with the
/// set of drag types it accepts.
pub trait SubtreeSummary: Copy {
    /// Identity summary for an empty group.
    fn empty() -> Self;

    /// Combines the summaries of two groups.
    fn combine(left: Self, right: Self) -> Self;
}

impl SubtreeSummary for () {
    #[inline]
    fn empty() -> Self {}

    #[inline]
    fn combine(_: Self, _: Self) -> Self {}
}

impl SubtreeSummary for u64 {
    #[inline]
    fn empty() -> Self {
        0
    }

    #[inline]
    fn combine(left: Self, right: Self) -> Self {
        left | right
    }
}

/// Query-dependent filter over summaries.
///
/// Filters are conservative: `false` guarantees that nothing summarized by
/// `summary` is relevant to `query`.
pub trait SubtreeFilter<S, Q> {
    /// Returns `true` if the group described by `summary` may match `query`.
    fn may_contain(&self, summary: &S, query: &Q) -> bool;
}

impl<Q> SubtreeFilter<(), Q> for () {
    #[inline]
    fn may_contain(&self, _summary: &(), _query: &Q) -> bool {
        true
    }
}

/// `u64` summaries as bitmasks: a group is relevant if it shares any bit
/// with the query mask.
impl SubtreeFilter<u64, u64> for () {
    #[inline]
    fn may_contain(&self, summary: &u64, query: &u64) -> bool {
        (*summary & *query) != 0
    }
}

/// Spatial backend used by [`IndexGeneric`](crate::IndexGeneric).
///
/// Backends only know about slots; the index owns payloads and keys.
pub trait Backend<T, S = ()>
where
    T: Copy + PartialOrd + Debug,
    S: SubtreeSummary,
{
    /// Inserts a new slot.
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>, summary: S);

    /// Moves an existing slot.
    fn update(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Removes a slot.
    fn remove(&mut self, slot: usize);

    /// Removes every slot.
    fn clear(&mut self);

    /// Visits slots whose box contains the point.
    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, f: F);

    /// Visits slots whose box intersects `rect`.
    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, f: F);

    /// Visits slots whose box intersects `rect` and whose summary passes `filter`.
    ///
    /// The default implementation ignores the filter.
    fn visit_rect_filtered<Q, Filt, F>(&self, rect: Aabb2D<T>, query: &Q, filter: &Filt, f: F)
    where
        Filt: SubtreeFilter<S, Q>,
        F: FnMut(usize),
    {
        let _ = (query, filter);
        self.visit_rect(rect, f);
    }
}
