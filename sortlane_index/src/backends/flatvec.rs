// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::{Backend, SubtreeFilter, SubtreeSummary};
use crate::types::Aabb2D;

/// Flat vector backend with linear scans.
///
/// Summaries are checked per slot before the box test.
pub struct FlatVec<T: Copy + PartialOrd + Debug, S: SubtreeSummary = ()> {
    entries: Vec<Option<(Aabb2D<T>, S)>>,
}

impl<T: Copy + PartialOrd + Debug, S: SubtreeSummary> Default for FlatVec<T, S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Copy + PartialOrd + Debug, S: SubtreeSummary> Debug for FlatVec<T, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl<T: Copy + PartialOrd + Debug, S: SubtreeSummary> Backend<T, S> for FlatVec<T, S> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>, summary: S) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some((aabb, summary));
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if let Some(Some((a, _))) = self.entries.get_mut(slot) {
            *a = aabb;
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, mut f: F) {
        for (i, slot) in self.entries.iter().enumerate() {
            if let Some((a, _)) = slot.as_ref()
                && a.contains_point(x, y)
            {
                f(i);
            }
        }
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        for (i, slot) in self.entries.iter().enumerate() {
            if let Some((a, _)) = slot.as_ref()
                && a.overlaps(&rect)
            {
                f(i);
            }
        }
    }

    fn visit_rect_filtered<Q, Filt, F>(&self, rect: Aabb2D<T>, query: &Q, filter: &Filt, mut f: F)
    where
        Filt: SubtreeFilter<S, Q>,
        F: FnMut(usize),
    {
        for (i, slot) in self.entries.iter().enumerate() {
            if let Some((a, s)) = slot.as_ref()
                && filter.may_contain(s, query)
                && a.overlaps(&rect)
            {
                f(i);
            }
        }
    }
}
