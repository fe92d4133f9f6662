// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend for `f64` coordinates.
//!
//! Each slot is bucketed into every cell its box touches. Buckets cache the
//! combined summary of their slots so a filtered query can skip a whole cell.
//! Boxes that would touch too many cells live in an overflow list that is
//! scanned linearly.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::backend::{Backend, SubtreeFilter, SubtreeSummary};
use crate::types::Aabb2D;

const MAX_CELLS_PER_SLOT: i64 = 1024;
const DEFAULT_CELL: f64 = 64.0;

type Cell = (i64, i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellRange {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl CellRange {
    fn count(&self) -> i64 {
        (self.x1 - self.x0 + 1).saturating_mul(self.y1 - self.y0 + 1)
    }

    fn clip(&self, other: &Self) -> Option<Self> {
        let r = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (r.x0 <= r.x1 && r.y0 <= r.y1).then_some(r)
    }

    fn cells(self) -> impl Iterator<Item = Cell> {
        (self.y0..=self.y1).flat_map(move |y| (self.x0..=self.x1).map(move |x| (x, y)))
    }
}

struct Bucket<S> {
    slots: SmallVec<[usize; 4]>,
    summary: S,
}

#[derive(Clone, Copy)]
struct Entry<S> {
    aabb: Aabb2D<f64>,
    summary: S,
    // `None` for overflow slots.
    range: Option<CellRange>,
}

/// Uniform grid over `f64` boxes.
pub struct Grid<S: SubtreeSummary = ()> {
    cell: f64,
    entries: Vec<Option<Entry<S>>>,
    buckets: HashMap<Cell, Bucket<S>>,
    overflow: Vec<usize>,
}

impl<S: SubtreeSummary> Grid<S> {
    /// Creates a grid with square cells of side `cell`.
    ///
    /// Non-positive or non-finite sizes fall back to 64.
    #[must_use]
    pub fn new(cell: f64) -> Self {
        let cell = if cell.is_finite() && cell > 0.0 {
            cell
        } else {
            DEFAULT_CELL
        };
        Self {
            cell,
            entries: Vec::new(),
            buckets: HashMap::new(),
            overflow: Vec::new(),
        }
    }

    /// Cell side length.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    fn coord(&self, v: f64) -> i64 {
        let q = v / self.cell;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "saturating float-to-int conversion is the intended floor for huge values"
        )]
        let t = q as i64;
        if (t as f64) > q { t - 1 } else { t }
    }

    fn range_of(&self, aabb: &Aabb2D<f64>) -> CellRange {
        CellRange {
            x0: self.coord(aabb.min_x),
            y0: self.coord(aabb.min_y),
            x1: self.coord(aabb.max_x),
            y1: self.coord(aabb.max_y),
        }
    }

    fn place(&mut self, slot: usize, aabb: Aabb2D<f64>, summary: S) {
        let range = self.range_of(&aabb);
        let range = (range.count() <= MAX_CELLS_PER_SLOT).then_some(range);
        match range {
            Some(r) => {
                for cell in r.cells() {
                    let bucket = self.buckets.entry(cell).or_insert_with(|| Bucket {
                        slots: SmallVec::new(),
                        summary: S::empty(),
                    });
                    bucket.slots.push(slot);
                    bucket.summary = S::combine(bucket.summary, summary);
                }
            }
            None => self.overflow.push(slot),
        }
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(Entry {
            aabb,
            summary,
            range,
        });
    }

    fn unplace(&mut self, slot: usize) -> Option<Entry<S>> {
        let entry = self.entries.get_mut(slot)?.take()?;
        match entry.range {
            Some(r) => {
                for cell in r.cells() {
                    let Some(bucket) = self.buckets.get_mut(&cell) else {
                        continue;
                    };
                    bucket.slots.retain(|s| *s != slot);
                    if bucket.slots.is_empty() {
                        self.buckets.remove(&cell);
                        continue;
                    }
                    let mut summary = S::empty();
                    for s in &bucket.slots {
                        if let Some(Some(e)) = self.entries.get(*s) {
                            summary = S::combine(summary, e.summary);
                        }
                    }
                    bucket.summary = summary;
                }
            }
            None => self.overflow.retain(|s| *s != slot),
        }
        Some(entry)
    }

    fn visit_impl(&self, rect: Aabb2D<f64>, keep: impl Fn(&S) -> bool, mut f: impl FnMut(usize)) {
        let query = self.range_of(&rect);
        for &slot in &self.overflow {
            if let Some(Some(e)) = self.entries.get(slot)
                && keep(&e.summary)
                && e.aabb.overlaps(&rect)
            {
                f(slot);
            }
        }
        let mut visit_cell = |cell: Cell| {
            let Some(bucket) = self.buckets.get(&cell) else {
                return;
            };
            if !keep(&bucket.summary) {
                return;
            }
            for &slot in &bucket.slots {
                let Some(Some(e)) = self.entries.get(slot) else {
                    continue;
                };
                // Report each slot once: in the first cell it shares with the query.
                let Some(shared) = e.range.and_then(|r| r.clip(&query)) else {
                    continue;
                };
                if (shared.x0, shared.y0) == cell && keep(&e.summary) && e.aabb.overlaps(&rect) {
                    f(slot);
                }
            }
        };
        if query.count() <= MAX_CELLS_PER_SLOT.saturating_mul(4) {
            query.cells().for_each(&mut visit_cell);
        } else {
            // Very large queries walk occupied buckets instead of empty cells.
            for &(x, y) in self.buckets.keys() {
                if (query.x0..=query.x1).contains(&x) && (query.y0..=query.y1).contains(&y) {
                    visit_cell((x, y));
                }
            }
        }
    }
}

impl<S: SubtreeSummary> Default for Grid<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CELL)
    }
}

impl<S: SubtreeSummary> Debug for Grid<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Grid")
            .field("cell", &self.cell)
            .field("alive", &alive)
            .field("buckets", &self.buckets.len())
            .field("overflow", &self.overflow.len())
            .finish_non_exhaustive()
    }
}

impl<S: SubtreeSummary> Backend<f64, S> for Grid<S> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<f64>, summary: S) {
        self.unplace(slot);
        self.place(slot, aabb, summary);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<f64>) {
        if let Some(entry) = self.unplace(slot) {
            self.place(slot, aabb, entry.summary);
        }
    }

    fn remove(&mut self, slot: usize) {
        self.unplace(slot);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.overflow.clear();
    }

    fn visit_point<F: FnMut(usize)>(&self, x: f64, y: f64, f: F) {
        self.visit_rect(Aabb2D::new(x, y, x, y), f);
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<f64>, f: F) {
        self.visit_impl(rect, |_| true, f);
    }

    fn visit_rect_filtered<Q, Filt, F>(&self, rect: Aabb2D<f64>, query: &Q, filter: &Filt, f: F)
    where
        Filt: SubtreeFilter<S, Q>,
        F: FnMut(usize),
    {
        self.visit_impl(rect, |s| filter.may_contain(s, query), f);
    }
}
