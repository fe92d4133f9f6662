// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed index over a spatial backend.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::backend::{Backend, SubtreeFilter, SubtreeSummary};
use crate::backends::FlatVec;
#[cfg(feature = "backend_grid")]
use crate::backends::Grid;
use crate::types::{Aabb2D, Key};

#[derive(Clone, Debug)]
struct Slot<T, P> {
    aabb: Aabb2D<T>,
    payload: P,
}

/// AABB index with stable keys, payloads, and a pluggable backend.
pub struct IndexGeneric<T, P, B, S = ()>
where
    T: Copy + PartialOrd + Debug,
    B: Backend<T, S>,
    S: SubtreeSummary,
{
    slots: Vec<Option<Slot<T, P>>>,
    generations: Vec<u32>,
    free: Vec<u32>,
    len: usize,
    backend: B,
    _summary: PhantomData<S>,
}

/// Index over a [`FlatVec`] backend.
pub type Index<T, P, S = ()> = IndexGeneric<T, P, FlatVec<T, S>, S>;

impl<T, P, S> Index<T, P, S>
where
    T: Copy + PartialOrd + Debug,
    S: SubtreeSummary,
{
    /// Creates an empty index that scans linearly.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(FlatVec::default())
    }
}

#[cfg(feature = "backend_grid")]
impl<P, S: SubtreeSummary> IndexGeneric<f64, P, Grid<S>, S> {
    /// Creates an empty index bucketed into square cells of side `cell`.
    #[must_use]
    pub fn with_grid(cell: f64) -> Self {
        Self::with_backend(Grid::new(cell))
    }
}

impl<T, P, S> Default for Index<T, P, S>
where
    T: Copy + PartialOrd + Debug,
    S: SubtreeSummary,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B, S> Debug for IndexGeneric<T, P, B, S>
where
    T: Copy + PartialOrd + Debug,
    B: Backend<T, S> + Debug,
    S: SubtreeSummary,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IndexGeneric")
            .field("len", &self.len)
            .field("free", &self.free.len())
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl<T, P, B, S> IndexGeneric<T, P, B, S>
where
    T: Copy + PartialOrd + Debug,
    B: Backend<T, S>,
    S: SubtreeSummary,
{
    /// Creates an empty index over `backend`.
    #[must_use]
    pub fn with_backend(backend: B) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            len: 0,
            backend,
            _summary: PhantomData,
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts an entry with the empty summary.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        self.insert_with_summary(aabb, payload, S::empty())
    }

    /// Inserts an entry tagged with `summary` for filtered queries.
    pub fn insert_with_summary(&mut self, aabb: Aabb2D<T>, payload: P, summary: S) -> Key {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(None);
                self.generations.push(0);
                slot
            }
        };
        let i = slot as usize;
        self.slots[i] = Some(Slot { aabb, payload });
        self.backend.insert(i, aabb, summary);
        self.len += 1;
        Key {
            slot,
            generation: self.generations[i],
        }
    }

    fn live(&self, key: Key) -> Option<usize> {
        let i = key.slot();
        (self.generations.get(i) == Some(&key.generation)
            && self.slots.get(i).is_some_and(Option::is_some))
        .then_some(i)
    }

    /// Moves an entry. Returns `false` for stale keys.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<T>) -> bool {
        let Some(i) = self.live(key) else {
            return false;
        };
        if let Some(slot) = self.slots[i].as_mut() {
            slot.aabb = aabb;
        }
        self.backend.update(i, aabb);
        true
    }

    /// Removes an entry and returns its payload.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        let i = self.live(key)?;
        let slot = self.slots[i].take()?;
        self.backend.remove(i);
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free.push(key.slot);
        self.len -= 1;
        Some(slot.payload)
    }

    /// Removes every entry. Outstanding keys become stale.
    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.generations[i] = self.generations[i].wrapping_add(1);
            }
        }
        self.free.clear();
        self.free.extend(
            (0..self.slots.len())
                .rev()
                .filter_map(|i| u32::try_from(i).ok()),
        );
        self.backend.clear();
        self.len = 0;
    }

    /// Box and payload of a live entry.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<(&Aabb2D<T>, &P)> {
        let i = self.live(key)?;
        self.slots[i].as_ref().map(|s| (&s.aabb, &s.payload))
    }

    fn key_at(&self, i: usize) -> Option<(Key, &P)> {
        let slot = self.slots.get(i)?.as_ref()?;
        Some((
            Key {
                slot: u32::try_from(i).ok()?,
                generation: self.generations[i],
            },
            &slot.payload,
        ))
    }

    /// Visits entries whose box contains the point.
    pub fn visit_point<F: FnMut(Key, &P)>(&self, x: T, y: T, mut f: F) {
        self.backend.visit_point(x, y, |i| {
            if let Some((k, p)) = self.key_at(i) {
                f(k, p);
            }
        });
    }

    /// Visits entries whose box intersects `rect`. Touching counts.
    pub fn visit_rect<F: FnMut(Key, &P)>(&self, rect: Aabb2D<T>, mut f: F) {
        self.backend.visit_rect(rect, |i| {
            if let Some((k, p)) = self.key_at(i) {
                f(k, p);
            }
        });
    }

    /// Visits entries whose box intersects `rect` and whose summary passes `filter`.
    pub fn visit_rect_filtered<Q, Filt, F>(
        &self,
        rect: Aabb2D<T>,
        query: &Q,
        filter: &Filt,
        mut f: F,
    ) where
        Filt: SubtreeFilter<S, Q>,
        F: FnMut(Key, &P),
    {
        self.backend.visit_rect_filtered(rect, query, filter, |i| {
            if let Some((k, p)) = self.key_at(i) {
                f(k, p);
            }
        });
    }

    /// Collects `(key, payload)` pairs intersecting `rect`, in slot order.
    #[must_use]
    pub fn query_rect(&self, rect: Aabb2D<T>) -> Vec<(Key, P)>
    where
        P: Clone,
    {
        let mut out = Vec::new();
        self.visit_rect(rect, |k, p| out.push((k, p.clone())));
        out.sort_by_key(|(k, _)| *k);
        out
    }
}
