// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core value types: axis-aligned boxes and stable slot keys.

use core::fmt::Debug;
use core::ops::{Add, Sub};

/// Axis-aligned bounding box in two dimensions.
///
/// Bounds are closed: a box with `min_x == max_x` still contains points on
/// that line, and two boxes sharing an edge overlap.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Aabb2D<T> {
    /// Minimum X.
    pub min_x: T,
    /// Minimum Y.
    pub min_y: T,
    /// Maximum X.
    pub max_x: T,
    /// Maximum Y.
    pub max_y: T,
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Creates a box from its corners, swapping components as needed so the
    /// result is well formed.
    #[must_use]
    pub fn new(x0: T, y0: T, x1: T, y1: T) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Returns `true` if `(x, y)` lies inside or on the boundary.
    #[must_use]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns `true` if the two boxes share at least one point.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Returns `true` if the box is inverted on either axis.
    ///
    /// Degenerate (zero-width) boxes are not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    /// Smallest box containing both inputs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: pick(self.min_x, other.min_x, |a, b| a < b),
            min_y: pick(self.min_y, other.min_y, |a, b| a < b),
            max_x: pick(self.max_x, other.max_x, |a, b| a > b),
            max_y: pick(self.max_y, other.max_y, |a, b| a > b),
        }
    }
}

impl<T: Copy + PartialOrd + Add<Output = T> + Sub<Output = T>> Aabb2D<T> {
    /// Creates a box from an origin and a size.
    #[must_use]
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> T {
        self.max_x - self.min_x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> T {
        self.max_y - self.min_y
    }
}

fn pick<T: Copy>(a: T, b: T, prefer_a: impl Fn(T, T) -> bool) -> T {
    if prefer_a(a, b) { a } else { b }
}

/// Stable handle to an entry in an [`IndexGeneric`](crate::IndexGeneric).
///
/// A key stays valid until its entry is removed or the index is cleared. Slots
/// are reused, so keys carry a generation that invalidates stale handles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl Key {
    /// Slot position inside the index.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }

    /// Generation of the slot when this key was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}
