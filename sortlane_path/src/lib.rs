// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sortlane Path: hierarchical position algebra.
//!
//! A [`Path`] locates an entity among its ancestors: `[1, 0]` is the first
//! child of the second root entity. Paths are compared to decide which
//! siblings shift to open a drop gap and whether a drop would be a no-op.
//!
//! ## Relations
//!
//! - **Siblings**: same length, identical prefix, different last index.
//! - **Direction** ([`sibling_direction`]): where `other` sits as seen from
//!   `reference`: [`SiblingDirection::SelfPath`] when equal,
//!   [`SiblingDirection::After`] when it is a later sibling,
//!   [`SiblingDirection::Before`] when it is an earlier sibling, otherwise
//!   [`SiblingDirection::NotSiblings`].
//! - **Next sibling** ([`is_next_sibling`]): `other` immediately follows
//!   `reference`.
//! - **Adjacent** ([`is_adjacent`]): either path is the next sibling of the
//!   other. This relation is symmetric.
//!
//! ```rust
//! use sortlane_path::{SiblingDirection, is_adjacent, is_next_sibling, sibling_direction};
//!
//! let i0 = [1, 0];
//! let i1 = [1, 1];
//!
//! assert_eq!(sibling_direction(&i0, &i1), SiblingDirection::After);
//! assert_eq!(sibling_direction(&i1, &i0), SiblingDirection::Before);
//! assert!(is_next_sibling(&i0, &i1));
//! assert!(is_adjacent(&i1, &i0));
//!
//! // Lanes 0 and 2 are siblings but not adjacent.
//! assert!(!is_adjacent(&[0], &[2]));
//! ```
//!
//! Paths of different lengths, or with different prefixes, are never siblings,
//! so they are never shifted relative to each other and never count as an
//! invalid self drop.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

use core::fmt;
use core::ops::Deref;

use smallvec::SmallVec;

/// Root-relative position of an entity in its ancestor chain.
///
/// Paths are values: they are computed on demand from the live ancestor chain
/// and should not be cached across registration changes.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(SmallVec<[u32; 6]>);

impl Path {
    /// The empty (root) path.
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Returns a copy of `self` extended by one child index.
    #[must_use]
    pub fn child(&self, index: u32) -> Self {
        let mut out = self.clone();
        out.push(index);
        out
    }

    /// Appends an index in place.
    pub fn push(&mut self, index: u32) {
        self.0.push(index);
    }

    /// Returns the path without its last component, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, prefix) = self.0.split_last()?;
        Some(Self(SmallVec::from_slice(prefix)))
    }

    /// Borrows the indices.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl Deref for Path {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.0
    }
}

impl From<&[u32]> for Path {
    fn from(value: &[u32]) -> Self {
        Self(SmallVec::from_slice(value))
    }
}

impl<const N: usize> From<[u32; N]> for Path {
    fn from(value: [u32; N]) -> Self {
        Self(value.iter().copied().collect())
    }
}

impl FromIterator<u32> for Path {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{step}")?;
        }
        f.write_str("]")
    }
}

/// Position of one path relative to a reference path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SiblingDirection {
    /// Earlier sibling of the reference.
    Before,
    /// Later sibling of the reference.
    After,
    /// The reference itself.
    SelfPath,
    /// Different parent or different depth.
    NotSiblings,
}

impl SiblingDirection {
    /// Returns the direction seen from the other side.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::After => Self::Before,
            other => other,
        }
    }

    /// `true` for [`Self::SelfPath`] and [`Self::After`]: the positions that
    /// move to open a gap in front of the reference.
    #[must_use]
    pub const fn opens_gap(self) -> bool {
        matches!(self, Self::SelfPath | Self::After)
    }
}

/// Returns `true` if both paths share a parent and differ in the last index.
#[must_use]
pub fn are_siblings(a: &[u32], b: &[u32]) -> bool {
    match (a.split_last(), b.split_last()) {
        (Some((la, pa)), Some((lb, pb))) => pa == pb && la != lb,
        _ => false,
    }
}

/// Where `other` sits as seen from `reference`.
#[must_use]
pub fn sibling_direction(reference: &[u32], other: &[u32]) -> SiblingDirection {
    if reference == other {
        return SiblingDirection::SelfPath;
    }
    if !are_siblings(reference, other) {
        return SiblingDirection::NotSiblings;
    }
    // Both are non-empty here.
    let last = reference.len() - 1;
    if reference[last] < other[last] {
        SiblingDirection::After
    } else {
        SiblingDirection::Before
    }
}

/// Returns `true` if `other` immediately follows `reference` under the same parent.
#[must_use]
pub fn is_next_sibling(reference: &[u32], other: &[u32]) -> bool {
    are_siblings(reference, other)
        && reference
            .last()
            .zip(other.last())
            .is_some_and(|(r, o)| r.checked_add(1) == Some(*o))
}

/// Returns `true` if either path is the next sibling of the other.
#[must_use]
pub fn is_adjacent(a: &[u32], b: &[u32]) -> bool {
    is_next_sibling(a, b) || is_next_sibling(b, a)
}

/// Returns `true` if dropping `dragged` onto `target` would not move it.
///
/// A drop target designates the slot in front of it, so dropping onto
/// oneself or onto one's next sibling leaves the order unchanged.
#[must_use]
pub fn is_invalid_drop(dragged: &[u32], target: &[u32]) -> bool {
    dragged == target || is_next_sibling(dragged, target)
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::format;

    #[test]
    fn root_paths_are_never_siblings() {
        assert!(!are_siblings(&[], &[]));
        assert!(!are_siblings(&[], &[0]));
    }

    #[test]
    fn self_is_not_a_sibling_but_has_self_direction() {
        assert!(!are_siblings(&[2, 3], &[2, 3]));
        assert_eq!(sibling_direction(&[2, 3], &[2, 3]), SiblingDirection::SelfPath);
    }

    #[test]
    fn different_prefix_or_depth() {
        assert_eq!(sibling_direction(&[0, 1], &[1, 2]), SiblingDirection::NotSiblings);
        assert_eq!(sibling_direction(&[0], &[0, 1]), SiblingDirection::NotSiblings);
        assert!(!is_adjacent(&[0, 1], &[1, 2]));
        assert!(!is_invalid_drop(&[0, 1], &[1, 2]));
    }

    #[test]
    fn next_sibling_does_not_overflow() {
        assert!(!is_next_sibling(&[u32::MAX], &[0]));
    }

    #[test]
    fn invalid_drops() {
        assert!(is_invalid_drop(&[1, 0], &[1, 0]));
        assert!(is_invalid_drop(&[1, 0], &[1, 1]));
        assert!(!is_invalid_drop(&[1, 1], &[1, 0]));
        assert!(!is_invalid_drop(&[0], &[2]));
    }

    #[test]
    fn path_helpers() {
        let p = Path::from([1, 4]);
        assert_eq!(p.child(2).as_slice(), &[1, 4, 2]);
        assert_eq!(p.parent(), Some(Path::from([1])));
        assert_eq!(Path::new().parent(), None);
        assert_eq!(format!("{p}"), "[1, 4]");
        assert_eq!(format!("{p:?}"), "[1, 4]");
    }

    #[test]
    fn opens_gap() {
        assert!(SiblingDirection::SelfPath.opens_gap());
        assert!(SiblingDirection::After.opens_gap());
        assert!(!SiblingDirection::Before.opens_gap());
        assert!(!SiblingDirection::NotSiblings.opens_gap());
    }
}
