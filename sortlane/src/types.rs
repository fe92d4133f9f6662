// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interned type tags and accept sets.
//!
//! Hosts name draggable kinds with strings ("card", "lane"). The stage interns
//! each name once into a [`TypeTag`], and an entity's accepted kinds become a
//! [`TypeSet`] bitmask. A bitmask doubles as the broad-phase summary, so the
//! "does this target accept the dragged kind" test is a single `&`.

use core::fmt;

use hashbrown::HashMap;
use sortlane_index::{SubtreeFilter, SubtreeSummary};

use crate::error::StageError;

/// Maximum number of distinct type names per stage.
pub const MAX_TYPES: usize = 64;

/// Compact handle to an interned type name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeTag(u8);

impl TypeTag {
    /// Bit of this tag inside a [`TypeSet`].
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u64 {
        1_u64 << self.0
    }

    /// Returns this tag as a `usize` index.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Set of [`TypeTag`]s, stored as a bitmask.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeSet(u64);

impl TypeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Set containing a single tag.
    #[must_use]
    pub const fn of(tag: TypeTag) -> Self {
        Self(tag.bit())
    }

    /// Returns `self` with `tag` added.
    #[must_use]
    pub const fn with(self, tag: TypeTag) -> Self {
        Self(self.0 | tag.bit())
    }

    /// Adds `tag` in place.
    pub fn insert(&mut self, tag: TypeTag) {
        self.0 |= tag.bit();
    }

    /// Returns `true` if `tag` is in the set.
    #[must_use]
    pub const fn contains(self, tag: TypeTag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Iterates the tags in ascending order.
    pub fn iter(self) -> impl Iterator<Item = TypeTag> {
        (0..64_u8).filter(move |i| self.0 & (1_u64 << i) != 0).map(TypeTag)
    }
}

impl From<TypeTag> for TypeSet {
    fn from(tag: TypeTag) -> Self {
        Self::of(tag)
    }
}

impl FromIterator<TypeTag> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl core::ops::BitOr for TypeSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for TypeSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl SubtreeSummary for TypeSet {
    #[inline]
    fn empty() -> Self {
        Self::EMPTY
    }

    #[inline]
    fn combine(left: Self, right: Self) -> Self {
        left | right
    }
}

/// A broad-phase entry is relevant if it accepts the dragged kind.
impl SubtreeFilter<TypeSet, TypeTag> for () {
    #[inline]
    fn may_contain(&self, summary: &TypeSet, query: &TypeTag) -> bool {
        summary.contains(*query)
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Interns type names into [`TypeTag`]s.
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeRegistry {
    names: Vec<Box<str>>,
    lookup: HashMap<Box<str>, TypeTag>,
}

impl TypeRegistry {
    /// Interns `name`, returning the existing tag when already known.
    pub(crate) fn intern(&mut self, name: &str) -> Result<TypeTag, StageError> {
        if let Some(tag) = self.lookup.get(name) {
            return Ok(*tag);
        }
        let index = u8::try_from(self.names.len())
            .ok()
            .filter(|i| usize::from(*i) < MAX_TYPES)
            .ok_or(StageError::TooManyTypes { limit: MAX_TYPES })?;
        let tag = TypeTag(index);
        self.names.push(name.into());
        self.lookup.insert(name.into(), tag);
        Ok(tag)
    }

    pub(crate) fn get(&self, name: &str) -> Option<TypeTag> {
        self.lookup.get(name).copied()
    }

    pub(crate) fn name(&self, tag: TypeTag) -> Option<&str> {
        self.names.get(tag.as_usize()).map(|n| &**n)
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut reg = TypeRegistry::default();
        let card = reg.intern("card").unwrap();
        let lane = reg.intern("lane").unwrap();
        assert_ne!(card, lane);
        assert_eq!(reg.intern("card").unwrap(), card);
        assert_eq!(reg.name(lane), Some("lane"));
        assert_eq!(reg.get("card"), Some(card));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn sixty_fifth_type_is_rejected() {
        let mut reg = TypeRegistry::default();
        for i in 0..MAX_TYPES {
            reg.intern(&format!("t{i}")).unwrap();
        }
        assert_eq!(
            reg.intern("one-too-many"),
            Err(StageError::TooManyTypes { limit: MAX_TYPES })
        );
        // Known names still resolve.
        assert!(reg.intern("t63").is_ok());
    }

    #[test]
    fn sets() {
        let mut reg = TypeRegistry::default();
        let a = reg.intern("a").unwrap();
        let b = reg.intern("b").unwrap();
        let set: TypeSet = [a, b].into_iter().collect();
        assert!(set.contains(a) && set.contains(b));
        assert_eq!(set.iter().collect::<Vec<_>>(), [a, b]);
        assert!(!TypeSet::of(a).contains(b));
        assert!(TypeSet::EMPTY.is_empty());
        assert_eq!(TypeSet::of(a) | TypeSet::of(b), set);
    }

    #[test]
    fn accept_filter_matches_contained_tags() {
        let mut reg = TypeRegistry::default();
        let card = reg.intern("card").unwrap();
        let lane = reg.intern("lane").unwrap();
        let accepts = TypeSet::of(card);
        assert!(().may_contain(&accepts, &card));
        assert!(!().may_contain(&accepts, &lane));
        let merged = <TypeSet as SubtreeSummary>::combine(accepts, TypeSet::of(lane));
        assert!(().may_contain(&merged, &lane));
    }
}
