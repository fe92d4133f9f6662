// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity registry: descriptors, cached geometry, and the parent/child tree.
//!
//! Entities are owned here and referenced everywhere else by [`EntityId`].
//! Parents keep non-owning child lists so that unregistering a parent can
//! cascade to its subtree. Paths are computed on demand by walking the parent
//! chain; they are never cached.

use hashbrown::HashMap;
use kurbo::Rect;
use smallvec::SmallVec;
use sortlane_path::Path;

use crate::error::StageError;
use crate::ids::{EntityId, RegionId, ScopeId, SortGroupId};
use crate::types::{TypeSet, TypeTag};

bitflags::bitflags! {
    /// Runtime state of an entity.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u8 {
        /// Reported visible by the host and not hidden since.
        const VISIBLE  = 0b0000_0001;
        /// Has an initial rectangle.
        const MEASURED = 0b0000_0010;
        /// Currently being dragged.
        const DRAGGING = 0b0000_0100;
        /// Displaced by its sort group.
        const SHIFTED  = 0b0000_1000;
    }
}

impl EntityFlags {
    /// Visible and measured: takes part in intersection tests.
    #[must_use]
    pub fn is_active(self) -> bool {
        self.contains(Self::VISIBLE | Self::MEASURED)
    }
}

/// Static description of an entity, supplied at registration.
///
/// ```rust
/// use sortlane::{EntityDesc, EntityId, ScopeId, Stage};
///
/// let mut stage: Stage = Stage::default();
/// let card = stage.intern_type("card").unwrap();
/// let desc = EntityDesc::new(ScopeId(0), card)
///     .with_accepts(card.into())
///     .with_index(2)
///     .with_parent(EntityId(1));
/// assert_eq!(desc.index, 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityDesc {
    /// Drag scope.
    pub scope: ScopeId,
    /// Kind of this entity when it is dragged.
    pub kind: TypeTag,
    /// Kinds that may be dropped onto this entity.
    pub accepts: TypeSet,
    /// Position among its siblings; the last component of its path.
    pub index: u32,
    /// Enclosing entity, if any.
    pub parent: Option<EntityId>,
    /// Innermost scroll region containing the entity.
    pub region: Option<RegionId>,
    /// Sort group the entity belongs to.
    pub sort_group: Option<SortGroupId>,
}

impl EntityDesc {
    /// Creates a root entity of `kind` that accepts nothing.
    #[must_use]
    pub fn new(scope: ScopeId, kind: TypeTag) -> Self {
        Self {
            scope,
            kind,
            accepts: TypeSet::EMPTY,
            index: 0,
            parent: None,
            region: None,
            sort_group: None,
        }
    }

    /// Sets the accepted kinds.
    #[must_use]
    pub fn with_accepts(mut self, accepts: TypeSet) -> Self {
        self.accepts = accepts;
        self
    }

    /// Sets the sibling index.
    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Sets the parent entity.
    #[must_use]
    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the enclosing scroll region.
    #[must_use]
    pub fn with_region(mut self, region: RegionId) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the sort group.
    #[must_use]
    pub fn with_sort_group(mut self, group: SortGroupId) -> Self {
        self.sort_group = Some(group);
        self
    }
}

#[derive(Debug)]
pub(crate) struct EntityRecord<D> {
    pub(crate) desc: EntityDesc,
    pub(crate) data: D,
    /// Scroll- and sort-independent rectangle.
    pub(crate) initial: Option<Rect>,
    pub(crate) flags: EntityFlags,
    pub(crate) children: SmallVec<[EntityId; 8]>,
}

impl<D> EntityRecord<D> {
    pub(crate) fn is_active(&self) -> bool {
        self.flags.is_active() && self.initial.is_some()
    }
}

#[derive(Debug)]
pub(crate) struct Registry<D> {
    entities: HashMap<EntityId, EntityRecord<D>>,
}

impl<D> Default for Registry<D> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }
}

impl<D> Registry<D> {
    pub(crate) fn insert(
        &mut self,
        id: EntityId,
        desc: EntityDesc,
        data: D,
    ) -> Result<(), StageError> {
        if self.entities.contains_key(&id) {
            return Err(StageError::DuplicateEntity(id));
        }
        if let Some(parent) = desc.parent {
            let parent = self
                .entities
                .get_mut(&parent)
                .ok_or(StageError::UnknownEntity(parent))?;
            parent.children.push(id);
        }
        self.entities.insert(
            id,
            EntityRecord {
                desc,
                data,
                initial: None,
                flags: EntityFlags::empty(),
                children: SmallVec::new(),
            },
        );
        Ok(())
    }

    /// Removes `id` and its whole subtree. Returns the removed records,
    /// descendants before ancestors.
    pub(crate) fn remove_subtree(&mut self, id: EntityId) -> Vec<(EntityId, EntityRecord<D>)> {
        let Some(root) = self.entities.get(&id) else {
            return Vec::new();
        };
        if let Some(parent) = root.desc.parent
            && let Some(parent) = self.entities.get_mut(&parent)
        {
            parent.children.retain(|c| *c != id);
        }
        let mut order = vec![id];
        let mut i = 0;
        while let Some(&next) = order.get(i) {
            if let Some(rec) = self.entities.get(&next) {
                order.extend(rec.children.iter().copied());
            }
            i += 1;
        }
        order
            .into_iter()
            .rev()
            .filter_map(|id| self.entities.remove(&id).map(|rec| (id, rec)))
            .collect()
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&EntityRecord<D>> {
        self.entities.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord<D>> {
        self.entities.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    /// All ids, sorted for deterministic iteration.
    pub(crate) fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Strict ancestors of `id`, nearest first.
    pub(crate) fn ancestors(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        let mut next = self.entities.get(&id).and_then(|r| r.desc.parent);
        // The parent graph is a forest, but a bound keeps a corrupted chain finite.
        let mut budget = self.entities.len();
        core::iter::from_fn(move || {
            let current = next?;
            if budget == 0 {
                return None;
            }
            budget -= 1;
            next = self.entities.get(&current).and_then(|r| r.desc.parent);
            Some(current)
        })
    }

    /// Root-relative path of `id`, or `None` if it is not registered.
    ///
    /// A missing ancestor ends the walk, so the path starts at the nearest
    /// registered ancestor.
    pub(crate) fn path(&self, id: EntityId) -> Option<Path> {
        let rec = self.entities.get(&id)?;
        let mut rev: SmallVec<[u32; 8]> = SmallVec::new();
        rev.push(rec.desc.index);
        for ancestor in self.ancestors(id) {
            match self.entities.get(&ancestor) {
                Some(a) => rev.push(a.desc.index),
                None => break,
            }
        }
        Some(rev.into_iter().rev().collect())
    }

    pub(crate) fn set_index(&mut self, id: EntityId, index: u32) -> bool {
        match self.entities.get_mut(&id) {
            Some(rec) => {
                rec.desc.index = index;
                true
            }
            None => false,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityRecord<D>)> {
        self.entities.iter().map(|(id, rec)| (*id, rec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRegistry;

    fn desc(parent: Option<u64>, index: u32) -> EntityDesc {
        let mut types = TypeRegistry::default();
        let kind = types.intern("card").unwrap();
        let mut d = EntityDesc::new(ScopeId(0), kind).with_index(index);
        d.parent = parent.map(EntityId);
        d
    }

    fn board() -> Registry<()> {
        let mut reg = Registry::default();
        for lane in 0..3_u32 {
            reg.insert(EntityId(u64::from(lane)), desc(None, lane), ()).unwrap();
        }
        reg.insert(EntityId(10), desc(Some(1), 0), ()).unwrap();
        reg.insert(EntityId(11), desc(Some(1), 1), ()).unwrap();
        reg
    }

    #[test]
    fn paths_follow_the_parent_chain() {
        let reg = board();
        assert_eq!(reg.path(EntityId(2)).unwrap().as_slice(), &[2]);
        assert_eq!(reg.path(EntityId(11)).unwrap().as_slice(), &[1, 1]);
        assert!(reg.path(EntityId(99)).is_none());
    }

    #[test]
    fn paths_reflect_index_updates() {
        let mut reg = board();
        assert!(reg.set_index(EntityId(1), 5));
        assert_eq!(reg.path(EntityId(10)).unwrap().as_slice(), &[5, 0]);
    }

    #[test]
    fn duplicate_and_orphan_registration_fail() {
        let mut reg = board();
        assert_eq!(
            reg.insert(EntityId(1), desc(None, 1), ()),
            Err(StageError::DuplicateEntity(EntityId(1)))
        );
        assert_eq!(
            reg.insert(EntityId(50), desc(Some(42), 0), ()),
            Err(StageError::UnknownEntity(EntityId(42)))
        );
    }

    #[test]
    fn unregister_cascades_to_subtree() {
        let mut reg = board();
        let removed: Vec<_> = reg
            .remove_subtree(EntityId(1))
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed.last(), Some(&EntityId(1)), "parent goes last");
        assert!(!reg.contains(EntityId(10)));
        assert!(!reg.contains(EntityId(11)));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn removing_a_child_unlinks_it() {
        let mut reg = board();
        reg.remove_subtree(EntityId(10));
        assert_eq!(reg.get(EntityId(1)).unwrap().children.as_slice(), &[EntityId(11)]);
    }

    #[test]
    fn activity_requires_visibility_and_measurement() {
        let mut flags = EntityFlags::VISIBLE;
        assert!(!flags.is_active());
        flags |= EntityFlags::MEASURED;
        assert!(flags.is_active());
    }
}
