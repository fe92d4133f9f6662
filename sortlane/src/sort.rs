// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sort groups and the shift bookkeeping that opens a gap under the drag.
//!
//! Every member whose path lies at or after the reference path (the dragged
//! entity at drag start, the primary intersection afterwards) is displaced
//! along the group axis by the extent of the dragged entity's margin box.
//! Everything else goes back to rest. The coordinator only records offsets
//! and reports changes; timing is handled by the stage.

use hashbrown::HashMap;
use kurbo::{Size, Vec2};
use smallvec::SmallVec;
use sortlane_geometry::Axis;
use sortlane_path::{Path, sibling_direction};

use crate::event::ShiftTransition;
use crate::ids::{EntityId, SortGroupId};

/// One displacement decided by a group.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Shift {
    pub(crate) entity: EntityId,
    pub(crate) group: SortGroupId,
    /// Zero when the entity returns to rest.
    pub(crate) offset: Vec2,
    pub(crate) transition: ShiftTransition,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SortGroup {
    axis: Axis,
    members: SmallVec<[EntityId; 16]>,
    shifted: HashMap<EntityId, Vec2>,
    sorting: bool,
}

impl SortGroup {
    pub(crate) fn contains(&self, entity: EntityId) -> bool {
        self.members.contains(&entity)
    }

    pub(crate) fn has_shifted(&self) -> bool {
        !self.shifted.is_empty()
    }

    /// Set between a primary intersection on a member and the next reset.
    pub(crate) fn is_sorting(&self) -> bool {
        self.sorting
    }
}

#[derive(Debug, Default)]
pub(crate) struct SortCoordinator {
    next: u32,
    groups: HashMap<SortGroupId, SortGroup>,
}

impl SortCoordinator {
    pub(crate) fn create(&mut self, axis: Axis) -> SortGroupId {
        let id = SortGroupId(self.next);
        self.next += 1;
        self.groups.insert(
            id,
            SortGroup {
                axis,
                ..SortGroup::default()
            },
        );
        id
    }

    pub(crate) fn destroy(&mut self, id: SortGroupId) -> Option<SortGroup> {
        self.groups.remove(&id)
    }

    pub(crate) fn get(&self, id: SortGroupId) -> Option<&SortGroup> {
        self.groups.get(&id)
    }

    pub(crate) fn contains(&self, id: SortGroupId) -> bool {
        self.groups.contains_key(&id)
    }

    pub(crate) fn join(&mut self, id: SortGroupId, entity: EntityId) -> bool {
        match self.groups.get_mut(&id) {
            Some(g) => {
                if !g.members.contains(&entity) {
                    g.members.push(entity);
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn leave(&mut self, id: SortGroupId, entity: EntityId) {
        if let Some(g) = self.groups.get_mut(&id) {
            g.members.retain(|m| *m != entity);
            g.shifted.remove(&entity);
        }
    }

    /// Opens the gap under a freshly lifted member. Shifts are instant.
    pub(crate) fn on_drag_start(
        &mut self,
        id: SortGroupId,
        dragged: &[u32],
        gap: Size,
        path_of: impl Fn(EntityId) -> Option<Path>,
    ) -> Vec<Shift> {
        self.shift_relative(id, dragged, gap, ShiftTransition::Instant, path_of)
    }

    /// Moves the gap in front of a new primary intersection and marks the
    /// group as sorting.
    pub(crate) fn on_enter(
        &mut self,
        id: SortGroupId,
        target: &[u32],
        gap: Size,
        path_of: impl Fn(EntityId) -> Option<Path>,
    ) -> Vec<Shift> {
        if let Some(g) = self.groups.get_mut(&id) {
            g.sorting = true;
        }
        self.shift_relative(id, target, gap, ShiftTransition::OutOfTheWay, path_of)
    }

    fn shift_relative(
        &mut self,
        id: SortGroupId,
        reference: &[u32],
        gap: Size,
        transition: ShiftTransition,
        path_of: impl Fn(EntityId) -> Option<Path>,
    ) -> Vec<Shift> {
        let Some(g) = self.groups.get_mut(&id) else {
            return Vec::new();
        };
        let extent = match g.axis {
            Axis::Horizontal => gap.width,
            Axis::Vertical => gap.height,
        };
        let offset = g.axis.unit() * extent;
        let mut out = Vec::new();
        for &entity in &g.members {
            // A member without a path cannot be placed; leave it where it is.
            let Some(path) = path_of(entity) else {
                continue;
            };
            if sibling_direction(reference, &path).opens_gap() {
                if g.shifted.insert(entity, offset) != Some(offset) {
                    out.push(Shift {
                        entity,
                        group: id,
                        offset,
                        transition,
                    });
                }
            } else if g.shifted.remove(&entity).is_some() {
                out.push(Shift {
                    entity,
                    group: id,
                    offset: Vec2::ZERO,
                    transition: ShiftTransition::OutOfTheWay,
                });
            }
        }
        out
    }

    /// Returns every shifted member to rest and ends sorting.
    pub(crate) fn reset(&mut self, id: SortGroupId) -> Vec<Shift> {
        let Some(g) = self.groups.get_mut(&id) else {
            return Vec::new();
        };
        g.sorting = false;
        let out: Vec<_> = g
            .members
            .iter()
            .filter(|m| g.shifted.contains_key(*m))
            .map(|&entity| Shift {
                entity,
                group: id,
                offset: Vec2::ZERO,
                transition: ShiftTransition::OutOfTheWay,
            })
            .collect();
        g.shifted.clear();
        out
    }

    /// Groups with at least one displaced member, in creation order.
    pub(crate) fn shifted_groups(&self) -> Vec<SortGroupId> {
        let mut ids: Vec<_> = self
            .groups
            .iter()
            .filter(|(_, g)| g.has_shifted())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Current offset of every displaced entity.
    pub(crate) fn offsets(&self) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        self.groups
            .values()
            .flat_map(|g| g.shifted.iter().map(|(e, o)| (*e, *o)))
    }

    pub(crate) fn offset_of(&self, entity: EntityId) -> Vec2 {
        self.groups
            .values()
            .find_map(|g| g.shifted.get(&entity).copied())
            .unwrap_or(Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A lane at `[1]` with four items.
    fn lane() -> (SortCoordinator, SortGroupId, impl Fn(EntityId) -> Option<Path>) {
        let mut sort = SortCoordinator::default();
        let g = sort.create(Axis::Vertical);
        for i in 0..4 {
            assert!(sort.join(g, EntityId(i)));
        }
        let path_of = |e: EntityId| {
            let i = u32::try_from(e.0).ok()?;
            Some(Path::from([1, i]))
        };
        (sort, g, path_of)
    }

    fn shifted(sort: &SortCoordinator) -> Vec<EntityId> {
        let mut v: Vec<_> = sort.offsets().map(|(e, _)| e).collect();
        v.sort_unstable();
        v
    }

    const CARD: Size = Size::new(200.0, 48.0);

    #[test]
    fn drag_start_opens_gap_at_the_lifted_item() {
        let (mut sort, g, path_of) = lane();
        let shifts = sort.on_drag_start(g, &[1, 1], CARD, &path_of);
        assert_eq!(shifted(&sort), [EntityId(1), EntityId(2), EntityId(3)]);
        assert!(shifts.iter().all(|s| s.transition == ShiftTransition::Instant));
        assert!(shifts.iter().all(|s| s.offset == Vec2::new(0.0, 48.0)));
        assert!(!sort.get(g).unwrap().is_sorting());
    }

    #[test]
    fn entering_moves_the_gap() {
        let (mut sort, g, path_of) = lane();
        sort.on_drag_start(g, &[1, 1], CARD, &path_of);
        let shifts = sort.on_enter(g, &[1, 3], CARD, &path_of);
        assert_eq!(shifted(&sort), [EntityId(3)]);
        let reset: Vec<_> = shifts.iter().map(|s| (s.entity, s.offset)).collect();
        assert_eq!(reset, [(EntityId(1), Vec2::ZERO), (EntityId(2), Vec2::ZERO)]);
        assert!(sort.get(g).unwrap().is_sorting());

        // Moving the gap back re-shifts only what changed.
        let shifts = sort.on_enter(g, &[1, 0], CARD, &path_of);
        let moved: Vec<_> = shifts.iter().map(|s| s.entity).collect();
        assert_eq!(moved, [EntityId(0), EntityId(1), EntityId(2)]);
        assert_eq!(sort.offset_of(EntityId(3)), Vec2::new(0.0, 48.0));
    }

    #[test]
    fn horizontal_groups_use_width() {
        let mut sort = SortCoordinator::default();
        let g = sort.create(Axis::Horizontal);
        sort.join(g, EntityId(7));
        sort.on_enter(g, &[0], CARD, |_| Some(Path::from([0])));
        assert_eq!(sort.offset_of(EntityId(7)), Vec2::new(200.0, 0.0));
    }

    #[test]
    fn reset_settles_to_empty() {
        let (mut sort, g, path_of) = lane();
        sort.on_enter(g, &[1, 2], CARD, &path_of);
        assert_eq!(sort.shifted_groups(), [g]);
        let shifts = sort.reset(g);
        assert_eq!(shifts.len(), 2);
        assert!(shifts.iter().all(|s| s.offset == Vec2::ZERO));
        assert!(shifted(&sort).is_empty());
        assert!(sort.shifted_groups().is_empty());
        assert!(!sort.get(g).unwrap().is_sorting());
    }

    #[test]
    fn leaving_members_drop_their_shift() {
        let (mut sort, g, path_of) = lane();
        sort.on_enter(g, &[1, 0], CARD, &path_of);
        sort.leave(g, EntityId(2));
        assert!(!sort.get(g).unwrap().contains(EntityId(2)));
        assert_eq!(sort.offset_of(EntityId(2)), Vec2::ZERO);
        assert!(sort.destroy(g).is_some());
        assert!(!sort.join(g, EntityId(9)));
    }
}
