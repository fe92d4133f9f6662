// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Stage`]: owner of every coordinator and the public entry point.

use core::fmt;
use std::time::Duration;

use kurbo::{Point, Rect, Vec2};
use sortlane_geometry::{Axis, ScrollState};
use sortlane_path::{Path, is_invalid_drop};

use crate::config::StageConfig;
use crate::drag::DragSession;
use crate::emitter::{Emitter, Subscription, isolated};
use crate::error::StageError;
use crate::event::{DragSnapshot, DropOutcome, Event};
use crate::host::{Host, Measure};
use crate::ids::{EntityId, PointerId, RegionId, ScopeId, SortGroupId, ZoneId};
use crate::pointer::MoveCoalescer;
use crate::registry::{EntityDesc, EntityFlags, Registry};
use crate::resolve::BroadPhaseIndex;
use crate::schedule::Scheduler;
use crate::scroll::ScrollCoordinator;
use crate::snapshot::LayoutSnapshot;
use crate::sort::{Shift, SortCoordinator};
use crate::types::{TypeRegistry, TypeSet, TypeTag};

/// Deferred work owned by the stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum TaskKey {
    /// Re-measure everything after a burst of resizes.
    ResizeRecalc,
    /// Put a group back to rest after the drag left it.
    SortLeave(SortGroupId),
    /// Put a group back to rest once the drop animation is over.
    SortSettle(SortGroupId),
}

type DropHandler = Box<dyn FnMut(&DropOutcome)>;

/// Headless drag-and-drop engine.
///
/// The host registers entities and scroll regions, reports geometry and
/// pointer input, and calls [`Stage::frame`] once per animation frame. The
/// stage answers through events (see [`Stage::subscribe`]) and the drop
/// handler (see [`Stage::set_drop_handler`]).
///
/// `D` is arbitrary per-entity data kept for the host.
pub struct Stage<D = ()> {
    config: StageConfig,
    types: TypeRegistry,
    registry: Registry<D>,
    scroll: ScrollCoordinator,
    sort: SortCoordinator,
    session: Option<DragSession>,
    moves: MoveCoalescer,
    recompute: bool,
    timers: Scheduler<TaskKey>,
    emitter: Emitter<Event>,
    on_drop: Option<DropHandler>,
    targets: BroadPhaseIndex<EntityId>,
    zones: BroadPhaseIndex<ZoneId>,
}

impl<D> fmt::Debug for Stage<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("config", &self.config)
            .field("entities", &self.registry.len())
            .field("types", &self.types.len())
            .field("dragging", &self.session.as_ref().map(|s| s.entity))
            .field("pending_timers", &self.timers.len())
            .field("listeners", &self.emitter.len())
            .finish_non_exhaustive()
    }
}

impl<D> Default for Stage<D> {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

/// A hitbox as seen by the intersection pass, for overlays and inspection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DebugHitbox {
    /// Entity.
    pub entity: EntityId,
    /// Current hitbox.
    pub rect: Rect,
    /// `true` for the current primary intersection.
    pub primary: bool,
}

/// A trigger zone as seen by the intersection pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DebugZone {
    /// Zone.
    pub zone: ZoneId,
    /// Current band.
    pub rect: Rect,
    /// `true` while an auto-scroll loop runs for this zone.
    pub scrolling: bool,
}

/// Snapshot of everything the intersection pass would consider.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugInfo {
    /// Active entities, in id order.
    pub hitboxes: Vec<DebugHitbox>,
    /// Zones of active regions.
    pub zones: Vec<DebugZone>,
    /// Dragged hitbox, when dragging.
    pub drag: Option<Rect>,
}

impl<D> Stage<D> {
    /// Creates an empty stage.
    #[must_use]
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            types: TypeRegistry::default(),
            registry: Registry::default(),
            scroll: ScrollCoordinator::default(),
            sort: SortCoordinator::default(),
            session: None,
            moves: MoveCoalescer::default(),
            recompute: false,
            timers: Scheduler::new(),
            emitter: Emitter::default(),
            on_drop: None,
            targets: BroadPhaseIndex::new(config.broad_phase),
            zones: BroadPhaseIndex::new(config.broad_phase),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    // --- types -----------------------------------------------------------

    /// Interns a type name.
    pub fn intern_type(&mut self, name: &str) -> Result<TypeTag, StageError> {
        self.types.intern(name)
    }

    /// Interns every name and returns the union.
    pub fn type_set(&mut self, names: &[&str]) -> Result<TypeSet, StageError> {
        names.iter().map(|n| self.types.intern(n)).collect()
    }

    /// Tag of an already interned name.
    #[must_use]
    pub fn type_tag(&self, name: &str) -> Option<TypeTag> {
        self.types.get(name)
    }

    /// Name behind a tag.
    #[must_use]
    pub fn type_name(&self, tag: TypeTag) -> Option<&str> {
        self.types.name(tag)
    }

    // --- entities --------------------------------------------------------

    /// Registers an entity. It takes part in intersection tests once
    /// [`Stage::notify_visible`] reports its rectangle.
    pub fn try_register_entity(
        &mut self,
        id: EntityId,
        desc: EntityDesc,
        data: D,
    ) -> Result<(), StageError> {
        if let Some(region) = desc.region
            && self.scroll.get(region).is_none()
        {
            return Err(StageError::UnknownRegion(region));
        }
        if let Some(group) = desc.sort_group
            && !self.sort.contains(group)
        {
            return Err(StageError::UnknownSortGroup(group));
        }
        self.registry.insert(id, desc, data)?;
        if let Some(group) = desc.sort_group {
            self.sort.join(group, id);
        }
        log::debug!("registered {id}");
        Ok(())
    }

    /// Like [`Stage::try_register_entity`], logging failures.
    pub fn register_entity(&mut self, id: EntityId, desc: EntityDesc, data: D) {
        if let Err(e) = self.try_register_entity(id, desc, data) {
            log::debug!("register_entity ignored: {e}");
        }
    }

    /// Unregisters an entity and its whole subtree.
    ///
    /// Removing the dragged entity (or an ancestor of it) cancels the drag.
    pub fn try_unregister_entity(&mut self, id: EntityId) -> Result<(), StageError> {
        if !self.registry.contains(id) {
            return Err(StageError::UnknownEntity(id));
        }
        if let Some(dragged) = self.session.as_ref().map(|s| s.entity)
            && (dragged == id || self.registry.ancestors(dragged).any(|a| a == id))
        {
            log::debug!("dragged {dragged} unregistered; cancelling");
            let pointer = self.session.as_ref().map(DragSession::pointer);
            if let Some(pointer) = pointer {
                self.drag_cancel(pointer);
            }
        }
        let removed = self.registry.remove_subtree(id);
        for (rid, rec) in &removed {
            if let Some(group) = rec.desc.sort_group {
                self.sort.leave(group, *rid);
            }
        }
        let lost = self
            .session
            .as_ref()
            .and_then(|s| s.primary)
            .filter(|p| removed.iter().any(|(rid, _)| rid == p));
        if let Some(target) = lost {
            let drag = self.session.as_mut().map(|s| {
                s.primary = None;
                s.entity
            });
            if let Some(drag) = drag {
                self.dispatch(Event::EndDragIntersect { drag, target });
            }
            // The target is gone, so its group cannot be found through it.
            let group = removed
                .iter()
                .find(|(rid, _)| *rid == target)
                .and_then(|(_, rec)| rec.desc.sort_group);
            if let Some(group) = group
                && self.sort.get(group).is_some_and(|g| g.is_sorting())
            {
                self.timers
                    .schedule(TaskKey::SortLeave(group), self.config.leave_debounce);
            }
        }
        if self.session.is_some() {
            self.recompute = true;
        }
        log::debug!("unregistered {id} ({} entities)", removed.len());
        Ok(())
    }

    /// Like [`Stage::try_unregister_entity`], ignoring unknown ids.
    pub fn unregister_entity(&mut self, id: EntityId) {
        if let Err(e) = self.try_unregister_entity(id) {
            log::debug!("unregister_entity ignored: {e}");
        }
    }

    /// Reports that an entity is visible, with its rectangle as measured now.
    pub fn notify_visible(&mut self, id: EntityId, raw: Rect) {
        let snapshot = self.layout();
        let Some(initial) = snapshot.to_initial(&self.registry, id, raw) else {
            log::debug!("notify_visible ignored: {id} is not registered");
            return;
        };
        if let Some(rec) = self.registry.get_mut(id) {
            rec.initial = Some(initial);
            rec.flags |= EntityFlags::VISIBLE | EntityFlags::MEASURED;
        }
        self.touch();
    }

    /// Excludes an entity from intersection tests until it is visible again.
    pub fn notify_hidden(&mut self, id: EntityId) {
        match self.registry.get_mut(id) {
            Some(rec) => rec.flags.remove(EntityFlags::VISIBLE),
            None => {
                log::debug!("notify_hidden ignored: {id} is not registered");
                return;
            }
        }
        self.touch();
    }

    /// Schedules a debounced re-measurement of every entity and region.
    ///
    /// Bursts of resizes are coalesced: the re-measurement runs once, after
    /// the stage has seen no resize for the configured debounce.
    pub fn notify_resize(&mut self, id: EntityId) {
        if !self.registry.contains(id) {
            log::debug!("notify_resize from unregistered {id}");
        }
        self.timers.schedule(TaskKey::ResizeRecalc, self.config.resize_debounce);
    }

    /// Changes an entity's position among its siblings.
    pub fn set_index(&mut self, id: EntityId, index: u32) {
        if !self.registry.set_index(id, index) {
            log::debug!("set_index ignored: {id} is not registered");
        }
    }

    /// Host data of an entity.
    #[must_use]
    pub fn data(&self, id: EntityId) -> Option<&D> {
        self.registry.get(id).map(|r| &r.data)
    }

    /// Mutable host data of an entity.
    pub fn data_mut(&mut self, id: EntityId) -> Option<&mut D> {
        self.registry.get_mut(id).map(|r| &mut r.data)
    }

    /// Descriptor of an entity.
    #[must_use]
    pub fn desc(&self, id: EntityId) -> Option<&EntityDesc> {
        self.registry.get(id).map(|r| &r.desc)
    }

    /// Root-relative path, computed from the live ancestor chain.
    #[must_use]
    pub fn path(&self, id: EntityId) -> Option<Path> {
        self.registry.path(id)
    }

    /// Like [`Stage::path`], with an error for unknown ids.
    pub fn try_path(&self, id: EntityId) -> Result<Path, StageError> {
        self.registry.path(id).ok_or(StageError::UnknownEntity(id))
    }

    /// Current hitbox of a measured entity.
    #[must_use]
    pub fn hitbox(&self, id: EntityId) -> Option<Rect> {
        self.try_hitbox(id).ok()
    }

    /// Like [`Stage::hitbox`], telling unknown and unmeasured entities apart.
    pub fn try_hitbox(&self, id: EntityId) -> Result<Rect, StageError> {
        if !self.registry.contains(id) {
            return Err(StageError::UnknownEntity(id));
        }
        self.layout()
            .hitbox(&self.registry, id)
            .ok_or(StageError::InactiveEntity(id))
    }

    /// Runtime flags of an entity.
    #[must_use]
    pub fn entity_flags(&self, id: EntityId) -> Option<EntityFlags> {
        self.registry.get(id).map(|r| r.flags)
    }

    /// Number of registered entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    // --- scroll regions --------------------------------------------------

    /// Creates a scroll region whose four edge zones trigger auto-scroll for
    /// drags of an accepted kind.
    ///
    /// A root region created with a rectangle is active immediately; a nested
    /// one (or one created without a rectangle) waits for
    /// [`Stage::notify_region_visible`].
    pub fn create_region(
        &mut self,
        scope: ScopeId,
        accepts: TypeSet,
        parent: Option<RegionId>,
        rect: Option<Rect>,
    ) -> Result<RegionId, StageError> {
        let id = self.scroll.create(scope, accepts, parent, rect)?;
        log::debug!("created {id} in scope {}", scope.0);
        Ok(id)
    }

    /// Destroys a region and every region nested in it.
    pub fn destroy_region(&mut self, region: RegionId) {
        let removed = self.scroll.destroy(region);
        if removed.is_empty() {
            log::debug!("destroy_region ignored: {region} does not exist");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let drag = session.entity;
        let mut ended = Vec::new();
        session.zones.retain(|&mut (zone, strength)| {
            let gone = removed.contains(&zone.region);
            if gone {
                ended.push((zone, strength));
            }
            !gone
        });
        for (zone, strength) in ended {
            self.dispatch(Event::EndDragScroll {
                drag,
                zone,
                strength,
            });
        }
        log::debug!("destroyed {} region(s)", removed.len());
    }

    /// Activates a region's zones with its rectangle as measured now.
    pub fn notify_region_visible(&mut self, region: RegionId, rect: Rect) {
        if !self.scroll.set_visible(region, rect) {
            log::debug!("notify_region_visible ignored: {region} does not exist");
            return;
        }
        self.touch();
    }

    /// Deactivates a region's zones.
    pub fn notify_region_hidden(&mut self, region: RegionId) {
        if !self.scroll.set_hidden(region) {
            log::debug!("notify_region_hidden ignored: {region} does not exist");
            return;
        }
        self.touch();
    }

    /// Records a scroll performed by the host.
    pub fn notify_scroll(&mut self, region: RegionId, state: ScrollState) {
        if self.scroll.get(region).is_none() {
            log::debug!("notify_scroll ignored: {region} does not exist");
            return;
        }
        if self.scroll.set_state(region, state) {
            self.touch();
        }
    }

    /// Effective shift of a region: its offset plus every enclosing region's.
    #[must_use]
    pub fn region_shift(&self, region: RegionId) -> Option<Vec2> {
        self.scroll.get(region)?;
        Some(self.scroll.shift(region))
    }

    /// Last known scroll state of a region; `None` until the host reports
    /// one through [`Stage::notify_scroll`] or [`ScrollDriver::scroll_by`].
    ///
    /// [`ScrollDriver::scroll_by`]: crate::ScrollDriver::scroll_by
    #[must_use]
    pub fn scroll_state(&self, region: RegionId) -> Option<ScrollState> {
        self.scroll.get(region).and_then(|r| r.state)
    }

    /// Current box of a region.
    #[must_use]
    pub fn region_rect(&self, region: RegionId) -> Option<Rect> {
        self.scroll.current_rect(region)
    }

    /// Current band of a trigger zone.
    #[must_use]
    pub fn zone_rect(&self, zone: ZoneId) -> Option<Rect> {
        self.scroll.zone_rect(zone, self.config.trigger_width)
    }

    /// `true` while an auto-scroll loop runs for `zone`.
    #[must_use]
    pub fn is_auto_scrolling(&self, zone: ZoneId) -> bool {
        self.scroll.is_scrolling(zone)
    }

    // --- sort groups -----------------------------------------------------

    /// Creates a sort group along `axis`.
    pub fn create_sort_group(&mut self, axis: Axis) -> SortGroupId {
        let id = self.sort.create(axis);
        log::debug!("created {id} ({axis:?})");
        id
    }

    /// Destroys a sort group. Members keep their registration.
    pub fn destroy_sort_group(&mut self, group: SortGroupId) {
        let Some(g) = self.sort.destroy(group) else {
            log::debug!("destroy_sort_group ignored: {group} does not exist");
            return;
        };
        self.timers.cancel(&TaskKey::SortLeave(group));
        self.timers.cancel(&TaskKey::SortSettle(group));
        if g.has_shifted() {
            self.touch();
        }
    }

    /// Current sort displacement of an entity.
    #[must_use]
    pub fn sort_offset(&self, id: EntityId) -> Vec2 {
        self.sort.offset_of(id)
    }

    /// `true` if `group` has a pending reset.
    #[must_use]
    pub fn is_settling(&self, group: SortGroupId) -> bool {
        self.timers.is_scheduled(&TaskKey::SortLeave(group))
            || self.timers.is_scheduled(&TaskKey::SortSettle(group))
    }

    // --- drag --------------------------------------------------------------

    /// Starts dragging `entity` with `pointer` at `position`.
    ///
    /// Margins come from `measure` and size the gap opened in the entity's
    /// sort group.
    pub fn try_drag_start<M: Measure + ?Sized>(
        &mut self,
        pointer: PointerId,
        entity: EntityId,
        position: Point,
        measure: &M,
    ) -> Result<(), StageError> {
        if let Some(s) = &self.session {
            return Err(StageError::AlreadyDragging { entity: s.entity });
        }
        let rec = self
            .registry
            .get(entity)
            .ok_or(StageError::UnknownEntity(entity))?;
        if !rec.is_active() {
            return Err(StageError::InactiveEntity(entity));
        }
        let (kind, scope, group) = (rec.desc.kind, rec.desc.scope, rec.desc.sort_group);
        let hitbox = self
            .layout()
            .hitbox(&self.registry, entity)
            .ok_or(StageError::InactiveEntity(entity))?;
        let session = DragSession::new(
            entity,
            kind,
            scope,
            pointer,
            position,
            measure.entity_margins(entity),
            hitbox,
        );
        let gap = session.gap();
        let snapshot = session.snapshot();
        self.session = Some(session);
        self.moves.reset();
        self.recompute = false;
        if let Some(rec) = self.registry.get_mut(entity) {
            rec.flags.insert(EntityFlags::DRAGGING);
        }
        log::debug!("drag start {entity} with pointer {}", pointer.0);
        self.emit(&Event::DragStart(snapshot));

        if let Some(group) = group.filter(|g| self.sort.get(*g).is_some_and(|g| g.contains(entity)))
            && let Some(path) = self.registry.path(entity)
        {
            self.cancel_group_timers(group);
            let registry = &self.registry;
            let shifts = self
                .sort
                .on_drag_start(group, &path, gap, |e| registry.path(e));
            self.apply_shifts(shifts);
        }
        Ok(())
    }

    /// Like [`Stage::try_drag_start`]; unknown or inactive entities and a
    /// second start while dragging are ignored.
    pub fn drag_start<M: Measure + ?Sized>(
        &mut self,
        pointer: PointerId,
        entity: EntityId,
        position: Point,
        measure: &M,
    ) {
        if let Err(e) = self.try_drag_start(pointer, entity, position, measure) {
            log::debug!("drag_start ignored: {e}");
        }
    }

    /// Buffers a pointer move. Only the latest buffered move is applied, on
    /// the next [`Stage::frame`].
    pub fn pointer_move(&mut self, pointer: PointerId, position: Point) {
        match &self.session {
            Some(s) if s.pointer() == pointer => self.moves.push(pointer, position),
            _ => log::trace!("pointer_move from unrelated pointer {}", pointer.0),
        }
    }

    /// Applies a pointer move immediately: emits `DragMove` and recomputes
    /// intersections.
    pub fn drag_move(&mut self, pointer: PointerId, position: Point) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.track.update(pointer, position).is_none() {
            log::trace!("drag_move from unrelated pointer {}", pointer.0);
            return;
        }
        let snapshot = session.snapshot();
        self.emit(&Event::DragMove(snapshot));
        self.pass();
    }

    /// Ends the drag and reports the drop.
    ///
    /// A pointer move still buffered by [`Stage::pointer_move`] is applied
    /// first. The returned outcome is the one passed to the drop handler.
    pub fn try_drag_end(
        &mut self,
        pointer: PointerId,
        position: Point,
    ) -> Result<DropOutcome, StageError> {
        self.check_pointer(pointer)?;
        if let Some((p, pos)) = self.moves.take() {
            self.drag_move(p, pos);
        }
        if let Some(session) = self.session.as_mut() {
            session.track.update(pointer, position);
        }
        self.finish(false).ok_or(StageError::NotDragging(pointer))
    }

    /// Like [`Stage::try_drag_end`]; returns `None` when `pointer` is not
    /// dragging.
    pub fn drag_end(&mut self, pointer: PointerId, position: Point) -> Option<DropOutcome> {
        self.try_drag_end(pointer, position)
            .inspect_err(|e| log::trace!("drag_end ignored: {e}"))
            .ok()
    }

    /// Ends the drag without a drop target.
    pub fn try_drag_cancel(&mut self, pointer: PointerId) -> Result<DropOutcome, StageError> {
        self.check_pointer(pointer)?;
        self.finish(true).ok_or(StageError::NotDragging(pointer))
    }

    /// Like [`Stage::try_drag_cancel`]; returns `None` when `pointer` is not
    /// dragging.
    pub fn drag_cancel(&mut self, pointer: PointerId) -> Option<DropOutcome> {
        self.try_drag_cancel(pointer)
            .inspect_err(|e| log::trace!("drag_cancel ignored: {e}"))
            .ok()
    }

    /// `true` between drag start and drag end.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// State of the current drag.
    #[must_use]
    pub fn drag_snapshot(&self) -> Option<DragSnapshot> {
        self.session.as_ref().map(DragSession::snapshot)
    }

    // --- events ----------------------------------------------------------

    /// Subscribes to every event. Listeners run in subscription order; a
    /// panicking listener is logged and skipped.
    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) -> Subscription {
        self.emitter.subscribe(Box::new(listener))
    }

    /// Stops a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.emitter.unsubscribe(subscription)
    }

    /// Sets the callback invoked once per drag end or cancel.
    pub fn set_drop_handler(&mut self, handler: impl FnMut(&DropOutcome) + 'static) {
        self.on_drop = Some(Box::new(handler));
    }

    // --- frame -------------------------------------------------------------

    /// Advances the stage to `now`.
    ///
    /// Applies the buffered pointer move (or a recomputation requested by a
    /// scroll or layout change), steps auto-scroll loops, then runs due
    /// timers.
    pub fn frame<H: Host + ?Sized>(&mut self, now: Duration, host: &mut H) {
        self.timers.advance_to(now);

        if self.session.is_some() {
            if self.moves.coalesced() > 0 {
                log::trace!("coalesced {} pointer moves", self.moves.coalesced());
            }
            match self.moves.take() {
                Some((pointer, pos)) => self.drag_move(pointer, pos),
                None if self.recompute => self.pass(),
                None => {}
            }
            self.moves.reset();
        }

        if self.scroll.step(host, &self.config) {
            self.touch();
        }

        for task in self.timers.take_due() {
            match task {
                TaskKey::ResizeRecalc => self.recalc(&*host),
                TaskKey::SortLeave(group) | TaskKey::SortSettle(group) => {
                    log::trace!("{task:?} fired");
                    let shifts = self.sort.reset(group);
                    self.apply_shifts(shifts);
                }
            }
        }
    }

    /// Lists active hitboxes and zones with their current rectangles.
    #[must_use]
    pub fn debug_info(&self) -> DebugInfo {
        let snapshot = self.layout();
        let primary = self.session.as_ref().and_then(|s| s.primary);
        let hitboxes = self
            .registry
            .ids()
            .into_iter()
            .filter(|id| self.registry.get(*id).is_some_and(|r| r.is_active()))
            .filter_map(|entity| {
                Some(DebugHitbox {
                    entity,
                    rect: snapshot.hitbox(&self.registry, entity)?,
                    primary: primary == Some(entity),
                })
            })
            .collect();
        let zones = self
            .scroll
            .ids()
            .into_iter()
            .filter(|id| self.scroll.get(*id).is_some_and(|r| r.visible))
            .flat_map(ZoneId::all)
            .filter_map(|zone| {
                Some(DebugZone {
                    zone,
                    rect: self.zone_rect(zone)?,
                    scrolling: self.scroll.is_scrolling(zone),
                })
            })
            .collect();
        DebugInfo {
            hitboxes,
            zones,
            drag: self.session.as_ref().map(DragSession::hitbox),
        }
    }

    // --- internals -------------------------------------------------------

    fn layout(&self) -> LayoutSnapshot {
        LayoutSnapshot::capture(&self.scroll, &self.sort)
    }

    /// Marks geometry as changed while dragging.
    fn touch(&mut self) {
        if self.session.is_some() {
            self.recompute = true;
        }
    }

    fn emit(&mut self, event: &Event) {
        log::trace!("{event:?}");
        self.emitter.emit(event, event.name());
    }

    /// Emits `event`, then applies the stage's own reaction to it.
    fn dispatch(&mut self, event: Event) {
        self.emit(&event);
        match event {
            Event::BeginDragIntersect { target, .. } => self.on_enter(target),
            Event::EndDragIntersect { target, .. } => self.on_leave(target),
            Event::BeginDragScroll { zone, strength, .. } => self.scroll.begin_loop(zone, strength),
            Event::UpdateDragScroll { zone, strength, .. } => {
                self.scroll.update_loop(zone, strength);
            }
            Event::EndDragScroll { zone, .. } => {
                self.scroll.end_loop(zone);
            }
            _ => {}
        }
    }

    fn member_group(&self, entity: EntityId) -> Option<SortGroupId> {
        let group = self.registry.get(entity)?.desc.sort_group?;
        self.sort.get(group)?.contains(entity).then_some(group)
    }

    fn on_enter(&mut self, target: EntityId) {
        let Some(group) = self.member_group(target) else {
            return;
        };
        let (Some(gap), Some(path)) = (
            self.session.as_ref().map(DragSession::gap),
            self.registry.path(target),
        ) else {
            return;
        };
        self.cancel_group_timers(group);
        let registry = &self.registry;
        let shifts = self.sort.on_enter(group, &path, gap, |e| registry.path(e));
        self.apply_shifts(shifts);
    }

    fn on_leave(&mut self, target: EntityId) {
        let Some(group) = self.member_group(target) else {
            return;
        };
        if self.sort.get(group).is_some_and(|g| g.is_sorting()) {
            self.timers
                .schedule(TaskKey::SortLeave(group), self.config.leave_debounce);
        }
    }

    fn cancel_group_timers(&mut self, group: SortGroupId) {
        self.timers.cancel(&TaskKey::SortLeave(group));
        self.timers.cancel(&TaskKey::SortSettle(group));
    }

    fn apply_shifts(&mut self, shifts: Vec<Shift>) {
        for shift in shifts {
            if let Some(rec) = self.registry.get_mut(shift.entity) {
                rec.flags.set(EntityFlags::SHIFTED, shift.offset != Vec2::ZERO);
            }
            self.emit(&Event::ShiftEntity {
                entity: shift.entity,
                group: shift.group,
                offset: shift.offset,
                transition: shift.transition,
            });
        }
        self.touch();
    }

    /// One intersection pass: rebuild the broad phase from the current
    /// layout, resolve, and dispatch the resulting events.
    fn pass(&mut self) {
        self.recompute = false;
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (scope, kind, drag) = (session.scope, session.kind, session.hitbox());
        let snapshot = self.layout();

        self.targets.clear();
        for (id, rec) in self.registry.iter() {
            if rec.desc.scope != scope || !rec.is_active() {
                continue;
            }
            if let Some(rect) = snapshot.hitbox(&self.registry, id) {
                self.targets.insert(id, rect, rec.desc.accepts);
            }
        }
        self.zones.clear();
        for (zone, accepts, rect) in self.scroll.active_zones(scope, self.config.trigger_width) {
            self.zones.insert(zone, rect, accepts);
        }

        log::trace!(
            "pass over {} targets and {} zones",
            self.targets.len(),
            self.zones.len()
        );
        let targets = self.targets.query(drag, kind);
        let zones = self.zones.query(drag, kind);
        let config = self.config;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let events = session.resolve(&config, &targets, &zones);
        for event in events {
            self.dispatch(event);
        }
        // Reactions to this pass must not schedule another one.
        self.recompute = false;
    }

    fn check_pointer(&self, pointer: PointerId) -> Result<(), StageError> {
        match &self.session {
            Some(s) if s.pointer() == pointer => Ok(()),
            _ => Err(StageError::NotDragging(pointer)),
        }
    }

    fn finish(&mut self, cancelled: bool) -> Option<DropOutcome> {
        let session = self.session.take()?;
        self.moves.reset();
        self.recompute = false;
        if let Some(rec) = self.registry.get_mut(session.entity) {
            rec.flags.remove(EntityFlags::DRAGGING);
        }
        log::debug!(
            "drag {} {}",
            if cancelled { "cancel" } else { "end" },
            session.entity
        );
        self.emit(&Event::DragEnd(session.snapshot()));
        for &(zone, strength) in &session.zones {
            self.dispatch(Event::EndDragScroll {
                drag: session.entity,
                zone,
                strength,
            });
        }
        self.scroll.end_all_loops();

        let target = if cancelled {
            None
        } else {
            session.primary.filter(|t| self.is_valid_drop(session.entity, *t))
        };
        let outcome = DropOutcome {
            dragged: session.entity,
            target,
            position: session.position(),
            cancelled,
        };
        if let Some(handler) = self.on_drop.as_mut() {
            isolated("drop handler", || handler(&outcome));
        }

        let destination = session
            .primary
            .filter(|_| !cancelled)
            .and_then(|t| self.hitbox(t));
        let settle = match destination {
            Some(rect) => {
                let distance = session.position().distance(Point::new(rect.x0, rect.y0));
                self.config.drop_timing.duration(distance)
            }
            None => self.config.drop_timing.min,
        };
        for group in self.sort.shifted_groups() {
            self.timers.cancel(&TaskKey::SortLeave(group));
            self.timers.schedule(TaskKey::SortSettle(group), settle);
        }
        Some(outcome)
    }

    fn is_valid_drop(&self, dragged: EntityId, target: EntityId) -> bool {
        match (self.registry.path(dragged), self.registry.path(target)) {
            (Some(d), Some(t)) => !is_invalid_drop(&d, &t),
            _ => false,
        }
    }

    /// Re-measures every visible entity and region. A failed measurement
    /// keeps the previous geometry.
    fn recalc<M: Measure + ?Sized>(&mut self, measure: &M) {
        let snapshot = self.layout();
        let mut stale = 0_usize;
        for id in self.registry.ids() {
            let visible = self
                .registry
                .get(id)
                .is_some_and(|r| r.flags.contains(EntityFlags::VISIBLE));
            if !visible {
                continue;
            }
            let initial = measure
                .entity_rect(id)
                .and_then(|raw| snapshot.to_initial(&self.registry, id, raw));
            match (initial, self.registry.get_mut(id)) {
                (Some(initial), Some(rec)) => rec.initial = Some(initial),
                _ => stale += 1,
            }
        }
        for region in self.scroll.ids() {
            match measure.region_rect(region) {
                Some(rect) => {
                    self.scroll.remeasure(region, rect);
                }
                None => stale += 1,
            }
        }
        log::debug!("recalculated geometry ({stale} stale)");
        self.touch();
    }
}
