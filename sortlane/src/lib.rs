// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sortlane: headless drag-and-drop and sortable reordering for nested
//! scrollable layouts.
//!
//! A [`Stage`] tracks interactive *entities* (lanes, cards, anything that can
//! be dragged or dropped onto) across independently scrolling *regions*. While
//! a drag is in progress it decides:
//!
//! - which entity is under the drag (the *primary intersection*),
//! - which region edges the drag is pressing against, driving auto-scroll,
//! - which siblings must shift to open a gap where the drag would land,
//! - and, on release, whether the drop is a real move.
//!
//! The stage never draws anything. The host reports geometry and pointer
//! input, implements [`Measure`] and [`ScrollDriver`], and reacts to the
//! [`Event`]s the stage emits.
//!
//! ## Geometry
//!
//! Every entity keeps an *initial* rectangle with scroll and sort displacement
//! removed. Its hitbox is recomposed on demand from the effective shift of its
//! region chain and the sort offsets of its ancestors, so scrolling never
//! requires re-measurement. See [`sortlane_geometry`].
//!
//! ## Paths
//!
//! Entities are ordered by their [`Path`], computed from the live parent chain.
//! Sort shifts and drop validation only ever compare siblings. See
//! [`sortlane_path`].
//!
//! ## Time
//!
//! The stage has no clock of its own. [`Stage::frame`] advances it, applies
//! the latest buffered pointer move, steps auto-scroll, and fires debounced
//! work.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use kurbo::{Point, Rect, Vec2};
//! use sortlane::{
//!     Axis, EntityDesc, EntityId, Event, Measure, PointerId, RegionId, ScopeId, ScrollDriver,
//!     ScrollState, Stage,
//! };
//!
//! struct Board;
//!
//! impl Measure for Board {
//!     fn entity_rect(&self, _: EntityId) -> Option<Rect> {
//!         None
//!     }
//!     fn region_rect(&self, _: RegionId) -> Option<Rect> {
//!         None
//!     }
//! }
//!
//! impl ScrollDriver for Board {
//!     fn scroll_by(&mut self, _: RegionId, _: Vec2) -> Option<ScrollState> {
//!         None
//!     }
//! }
//!
//! let mut stage: Stage = Stage::default();
//! let card = stage.intern_type("card").unwrap();
//! let lane = stage.create_sort_group(Axis::Vertical);
//!
//! // Three cards stacked in one lane.
//! for i in 0..3_u32 {
//!     let id = EntityId(u64::from(i));
//!     let desc = EntityDesc::new(ScopeId(0), card)
//!         .with_accepts(card.into())
//!         .with_index(i)
//!         .with_sort_group(lane);
//!     stage.register_entity(id, desc, ());
//!     let y = f64::from(i) * 50.0;
//!     stage.notify_visible(id, Rect::new(0.0, y, 200.0, y + 40.0));
//! }
//!
//! let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//! let sink = log.clone();
//! let _sub = stage.subscribe(move |e: &Event| sink.borrow_mut().push(e.name()));
//!
//! let mut host = Board;
//! stage.drag_start(PointerId(0), EntityId(0), Point::new(100.0, 20.0), &host);
//! stage.pointer_move(PointerId(0), Point::new(100.0, 130.0));
//! stage.frame(Duration::from_millis(16), &mut host);
//!
//! let outcome = stage.drag_end(PointerId(0), Point::new(100.0, 130.0)).unwrap();
//! assert_eq!(outcome.target, Some(EntityId(2)));
//! assert!(log.borrow().contains(&"beginDragIntersect"));
//! ```

mod config;
mod drag;
mod emitter;
mod error;
mod event;
mod host;
mod ids;
mod pointer;
mod registry;
mod resolve;
pub mod schedule;
mod scroll;
mod snapshot;
mod sort;
mod stage;
mod types;

pub use config::{BroadPhase, DropTiming, IntersectionStrategy, StageConfig};
pub use emitter::Subscription;
pub use error::StageError;
pub use event::{DragSnapshot, DropOutcome, Event, ShiftTransition};
pub use host::{Host, Measure, ScrollDriver};
pub use ids::{EntityId, PointerId, RegionId, ScopeId, SortGroupId, ZoneId};
pub use registry::{EntityDesc, EntityFlags};
pub use stage::{DebugHitbox, DebugInfo, DebugZone, Stage};
pub use types::{MAX_TYPES, TypeSet, TypeTag};

pub use sortlane_geometry::{Axis, ScrollState, Side};
pub use sortlane_path::{Path, SiblingDirection};
