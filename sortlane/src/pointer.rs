// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer tracking and move coalescing for a drag session.

use kurbo::{Point, Vec2};

use crate::ids::PointerId;

/// Tracks one pointer from drag start: origin and latest position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PointerTrack {
    pub(crate) pointer: PointerId,
    pub(crate) origin: Point,
    pub(crate) last: Point,
}

impl PointerTrack {
    pub(crate) fn start(pointer: PointerId, origin: Point) -> Self {
        Self {
            pointer,
            origin,
            last: origin,
        }
    }

    /// Records a new position and returns the delta since the last one.
    ///
    /// Samples from other pointers are ignored.
    pub(crate) fn update(&mut self, pointer: PointerId, pos: Point) -> Option<Vec2> {
        if pointer != self.pointer {
            return None;
        }
        let delta = pos - self.last;
        self.last = pos;
        Some(delta)
    }
}

/// Latest-wins buffer for pointer moves submitted between frames.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MoveCoalescer {
    pending: Option<(PointerId, Point)>,
    coalesced: u32,
}

impl MoveCoalescer {
    /// Buffers a move, replacing any pending one.
    pub(crate) fn push(&mut self, pointer: PointerId, pos: Point) {
        if self.pending.is_some() {
            self.coalesced = self.coalesced.saturating_add(1);
        }
        self.pending = Some((pointer, pos));
    }

    /// Takes the pending move, if any.
    pub(crate) fn take(&mut self) -> Option<(PointerId, Point)> {
        self.pending.take()
    }

    /// Number of moves dropped in favor of a later one since the last reset.
    pub(crate) fn coalesced(&self) -> u32 {
        self.coalesced
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
