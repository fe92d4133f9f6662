// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage configuration.

use std::time::Duration;

/// How the primary intersection is chosen among overlapping drop targets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntersectionStrategy {
    /// Smallest center distance, with a penalty for targets whose center lies
    /// above the dragged box's center.
    #[default]
    CenterDistanceBiased,
    /// Largest intersection-over-union. Targets that only touch are ignored.
    OverlapRatio,
    /// Smallest mean distance between corresponding corners.
    ClosestCorners,
}

/// Broad-phase structure used to find overlapping candidates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BroadPhase {
    /// Linear scan. Best for boards with a few hundred entities.
    #[default]
    FlatVec,
    /// Uniform grid with square cells of the given side.
    Grid {
        /// Cell side length.
        cell: f64,
    },
}

/// Duration of the settle animation after a drop.
///
/// The duration grows linearly with the distance the dropped item travels,
/// from `min` at zero distance to `max` at `max_distance` and beyond.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropTiming {
    /// Duration for a drop in place.
    pub min: Duration,
    /// Duration for long drops.
    pub max: Duration,
    /// Distance at which `max` is reached.
    pub max_distance: f64,
}

impl Default for DropTiming {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(330),
            max: Duration::from_millis(550),
            max_distance: 1500.0,
        }
    }
}

impl DropTiming {
    /// Settle duration for a drop that travels `distance`.
    #[must_use]
    pub fn duration(&self, distance: f64) -> Duration {
        if self.max <= self.min || distance.is_nan() || distance <= 0.0 {
            return self.min;
        }
        if distance >= self.max_distance {
            return self.max;
        }
        let ratio = distance / self.max_distance;
        if !ratio.is_finite() {
            return self.min;
        }
        self.min + (self.max - self.min).mul_f64(ratio)
    }
}

/// Tunables for a [`Stage`](crate::Stage).
///
/// ```rust
/// use std::time::Duration;
/// use sortlane::{IntersectionStrategy, StageConfig};
///
/// let config = StageConfig::default()
///     .with_strategy(IntersectionStrategy::OverlapRatio)
///     .with_leave_debounce(Duration::from_millis(50));
/// assert_eq!(config.trigger_width, 35.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StageConfig {
    /// Width of each edge trigger zone.
    pub trigger_width: f64,
    /// Auto-scroll step per frame when the dragged box is flush with an edge.
    pub max_scroll_speed: f64,
    /// Added to the center distance of targets above the dragged box.
    pub above_center_penalty: f64,
    /// Quiet period before measurements are refreshed after a resize.
    pub resize_debounce: Duration,
    /// Delay before a sort group closes its gap after the drag leaves it.
    pub leave_debounce: Duration,
    /// Settle timing after a drop.
    pub drop_timing: DropTiming,
    /// Primary intersection heuristic.
    pub strategy: IntersectionStrategy,
    /// Broad-phase structure.
    pub broad_phase: BroadPhase,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            trigger_width: 35.0,
            max_scroll_speed: 13.0,
            above_center_penalty: 10_000.0,
            resize_debounce: Duration::from_millis(100),
            leave_debounce: Duration::from_millis(100),
            drop_timing: DropTiming::default(),
            strategy: IntersectionStrategy::default(),
            broad_phase: BroadPhase::default(),
        }
    }
}

impl StageConfig {
    /// Sets the primary intersection heuristic.
    #[must_use]
    pub fn with_strategy(mut self, strategy: IntersectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the broad-phase structure.
    #[must_use]
    pub fn with_broad_phase(mut self, broad_phase: BroadPhase) -> Self {
        self.broad_phase = broad_phase;
        self
    }

    /// Sets the trigger-zone width and maximum auto-scroll speed.
    #[must_use]
    pub fn with_auto_scroll(mut self, trigger_width: f64, max_speed: f64) -> Self {
        self.trigger_width = trigger_width;
        self.max_scroll_speed = max_speed;
        self
    }

    /// Sets the resize debounce.
    #[must_use]
    pub fn with_resize_debounce(mut self, delay: Duration) -> Self {
        self.resize_debounce = delay;
        self
    }

    /// Sets the drag-leave debounce.
    #[must_use]
    pub fn with_leave_debounce(mut self, delay: Duration) -> Self {
        self.leave_debounce = delay;
        self
    }
}
