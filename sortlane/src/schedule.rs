// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed, cancellable timers on a host-driven clock.
//!
//! The scheduler never reads a system clock. The host advances it with
//! [`Scheduler::advance_to`] (the stage does this from
//! [`Stage::frame`](crate::Stage::frame)), and due tasks are handed back in
//! deadline order. Scheduling a key that is already pending replaces its
//! deadline, which is how debouncing is expressed.
//!
//! ```rust
//! use std::time::Duration;
//! use sortlane::schedule::Scheduler;
//!
//! let mut timers = Scheduler::new();
//! timers.schedule("resize", Duration::from_millis(100));
//! timers.advance_to(Duration::from_millis(60));
//! // Another resize arrives: the debounce restarts.
//! timers.schedule("resize", Duration::from_millis(100));
//! timers.advance_to(Duration::from_millis(120));
//! assert!(timers.take_due().is_empty());
//! timers.advance_to(Duration::from_millis(160));
//! assert_eq!(timers.take_due(), ["resize"]);
//! ```

use core::hash::Hash;
use std::time::Duration;

use hashbrown::HashMap;

/// Keyed timers driven by an external clock.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    now: Duration,
    seq: u64,
    tasks: HashMap<K, (Duration, u64)>,
}

impl<K: Eq + Hash + Clone> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> Scheduler<K> {
    /// Creates an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            tasks: HashMap::new(),
        }
    }

    /// Current clock value.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward. Earlier timestamps are ignored.
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Schedules `key` to fire `delay` from now, replacing any pending deadline.
    pub fn schedule(&mut self, key: K, delay: Duration) {
        let seq = self.seq;
        self.seq += 1;
        self.tasks.insert(key, (self.now.saturating_add(delay), seq));
    }

    /// Cancels `key`. Returns `true` if it was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.tasks.remove(key).is_some()
    }

    /// Cancels every task matching `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) {
        self.tasks.retain(|k, _| !pred(k));
    }

    /// Returns `true` if `key` is pending.
    #[must_use]
    pub fn is_scheduled(&self, key: &K) -> bool {
        self.tasks.contains_key(key)
    }

    /// Deadline of `key`, if pending.
    #[must_use]
    pub fn deadline(&self, key: &K) -> Option<Duration> {
        self.tasks.get(key).map(|(at, _)| *at)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Removes and returns every task whose deadline has passed, earliest
    /// first. Ties fire in scheduling order.
    pub fn take_due(&mut self) -> Vec<K> {
        let now = self.now;
        let mut due: Vec<(Duration, u64, K)> = self
            .tasks
            .iter()
            .filter(|(_, (at, _))| *at <= now)
            .map(|(k, (at, seq))| (*at, *seq, k.clone()))
            .collect();
        due.sort_by_key(|(at, seq, _)| (*at, *seq));
        for (_, _, k) in &due {
            self.tasks.remove(k);
        }
        due.into_iter().map(|(_, _, k)| k).collect()
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
