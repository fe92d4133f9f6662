// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener registry with per-listener panic isolation.
//!
//! Listeners run in subscription order. A listener that panics is logged and
//! skipped; later listeners still receive the event, and the panicking
//! listener stays subscribed.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Handle returned by [`Stage::subscribe`](crate::Stage::subscribe).
///
/// Pass it back to [`Stage::unsubscribe`](crate::Stage::unsubscribe) to stop
/// receiving events. Dropping the handle does not unsubscribe.
#[must_use = "keep the subscription to be able to unsubscribe"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

pub(crate) struct Emitter<E> {
    next: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            next: 0,
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<E> Emitter<E> {
    pub(crate) fn subscribe(&mut self, listener: Listener<E>) -> Subscription {
        let id = self.next;
        self.next += 1;
        self.listeners.push((id, listener));
        Subscription(id)
    }

    pub(crate) fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn emit(&mut self, event: &E, name: &str) {
        for (id, listener) in &mut self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                log::warn!("listener {id} panicked while handling {name}");
            }
        }
    }
}

/// Calls `f`, logging instead of propagating a panic. Returns `false` on panic.
pub(crate) fn isolated(what: &str, f: impl FnOnce()) -> bool {
    let ok = catch_unwind(AssertUnwindSafe(f)).is_ok();
    if !ok {
        log::warn!("{what} panicked");
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn panicking_listener_does_not_stop_dispatch() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::<u32>::default();
        let s1 = Rc::clone(&seen);
        let _a = emitter.subscribe(Box::new(move |e: &u32| s1.borrow_mut().push(("a", *e))));
        let _b = emitter.subscribe(Box::new(|_: &u32| panic!("listener b always fails")));
        let s3 = Rc::clone(&seen);
        let _c = emitter.subscribe(Box::new(move |e: &u32| s3.borrow_mut().push(("c", *e))));

        emitter.emit(&1, "test");
        emitter.emit(&2, "test");
        assert_eq!(*seen.borrow(), [("a", 1), ("c", 1), ("a", 2), ("c", 2)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter = Emitter::<()>::default();
        let c = Rc::clone(&count);
        let sub = emitter.subscribe(Box::new(move |_: &()| *c.borrow_mut() += 1));
        emitter.emit(&(), "test");
        assert!(emitter.unsubscribe(sub));
        emitter.emit(&(), "test");
        assert_eq!(*count.borrow(), 1);
        assert_eq!(emitter.len(), 0);
    }
}
