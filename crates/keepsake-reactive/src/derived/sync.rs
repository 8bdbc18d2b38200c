#![forbid(unsafe_code)]

//! Per-activation state of a derived store.
//!
//! A [`Synchronizer`] exists only while its derived store has subscribers.
//! It records the latest value of every input, tracks which inputs were
//! invalidated and have not delivered yet, and re-runs the aggregation once
//! nothing is pending.
//!
//! # Invariants
//!
//! 1. The aggregation never runs while [`PendingSet`] is non-empty.
//! 2. Input callbacks do not trigger recomputation until every input has been
//!    subscribed; the activation pass then forces one `sync`.
//! 3. The stored cleanup runs exactly once: immediately before the next
//!    recomputation or at disposal, whichever comes first. A `sync` that does
//!    not recompute leaves it in place.
//! 4. After [`dispose`](Synchronizer::dispose), input callbacks are inert.
//! 5. A recomputation superseded by a nested one does not overwrite the
//!    newer result; its cleanup runs immediately instead of being stored.
//!    This happens when an aggregation sets one of its own inputs while no
//!    propagation is running, for example during activation.
//! 6. The first input invalidation after the synchronizer settled is
//!    forwarded to the derived store's own subscribers, so a store further
//!    down waits for this one even when it also listens to the shared
//!    ancestor directly. Every forwarded invalidation is matched by either a
//!    publish or a revalidation once nothing is pending, including when the
//!    inputs turn out unchanged, the aggregation stays silent, or it panics.
//! 7. Only deliveries mark the synchronizer dirty. Once pending empties
//!    through revalidation alone, nothing is recomputed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::Aggregate;
use super::inputs::{DeriveInputs, InputSink};
use super::pending::PendingSet;
use crate::cleanup::Cleanup;
use crate::observable::{Setter, Subscription};
use crate::queue;

pub(crate) struct Synchronizer<I: DeriveInputs, U> {
    key: Rc<str>,
    slots: RefCell<I::Slots>,
    pending: RefCell<PendingSet>,
    initialized: Cell<bool>,
    disposed: Cell<bool>,
    /// An input delivered since the last recomputation.
    dirty: Cell<bool>,
    /// Downstream subscribers were invalidated and are owed a value or a
    /// revalidation.
    forwarded: Rc<Cell<bool>>,
    /// Bumped at the start of every recomputation.
    generation: Cell<u64>,
    cleanup: RefCell<Option<Cleanup>>,
    aggregate: Rc<Aggregate<I::Values, U>>,
    /// Handed to the aggregation; publishing settles `forwarded`.
    setter: Setter<U>,
    downstream: Setter<U>,
}

impl<I: DeriveInputs, U: 'static> Synchronizer<I, U> {
    pub(crate) fn new(
        key: Rc<str>,
        inputs: &I,
        aggregate: Rc<Aggregate<I::Values, U>>,
        downstream: Setter<U>,
    ) -> Self {
        let forwarded = Rc::new(Cell::new(false));
        let setter = {
            let forwarded = Rc::clone(&forwarded);
            let publish = downstream.clone();
            let current = downstream.clone();
            Setter::new(
                move |value: U| {
                    forwarded.set(false);
                    publish.set(value);
                },
                move || current.current(),
            )
        };
        Self {
            key,
            slots: RefCell::new(inputs.empty_slots()),
            pending: RefCell::new(PendingSet::with_inputs(inputs.len())),
            initialized: Cell::new(false),
            disposed: Cell::new(false),
            dirty: Cell::new(true),
            forwarded,
            generation: Cell::new(0),
            cleanup: RefCell::new(None),
            aggregate,
            setter,
            downstream,
        }
    }

    /// Subscribe to every input, then run the first recomputation.
    pub(crate) fn activate(self: &Rc<Self>, inputs: &I) -> Vec<Subscription> {
        let sink: Rc<dyn InputSink<I::Slots>> = Rc::clone(self) as Rc<dyn InputSink<I::Slots>>;
        let subscriptions = inputs.subscribe_all(&sink);
        self.initialized.set(true);
        tracing::trace!(
            message = "derived.activate",
            key = &*self.key,
            inputs = subscriptions.len()
        );
        self.sync();
        subscriptions
    }

    /// Recompute if no input is pending and one delivered since last time.
    pub(crate) fn sync(&self) {
        if self.disposed.get() || !self.pending.borrow().is_empty() {
            return;
        }
        if !self.dirty.replace(false) {
            tracing::trace!(message = "derived.sync.unchanged", key = &*self.key);
            self.release();
            return;
        }

        let values = I::collect(&self.slots.borrow());
        let Some(values) = values else {
            tracing::trace!(message = "derived.sync.incomplete", key = &*self.key);
            self.release();
            return;
        };

        let previous = self.cleanup.borrow_mut().take();
        if let Some(previous) = previous {
            previous.run();
        }

        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        tracing::trace!(message = "derived.sync", key = &*self.key, generation);

        let unwinding = ReleaseOnUnwind {
            forwarded: &self.forwarded,
            downstream: &self.downstream,
        };
        match &*self.aggregate {
            Aggregate::Pure(f) => {
                let value = f(&values);
                if self.is_current(generation) {
                    self.setter.set(value);
                }
            }
            Aggregate::Effectful(f) => {
                let cleanup = f(&values, &self.setter);
                if self.is_current(generation) {
                    let replaced = self.cleanup.replace(cleanup);
                    if let Some(replaced) = replaced {
                        replaced.run();
                    }
                } else if let Some(cleanup) = cleanup {
                    cleanup.run();
                }
            }
        }
        std::mem::forget(unwinding);
        self.release();
    }

    /// Revalidate downstream subscribers still waiting on this store, unless
    /// an input went stale again in the meantime.
    fn release(&self) {
        if self.pending.borrow().is_empty() && self.forwarded.replace(false) {
            self.downstream.revalidate();
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        if self.generation.get() == generation && !self.disposed.get() {
            return true;
        }
        tracing::trace!(message = "derived.sync.superseded", key = &*self.key, generation);
        false
    }

    /// Release every input in subscription order, then run the last cleanup.
    pub(crate) fn dispose(&self, subscriptions: Vec<Subscription>) {
        self.disposed.set(true);
        self.forwarded.set(false);
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup.run();
        }
        tracing::trace!(message = "derived.dispose", key = &*self.key);
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }
}

/// Queues the downstream revalidation when the aggregation unwinds, so the
/// rest of the propagation still settles.
struct ReleaseOnUnwind<'a, U: 'static> {
    forwarded: &'a Rc<Cell<bool>>,
    downstream: &'a Setter<U>,
}

impl<U: 'static> Drop for ReleaseOnUnwind<'_, U> {
    fn drop(&mut self) {
        if !self.forwarded.get() {
            return;
        }
        let forwarded = Rc::clone(self.forwarded);
        let downstream = self.downstream.clone();
        queue::defer(Box::new(move || {
            if forwarded.replace(false) {
                downstream.revalidate();
            }
        }));
    }
}

impl<I: DeriveInputs, U: 'static> InputSink<I::Slots> for Synchronizer<I, U> {
    fn invalidate(&self, index: usize) {
        if self.disposed.get() {
            return;
        }
        let settled = {
            let mut pending = self.pending.borrow_mut();
            let settled = pending.is_empty();
            pending.insert(index);
            settled
        };
        if settled && self.initialized.get() && !self.forwarded.replace(true) {
            self.downstream.invalidate();
        }
    }

    fn deliver(&self, index: usize, write: &dyn Fn(&mut I::Slots)) {
        if self.disposed.get() {
            return;
        }
        write(&mut self.slots.borrow_mut());
        self.pending.borrow_mut().remove(index);
        self.dirty.set(true);
        if self.initialized.get() {
            self.sync();
        }
    }

    fn revalidate(&self, index: usize) {
        if self.disposed.get() {
            return;
        }
        self.pending.borrow_mut().remove(index);
        if self.initialized.get() {
            self.sync();
        }
    }
}
