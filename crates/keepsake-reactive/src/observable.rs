#![forbid(unsafe_code)]

//! The subscription primitive.
//!
//! [`Observable<T>`] is a shared value container with synchronous change
//! notification. It is the base every keepsake store publishes through.
//!
//! # Design
//!
//! State lives in `Rc` interior storage, so cloning an `Observable` creates
//! a new handle to the **same** value and subscriber list. Subscribers are
//! held as `Rc` slots with a liveness flag; delivery iterates a snapshot of
//! the list and skips slots that were unsubscribed mid-delivery.
//!
//! An observable may carry an activation callback ("start"). It runs when the
//! subscriber count goes from zero to one and receives a [`Setter`]; the
//! [`Cleanup`] it returns runs when the count drops back to zero.
//!
//! # Invariants
//!
//! 1. A new subscriber receives the current value synchronously at subscribe
//!    time, exactly once, if a value is known. Values published by the start
//!    callback while it is still running are folded into that one delivery.
//! 2. `set` always publishes; values are never compared for equality.
//! 3. On `set`, every subscriber's invalidator runs before any subscriber
//!    receives the new value.
//! 4. Subscribers are notified in registration order.
//! 5. Deliveries go through the per-thread queue (see [`crate::queue`]). A
//!    `set` made while another publish is being delivered runs after it, so
//!    every subscriber sees values in the order they were set.
//! 6. After unsubscribing, a subscriber receives nothing further, even from a
//!    delivery already queued.
//! 7. An invalidated subscriber is later either delivered a value or, through
//!    [`Readable::subscribe_tracked`], told that no value is coming.
//!
//! # Failure Modes
//!
//! - **Callback panics**: the panic unwinds to the caller of `set` or
//!   `subscribe`, after every other queued delivery has run. No `RefCell`
//!   borrow is held across user callbacks, so the observable stays usable
//!   afterwards. A panicking activation callback leaves the observable
//!   without the subscriber that triggered it.
//! - **Deep activation chains**: activation recurses through every inactive
//!   upstream store and panics past
//!   [`MAX_PROPAGATION_DEPTH`](crate::MAX_PROPAGATION_DEPTH) nested frames.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::cleanup::{Cleanup, IntoCleanup};
use crate::depth::PropagationGuard;
use crate::queue::{self, Delivery};

/// Activation callback stored by an observable.
pub(crate) type StartFn<T> = Box<dyn Fn(Setter<T>) -> Option<Cleanup>>;

// ---------------------------------------------------------------------------
// Setter
// ---------------------------------------------------------------------------

/// A `set`/`update` pair handed to activation callbacks and effectful
/// aggregations.
pub struct Setter<T> {
    publish: Rc<dyn Fn(T)>,
    current: Rc<dyn Fn() -> Option<T>>,
    /// `true` invalidates the store's subscribers, `false` revalidates them.
    staleness: Rc<dyn Fn(bool)>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            publish: Rc::clone(&self.publish),
            current: Rc::clone(&self.current),
            staleness: Rc::clone(&self.staleness),
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Setter(..)")
    }
}

impl<T: 'static> Setter<T> {
    pub(crate) fn new(
        publish: impl Fn(T) + 'static,
        current: impl Fn() -> Option<T> + 'static,
    ) -> Self {
        Self {
            publish: Rc::new(publish),
            current: Rc::new(current),
            staleness: Rc::new(|_: bool| {}),
        }
    }

    pub(crate) fn with_staleness(mut self, staleness: impl Fn(bool) + 'static) -> Self {
        self.staleness = Rc::new(staleness);
        self
    }

    /// Announce that a new value is on its way.
    pub(crate) fn invalidate(&self) {
        (self.staleness)(true);
    }

    /// Withdraw an earlier [`invalidate`](Self::invalidate): no value is
    /// coming after all.
    pub(crate) fn revalidate(&self) {
        (self.staleness)(false);
    }

    /// Publish a new value.
    pub fn set(&self, value: T) {
        (self.publish)(value);
    }

    /// Publish `f(current)`.
    ///
    /// Does nothing while the store has no value yet.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        match (self.current)() {
            Some(current) => self.set(f(&current)),
            None => tracing::trace!(message = "setter.update.no_value"),
        }
    }

    /// Live value of the store this setter publishes to.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        (self.current)()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII guard for a subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an unsubscribe callback.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Unsubscribe now.
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Keep the subscription for the lifetime of the store.
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Readable
// ---------------------------------------------------------------------------

/// Anything that can be subscribed to.
///
/// Object safe: `Rc<dyn Readable<Value = T>>` works wherever a concrete store
/// does.
pub trait Readable {
    /// The published value type.
    type Value: Clone + 'static;

    /// Register a value callback and an invalidation callback.
    ///
    /// Implementations must deliver the current value to `run` before
    /// returning, if a value is known.
    fn subscribe_with(
        &self,
        run: Box<dyn Fn(&Self::Value)>,
        invalidate: Box<dyn Fn()>,
    ) -> Subscription;

    /// [`subscribe_with`](Self::subscribe_with) plus a callback run when an
    /// invalidation turns out not to be followed by a value.
    ///
    /// Derived stores subscribe to their inputs this way. Wrappers around
    /// another readable must forward all three callbacks; the default drops
    /// `revalidate`, which is only correct for stores that never invalidate
    /// without publishing.
    fn subscribe_tracked(
        &self,
        run: Box<dyn Fn(&Self::Value)>,
        invalidate: Box<dyn Fn()>,
        revalidate: Box<dyn Fn()>,
    ) -> Subscription {
        drop(revalidate);
        self.subscribe_with(run, invalidate)
    }

    /// Register a value callback.
    fn subscribe<F>(&self, run: F) -> Subscription
    where
        F: Fn(&Self::Value) + 'static,
        Self: Sized,
    {
        self.subscribe_with(Box::new(run), Box::new(|| {}))
    }

    /// Read the value by subscribing and immediately unsubscribing.
    ///
    /// For stores with activation logic this runs one full start/stop cycle.
    fn get(&self) -> Option<Self::Value> {
        let slot = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&slot);
        let subscription = self.subscribe_with(
            Box::new(move |value: &Self::Value| *sink.borrow_mut() = Some(value.clone())),
            Box::new(|| {}),
        );
        subscription.unsubscribe();
        slot.take()
    }
}

impl<R: Readable + ?Sized> Readable for Rc<R> {
    type Value = R::Value;

    fn subscribe_with(
        &self,
        run: Box<dyn Fn(&Self::Value)>,
        invalidate: Box<dyn Fn()>,
    ) -> Subscription {
        (**self).subscribe_with(run, invalidate)
    }

    fn subscribe_tracked(
        &self,
        run: Box<dyn Fn(&Self::Value)>,
        invalidate: Box<dyn Fn()>,
        revalidate: Box<dyn Fn()>,
    ) -> Subscription {
        (**self).subscribe_tracked(run, invalidate, revalidate)
    }
}

// ---------------------------------------------------------------------------
// Observable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Notice {
    Invalidate,
    Revalidate,
}

struct SubscriberSlot<T> {
    id: u64,
    run: Box<dyn Fn(&T)>,
    invalidate: Box<dyn Fn()>,
    revalidate: Box<dyn Fn()>,
    live: Cell<bool>,
}

struct ObservableInner<T> {
    value: RefCell<Option<T>>,
    subscribers: RefCell<Vec<Rc<SubscriberSlot<T>>>>,
    next_id: Cell<u64>,
    start: Option<StartFn<T>>,
    stop: RefCell<Option<Cleanup>>,
    /// True between the end of activation and deactivation.
    running: Cell<bool>,
}

/// A shared, observable value.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .field("running", &self.inner.running.get())
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create an observable holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::build(Some(value), None)
    }

    /// Create an observable with an activation callback.
    ///
    /// `start` runs on the first subscribe; whatever cleanup it returns runs
    /// after the last unsubscribe.
    pub fn with_start<R>(value: T, start: impl Fn(Setter<T>) -> R + 'static) -> Self
    where
        R: IntoCleanup,
    {
        Self::build(
            Some(value),
            Some(Box::new(move |setter: Setter<T>| start(setter).into_cleanup())),
        )
    }

    /// Create an observable with no value yet; `start` is expected to set one.
    pub fn empty_with_start<R>(start: impl Fn(Setter<T>) -> R + 'static) -> Self
    where
        R: IntoCleanup,
    {
        Self::build(
            None,
            Some(Box::new(move |setter: Setter<T>| start(setter).into_cleanup())),
        )
    }

    pub(crate) fn build(value: Option<T>, start: Option<StartFn<T>>) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                start,
                stop: RefCell::new(None),
                running: Cell::new(false),
            }),
        }
    }

    /// Clone of the current value, if one is known.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.value.borrow().clone()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether the activation callback is currently in effect.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Publish a new value.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = Some(value.clone());
        if !self.inner.running.get() {
            return;
        }

        let slots = self.notify(Notice::Invalidate);
        if slots.is_empty() {
            return;
        }

        let value = Rc::new(value);
        queue::enqueue(slots.into_iter().map(|slot| -> Delivery {
            let value = Rc::clone(&value);
            Box::new(move || {
                if slot.live.get() {
                    (slot.run)(&value);
                }
            })
        }));
    }

    /// Publish `f(current)`. Does nothing while no value is known.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let Some(current) = self.get() else {
            return;
        };
        self.set(f(&current));
    }

    /// Pass `notice` to every live subscriber while running, returning the
    /// snapshot that was walked.
    fn notify(&self, notice: Notice) -> Vec<Rc<SubscriberSlot<T>>> {
        if !self.inner.running.get() {
            return Vec::new();
        }
        let slots: Vec<Rc<SubscriberSlot<T>>> = self.inner.subscribers.borrow().clone();
        for slot in slots.iter().filter(|slot| slot.live.get()) {
            match notice {
                Notice::Invalidate => (slot.invalidate)(),
                Notice::Revalidate => (slot.revalidate)(),
            }
        }
        slots
    }

    /// A setter publishing to this observable without keeping it alive.
    #[must_use]
    pub fn setter(&self) -> Setter<T> {
        let publish = Rc::downgrade(&self.inner);
        let current = Rc::downgrade(&self.inner);
        let staleness = Rc::downgrade(&self.inner);
        Setter::new(
            move |value| {
                if let Some(inner) = publish.upgrade() {
                    Observable { inner }.set(value);
                }
            },
            move || {
                current
                    .upgrade()
                    .and_then(|inner| inner.value.borrow().clone())
            },
        )
        .with_staleness(move |stale| {
            if let Some(inner) = staleness.upgrade() {
                let notice = if stale { Notice::Invalidate } else { Notice::Revalidate };
                Observable { inner }.notify(notice);
            }
        })
    }

    fn add_subscriber(
        &self,
        run: Box<dyn Fn(&T)>,
        invalidate: Box<dyn Fn()>,
        revalidate: Box<dyn Fn()>,
    ) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let slot = Rc::new(SubscriberSlot {
            id,
            run,
            invalidate,
            revalidate,
            live: Cell::new(true),
        });

        let first = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.push(Rc::clone(&slot));
            subscribers.len() == 1
        };

        if first && !self.inner.running.get() {
            if let Some(start) = &self.inner.start {
                // A panicking start must not leave a half-registered slot behind.
                let rollback = Rollback { inner: &self.inner, id };
                let _guard = PropagationGuard::enter("observable.start");
                let stop = start(self.setter());
                std::mem::forget(rollback);
                *self.inner.stop.borrow_mut() = stop;
            }
            self.inner.running.set(true);
        }

        let current = self.get();
        if let Some(value) = current
            && slot.live.get()
        {
            (slot.run)(&value);
        }

        let inner = Rc::clone(&self.inner);
        Subscription::new(move || Observable { inner }.remove_subscriber(id))
    }

    fn remove_subscriber(&self, id: u64) {
        let now_empty = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            let Some(pos) = subscribers.iter().position(|slot| slot.id == id) else {
                return;
            };
            let slot = subscribers.remove(pos);
            slot.live.set(false);
            subscribers.is_empty()
        };

        if now_empty && self.inner.running.get() {
            self.inner.running.set(false);
            let stop = self.inner.stop.borrow_mut().take();
            if let Some(stop) = stop {
                stop.run();
            }
        }
    }
}

/// Drops the slot `id` when activation unwinds.
struct Rollback<'a, T> {
    inner: &'a ObservableInner<T>,
    id: u64,
}

impl<T> Drop for Rollback<'_, T> {
    fn drop(&mut self) {
        let slot = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers
                .iter()
                .position(|slot| slot.id == self.id)
                .map(|pos| subscribers.remove(pos))
        };
        if let Some(slot) = slot {
            slot.live.set(false);
        }
    }
}

impl<T: Clone + 'static> Readable for Observable<T> {
    type Value = T;

    fn subscribe_with(&self, run: Box<dyn Fn(&T)>, invalidate: Box<dyn Fn()>) -> Subscription {
        self.add_subscriber(run, invalidate, Box::new(|| {}))
    }

    fn subscribe_tracked(
        &self,
        run: Box<dyn Fn(&T)>,
        invalidate: Box<dyn Fn()>,
        revalidate: Box<dyn Fn()>,
    ) -> Subscription {
        self.add_subscriber(run, invalidate, revalidate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn collector<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&values);
        (values, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn delivers_current_value_on_subscribe() {
        let obs = Observable::new(5);
        let (values, run) = collector();
        let _sub = obs.subscribe(run);
        assert_eq!(*values.borrow(), vec![5]);
    }

    #[test]
    fn set_and_update_publish_in_order() {
        let obs = Observable::new(0);
        let (values, run) = collector();
        let sub = obs.subscribe(run);
        obs.set(1);
        obs.update(|n| n + 1);
        sub.unsubscribe();
        obs.set(3);
        assert_eq!(*values.borrow(), vec![0, 1, 2]);
        assert_eq!(obs.get(), Some(3));
    }

    #[test]
    fn equal_values_are_republished() {
        let obs = Observable::new(7);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| h.set(h.get() + 1));
        obs.set(7);
        obs.update(|n| *n);
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn invalidates_everyone_before_delivering() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let mut subs = Vec::new();
        for name in ["a", "b"] {
            let run_log = Rc::clone(&log);
            let inv_log = Rc::clone(&log);
            subs.push(obs.subscribe_with(
                Box::new(move |v: &i32| run_log.borrow_mut().push(format!("{name}={v}"))),
                Box::new(move || inv_log.borrow_mut().push(format!("{name}!"))),
            ));
        }
        log.borrow_mut().clear();

        obs.set(1);
        assert_eq!(*log.borrow(), vec!["a!", "b!", "a=1", "b=1"]);
    }

    #[test]
    fn setter_signals_reach_tracked_subscribers() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let (inv, rev) = (Rc::clone(&log), Rc::clone(&log));
        let _tracked = obs.subscribe_tracked(
            Box::new(|_: &i32| {}),
            Box::new(move || inv.borrow_mut().push("stale")),
            Box::new(move || rev.borrow_mut().push("fresh")),
        );
        // Plain subscribers ignore revalidation.
        let _plain = obs.subscribe(|_| {});

        let setter = obs.setter();
        setter.invalidate();
        setter.revalidate();
        assert_eq!(*log.borrow(), vec!["stale", "fresh"]);
    }

    #[test]
    fn setter_signals_are_ignored_while_inactive() {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let obs: Observable<i32> = Observable::empty_with_start(move |set: Setter<i32>| {
            // Activation is still in progress, so nobody is notified.
            set.invalidate();
            set.revalidate();
        });
        let _sub = obs.subscribe_tracked(
            Box::new(|_: &i32| {}),
            Box::new(move || h.set(h.get() + 1)),
            Box::new(|| {}),
        );
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn start_and_stop_are_reference_counted() {
        let active = Rc::new(Cell::new(0));
        let a = Rc::clone(&active);
        let obs = Observable::with_start(0, move |_set| {
            a.set(a.get() + 1);
            let a = Rc::clone(&a);
            Cleanup::new(move || a.set(a.get() - 1))
        });

        let first = obs.subscribe(|_| {});
        assert_eq!(active.get(), 1);
        let second = obs.subscribe(|_| {});
        assert_eq!(active.get(), 1);
        first.unsubscribe();
        assert_eq!(active.get(), 1);
        second.unsubscribe();
        assert_eq!(active.get(), 0);
        assert!(!obs.is_running());
    }

    #[test]
    fn value_set_during_start_is_delivered_once() {
        let obs = Observable::with_start(0, |set: Setter<i32>| set.set(42));
        let (values, run) = collector();
        let _sub = obs.subscribe(run);
        assert_eq!(*values.borrow(), vec![42]);
    }

    #[test]
    fn empty_observable_delivers_nothing_until_set() {
        let obs: Observable<i32> = Observable::empty_with_start(|_set: Setter<i32>| {});
        let (values, run) = collector();
        let _sub = obs.subscribe(run);
        assert!(values.borrow().is_empty());
        obs.set(1);
        assert_eq!(*values.borrow(), vec![1]);
    }

    #[test]
    fn setter_update_without_value_is_noop() {
        let obs: Observable<i32> = Observable::empty_with_start(|set: Setter<i32>| {
            set.update(|n| n + 1);
        });
        let _sub = obs.subscribe(|_| {});
        assert_eq!(obs.get(), None);
    }

    #[test]
    fn unsubscribe_during_delivery_silences_later_slot() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let v = Rc::clone(&victim);
        let _killer = obs.subscribe(move |n: &i32| {
            if *n == 1 {
                if let Some(sub) = v.borrow_mut().take() {
                    sub.unsubscribe();
                }
            }
        });
        let h = Rc::clone(&hits);
        *victim.borrow_mut() = Some(obs.subscribe(move |_| h.set(h.get() + 1)));
        assert_eq!(hits.get(), 1);

        obs.set(1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn nested_set_is_delivered_after_outer_set() {
        let obs = Observable::new(0);
        let o = obs.clone();
        let _bumper = obs.subscribe(move |n: &i32| {
            if *n == 1 {
                o.set(2);
            }
        });
        let (values, run) = collector();
        let _watcher = obs.subscribe(run);

        obs.set(1);
        assert_eq!(*values.borrow(), vec![0, 1, 2]);
        assert_eq!(obs.get(), Some(2));
    }

    #[test]
    fn drop_unsubscribes() {
        let obs = Observable::new(0);
        {
            let _sub = obs.subscribe(|_| {});
            assert_eq!(obs.subscriber_count(), 1);
        }
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn detach_keeps_subscription() {
        let obs = Observable::new(0);
        let (values, run) = collector();
        obs.subscribe(run).detach();
        obs.set(1);
        assert_eq!(*values.borrow(), vec![0, 1]);
    }

    #[test]
    fn setter_does_not_keep_store_alive() {
        let obs = Observable::new(1);
        let setter = obs.setter();
        assert_eq!(setter.current(), Some(1));
        drop(obs);
        assert_eq!(setter.current(), None);
        setter.set(2);
    }

    #[test]
    fn trait_get_reads_through_subscription() {
        let obs = Observable::new(String::from("hi"));
        let dyn_obs: Rc<dyn Readable<Value = String>> = Rc::new(obs);
        assert_eq!(Readable::get(&dyn_obs), Some("hi".to_string()));
    }

    #[test]
    fn panicking_subscriber_leaves_store_usable() {
        let obs = Observable::new(0);
        let _bad = obs.subscribe(|n: &i32| {
            if *n == 1 {
                panic!("boom");
            }
        });
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| obs.set(1)));
        assert!(result.is_err());
        obs.set(2);
        assert_eq!(obs.get(), Some(2));
    }

    #[test]
    fn panicking_start_does_not_register_subscriber() {
        let fail = Rc::new(Cell::new(true));
        let f = Rc::clone(&fail);
        let obs = Observable::with_start(0, move |_set: Setter<i32>| {
            if f.get() {
                panic!("start failed");
            }
        });
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            obs.subscribe(|_| {}).detach();
        }));
        assert!(result.is_err());
        assert_eq!(obs.subscriber_count(), 0);
        assert!(!obs.is_running());

        fail.set(false);
        let _sub = obs.subscribe(|_| {});
        assert!(obs.is_running());
    }

    #[test]
    fn debug_format() {
        let obs = Observable::new(42);
        let dbg = format!("{obs:?}");
        assert!(dbg.contains("Observable"));
        assert!(dbg.contains("42"));
    }
}
