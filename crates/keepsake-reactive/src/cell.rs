#![forbid(unsafe_code)]

//! Persisted value cells.
//!
//! [`Writable<T>`] wraps an [`Observable<T>`] and mirrors every value it
//! publishes into a key of the backing store. [`ReadOnly<T>`] is the same
//! cell with `set`/`update` hidden; derived stores publish through one.
//!
//! # Lifecycle
//!
//! 1. Construction reads the key. A value that decodes wins over the supplied
//!    default; absent or undecodable data falls back to the default.
//! 2. The resolved value is written back immediately, which repairs corrupted
//!    entries.
//! 3. Every later change is written **before** it is published, so a
//!    subscriber reacting to a value can rely on it being stored already.
//!    This holds for `set`, `update`, and the setter given to the activation
//!    callback.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cleanup::IntoCleanup;
use crate::observable::{Observable, Readable, Setter, StartFn, Subscription};
use crate::persist::Persistence;

/// Bounds every persisted value satisfies.
pub trait StoreValue: Clone + Serialize + DeserializeOwned + 'static {}

impl<T: Clone + Serialize + DeserializeOwned + 'static> StoreValue for T {}

/// A persisted, writable store.
pub struct Writable<T> {
    key: Rc<str>,
    persistence: Persistence,
    store: Observable<T>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            key: Rc::clone(&self.key),
            persistence: self.persistence.clone(),
            store: self.store.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("key", &self.key)
            .field("store", &self.store)
            .finish()
    }
}

impl<T: StoreValue> Writable<T> {
    /// Create a store under `key`, defaulting to `initial`.
    pub fn new(persistence: &Persistence, key: impl Into<String>, initial: T) -> Self {
        Self::build(persistence, key.into(), Some(initial), None)
    }

    /// Create a store with an activation callback.
    ///
    /// `start` runs while at least one subscriber exists. The [`Setter`] it
    /// receives persists before publishing, exactly like [`Writable::set`].
    pub fn with_start<R>(
        persistence: &Persistence,
        key: impl Into<String>,
        initial: T,
        start: impl Fn(Setter<T>) -> R + 'static,
    ) -> Self
    where
        R: IntoCleanup,
    {
        Self::build(
            persistence,
            key.into(),
            Some(initial),
            Some(Box::new(move |setter: Setter<T>| start(setter).into_cleanup())),
        )
    }

    pub(crate) fn build(
        persistence: &Persistence,
        key: String,
        initial: Option<T>,
        start: Option<StartFn<T>>,
    ) -> Self {
        let key: Rc<str> = Rc::from(key);
        let value = match persistence.load::<T>(&key) {
            Some(stored) => Some(stored),
            None => {
                tracing::trace!(message = "store.load.default", key = &*key);
                initial
            }
        };
        if let Some(value) = &value {
            persistence.persist(&key, value);
        }

        let start = start.map(|start| -> StartFn<T> {
            let persistence = persistence.clone();
            let key = Rc::clone(&key);
            Box::new(move |raw: Setter<T>| start(persisting(&persistence, &key, raw)))
        });

        Self {
            key,
            persistence: persistence.clone(),
            store: Observable::build(value, start),
        }
    }

    /// Persist `value`, then publish it.
    pub fn set(&self, value: T) {
        self.persistence.persist(&self.key, &value);
        self.store.set(value);
    }

    /// `set(f(current))`, reading the live value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        if let Some(current) = self.store.get() {
            self.set(f(&current));
        }
    }

    /// Clone of the live value.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.store.get()
    }

    /// Storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.store.subscriber_count()
    }

    /// A view exposing only subscription.
    #[must_use]
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly { cell: self.clone() }
    }
}

impl<T: StoreValue> Readable for Writable<T> {
    type Value = T;

    fn subscribe_with(&self, run: Box<dyn Fn(&T)>, invalidate: Box<dyn Fn()>) -> Subscription {
        self.store.subscribe_with(run, invalidate)
    }

    fn subscribe_tracked(
        &self,
        run: Box<dyn Fn(&T)>,
        invalidate: Box<dyn Fn()>,
        revalidate: Box<dyn Fn()>,
    ) -> Subscription {
        self.store.subscribe_tracked(run, invalidate, revalidate)
    }
}

/// Wrap a raw observable setter so it persists before publishing.
fn persisting<T: StoreValue>(persistence: &Persistence, key: &Rc<str>, raw: Setter<T>) -> Setter<T> {
    let persistence = persistence.clone();
    let key = Rc::clone(key);
    let publish = raw.clone();
    let current = raw.clone();
    Setter::new(
        move |value: T| {
            persistence.persist(&key, &value);
            publish.set(value);
        },
        move || current.current(),
    )
    .with_staleness(move |stale| {
        if stale {
            raw.invalidate();
        } else {
            raw.revalidate();
        }
    })
}

/// A persisted store that can only be subscribed to.
pub struct ReadOnly<T> {
    cell: Writable<T>,
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnly").field(&self.cell).finish()
    }
}

impl<T: StoreValue> ReadOnly<T> {
    /// Create a read-only store whose value is driven by `start`.
    pub fn new<R>(
        persistence: &Persistence,
        key: impl Into<String>,
        initial: T,
        start: impl Fn(Setter<T>) -> R + 'static,
    ) -> Self
    where
        R: IntoCleanup,
    {
        Writable::with_start(persistence, key, initial, start).read_only()
    }

    pub(crate) fn from_cell(cell: Writable<T>) -> Self {
        Self { cell }
    }

    /// Storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.cell.key()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.cell.subscriber_count()
    }
}

impl<T: StoreValue> Readable for ReadOnly<T> {
    type Value = T;

    fn subscribe_with(&self, run: Box<dyn Fn(&T)>, invalidate: Box<dyn Fn()>) -> Subscription {
        self.cell.subscribe_with(run, invalidate)
    }

    fn subscribe_tracked(
        &self,
        run: Box<dyn Fn(&T)>,
        invalidate: Box<dyn Fn()>,
        revalidate: Box<dyn Fn()>,
    ) -> Subscription {
        self.cell.subscribe_tracked(run, invalidate, revalidate)
    }
}

/// Build a [`ReadOnly`] store; see [`ReadOnly::new`].
pub fn readable_view<T, R>(
    persistence: &Persistence,
    key: impl Into<String>,
    initial: T,
    start: impl Fn(Setter<T>) -> R + 'static,
) -> ReadOnly<T>
where
    T: StoreValue,
    R: IntoCleanup,
{
    ReadOnly::new(persistence, key, initial, start)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
