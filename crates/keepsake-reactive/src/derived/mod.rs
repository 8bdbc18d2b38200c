#![forbid(unsafe_code)]

//! Derived stores: persisted values recomputed from other stores.
//!
//! A derived store is a [`ReadOnly`] cell whose activation callback owns a
//! [`Synchronizer`](sync::Synchronizer). While the store has subscribers the
//! synchronizer listens to every input and republishes the aggregation of
//! their latest values; when the last subscriber leaves it releases the
//! inputs and runs any outstanding cleanup.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use keepsake_reactive::{Aggregate, Persistence, Readable, Writable, derive_from_one};
//! use keepsake_storage::MemoryStorage;
//!
//! let p = Persistence::json(Rc::new(MemoryStorage::new()));
//! let count = Writable::new(&p, "count", 1);
//! let doubled = derive_from_one(&p, "doubled", count.clone(), Aggregate::pure(|n: &i32| n * 2), None);
//!
//! assert_eq!(doubled.get(), Some(2));
//! count.set(5);
//! assert_eq!(doubled.get(), Some(10));
//! ```
//!
//! # Glitch freedom
//!
//! Every observable invalidates all of its subscribers before delivering to
//! any of them, and deliveries triggered during propagation are queued rather
//! than run recursively. A synchronizer forwards the first invalidation it
//! receives to its own subscribers, so staleness reaches every store
//! downstream of a change before any value does. A store whose inputs share
//! an ancestor, in whatever order they are listed, therefore recomputes once
//! with the settled values.
//!
//! A synchronizer that settles without publishing (its aggregation stayed
//! silent, its inputs turned out unchanged, or the aggregation panicked)
//! revalidates its subscribers instead, so nothing downstream is left
//! waiting.
//!
//! # Cycles
//!
//! Cycles in the dependency graph are unsupported: a store that keeps setting
//! one of its own ancestors never lets propagation finish.

mod inputs;
mod pending;
mod sync;

use std::fmt;
use std::rc::Rc;

pub use inputs::{DeriveInputs, InputSink, Single};
pub use pending::PendingSet;

use crate::cell::{ReadOnly, StoreValue, Writable};
use crate::cleanup::{Cleanup, IntoCleanup};
use crate::observable::{Readable, Setter, StartFn};
use crate::persist::Persistence;
use sync::Synchronizer;

/// How a derived store turns input values into its own value.
pub enum Aggregate<V, U> {
    /// The return value is published.
    Pure(Box<dyn Fn(&V) -> U>),
    /// Publishes through the setter, zero or more times, possibly later.
    /// The returned cleanup runs before the next recomputation and when the
    /// store deactivates.
    Effectful(Box<dyn Fn(&V, &Setter<U>) -> Option<Cleanup>>),
}

impl<V: 'static, U: 'static> Aggregate<V, U> {
    /// Wrap a mapping function.
    pub fn pure(f: impl Fn(&V) -> U + 'static) -> Self {
        Self::Pure(Box::new(f))
    }

    /// Wrap a side-effecting function. Returning `()` or `None` means no
    /// cleanup.
    pub fn effectful<R>(f: impl Fn(&V, &Setter<U>) -> R + 'static) -> Self
    where
        R: IntoCleanup,
    {
        Self::Effectful(Box::new(move |values: &V, set: &Setter<U>| {
            f(values, set).into_cleanup()
        }))
    }
}

impl<V, U> fmt::Debug for Aggregate<V, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pure(_) => f.write_str("Aggregate::Pure(..)"),
            Self::Effectful(_) => f.write_str("Aggregate::Effectful(..)"),
        }
    }
}

/// Errors constructing a derived store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    /// A derived store needs at least one input.
    #[error("derived store `{key}` has no inputs")]
    NoInputs { key: String },
}

/// Derive a store from a single input. The aggregation receives the bare
/// input value.
pub fn derive_from_one<R, U>(
    persistence: &Persistence,
    key: impl Into<String>,
    input: R,
    aggregate: Aggregate<R::Value, U>,
    initial: Option<U>,
) -> ReadOnly<U>
where
    R: Readable + 'static,
    U: StoreValue,
{
    build(persistence, key.into(), Single(input), aggregate, initial)
}

/// Derive a store from several inputs.
///
/// `inputs` is a tuple of up to eight readables (the aggregation receives a
/// tuple of their values) or a `Vec` of same-typed readables (the aggregation
/// receives a `Vec`).
///
/// # Errors
///
/// [`DeriveError::NoInputs`] if `inputs` is empty.
pub fn derive_from_many<I, U>(
    persistence: &Persistence,
    key: impl Into<String>,
    inputs: I,
    aggregate: Aggregate<I::Values, U>,
    initial: Option<U>,
) -> Result<ReadOnly<U>, DeriveError>
where
    I: DeriveInputs,
    U: StoreValue,
{
    let key = key.into();
    if inputs.is_empty() {
        tracing::warn!(message = "derived.no_inputs", key = %key);
        return Err(DeriveError::NoInputs { key });
    }
    Ok(build(persistence, key, inputs, aggregate, initial))
}

fn build<I, U>(
    persistence: &Persistence,
    key: String,
    inputs: I,
    aggregate: Aggregate<I::Values, U>,
    initial: Option<U>,
) -> ReadOnly<U>
where
    I: DeriveInputs,
    U: StoreValue,
{
    let aggregate = Rc::new(aggregate);
    let sync_key: Rc<str> = Rc::from(key.as_str());
    let start: StartFn<U> = Box::new(move |setter: Setter<U>| {
        let sync = Rc::new(Synchronizer::new(
            Rc::clone(&sync_key),
            &inputs,
            Rc::clone(&aggregate),
            setter,
        ));
        let subscriptions = sync.activate(&inputs);
        Some(Cleanup::new(move || sync.dispose(subscriptions)))
    });
    ReadOnly::from_cell(Writable::build(persistence, key, initial, Some(start)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::Observable;
    use keepsake_storage::{KeyValueStore, MemoryStorage};
    use std::cell::RefCell;

    fn persistence() -> Persistence {
        Persistence::json(Rc::new(MemoryStorage::new()))
    }

    fn record<T: Clone + 'static>(
        store: &impl Readable<Value = T>,
    ) -> (Rc<RefCell<Vec<T>>>, crate::observable::Subscription) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&values);
        let sub = store.subscribe_with(
            Box::new(move |v: &T| sink.borrow_mut().push(v.clone())),
            Box::new(|| {}),
        );
        (values, sub)
    }

    #[test]
    fn empty_vec_is_rejected() {
        let p = persistence();
        let inputs: Vec<Observable<i32>> = Vec::new();
        let err = derive_from_many(&p, "sum", inputs, Aggregate::pure(|v: &Vec<i32>| v.iter().sum::<i32>()), None)
            .unwrap_err();
        assert_eq!(err, DeriveError::NoInputs { key: "sum".into() });
        assert_eq!(err.to_string(), "derived store `sum` has no inputs");
    }

    #[test]
    fn vec_inputs_are_summed() {
        let p = persistence();
        let a = Writable::new(&p, "a", 1);
        let b = Writable::new(&p, "b", 2);
        let sum = derive_from_many(
            &p,
            "sum",
            vec![a.clone(), b.clone()],
            Aggregate::pure(|v: &Vec<i32>| v.iter().sum::<i32>()),
            None,
        )
        .unwrap();
        let (values, _sub) = record(&sum);
        a.set(10);
        b.set(20);
        assert_eq!(*values.borrow(), vec![3, 12, 30]);
    }

    #[test]
    fn inputs_are_released_when_last_subscriber_leaves() {
        let p = persistence();
        let a = Writable::new(&p, "a", 1);
        let b = derive_from_one(&p, "b", a.clone(), Aggregate::pure(|n: &i32| n + 1), None);
        assert_eq!(a.subscriber_count(), 0);
        let sub = b.subscribe(|_| {});
        assert_eq!(a.subscriber_count(), 1);
        drop(sub);
        assert_eq!(a.subscriber_count(), 0);
    }

    #[test]
    fn initial_value_is_seed_until_effectful_publishes() {
        let p = persistence();
        let source = Writable::new(&p, "source", 1);
        let lazy = derive_from_one(
            &p,
            "lazy",
            source.clone(),
            Aggregate::effectful(|n: &i32, set: &Setter<i32>| {
                if *n > 1 {
                    set.set(*n);
                }
            }),
            Some(-1),
        );
        let (values, _sub) = record(&lazy);
        source.set(2);
        assert_eq!(*values.borrow(), vec![-1, 2]);
    }

    #[test]
    fn no_initial_and_silent_aggregate_delivers_nothing() {
        let p = persistence();
        let source = Writable::new(&p, "source", 1);
        let silent = derive_from_one(
            &p,
            "silent",
            source,
            Aggregate::effectful(|_: &i32, _: &Setter<i32>| None::<Cleanup>),
            None,
        );
        let (values, _sub) = record(&silent);
        assert!(values.borrow().is_empty());
        assert_eq!(p.storage().get("silent"), None);
    }

    #[test]
    fn derived_value_is_persisted() {
        let p = persistence();
        let a = Writable::new(&p, "a", 2);
        let b = derive_from_one(&p, "b", a.clone(), Aggregate::pure(|n: &i32| n * 3), None);
        let _sub = b.subscribe(|_| {});
        assert_eq!(p.load::<i32>("b"), Some(6));
        a.set(5);
        assert_eq!(p.load::<i32>("b"), Some(15));
    }

    #[test]
    fn chained_derivations_settle() {
        let p = persistence();
        let a = Writable::new(&p, "a", 1);
        let b = derive_from_one(&p, "b", a.clone(), Aggregate::pure(|n: &i32| n * 2), None);
        let c = derive_from_one(&p, "c", b, Aggregate::pure(|n: &i32| n + 1), None);
        let (values, _sub) = record(&c);
        a.set(2);
        a.set(3);
        assert_eq!(*values.borrow(), vec![3, 5, 7]);
    }

    #[test]
    fn aggregate_debug() {
        let pure: Aggregate<i32, i32> = Aggregate::pure(|n: &i32| *n);
        assert_eq!(format!("{pure:?}"), "Aggregate::Pure(..)");
        let effectful: Aggregate<i32, i32> = Aggregate::effectful(|_: &i32, _: &Setter<i32>| {});
        assert_eq!(format!("{effectful:?}"), "Aggregate::Effectful(..)");
    }
}
