#![forbid(unsafe_code)]

//! A store generator bound to one backend and codec.
//!
//! [`StoreFactory`] saves threading a [`Persistence`] through every
//! constructor call. Factories are cheap to clone; clones share the backend.

use std::rc::Rc;

use keepsake_storage::{Codec, KeyValueStore};

use crate::cell::{ReadOnly, StoreValue, Writable, readable_view};
use crate::cleanup::IntoCleanup;
use crate::derived::{Aggregate, DeriveError, DeriveInputs, derive_from_many, derive_from_one};
use crate::observable::{Readable, Setter};
use crate::persist::Persistence;

/// Creates persisted stores that share a backend and codec.
#[derive(Debug, Clone)]
pub struct StoreFactory {
    persistence: Persistence,
}

impl StoreFactory {
    #[must_use]
    pub fn new(storage: Rc<dyn KeyValueStore>, codec: Rc<dyn Codec>) -> Self {
        Self::from_persistence(Persistence::new(storage, codec))
    }

    /// Factory encoding values as JSON.
    #[must_use]
    pub fn json(storage: Rc<dyn KeyValueStore>) -> Self {
        Self::from_persistence(Persistence::json(storage))
    }

    /// Factory encoding values with the packed codec.
    #[must_use]
    pub fn packed(storage: Rc<dyn KeyValueStore>) -> Self {
        Self::from_persistence(Persistence::packed(storage))
    }

    #[must_use]
    pub fn from_persistence(persistence: Persistence) -> Self {
        Self { persistence }
    }

    #[must_use]
    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    #[must_use]
    pub fn storage(&self) -> &Rc<dyn KeyValueStore> {
        self.persistence.storage()
    }

    #[must_use]
    pub fn codec(&self) -> &Rc<dyn Codec> {
        self.persistence.codec()
    }

    /// See [`Writable::new`].
    pub fn writable<T: StoreValue>(&self, key: impl Into<String>, initial: T) -> Writable<T> {
        Writable::new(&self.persistence, key, initial)
    }

    /// See [`Writable::with_start`].
    pub fn writable_with_start<T, R>(
        &self,
        key: impl Into<String>,
        initial: T,
        start: impl Fn(Setter<T>) -> R + 'static,
    ) -> Writable<T>
    where
        T: StoreValue,
        R: IntoCleanup,
    {
        Writable::with_start(&self.persistence, key, initial, start)
    }

    /// See [`readable_view`].
    pub fn readable<T, R>(
        &self,
        key: impl Into<String>,
        initial: T,
        start: impl Fn(Setter<T>) -> R + 'static,
    ) -> ReadOnly<T>
    where
        T: StoreValue,
        R: IntoCleanup,
    {
        readable_view(&self.persistence, key, initial, start)
    }

    /// See [`derive_from_one`].
    pub fn derived_from_one<R, U>(
        &self,
        key: impl Into<String>,
        input: R,
        aggregate: Aggregate<R::Value, U>,
        initial: Option<U>,
    ) -> ReadOnly<U>
    where
        R: Readable + 'static,
        U: StoreValue,
    {
        derive_from_one(&self.persistence, key, input, aggregate, initial)
    }

    /// See [`derive_from_many`].
    ///
    /// # Errors
    ///
    /// [`DeriveError::NoInputs`] if `inputs` is empty.
    pub fn derived_from_many<I, U>(
        &self,
        key: impl Into<String>,
        inputs: I,
        aggregate: Aggregate<I::Values, U>,
        initial: Option<U>,
    ) -> Result<ReadOnly<U>, DeriveError>
    where
        I: DeriveInputs,
        U: StoreValue,
    {
        derive_from_many(&self.persistence, key, inputs, aggregate, initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_storage::{MemoryStorage, PackedCodec};

    #[test]
    fn clones_share_storage() {
        let storage = Rc::new(MemoryStorage::new());
        let factory = StoreFactory::json(storage.clone());
        let other = factory.clone();
        let _a = factory.writable("a", 1);
        let b = other.writable("a", 0);
        assert_eq!(b.get(), Some(1));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn codec_is_reported() {
        let factory = StoreFactory::new(Rc::new(MemoryStorage::new()), Rc::new(PackedCodec));
        assert_eq!(factory.codec().name(), "packed");
        assert_eq!(StoreFactory::json(Rc::new(MemoryStorage::new())).codec().name(), "json");
    }

    #[test]
    fn builds_every_store_kind() {
        let factory = StoreFactory::packed(Rc::new(MemoryStorage::new()));
        let a = factory.writable("a", 2);
        let ticks = factory.readable("ticks", 0, |set: Setter<i32>| set.set(7));
        let doubled = factory.derived_from_one("doubled", a.clone(), Aggregate::pure(|n: &i32| n * 2), None);
        let sum = factory
            .derived_from_many(
                "sum",
                (doubled.clone(), ticks.clone()),
                Aggregate::pure(|(d, t): &(i32, i32)| d + t),
                None,
            )
            .unwrap();
        assert_eq!(sum.get(), Some(11));
        a.set(3);
        assert_eq!(sum.get(), Some(13));

        let counter = factory.writable_with_start("counter", 0, |set: Setter<i32>| set.update(|n| n + 1));
        assert_eq!(counter.read_only().get(), Some(1));
    }
}
