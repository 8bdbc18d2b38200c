#![forbid(unsafe_code)]

//! Key-value backing stores.
//!
//! A [`KeyValueStore`] maps string keys to the single serialized string a
//! store persists under that key. Backends are shared between many stores as
//! `Rc<dyn KeyValueStore>`, so every method takes `&self` and backends use
//! interior mutability.
//!
//! The contract is deliberately small: get and set. There are no
//! transactions, and concurrent writers of the same key are last-writer-wins.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::StorageError;

/// A string-to-string backing store.
pub trait KeyValueStore {
    /// Read the raw string stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Process-local map. Contents are lost when the last handle drops.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no key is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Plant a raw string under `key` without going through a codec.
    pub fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), raw.into());
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }
}

/// A backend that never holds anything.
///
/// Stands in when no storage is available: stores still work as plain
/// observables, nothing survives them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStorage;

impl KeyValueStore for NullStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Ok(())
    }
}
