#![forbid(unsafe_code)]

//! Keepsake: reactive stores that survive restarts.
//!
//! This is the facade crate. It re-exports the store types from
//! `keepsake-reactive`, the backends and codecs from `keepsake-storage`, and
//! adds configuration plus two ready-made factories:
//!
//! - [`session`]: in-memory backend, gone when the process exits.
//! - [`local`]: JSON file backend, reloaded on the next run.
//!
//! # Example
//!
//! ```
//! use keepsake::prelude::*;
//!
//! let stores = keepsake::session();
//! let count = stores.writable("count", 1_i64);
//! let doubled = stores.derived_from_one("doubled", count.clone(), Aggregate::pure(|n: &i64| n * 2), None);
//!
//! count.set(21);
//! assert_eq!(doubled.get(), Some(42));
//! ```
//!
//! # Configuration
//!
//! [`StoreConfig::from_env`] reads `KEEPSAKE_STORAGE` and `KEEPSAKE_CODEC`;
//! see [`config`] for the accepted values.

pub mod config;

use std::path::PathBuf;
use std::rc::Rc;

pub use config::{BackendKind, CODEC_ENV, CodecKind, ConfigError, STORAGE_ENV, StoreConfig};
pub use keepsake_reactive as reactive;
pub use keepsake_reactive::{
    Aggregate, Cleanup, DeriveError, IntoCleanup, Observable, Persistence, ReadOnly, Readable,
    Setter, StoreFactory, StoreValue, Subscription, Writable, derive_from_many, derive_from_one,
    readable_view,
};
pub use keepsake_storage as storage;
pub use keepsake_storage::{
    Codec, FileStorage, JsonCodec, KeyValueStore, MemoryStorage, NullStorage, PackedCodec,
    StorageError,
};

/// Factory over a fresh in-memory backend with the JSON codec.
#[must_use]
pub fn session() -> StoreFactory {
    StoreFactory::json(Rc::new(MemoryStorage::new()))
}

/// Factory over the JSON file at `path` with the JSON codec.
///
/// A missing file is created on the first write.
///
/// # Errors
///
/// [`ConfigError::Storage`] when the file exists but cannot be read or does
/// not hold a JSON object of strings.
pub fn local(path: impl Into<PathBuf>) -> Result<StoreFactory, ConfigError> {
    StoreConfig::new().file(path).build()
}

/// Common imports.
pub mod prelude {
    pub use crate::{
        Aggregate, Cleanup, IntoCleanup, ReadOnly, Readable, Setter, StoreConfig, StoreFactory,
        Subscription, Writable, derive_from_many, derive_from_one,
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
