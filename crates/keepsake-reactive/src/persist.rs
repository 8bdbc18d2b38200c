#![forbid(unsafe_code)]

//! The storage capability carried by every persisted store.
//!
//! [`Persistence`] pairs a backend with a codec. It is passed explicitly to
//! every store constructor; there is no ambient, process-wide storage.
//!
//! Both directions swallow their failures on purpose:
//!
//! - [`load`](Persistence::load) returns `None` for absent, empty, or
//!   undecodable data so the caller falls back to its default.
//! - [`persist`](Persistence::persist) is fire-and-forget; encode and write
//!   failures are logged and the in-memory value still publishes.

use std::fmt;
use std::rc::Rc;

use keepsake_storage::{
    Codec, JsonCodec, KeyValueStore, PackedCodec, decode_value, encode_value,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Backend + codec pair.
#[derive(Clone)]
pub struct Persistence {
    storage: Rc<dyn KeyValueStore>,
    codec: Rc<dyn Codec>,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("codec", &self.codec.name())
            .finish_non_exhaustive()
    }
}

impl Persistence {
    /// Pair `storage` with `codec`.
    #[must_use]
    pub fn new(storage: Rc<dyn KeyValueStore>, codec: Rc<dyn Codec>) -> Self {
        Self { storage, codec }
    }

    /// Pair `storage` with [`JsonCodec`].
    #[must_use]
    pub fn json(storage: Rc<dyn KeyValueStore>) -> Self {
        Self::new(storage, Rc::new(JsonCodec))
    }

    /// Pair `storage` with [`PackedCodec`].
    #[must_use]
    pub fn packed(storage: Rc<dyn KeyValueStore>) -> Self {
        Self::new(storage, Rc::new(PackedCodec))
    }

    /// The backend.
    #[must_use]
    pub fn storage(&self) -> &Rc<dyn KeyValueStore> {
        &self.storage
    }

    /// The codec.
    #[must_use]
    pub fn codec(&self) -> &Rc<dyn Codec> {
        &self.codec
    }

    /// Decode the value stored under `key`, if any.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.storage.get(key)?;
        if raw.is_empty() {
            return None;
        }
        match decode_value(&*self.codec, &raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(
                    message = "store.load.decode_failed",
                    key,
                    codec = self.codec.name(),
                    error = %err
                );
                None
            }
        }
    }

    /// Encode `value` and write it under `key`.
    pub fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match encode_value(&*self.codec, value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(
                    message = "store.persist.encode_failed",
                    key,
                    codec = self.codec.name(),
                    error = %err
                );
                return;
            }
        };
        if let Err(err) = self.storage.set(key, raw) {
            tracing::warn!(message = "store.persist.write_failed", key, error = %err);
        }
    }
}
