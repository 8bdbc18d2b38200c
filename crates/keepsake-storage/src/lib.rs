#![forbid(unsafe_code)]

//! Storage: key-value backends and serialization codecs for keepsake stores.
//!
//! - [`KeyValueStore`]: the string-to-string backend contract, with
//!   [`MemoryStorage`], [`FileStorage`] and [`NullStorage`].
//! - [`Codec`]: the value-to-string strategy, with [`JsonCodec`] and
//!   [`PackedCodec`].

pub mod backend;
pub mod codec;
pub mod error;
pub mod file;

pub use backend::{KeyValueStore, MemoryStorage, NullStorage};
pub use codec::{Codec, JsonCodec, PackedCodec, decode_value, encode_value};
pub use error::{CodecError, StorageError};
pub use file::FileStorage;
