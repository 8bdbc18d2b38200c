#![forbid(unsafe_code)]

//! Error types for backends and codecs.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading or writing a backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while encoding or decoding a persisted value.
///
/// Decoding failures are expected at runtime (stale or foreign data under a
/// key) and callers are meant to recover from them.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("packed payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("stored value does not match the expected type: {0}")]
    Shape(#[source] serde_json::Error),
}
