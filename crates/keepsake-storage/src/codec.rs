#![forbid(unsafe_code)]

//! Serialization strategies for persisted values.
//!
//! A [`Codec`] turns a [`serde_json::Value`] into the single string stored
//! under a key and back. Working on `Value` keeps the trait object safe, so a
//! store factory can hold any codec behind `Rc<dyn Codec>`; the typed helpers
//! [`encode_value`] and [`decode_value`] bridge to caller types.
//!
//! Two codecs ship with the crate:
//!
//! - [`JsonCodec`]: plain JSON text.
//! - [`PackedCodec`]: compact JSON bytes armoured as standard base64. Payloads
//!   are opaque to casual inspection and never contain quotes or newlines.
//!
//! # Failure Modes
//!
//! Decoding is expected to fail on foreign or truncated data. Every failure
//! is reported as a [`CodecError`]; nothing in this module panics on input.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CodecError;

/// A string serialization strategy for persisted values.
pub trait Codec {
    /// Short identifier used in log fields.
    fn name(&self) -> &'static str;

    /// Encode a value into its persisted form.
    fn encode(&self, value: &Value) -> Result<String, CodecError>;

    /// Decode a persisted string.
    fn decode(&self, raw: &str) -> Result<Value, CodecError>;
}

/// Encode any serializable value with `codec`.
pub fn encode_value<T: Serialize + ?Sized>(codec: &dyn Codec, value: &T) -> Result<String, CodecError> {
    let value = serde_json::to_value(value)?;
    codec.encode(&value)
}

/// Decode a persisted string into `T` with `codec`.
///
/// A payload that decodes but does not fit `T` yields [`CodecError::Shape`].
pub fn decode_value<T: DeserializeOwned>(codec: &dyn Codec, raw: &str) -> Result<T, CodecError> {
    let value = codec.decode(raw)?;
    serde_json::from_value(value).map_err(CodecError::Shape)
}

/// Plain JSON text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> Result<Value, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Compact JSON bytes, base64 armoured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedCodec;

impl Codec for PackedCodec {
    fn name(&self) -> &'static str {
        "packed"
    }

    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(STANDARD.encode(bytes))
    }

    fn decode(&self, raw: &str) -> Result<Value, CodecError> {
        let bytes = STANDARD.decode(raw.trim())?;
        let text = String::from_utf8(bytes)?;
        Ok(serde_json::from_str(&text)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
