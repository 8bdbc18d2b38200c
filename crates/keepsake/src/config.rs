#![forbid(unsafe_code)]

//! Backend and codec selection.
//!
//! [`StoreConfig`] names a backend and a codec and turns them into a
//! [`StoreFactory`]. Values come from code (builder methods) or from the
//! environment:
//!
//! | Variable           | Values                              | Default  |
//! |--------------------|-------------------------------------|----------|
//! | `KEEPSAKE_STORAGE` | `memory`, `null`, or a file path    | `memory` |
//! | `KEEPSAKE_CODEC`   | `json`, `packed`                    | `json`   |
//!
//! Keywords are matched case-insensitively.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use keepsake_reactive::StoreFactory;
use keepsake_storage::{
    Codec, FileStorage, JsonCodec, KeyValueStore, MemoryStorage, NullStorage, PackedCodec,
    StorageError,
};

/// Environment variable selecting the backend.
pub const STORAGE_ENV: &str = "KEEPSAKE_STORAGE";
/// Environment variable selecting the codec.
pub const CODEC_ENV: &str = "KEEPSAKE_CODEC";

/// Errors resolving a [`StoreConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown codec `{value}` (expected `json` or `packed`)")]
    UnknownCodec { value: String },

    #[error("{variable} is set but empty")]
    Empty { variable: &'static str },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Where values are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-lifetime map.
    #[default]
    Memory,
    /// JSON file at the given path.
    File(PathBuf),
    /// Discards writes; every store starts from its default.
    Null,
}

impl BackendKind {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else if raw.eq_ignore_ascii_case("null") {
            Self::Null
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    fn open(&self) -> Result<Rc<dyn KeyValueStore>, StorageError> {
        Ok(match self {
            Self::Memory => Rc::new(MemoryStorage::new()),
            Self::File(path) => Rc::new(FileStorage::open(path)?),
            Self::Null => Rc::new(NullStorage),
        })
    }
}

/// How values are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodecKind {
    #[default]
    Json,
    Packed,
}

impl CodecKind {
    fn codec(self) -> Rc<dyn Codec> {
        match self {
            Self::Json => Rc::new(JsonCodec),
            Self::Packed => Rc::new(PackedCodec),
        }
    }
}

impl FromStr for CodecKind {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if raw.eq_ignore_ascii_case("packed") {
            Ok(Self::Packed)
        } else {
            Err(ConfigError::UnknownCodec {
                value: raw.to_owned(),
            })
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Packed => "packed",
        })
    }
}

/// Backend + codec selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub codec: CodecKind,
}

impl StoreConfig {
    /// Memory backend, JSON codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    /// Shorthand for `backend(BackendKind::File(path))`.
    #[must_use]
    pub fn file(self, path: impl Into<PathBuf>) -> Self {
        self.backend(BackendKind::File(path.into()))
    }

    /// Defaults overridden by `KEEPSAKE_STORAGE` / `KEEPSAKE_CODEC`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when a variable is set but empty or names an unknown
    /// codec.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(STORAGE_ENV) {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(ConfigError::Empty {
                    variable: STORAGE_ENV,
                });
            }
            config.backend = BackendKind::parse(raw);
        }
        if let Some(raw) = lookup(CODEC_ENV) {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(ConfigError::Empty { variable: CODEC_ENV });
            }
            config.codec = raw.parse()?;
        }

        tracing::debug!(
            message = "config.resolved",
            backend = ?config.backend,
            codec = %config.codec
        );
        Ok(config)
    }

    /// Open the backend and pair it with the codec.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Storage`] when a file backend cannot be read or holds
    /// malformed data.
    pub fn build(&self) -> Result<StoreFactory, ConfigError> {
        let storage = self.backend.open()?;
        Ok(StoreFactory::new(storage, self.codec.codec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.codec, CodecKind::Json);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let config =
            StoreConfig::from_lookup(lookup(&[(STORAGE_ENV, "NULL"), (CODEC_ENV, "Packed")]))
                .unwrap();
        assert_eq!(config.backend, BackendKind::Null);
        assert_eq!(config.codec, CodecKind::Packed);
    }

    #[test]
    fn other_storage_values_are_paths() {
        let config =
            StoreConfig::from_lookup(lookup(&[(STORAGE_ENV, " /tmp/state.json ")])).unwrap();
        assert_eq!(config.backend, BackendKind::File("/tmp/state.json".into()));
    }

    #[test]
    fn unknown_codec_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[(CODEC_ENV, "msgpack")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCodec { ref value } if value == "msgpack"));
        assert_eq!(
            err.to_string(),
            "unknown codec `msgpack` (expected `json` or `packed`)"
        );
    }

    #[test]
    fn empty_variable_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[(STORAGE_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty { variable } if variable == STORAGE_ENV));
    }

    #[test]
    fn builder_sets_fields() {
        let config = StoreConfig::new().file("state.json").codec(CodecKind::Packed);
        assert_eq!(config.backend, BackendKind::File("state.json".into()));
        assert_eq!(config.codec, CodecKind::Packed);
        assert_eq!(config.codec.to_string(), "packed");
    }

    #[test]
    fn build_uses_selected_codec() {
        let factory = StoreConfig::new().codec(CodecKind::Packed).build().unwrap();
        assert_eq!(factory.codec().name(), "packed");
    }

    #[test]
    fn corrupt_file_fails_to_build() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let err = StoreConfig::new().file(&path).build().unwrap_err();
        assert!(matches!(err, ConfigError::Storage(StorageError::Corrupt { .. })));
    }
}
