#![forbid(unsafe_code)]

//! File-backed stores across simulated restarts.
//!
//! Each test opens a factory over a temporary file, drops it, and opens a
//! second factory over the same path to stand in for the next process.

use std::fs;

use keepsake::prelude::*;
use keepsake::{BackendKind, CodecKind, ConfigError, StorageError, local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Settings {
    theme: String,
    font_size: u8,
    recent: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "light".into(),
            font_size: 12,
            recent: Vec::new(),
        }
    }
}

#[test]
fn writable_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let stores = local(&path).unwrap();
        let settings = stores.writable("settings", Settings::default());
        settings.update(|s| Settings {
            theme: "dark".into(),
            recent: vec!["notes.md".into()],
            ..s.clone()
        });
    }

    let stores = local(&path).unwrap();
    let settings = stores.writable("settings", Settings::default());
    assert_eq!(
        settings.get(),
        Some(Settings {
            theme: "dark".into(),
            font_size: 12,
            recent: vec!["notes.md".into()],
        })
    );
}

#[test]
fn derived_value_is_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let stores = local(&path).unwrap();
        let count = stores.writable("count", 2_i64);
        let squared = stores.derived_from_one(
            "squared",
            count.clone(),
            Aggregate::pure(|n: &i64| n * n),
            None,
        );
        let _sub = squared.subscribe(|_| {});
        count.set(9);
    }

    let raw = fs::read_to_string(&path).unwrap();
    let entries: std::collections::BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(entries.get("count").map(String::as_str), Some("9"));
    assert_eq!(entries.get("squared").map(String::as_str), Some("81"));
}

#[test]
fn corrupt_entry_self_heals_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, r#"{ "count": "[object Map]", "other": "\"kept\"" }"#).unwrap();

    {
        let stores = local(&path).unwrap();
        let count = stores.writable("count", 7_u32);
        assert_eq!(count.get(), Some(7));
    }

    let stores = local(&path).unwrap();
    assert_eq!(stores.writable("count", 0_u32).get(), Some(7));
    assert_eq!(
        stores.writable("other", String::new()).get(),
        Some("kept".to_owned())
    );
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let err = local(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Storage(StorageError::Corrupt { .. })));
}

#[test]
fn packed_codec_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let config = StoreConfig::new().file(&path).codec(CodecKind::Packed);

    {
        let stores = config.build().unwrap();
        stores.writable("tags", vec!["a".to_owned()]).set(vec!["b".into(), "c".into()]);
    }

    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("\\\"b\\\""), "packed values are not plain JSON: {raw}");

    let stores = config.build().unwrap();
    assert_eq!(
        stores.writable("tags", Vec::<String>::new()).get(),
        Some(vec!["b".to_owned(), "c".to_owned()])
    );
}

#[test]
fn null_backend_always_starts_from_default() {
    let config = StoreConfig::new().backend(BackendKind::Null);

    let first = config.build().unwrap();
    first.writable("count", 0).set(10);

    let second = config.build().unwrap();
    assert_eq!(second.writable("count", 0).get(), Some(0));
}

#[test]
fn environment_lookup_selects_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("env.json");
    let path_str = path.to_string_lossy().into_owned();

    let config = StoreConfig::from_lookup(|name| match name {
        keepsake::STORAGE_ENV => Some(path_str.clone()),
        keepsake::CODEC_ENV => Some("json".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.backend, BackendKind::File(path.clone()));

    config.build().unwrap().writable("seen", true);
    assert!(path.exists());
}
