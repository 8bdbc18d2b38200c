#![forbid(unsafe_code)]

//! JSON file backend.
//!
//! [`FileStorage`] keeps every key in one JSON object on disk:
//!
//! ```json
//! { "count": "3", "theme": "\"dark\"" }
//! ```
//!
//! The file is read once at [`FileStorage::open`] and cached. Each `set`
//! updates the cache and rewrites the whole file through a sibling temp file
//! (the file name with `.tmp` appended) followed by a rename, so a crash
//! mid-write leaves either the old or the new contents, never a torn file.
//!
//! # Failure Modes
//!
//! - Missing file: treated as empty; created on first write.
//! - Malformed file: [`StorageError::Corrupt`] from `open`. The caller decides
//!   whether to discard it.
//! - Write failure: the cache keeps the new value and the error is returned;
//!   the next successful write persists everything.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::backend::KeyValueStore;
use crate::error::StorageError;

/// A backend persisted as a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the store at `path`, loading existing contents.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        tracing::debug!(
            message = "storage.file.open",
            path = %path.display(),
            keys = entries.len()
        );

        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
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

    fn flush(&self) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let bytes = serde_json::to_vec_pretty(&*self.entries.borrow()).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    /// Sibling of the target with `.tmp` appended to the full file name, so
    /// it never coincides with the target.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_owned(), value);
        self.flush()
    }
}
