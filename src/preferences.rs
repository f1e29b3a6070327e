//! Durable key-value preferences.
//!
//! A [`PreferenceStore`] holds serialized strings under string keys, the way
//! browser local storage does. [`PreferenceCell`] layers a typed value on top:
//! it loads once, falls back to a default when the stored string is missing or
//! unreadable, and writes through on every change.

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait PreferenceStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-lifetime store.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| AppError::Storage("preference store poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| AppError::Storage("preference store poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a single JSON object file (`{"key": "<serialized>"}`).
///
/// The whole file is replaced on every `set_item`, through a temp file and a
/// rename.
pub struct JsonFileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// one is logged and treated as empty, and is replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let items = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt preference file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::debug!("Opened preference file {} ({} keys)", path.display(), items.len());

        Ok(JsonFileStore {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| AppError::Storage("preference store poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| AppError::Storage("preference store poisoned".to_string()))?;

        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());

        let contents = serde_json::to_string_pretty(&next)
            .map_err(|e| AppError::Storage(format!("Failed to serialize preferences: {}", e)))?;

        write_atomic(&self.path, contents.as_bytes()).map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        *items = next;
        Ok(())
    }
}

/// Write `data` to `{path}.tmp`, sync it, then rename over `path`. A failure
/// at any step leaves the previous file untouched.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path_for(path);
    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// A typed value mirrored into a [`PreferenceStore`] under one key.
pub struct PreferenceCell<T> {
    store: Arc<dyn PreferenceStore>,
    key: String,
    value: T,
}

impl<T> PreferenceCell<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Load `key` from `store`, falling back to `default` when nothing usable
    /// is stored. The resulting value is written back immediately.
    pub fn load(store: Arc<dyn PreferenceStore>, key: &str, default: T) -> Self {
        let value = match store.get_item(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Failed to parse stored preference {:?}: {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!("Failed to read stored preference {:?}: {}", key, e);
                default
            }
        };

        let cell = PreferenceCell {
            store,
            key: key.to_string(),
            value,
        };
        cell.persist();
        cell
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the value and persist it. Write failures are logged and leave
    /// the in-memory value updated.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Mutate the value in place, then persist it.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.persist();
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.value) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Failed to serialize preference {:?}: {}", self.key, e);
                return;
            }
        };

        if let Err(e) = self.store.set_item(&self.key, &serialized) {
            tracing::warn!("Failed to persist preference {:?}: {}", self.key, e);
        }
    }
}
