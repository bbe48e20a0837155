//! Persistent level storage.
//!
//! Levels are stored as JSON strings under fixed keys of a key-value store
//! (browser local storage on the web, a directory of files natively), or as
//! standalone files the player downloads and uploads.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{WorldError, WorldResult};
use crate::level::Level;

/// Named save slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveSlot {
    QuickSave,
    AutoSave,
}

impl SaveSlot {
    pub fn key(self) -> &'static str {
        match self {
            Self::QuickSave => "MARBLE_QUICK_SAVE",
            Self::AutoSave => "MARBLE_AUTO_SAVE",
        }
    }
}

impl fmt::Display for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// String key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> WorldResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> WorldResult<()>;
    fn remove(&mut self, key: &str) -> WorldResult<()>;
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> WorldResult<Option<String>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> WorldResult<()> {
        self.inner.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> WorldResult<()> {
        self.inner.write().remove(key);
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> WorldResult<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> WorldResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> WorldResult<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Writes `level` into `slot`, replacing whatever was there.
pub fn save_to_slot(store: &mut dyn KeyValueStore, slot: SaveSlot, level: &Level) -> WorldResult<()> {
    store.set(slot.key(), &level.to_json()?)?;
    tracing::info!("[store] Saved '{}' to {}", level.metadata.name, slot);
    Ok(())
}

/// Reads the level in `slot`.
pub fn load_from_slot(store: &dyn KeyValueStore, slot: SaveSlot) -> WorldResult<Level> {
    let Some(json) = store.get(slot.key())? else {
        return Err(WorldError::NothingSaved { slot });
    };
    Ok(Level::from_json(&json)?)
}

/// Writes `level` to a downloadable file.
pub fn save_to_file(path: &Path, level: &Level) -> WorldResult<()> {
    std::fs::write(path, level.to_json()?)?;
    tracing::info!("[store] Wrote '{}' to {}", level.metadata.name, path.display());
    Ok(())
}

/// Reads a level file picked by the user. `None` means the pick was cancelled.
pub fn load_from_file(path: Option<&Path>) -> WorldResult<Option<Level>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let json = std::fs::read_to_string(path)?;
    Ok(Some(Level::from_json(&json)?))
}
