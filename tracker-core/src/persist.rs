//! Roster persistence.
//!
//! The roster is stored as JSON in a single slot of a key-value store.
//! Loading never fails: a missing slot starts an empty roster, and a slot
//! that cannot be parsed is logged and treated the same way.

use crate::roster::RosterState;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// A string key-value slot store.
pub trait KeyValueStore {
    /// Load the value stored under `key`, if any.
    fn load(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing what was there.
    fn save(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Remove `key` if present.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with one slot already filled.
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.write() {
            slots.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.slots.read().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut slots = self.slots.write().map_err(|_| PersistError::LockPoisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut slots = self.slots.write().map_err(|_| PersistError::LockPoisoned)?;
        slots.remove(key);
        Ok(())
    }
}

/// File-backed store: every slot lives in one JSON object on disk.
///
/// The file is read once when opened and rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating nothing until the first write.
    ///
    /// An unreadable or corrupt file starts the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let cache = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
                    Ok(map) => map,
                    Err(e) => {
                        tracing::warn!("Failed to parse storage file {}: {}", path.display(), e);
                        HashMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read storage file {}: {}", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!("File storage opened at {}", path.display());

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, slots: &HashMap<String, String>) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(slots)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        self.cache.read().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut slots = self.cache.write().map_err(|_| PersistError::LockPoisoned)?;
        slots.insert(key.to_string(), value.to_string());
        self.flush(&slots)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut slots = self.cache.write().map_err(|_| PersistError::LockPoisoned)?;
        if slots.remove(key).is_some() {
            self.flush(&slots)?;
        }
        Ok(())
    }
}

/// Serialize a roster to its stored JSON form.
pub fn encode_roster(roster: &RosterState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(roster)?)
}

/// Parse a stored roster.
///
/// A selection that references no character falls back to the first one.
pub fn decode_roster(raw: &str) -> Result<RosterState, PersistError> {
    let mut roster: RosterState = serde_json::from_str(raw)?;

    if let Some(id) = roster.selected_character_id {
        if roster.get(id).is_none() {
            tracing::warn!("Stored selection {} matches no character, falling back", id);
            roster.selected_character_id = roster.characters.first().map(|c| c.id);
        }
    }

    Ok(roster)
}

/// Load the roster stored under `key`, falling back to an empty roster.
pub fn load_roster(store: &dyn KeyValueStore, key: &str) -> RosterState {
    let Some(raw) = store.load(key) else {
        tracing::debug!("No stored roster under {:?}, starting empty", key);
        return RosterState::default();
    };

    match decode_roster(&raw) {
        Ok(roster) => {
            tracing::info!("Loaded {} character(s) from storage", roster.len());
            roster
        }
        Err(e) => {
            tracing::error!("Error loading roster from storage: {}", e);
            RosterState::default()
        }
    }
}

/// Store the roster under `key`.
pub fn save_roster(
    store: &dyn KeyValueStore,
    key: &str,
    roster: &RosterState,
) -> Result<(), PersistError> {
    let content = encode_roster(roster)?;
    store.save(key, &content)
}
