//! Flat key-value snapshot of session progress and the stores that hold it.
//!
//! A record is always written whole. A missing or unreadable save is not an
//! error: it loads as an empty record, which the session treats as a new game.

use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::game::{Direction, Gender, Player};

pub const KEY_LIVES: &str = "lives";
pub const KEY_NEXT_TEST: &str = "nextTest";
pub const KEY_NAME: &str = "name";
pub const KEY_GENDER: &str = "gender";
pub const KEY_X: &str = "x";
pub const KEY_Y: &str = "y";
pub const KEY_DIRECTION: &str = "direction";

/// The only keys a record may carry
pub const SAVE_KEYS: [&str; 7] = [KEY_LIVES, KEY_NEXT_TEST, KEY_NAME, KEY_GENDER, KEY_X, KEY_Y, KEY_DIRECTION];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveRecord {
    values: BTreeMap<String, String>,
}

impl SaveRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an arbitrary map, dropping keys outside the fixed set
    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        let mut record = Self::new();
        for (key, value) in values {
            if !record.set(&key, value) {
                log::debug!("Dropping unknown save key '{}'", key);
            }
        }
        record
    }

    /// Snapshot of progress plus the player's identity and resting position
    pub fn snapshot(lives: u8, next_test: u32, player: &Player) -> Self {
        let mut record = Self::new();
        record.set(KEY_LIVES, lives.to_string());
        record.set(KEY_NEXT_TEST, next_test.to_string());
        record.set(KEY_NAME, player.name.clone());
        record.set(KEY_GENDER, player.gender.as_str());
        record.set(KEY_X, player.tile_x.to_string());
        record.set(KEY_Y, player.tile_y.to_string());
        record.set(KEY_DIRECTION, player.direction.as_str());
        record
    }

    /// Returns false (and stores nothing) for a key outside the fixed set
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        if !SAVE_KEYS.contains(&key) {
            return false;
        }
        self.values.insert(key.to_string(), value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn lives(&self) -> Option<u8> {
        self.get(KEY_LIVES)?.trim().parse().ok()
    }

    pub fn next_test(&self) -> Option<u32> {
        self.get(KEY_NEXT_TEST)?.trim().parse().ok()
    }

    pub fn name(&self) -> Option<&str> {
        self.get(KEY_NAME)
    }

    pub fn gender(&self) -> Option<Gender> {
        Gender::from_str(self.get(KEY_GENDER)?)
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        let x = self.get(KEY_X)?.trim().parse().ok()?;
        let y = self.get(KEY_Y)?.trim().parse().ok()?;
        Some((x, y))
    }

    pub fn direction(&self) -> Option<Direction> {
        Direction::from_str(self.get(KEY_DIRECTION)?)
    }
}

/// Persistence boundary. `load` of a store that has never been written
/// returns an empty record.
pub trait SaveStore {
    fn load(&self) -> GameResult<SaveRecord>;

    fn save(&mut self, record: &SaveRecord) -> GameResult<()>;
}

// ============================================================================
// File store (desktop, Android)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveStore for FileSaveStore {
    fn load(&self) -> GameResult<SaveRecord> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No save at {:?}", self.path);
                return Ok(SaveRecord::new());
            }
            Err(e) => return Err(GameError::io(&self.path, e)),
        };

        match toml::from_str::<BTreeMap<String, String>>(&contents) {
            Ok(values) => Ok(SaveRecord::from_map(values)),
            Err(e) => {
                log::warn!("Ignoring corrupt save {:?}: {}", self.path, e);
                Ok(SaveRecord::new())
            }
        }
    }

    fn save(&mut self, record: &SaveRecord) -> GameResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| GameError::io(parent, e))?;
            }
        }

        let contents = toml::to_string_pretty(record).map_err(|e| GameError::Storage(e.to_string()))?;

        // Whole-record replace: write beside the target, then rename over it
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, contents).map_err(|e| GameError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| GameError::io(&self.path, e))?;

        log::debug!("Saved progress to {:?}", self.path);
        Ok(())
    }
}

// ============================================================================
// Browser store (wasm)
// ============================================================================

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "campus_trials_save";

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct QuadStorageSaveStore;

#[cfg(target_arch = "wasm32")]
impl SaveStore for QuadStorageSaveStore {
    fn load(&self) -> GameResult<SaveRecord> {
        let storage = quad_storage::STORAGE
            .lock()
            .map_err(|e| GameError::Storage(e.to_string()))?;
        let Some(json) = storage.get(STORAGE_KEY) else {
            return Ok(SaveRecord::new());
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&json) {
            Ok(values) => Ok(SaveRecord::from_map(values)),
            Err(e) => {
                log::warn!("Ignoring corrupt browser save: {}", e);
                Ok(SaveRecord::new())
            }
        }
    }

    fn save(&mut self, record: &SaveRecord) -> GameResult<()> {
        let json = serde_json::to_string(record).map_err(|e| GameError::Storage(e.to_string()))?;
        quad_storage::STORAGE
            .lock()
            .map_err(|e| GameError::Storage(e.to_string()))?
            .set(STORAGE_KEY, &json);
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Keeps the last written record; used by tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    record: SaveRecord,
    writes: usize,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: SaveRecord) -> Self {
        Self { record, writes: 0 }
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    /// Number of `save` calls so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SaveStore for MemorySaveStore {
    fn load(&self) -> GameResult<SaveRecord> {
        Ok(self.record.clone())
    }

    fn save(&mut self, record: &SaveRecord) -> GameResult<()> {
        self.record = record.clone();
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Platform selection
// ============================================================================

#[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
pub type PlatformSaveStore = FileSaveStore;

#[cfg(target_os = "android")]
pub type PlatformSaveStore = FileSaveStore;

#[cfg(target_arch = "wasm32")]
pub type PlatformSaveStore = QuadStorageSaveStore;

#[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
pub fn platform_store() -> PlatformSaveStore {
    let path = dirs::data_dir()
        .map(|p| p.join("campus-trials").join("save.toml"))
        .unwrap_or_else(|| PathBuf::from("save.toml"));
    FileSaveStore::new(path)
}

#[cfg(target_os = "android")]
pub fn platform_store() -> PlatformSaveStore {
    // Relative to the app's working directory
    FileSaveStore::new("save.toml")
}

#[cfg(target_arch = "wasm32")]
pub fn platform_store() -> PlatformSaveStore {
    QuadStorageSaveStore
}
