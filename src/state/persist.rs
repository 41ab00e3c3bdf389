use serde_json::Value;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use super::data::{PersistedItem, PersistedState, Settings};
use crate::error::{Result, ShelfError};

/// The JSON snapshot of the shelf on disk.
///
/// Writes are full overwrites after every mutation; there is no
/// batching and no journaling, so a crash between a mutation and its
/// save loses that one change.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
    /// Successful saves since this handle was created
    writes: Cell<u64>,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        StateFile {
            path,
            writes: Cell::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writes(&self) -> u64 {
        self.writes.get()
    }

    /// Load the snapshot.
    ///
    /// Never fails: a missing or unreadable file yields the default
    /// state, malformed items are skipped, malformed settings fall back
    /// to defaults, and items whose file no longer exists are dropped.
    pub fn load(&self) -> PersistedState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return PersistedState::default();
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}", self.path.display(), e);
                return PersistedState::default();
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring malformed state file {}: {}", self.path.display(), e);
                return PersistedState::default();
            }
        };

        let items = value
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<PersistedItem>(item.clone()).ok())
                    .filter(|item| item.path.exists())
                    .collect()
            })
            .unwrap_or_default();

        let settings = value
            .get("settings")
            .and_then(|settings| serde_json::from_value::<Settings>(settings.clone()).ok())
            .unwrap_or_default()
            .sanitized();

        PersistedState { items, settings }
    }

    /// Overwrite the file with a fresh snapshot
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json).map_err(|e| ShelfError::io(&self.path, e))?;
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
