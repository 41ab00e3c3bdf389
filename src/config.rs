/// Filesystem locations used by the shelf
///
/// Both locations can be overridden through the environment, which is
/// mostly useful for running several shelves side by side or for tests:
/// - `DROPSHELF_CACHE_DIR` - where materialized drops and downloads live
/// - `DROPSHELF_STATE_FILE` - the JSON snapshot of items and settings
use std::fs;
use std::path::PathBuf;

use crate::error::{Result, ShelfError};

/// Name of the shelf's directory under the user's cache root
const CACHE_DIR_NAME: &str = "dropshelf";

/// Default state file name, relative to the working directory
const STATE_FILE_NAME: &str = "state.json";

const CACHE_DIR_ENV: &str = "DROPSHELF_CACHE_DIR";
const STATE_FILE_ENV: &str = "DROPSHELF_STATE_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfPaths {
    /// Holds materialized drops, downloaded images and `collected.csv`
    pub cache_dir: PathBuf,
    /// Persisted items + settings
    pub state_file: PathBuf,
}

impl ShelfPaths {
    /// Resolve paths from the environment and platform defaults.
    ///
    /// The cache directory is created if it doesn't exist yet:
    /// - Linux: ~/.cache/dropshelf
    /// - macOS: ~/Library/Caches/dropshelf
    /// - Windows: %LOCALAPPDATA%\dropshelf
    pub fn resolve() -> Result<Self> {
        let cache_dir = match std::env::var_os(CACHE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_cache_dir()?,
        };

        let state_file = match std::env::var_os(STATE_FILE_ENV) {
            Some(file) => PathBuf::from(file),
            None => std::env::current_dir()
                .map_err(|e| ShelfError::io(".", e))?
                .join(STATE_FILE_NAME),
        };

        Self::new(cache_dir, state_file)
    }

    /// Use explicit locations, creating the cache directory if needed
    pub fn new(cache_dir: PathBuf, state_file: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir).map_err(|e| ShelfError::io(&cache_dir, e))?;
        Ok(ShelfPaths {
            cache_dir,
            state_file,
        })
    }
}

fn default_cache_dir() -> Result<PathBuf> {
    let mut path = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .ok_or(ShelfError::NoCacheDir)?;
    path.push(CACHE_DIR_NAME);
    Ok(path)
}
