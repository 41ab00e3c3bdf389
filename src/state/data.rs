/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the shelf, the persistence layer and the UI layer.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions shown with the image icon (and given a thumbnail)
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Icon category for a shelf entry, recomputed from the path on every load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Spreadsheet,
    Image,
    Text,
    Generic,
}

impl ContentKind {
    /// Classify a path by its extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => ContentKind::Spreadsheet,
            "txt" => ContentKind::Text,
            e if IMAGE_EXTENSIONS.contains(&e) => ContentKind::Image,
            _ => ContentKind::Generic,
        }
    }
}

/// Represents a single entry on the shelf
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfItem {
    /// Absolute path; the identity of the item
    pub path: PathBuf,
    /// Basename of `path`, for display
    pub filename: String,
    /// Pinned items survive "clear all" and drag-out cleanup
    pub pinned: bool,
    pub kind: ContentKind,
}

impl ShelfItem {
    pub fn new(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let kind = ContentKind::from_path(&path);

        ShelfItem {
            path,
            filename,
            pinned: false,
            kind,
        }
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }
}

pub const MIN_OPACITY: f32 = 0.2;
pub const MAX_OPACITY: f32 = 1.0;

/// User-toggled behaviour, persisted alongside the items
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Fetch remote image URLs (and decode inline images) instead of
    /// keeping them as link text
    pub download_images: bool,
    /// Append text and links to a single `collected.csv`
    pub csv_mode: bool,
    /// Window opacity in [0.2, 1.0]
    pub opacity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_images: true,
            csv_mode: false,
            opacity: MAX_OPACITY,
        }
    }
}

impl Settings {
    /// Clamp out-of-range values loaded from disk
    pub fn sanitized(mut self) -> Self {
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(MIN_OPACITY, MAX_OPACITY)
        } else {
            MAX_OPACITY
        };
        self
    }
}

/// One item as written to the state file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PersistedItem {
    pub path: PathBuf,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub pinned: bool,
}

impl From<&ShelfItem> for PersistedItem {
    fn from(item: &ShelfItem) -> Self {
        PersistedItem {
            path: item.path.clone(),
            filename: item.filename.clone(),
            pinned: item.pinned,
        }
    }
}

/// The on-disk snapshot: `{ "items": [...], "settings": {...} }`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub items: Vec<PersistedItem>,
    pub settings: Settings,
}
