/// Mutating operations on the shelf, and what came of them
use std::path::PathBuf;

use crate::ingest::clipboard::PastedImage;
use crate::ingest::fetch::FetchJob;

/// Where an ingestion payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Drag-and-drop onto the window; subject to the self-drop guard
    Drop,
    /// Clipboard paste
    Paste,
}

/// A single settings toggle from the UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    DownloadImages(bool),
    CsvMode(bool),
    Opacity(f32),
}

/// Every mutation the shelf accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Newline-separated tokens: URIs, paths, data: URIs or plain text
    Ingest { payload: String, source: Source },
    /// Files dropped onto the window, as the OS handed them over;
    /// subject to the self-drop guard
    DropFiles(Vec<PathBuf>),
    /// Paths picked from the file dialog
    AddPaths(Vec<PathBuf>),
    /// RGBA pixels read from the clipboard
    PasteImage(PastedImage),
    /// Explicit delete; ignores the pin flag
    Remove(PathBuf),
    /// Remove everything that isn't pinned
    ClearAll,
    TogglePin(PathBuf),
    /// Wipe the cache directory and empty the shelf
    ClearCache,
    UpdateSettings(SettingsChange),
}

impl Command {
    /// Whether lock mode vetoes this command.
    ///
    /// Pinning and settings stay available while locked: neither adds
    /// nor removes items.
    pub fn requires_unlocked(&self) -> bool {
        !matches!(self, Command::TogglePin(_) | Command::UpdateSettings(_))
    }

    /// Whether this command is a drop onto the window
    pub fn is_drop(&self) -> bool {
        matches!(
            self,
            Command::DropFiles(_) | Command::Ingest { source: Source::Drop, .. }
        )
    }
}

/// Result of executing a command
#[derive(Debug)]
pub enum Outcome {
    /// Vetoed by lock mode; nothing happened
    Rejected,
    /// A drop that was the tail of our own drag-out; swallowed
    SelfDrop,
    Applied {
        /// Store contents changed (and were flushed)
        changed: bool,
        /// Downloads the caller must run in the background
        fetches: Vec<FetchJob>,
    },
}

impl Outcome {
    pub fn unchanged() -> Self {
        Outcome::Applied {
            changed: false,
            fetches: Vec::new(),
        }
    }

    /// What to report back to the toolkit's drop handler
    pub fn accepts_drop(&self) -> bool {
        !matches!(self, Outcome::Rejected)
    }

    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Applied { changed: true, .. })
    }

    /// Take the pending downloads out of the outcome
    pub fn into_fetches(self) -> Vec<FetchJob> {
        match self {
            Outcome::Applied { fetches, .. } => fetches,
            _ => Vec::new(),
        }
    }
}
