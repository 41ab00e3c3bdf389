use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::command::{Command, Outcome, SettingsChange};
use super::data::{PersistedItem, PersistedState, Settings, ShelfItem};
use super::gate::LockGate;
use super::guard::{DragCleanup, DragScope, DropGuard};
use super::persist::StateFile;
use super::store::ShelfStore;
use crate::config::ShelfPaths;
use crate::ingest::allocate::CacheAllocator;
use crate::ingest::classify::{self, Route};
use crate::ingest::clipboard::PastedImage;
use crate::ingest::fetch::{FetchFailure, FetchJob, FetchOutcome, FetchRegistry};
use crate::ingest::{materialize, uri_list};

/// What the shelf is busy with, for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Downloading,
    Downloaded,
    AddedToCsv,
}

/// The shelf: items, settings and everything that mutates them.
///
/// Owned by the UI and only ever touched from the foreground. Background
/// downloads hand their results back through `complete_fetch`.
pub struct Shelf {
    store: ShelfStore,
    settings: Settings,
    gate: LockGate,
    guard: DropGuard,
    allocator: CacheAllocator,
    fetches: FetchRegistry,
    state_file: StateFile,
    activity: Activity,
    /// uri-list of the running drag, published only if it leaves the window
    drag_payload: Option<String>,
}

impl Shelf {
    /// Restore the shelf from its state file. Items whose files have
    /// disappeared are silently left out.
    pub fn open(paths: &ShelfPaths) -> Self {
        let state_file = StateFile::new(paths.state_file.clone());
        let persisted = state_file.load();

        let mut store = ShelfStore::new();
        for item in persisted.items {
            store.insert(ShelfItem::new(item.path).pinned(item.pinned));
        }

        info!(
            "📦 Shelf restored with {} items from {}",
            store.len(),
            state_file.path().display()
        );

        Shelf {
            store,
            settings: persisted.settings,
            gate: LockGate::new(),
            guard: DropGuard::new(),
            allocator: CacheAllocator::new(paths.cache_dir.clone()),
            fetches: FetchRegistry::new(),
            state_file,
            activity: Activity::Idle,
            drag_payload: None,
        }
    }

    pub fn items(&self) -> &[ShelfItem] {
        self.store.items()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn cache_dir(&self) -> &Path {
        self.allocator.dir()
    }

    pub fn pending_fetches(&self) -> usize {
        self.fetches.len()
    }

    /// Toggle lock mode; returns true if now locked
    pub fn toggle_lock(&mut self) -> bool {
        let locked = self.gate.toggle();
        info!("🔒 Lock mode {}", if locked { "on" } else { "off" });
        locked
    }

    /// Run a command through the lock gate.
    ///
    /// Drops are checked against the self-drop guard before anything
    /// else: a drop that ends our own drag-out is swallowed whole.
    pub fn execute(&mut self, command: Command) -> Outcome {
        if command.is_drop() && self.guard.observe_drop() {
            debug!("Drop is our own drag coming back; ignoring");
            return Outcome::SelfDrop;
        }

        if command.requires_unlocked() && !self.gate.can_mutate() {
            debug!("Shelf is locked; rejecting command");
            return Outcome::Rejected;
        }

        match command {
            Command::Ingest { payload, .. } => self.ingest(&payload),
            Command::DropFiles(paths) | Command::AddPaths(paths) => self.add_paths(paths),
            Command::PasteImage(image) => self.paste_image(image),
            Command::Remove(path) => self.remove(&path),
            Command::ClearAll => self.clear_all(),
            Command::TogglePin(path) => self.toggle_pin(&path),
            Command::ClearCache => self.clear_cache(),
            Command::UpdateSettings(change) => self.update_settings(change),
        }
    }

    /// Route every token of a payload, flushing once at the end
    fn ingest(&mut self, payload: &str) -> Outcome {
        let mut changed = false;
        let mut fetches = Vec::new();

        for token in classify::tokens(payload) {
            let route = classify::classify(&token, &self.settings);
            changed |= self.apply_route(route, &mut fetches);
        }

        if changed {
            self.flush();
        }
        Outcome::Applied { changed, fetches }
    }

    /// Carry out one routing decision. Returns true if the store gained an item.
    fn apply_route(&mut self, route: Route, fetches: &mut Vec<FetchJob>) -> bool {
        match route {
            Route::Discard => {
                debug!("Inline image ignored: image downloads are off");
                false
            }
            Route::AddLocal(path) => {
                debug!("Referencing local file {}", path.display());
                self.store.add(path)
            }
            Route::InlineImage { filename, data_uri } => {
                match materialize::save_inline_image(&mut self.allocator, &data_uri, &filename) {
                    Ok(path) => self.store.add(path),
                    Err(e) => {
                        warn!("Could not save inline image: {}", e);
                        false
                    }
                }
            }
            Route::SaveText { content, filename } => {
                match materialize::save_text(&mut self.allocator, &content, filename) {
                    Ok(path) => self.store.add(path),
                    Err(e) => {
                        warn!("Could not save text: {}", e);
                        false
                    }
                }
            }
            Route::AppendCsv(text) => match materialize::append_csv(self.allocator.dir(), &text) {
                Ok(path) => {
                    if self.activity != Activity::Downloading {
                        self.activity = Activity::AddedToCsv;
                    }
                    self.store.add(path)
                }
                Err(e) => {
                    warn!("Could not append to CSV: {}", e);
                    false
                }
            },
            Route::Fetch { url, filename } => {
                if self.fetches.is_in_flight(&url) {
                    debug!("Already downloading {}", url);
                    return false;
                }
                let destination = self.allocator.allocate(&filename);
                if let Some(job) = self.fetches.submit(&url, destination) {
                    info!("⬇️  Downloading {} -> {}", job.url, job.destination.display());
                    self.activity = Activity::Downloading;
                    fetches.push(job);
                }
                false
            }
        }
    }

    fn paste_image(&mut self, image: PastedImage) -> Outcome {
        let changed = match materialize::save_png(&mut self.allocator, image) {
            Ok(path) => {
                info!("📋 Pasted image saved to {}", path.display());
                self.store.add(path)
            }
            Err(e) => {
                warn!("Could not save pasted image: {}", e);
                false
            }
        };

        if changed {
            self.flush();
        }
        Outcome::Applied {
            changed,
            fetches: Vec::new(),
        }
    }

    /// Reference files in place. Paths arrive as the OS handed them
    /// over and are never turned into text on the way.
    fn add_paths(&mut self, paths: Vec<PathBuf>) -> Outcome {
        let mut changed = false;
        for path in paths {
            if path.exists() {
                changed |= self.store.add(path);
            } else {
                warn!("Skipping missing file {}", path.display());
            }
        }

        if changed {
            self.flush();
        }
        Outcome::Applied {
            changed,
            fetches: Vec::new(),
        }
    }

    /// Explicit delete: ignores the pin flag and deletes cache-backed files
    fn remove(&mut self, path: &Path) -> Outcome {
        let Some(item) = self.store.take(path) else {
            return Outcome::unchanged();
        };

        self.flush();
        self.discard_backing_file(&item);
        Outcome::Applied {
            changed: true,
            fetches: Vec::new(),
        }
    }

    fn clear_all(&mut self) -> Outcome {
        let removed = self.store.drain_unpinned();
        if removed.is_empty() {
            return Outcome::unchanged();
        }

        self.flush();
        for item in &removed {
            self.discard_backing_file(item);
        }
        info!("🧹 Cleared {} items", removed.len());
        Outcome::Applied {
            changed: true,
            fetches: Vec::new(),
        }
    }

    fn toggle_pin(&mut self, path: &Path) -> Outcome {
        match self.store.toggle_pin(path) {
            Some(_) => {
                self.flush();
                Outcome::Applied {
                    changed: true,
                    fetches: Vec::new(),
                }
            }
            None => Outcome::unchanged(),
        }
    }

    /// Delete every file in the cache directory and empty the shelf
    fn clear_cache(&mut self) -> Outcome {
        let cancelled = self.fetches.cancel_all();
        if cancelled > 0 {
            self.activity = Activity::Idle;
        }

        let mut deleted = 0;
        for entry in WalkDir::new(self.allocator.dir())
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path == self.state_file.path() {
                continue;
            }
            let result = if entry.file_type().is_dir() {
                fs::remove_dir(path)
            } else {
                fs::remove_file(path)
            };
            match result {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Could not delete {}: {}", path.display(), e),
            }
        }

        let removed = self.store.clear();
        self.allocator.reset();
        self.flush();
        info!("🧹 Cache cleared: {} entries deleted, {} items dropped", deleted, removed.len());

        Outcome::Applied {
            changed: !removed.is_empty(),
            fetches: Vec::new(),
        }
    }

    fn update_settings(&mut self, change: SettingsChange) -> Outcome {
        match change {
            SettingsChange::DownloadImages(on) => self.settings.download_images = on,
            SettingsChange::CsvMode(on) => self.settings.csv_mode = on,
            SettingsChange::Opacity(opacity) => self.settings.opacity = opacity,
        }
        self.settings = self.settings.sanitized();
        self.flush();
        Outcome::unchanged()
    }

    /// Start a drag-out gesture and return its `text/uri-list` payload
    pub fn begin_drag(&mut self, scope: DragScope) -> String {
        let payload = match &scope {
            DragScope::Single(path) => uri_list::encode([path.as_path()]),
            DragScope::All => uri_list::encode(self.store.iter().map(|item| item.path.as_path())),
        };
        self.guard.begin(scope);
        self.drag_payload = Some(payload.clone());
        payload
    }

    pub fn is_dragging(&self) -> bool {
        self.guard.is_dragging()
    }

    /// The running drag was released over this shelf
    pub fn observe_drop(&mut self) -> bool {
        self.guard.observe_drop()
    }

    /// Finish a drag-out gesture. Unless the drag came back to this
    /// shelf, the dragged items are taken off the shelf (pinned ones
    /// stay). Their files are left alone: the drop target has them by
    /// reference. Returns how many items were removed.
    pub fn end_drag(&mut self) -> usize {
        self.drag_payload = None;
        let cleanup = self.guard.end();
        if cleanup == DragCleanup::Nothing {
            return 0;
        }
        if !self.gate.can_mutate() {
            debug!("Shelf is locked; keeping dragged items");
            return 0;
        }

        let removed = match cleanup {
            DragCleanup::One(path) => {
                let pinned = self
                    .store
                    .position(&path)
                    .and_then(|index| self.store.get(index))
                    .map(|item| item.pinned);
                match pinned {
                    Some(false) => self.store.take(&path).map_or(0, |_| 1),
                    _ => 0,
                }
            }
            DragCleanup::AllUnpinned => self.store.drain_unpinned().len(),
            DragCleanup::Nothing => 0,
        };

        if removed > 0 {
            self.flush();
        }
        removed
    }

    /// The running drag left the window: finish it as a drag-out and
    /// return the uri-list for the receiving application. None when no
    /// drag is running.
    pub fn drag_out(&mut self) -> Option<String> {
        if !self.guard.is_dragging() {
            return None;
        }
        let payload = self.drag_payload.take();
        let moved = self.end_drag();
        info!("📤 Dragged {} items out of the shelf", moved);
        payload
    }

    /// Apply a finished download. Only registered, successful downloads
    /// reach the store; anything else is logged and its file removed.
    pub fn complete_fetch(&mut self, outcome: FetchOutcome) -> bool {
        let registered = self.fetches.finish(&outcome);
        if self.fetches.is_empty() && self.activity == Activity::Downloading {
            self.activity = Activity::Idle;
        }

        match outcome.result {
            Ok(bytes) if registered && self.gate.can_mutate() => {
                info!("✅ Downloaded {} ({} bytes)", outcome.url, bytes);
                self.activity = Activity::Downloaded;
                let added = self.store.add(outcome.destination);
                if added {
                    self.flush();
                }
                added
            }
            Ok(_) => {
                debug!("Discarding download of {}", outcome.url);
                match fs::remove_file(&outcome.destination) {
                    Ok(()) => self.allocator.release(&outcome.destination),
                    Err(e) => debug!("Could not remove {}: {}", outcome.destination.display(), e),
                }
                false
            }
            Err(FetchFailure::Cancelled) => {
                debug!("Download of {} cancelled", outcome.url);
                self.allocator.release(&outcome.destination);
                false
            }
            Err(FetchFailure::Failed(reason)) => {
                warn!("Download of {} failed: {}", outcome.url, reason);
                self.allocator.release(&outcome.destination);
                false
            }
        }
    }

    /// Drop a transient status once it has been shown long enough
    pub fn settle_activity(&mut self) {
        self.activity = if self.fetches.is_empty() {
            Activity::Idle
        } else {
            Activity::Downloading
        };
    }

    /// Cancel outstanding downloads and write the final snapshot
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.fetches.cancel_all();
        if cancelled > 0 {
            info!("Cancelled {} pending downloads", cancelled);
        }
        self.activity = Activity::Idle;
        self.flush();
        cancelled
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            items: self.store.iter().map(PersistedItem::from).collect(),
            settings: self.settings,
        }
    }

    /// Write-through save; failures are logged and otherwise ignored
    fn flush(&self) {
        if let Err(e) = self.state_file.save(&self.snapshot()) {
            warn!("Could not save shelf state: {}", e);
        }
    }

    /// Delete the file behind a removed item if the shelf created it.
    /// Files the user dropped by reference are never touched.
    fn discard_backing_file(&mut self, item: &ShelfItem) {
        if !self.allocator.owns(&item.path) {
            return;
        }
        match fs::remove_file(&item.path) {
            Ok(()) => info!("🗑️  Deleted cache file: {}", item.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!("Failed to delete file {}: {}", item.path.display(), e);
                return;
            }
        }
        self.allocator.release(&item.path);
    }
}

impl std::fmt::Debug for Shelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shelf")
            .field("items", &self.store.len())
            .field("locked", &self.gate.is_locked())
            .field("cache_dir", &self.allocator.dir())
            .field("state_file", &self.state_file.path())
            .field("writes", &self.state_file.writes())
            .finish()
    }
}
