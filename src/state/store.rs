use std::path::{Path, PathBuf};

use super::data::ShelfItem;

/// Ordered, deduplicated collection of shelf items.
///
/// Insertion order is display order. At most one item exists per path;
/// the store itself knows nothing about locking or the disk, the shelf
/// layers both on top.
#[derive(Debug, Default, Clone)]
pub struct ShelfStore {
    items: Vec<ShelfItem>,
}

impl ShelfStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path. Returns false if an item with that path is already present.
    pub fn add(&mut self, path: PathBuf) -> bool {
        self.insert(ShelfItem::new(path))
    }

    /// Insert a prepared item (used when restoring pinned items).
    /// The later duplicate is discarded, never merged.
    pub fn insert(&mut self, item: ShelfItem) -> bool {
        if self.position(&item.path).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.items.iter().position(|item| item.path == path)
    }

    pub fn get(&self, index: usize) -> Option<&ShelfItem> {
        self.items.get(index)
    }

    /// Remove the item with this path, returning it
    pub fn take(&mut self, path: &Path) -> Option<ShelfItem> {
        let index = self.position(path)?;
        Some(self.items.remove(index))
    }

    /// Flip the pin flag; returns the new value
    pub fn toggle_pin(&mut self, path: &Path) -> Option<bool> {
        let index = self.position(path)?;
        let item = &mut self.items[index];
        item.pinned = !item.pinned;
        Some(item.pinned)
    }

    /// Remove every unpinned item, walking from the back so earlier
    /// indices stay valid. Removed items are returned in removal order.
    pub fn drain_unpinned(&mut self) -> Vec<ShelfItem> {
        let mut removed = Vec::new();
        for index in (0..self.items.len()).rev() {
            if !self.items[index].pinned {
                removed.push(self.items.remove(index));
            }
        }
        removed
    }

    /// Remove everything, pinned or not
    pub fn clear(&mut self) -> Vec<ShelfItem> {
        std::mem::take(&mut self.items)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShelfItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[ShelfItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
