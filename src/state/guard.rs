use std::path::PathBuf;

/// What a drag-out gesture carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragScope {
    /// Modifier held: only the grabbed item
    Single(PathBuf),
    /// Every item currently on the shelf
    All,
}

/// What the shelf should remove once a drag-out gesture ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragCleanup {
    /// The items came back to this shelf (or no gesture was running)
    Nothing,
    /// Remove this item unless pinned
    One(PathBuf),
    /// Remove every unpinned item
    AllUnpinned,
}

/// Tells "content leaving and coming back" apart from "content arriving".
///
/// The shelf is both a drag source and a drop target. While one of our
/// own drags is in flight, a drop onto the shelf is the end of that
/// gesture, not new content, and must not trigger the removal that a
/// finished drag-out would otherwise perform.
#[derive(Debug, Default)]
pub struct DropGuard {
    active: Option<DragScope>,
    self_drop: bool,
}

impl DropGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A drag-out gesture started on this shelf
    pub fn begin(&mut self, scope: DragScope) {
        self.active = Some(scope);
        self.self_drop = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// A drop landed on the shelf. Returns true if it is our own drag
    /// coming back and must be swallowed.
    pub fn observe_drop(&mut self) -> bool {
        if self.active.is_some() {
            self.self_drop = true;
        }
        self.self_drop
    }

    /// The drag-out gesture finished; consumes the self-drop flag
    pub fn end(&mut self) -> DragCleanup {
        let scope = self.active.take();
        if std::mem::take(&mut self.self_drop) {
            return DragCleanup::Nothing;
        }

        match scope {
            Some(DragScope::Single(path)) => DragCleanup::One(path),
            Some(DragScope::All) => DragCleanup::AllUnpinned,
            None => DragCleanup::Nothing,
        }
    }
}
