/// Lock mode: a single read-only switch for the whole shelf.
///
/// The shelf asks `can_mutate()` once per command instead of every
/// mutation site checking the flag on its own.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LockGate {
    locked: bool,
}

impl LockGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_mutate(&self) -> bool {
        !self.locked
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Flip lock mode; returns the new state
    pub fn toggle(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }
}
