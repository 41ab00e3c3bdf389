/// State management module
///
/// This module handles all shelf state, including:
/// - Shared data structures (data.rs)
/// - The ordered, deduplicated item store (store.rs)
/// - Writing and restoring the JSON snapshot (persist.rs)
/// - Lock mode (gate.rs) and the command pipeline it guards (command.rs)
/// - Telling our own drag-outs apart from real drops (guard.rs)
/// - The shelf that ties all of the above together (shelf.rs)

pub mod command;
pub mod data;
pub mod gate;
pub mod guard;
pub mod persist;
pub mod shelf;
pub mod store;
