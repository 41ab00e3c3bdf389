/// Ingestion pipeline
///
/// This module turns dropped or pasted payloads into files on the shelf:
/// - Cache path allocation (allocate.rs)
/// - Images pasted from the system clipboard (clipboard.rs)
/// - Token classification and routing (classify.rs)
/// - Writing text, CSV records and inline images (materialize.rs)
/// - Background downloads of image URLs (fetch.rs)
/// - `text/uri-list` parsing and encoding (uri_list.rs)

pub mod allocate;
pub mod clipboard;
pub mod classify;
pub mod fetch;
pub mod materialize;
pub mod uri_list;
