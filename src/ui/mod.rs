/// View helpers for the shelf window
///
/// - One row per shelf item (row.rs)
/// - The status line text (status.rs)

pub mod row;
pub mod status;
