use crate::state::shelf::Activity;

/// Text for the bottom status line.
///
/// Lock mode wins over everything; a running download wins over the
/// drag mode hint.
pub fn status_text(locked: bool, single_mode: bool, activity: Activity) -> &'static str {
    if locked {
        return "Locked (Read-Only)";
    }

    match activity {
        Activity::Downloading => "Downloading...",
        Activity::Downloaded => "Downloaded!",
        Activity::AddedToCsv => "Added to CSV",
        Activity::Idle if single_mode => "Single Mode (Drag One)",
        Activity::Idle => "Batch Mode (Drag All)",
    }
}
