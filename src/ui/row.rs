use iced::widget::{button, container, image, mouse_area, row, text};
use iced::{Alignment, Element, Length, Theme};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::state::data::{ContentKind, ShelfItem};
use crate::Message;

/// Edge length of the preview square at the start of a row
const PREVIEW_SIZE: f32 = 32.0;

/// Two presses on the same row within this window open the item
pub const DOUBLE_PRESS: Duration = Duration::from_millis(400);

/// Remembers the last row press so a second one can be told apart
/// from the start of a new drag
#[derive(Debug, Default)]
pub struct PressTracker {
    last: Option<(PathBuf, Instant)>,
}

impl PressTracker {
    /// Record a press; returns true if it completes a double press
    pub fn press(&mut self, path: &Path, now: Instant) -> bool {
        let double = matches!(
            &self.last,
            Some((last, at)) if last == path && now.saturating_duration_since(*at) <= DOUBLE_PRESS
        );
        self.last = if double {
            None
        } else {
            Some((path.to_path_buf(), now))
        };
        double
    }
}

/// Short label drawn when there is no thumbnail
fn kind_badge(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Spreadsheet => "CSV",
        ContentKind::Image => "IMG",
        ContentKind::Text => "TXT",
        ContentKind::Generic => "FILE",
    }
}

/// One shelf entry: preview, name, pin and delete buttons.
///
/// Pressing on the preview or name starts a drag-out gesture.
pub fn item_row<'a>(
    item: &'a ShelfItem,
    thumbnail: Option<&'a image::Handle>,
    selected: bool,
) -> Element<'a, Message> {
    let preview: Element<'a, Message> = match thumbnail {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(PREVIEW_SIZE))
            .height(Length::Fixed(PREVIEW_SIZE))
            .into(),
        None => container(text(kind_badge(item.kind)).size(11))
            .center_x(Length::Fixed(PREVIEW_SIZE))
            .center_y(Length::Fixed(PREVIEW_SIZE))
            .into(),
    };

    let grab = mouse_area(
        row![preview, text(&item.filename).width(Length::Fill)]
            .spacing(12)
            .align_y(Alignment::Center),
    )
    .on_press(Message::DragStarted(item.path.clone()));

    let pin = button(text(if item.pinned { "Unpin" } else { "Pin" }).size(12))
        .on_press(Message::TogglePin(item.path.clone()))
        .style(button::text);

    let delete = button(text("Delete").size(12))
        .on_press(Message::Remove(item.path.clone()))
        .style(button::text);

    let style: fn(&Theme) -> container::Style = if selected {
        container::rounded_box
    } else {
        container::transparent
    };

    container(
        row![grab, pin, delete]
            .spacing(8)
            .align_y(Alignment::Center),
    )
    .padding([8, 12])
    .width(Length::Fill)
    .style(style)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_press_on_same_row() {
        let mut presses = PressTracker::default();
        let start = Instant::now();
        let row = Path::new("/tmp/a.txt");

        assert!(!presses.press(row, start));
        assert!(presses.press(row, start + Duration::from_millis(150)));
        // A third press starts over
        assert!(!presses.press(row, start + Duration::from_millis(300)));
    }

    #[test]
    fn test_slow_or_different_presses_are_single() {
        let mut presses = PressTracker::default();
        let start = Instant::now();

        assert!(!presses.press(Path::new("/a"), start));
        assert!(!presses.press(Path::new("/b"), start + Duration::from_millis(100)));
        assert!(!presses.press(Path::new("/b"), start + DOUBLE_PRESS * 2));
    }
}
