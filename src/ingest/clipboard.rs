/// Reading images from the system clipboard
///
/// iced only exposes clipboard text, so image paste goes through
/// `arboard` on a blocking worker. Encoding to PNG happens later, in
/// `materialize::save_png`, once the shelf has allowed the paste.
use tracing::debug;

/// Raw RGBA8 pixels as handed over by the clipboard
#[derive(Clone, PartialEq, Eq)]
pub struct PastedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for PastedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PastedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Read an image from the clipboard off the UI thread.
/// Returns None when the clipboard holds no image.
pub async fn read_image() -> Option<PastedImage> {
    tokio::task::spawn_blocking(read_image_blocking)
        .await
        .ok()
        .flatten()
}

fn read_image_blocking() -> Option<PastedImage> {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(e) => {
            debug!("Clipboard unavailable: {}", e);
            return None;
        }
    };

    match clipboard.get_image() {
        Ok(image) => Some(PastedImage {
            width: u32::try_from(image.width).ok()?,
            height: u32::try_from(image.height).ok()?,
            rgba: image.bytes.into_owned(),
        }),
        Err(e) => {
            debug!("No image on the clipboard: {}", e);
            None
        }
    }
}
