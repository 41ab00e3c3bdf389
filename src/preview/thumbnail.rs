use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Edge length of row thumbnails (square)
pub const THUMBNAIL_SIZE: u32 = 48;

/// Square region cut out of a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Largest centred square inside a `width` x `height` image
pub fn square_crop(width: u32, height: u32) -> CropRect {
    let side = width.min(height);
    CropRect {
        x: (width - side) / 2,
        y: (height - side) / 2,
        side,
    }
}

/// Decoded thumbnail pixels, ready to hand to the UI
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major
    pub pixels: Vec<u8>,
}

/// Generate a thumbnail off the UI thread.
/// Returns None if the file can't be decoded as an image.
pub async fn load_thumbnail(path: PathBuf) -> Option<Thumbnail> {
    // Spawn blocking because decoding is CPU-bound
    tokio::task::spawn_blocking(move || load_thumbnail_blocking(&path, THUMBNAIL_SIZE))
        .await
        .ok()
        .flatten()
}

/// Blocking version of thumbnail generation
pub fn load_thumbnail_blocking(path: &Path, size: u32) -> Option<Thumbnail> {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!("No thumbnail for {}: {}", path.display(), e);
            return None;
        }
    };

    let crop = square_crop(img.width(), img.height());
    if crop.side == 0 {
        return None;
    }

    let thumbnail = img
        .crop_imm(crop.x, crop.y, crop.side, crop.side)
        .resize_exact(size, size, FilterType::Lanczos3)
        .to_rgba8();

    Some(Thumbnail {
        width: thumbnail.width(),
        height: thumbnail.height(),
        pixels: thumbnail.into_raw(),
    })
}
