/// Writing dropped content into the cache directory
///
/// Each function returns the path of the file that should appear on the
/// shelf. Callers decide what to do with a failure (the shelf logs and
/// moves on).
use base64::{engine::general_purpose, Engine as _};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::allocate::CacheAllocator;
use super::clipboard::PastedImage;
use crate::error::{Result, ShelfError};

/// The single accumulation file for CSV mode
pub const CSV_FILE_NAME: &str = "collected.csv";

/// Name given to images pasted from the clipboard
pub const PASTED_IMAGE_NAME: &str = "pasted_image.png";

/// Save text into a freshly allocated file
pub fn save_text(allocator: &mut CacheAllocator, content: &str, filename: &str) -> Result<PathBuf> {
    let path = allocator.allocate(filename);
    fs::write(&path, content).map_err(|e| ShelfError::io(&path, e))?;
    Ok(path)
}

/// Decode a `data:image/...;base64,...` URI into a freshly allocated file.
///
/// Decoding happens before allocation, so a bad payload never leaves
/// an empty file behind.
pub fn save_inline_image(
    allocator: &mut CacheAllocator,
    data_uri: &str,
    filename: &str,
) -> Result<PathBuf> {
    let bytes = decode_data_uri(data_uri)?;
    let path = allocator.allocate(filename);
    fs::write(&path, bytes).map_err(|e| ShelfError::io(&path, e))?;
    Ok(path)
}

/// Encode clipboard pixels as PNG into a freshly allocated file.
///
/// The buffer is validated before allocation; a failed write releases
/// the allocated path again.
pub fn save_png(allocator: &mut CacheAllocator, pasted: PastedImage) -> Result<PathBuf> {
    let PastedImage { width, height, rgba } = pasted;
    let len = rgba.len();
    let buffer = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or(ShelfError::PixelBuffer { width, height, len })?;

    let path = allocator.allocate(PASTED_IMAGE_NAME);
    if let Err(e) = buffer.save_with_format(&path, image::ImageFormat::Png) {
        allocator.release(&path);
        let _ = fs::remove_file(&path);
        return Err(e.into());
    }
    Ok(path)
}

fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>> {
    let (_header, encoded) = data_uri.split_once(',').ok_or(ShelfError::MalformedDataUri)?;
    let encoded: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(general_purpose::STANDARD.decode(encoded)?)
}

/// Append one record to `collected.csv` and return its path
pub fn append_csv(cache_dir: &Path, text: &str) -> Result<PathBuf> {
    let path = cache_dir.join(CSV_FILE_NAME);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| ShelfError::io(&path, e))?;

    file.write_all(csv_record(text).as_bytes())
        .map_err(|e| ShelfError::io(&path, e))?;
    Ok(path)
}

/// One quoted, newline-terminated CSV line. Line breaks collapse to
/// spaces; embedded quotes are doubled.
pub fn csv_record(text: &str) -> String {
    let flattened = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    format!("\"{}\"\n", flattened.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_png_writes_decodable_image() {
        let tmp = tempfile::tempdir().unwrap();
        let mut allocator = CacheAllocator::new(tmp.path().to_path_buf());
        let pasted = PastedImage {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
        };

        let path = save_png(&mut allocator, pasted).unwrap();

        assert_eq!(path, tmp.path().join(PASTED_IMAGE_NAME));
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_save_png_rejects_short_buffer() {
        let tmp = tempfile::tempdir().unwrap();
        let mut allocator = CacheAllocator::new(tmp.path().to_path_buf());
        let pasted = PastedImage {
            width: 4,
            height: 4,
            rgba: vec![0; 10],
        };

        assert!(matches!(
            save_png(&mut allocator, pasted),
            Err(ShelfError::PixelBuffer { len: 10, .. })
        ));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_csv_record() {
        assert_eq!(csv_record("hello world"), "\"hello world\"\n");
        assert_eq!(csv_record("a\nb\r\nc"), "\"a b c\"\n");
        assert_eq!(csv_record("say \"hi\""), "\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_append_csv_accumulates() {
        let tmp = tempfile::tempdir().unwrap();

        let first = append_csv(tmp.path(), "hello world").unwrap();
        let second = append_csv(tmp.path(), "https://example.com").unwrap();

        assert_eq!(first, second);
        assert_eq!(first, tmp.path().join(CSV_FILE_NAME));
        assert_eq!(
            fs::read_to_string(&first).unwrap(),
            "\"hello world\"\n\"https://example.com\"\n"
        );
    }

    #[test]
    fn test_save_text_never_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let mut allocator = CacheAllocator::new(tmp.path().to_path_buf());

        let a = save_text(&mut allocator, "one", "dragged_text.txt").unwrap();
        let b = save_text(&mut allocator, "two", "dragged_text.txt").unwrap();

        assert_eq!(b, tmp.path().join("dragged_text_1.txt"));
        assert_eq!(fs::read_to_string(a).unwrap(), "one");
        assert_eq!(fs::read_to_string(b).unwrap(), "two");
    }

    #[test]
    fn test_save_inline_image() {
        let tmp = tempfile::tempdir().unwrap();
        let mut allocator = CacheAllocator::new(tmp.path().to_path_buf());
        let payload = general_purpose::STANDARD.encode(b"\x89PNG fake");

        let path = save_inline_image(
            &mut allocator,
            &format!("data:image/png;base64,{}", payload),
            "dropped_image.png",
        )
        .unwrap();

        assert_eq!(fs::read(path).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn test_bad_inline_image_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut allocator = CacheAllocator::new(tmp.path().to_path_buf());

        let no_comma = save_inline_image(&mut allocator, "data:image/png;base64", "x.png");
        let not_base64 = save_inline_image(&mut allocator, "data:image/png;base64,!!!", "x.png");

        assert!(matches!(no_comma, Err(ShelfError::MalformedDataUri)));
        assert!(matches!(not_base64, Err(ShelfError::Decode(_))));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
