use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

use super::uri_list;
use crate::state::data::{Settings, IMAGE_EXTENSIONS};

/// Name used when a remote image URL has no usable basename
pub const FALLBACK_DOWNLOAD_NAME: &str = "downloaded_image.jpg";
/// Name for links saved as standalone text files
pub const LINK_FILE_NAME: &str = "saved_link.txt";
/// Name for dropped or pasted plain text
pub const TEXT_FILE_NAME: &str = "dragged_text.txt";
/// Base name for decoded inline images
pub const INLINE_IMAGE_BASE: &str = "dropped_image";

/// What to do with one token of a drop/paste payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Inline image with downloads disabled: drop it on the floor
    Discard,
    /// `data:image/...;base64,...` to decode into the cache
    InlineImage { filename: String, data_uri: String },
    /// Remote image to download in the background
    Fetch { url: String, filename: String },
    /// Append as one record of `collected.csv`
    AppendCsv(String),
    /// Write into a new text file in the cache
    SaveText { content: String, filename: &'static str },
    /// Existing local file, referenced in place
    AddLocal(PathBuf),
}

/// Split a payload into tokens: one per non-blank line, trimmed, NULs removed
pub fn tokens(payload: &str) -> impl Iterator<Item = String> + '_ {
    payload
        .lines()
        .map(|line| line.replace('\0', "").trim().to_string())
        .filter(|line| !line.is_empty())
}

/// Decide the route for a single token. Checks are made in priority
/// order: inline image, web URL, existing local file, plain text.
pub fn classify(token: &str, settings: &Settings) -> Route {
    if token.starts_with("data:image") {
        if !settings.download_images {
            return Route::Discard;
        }
        return Route::InlineImage {
            filename: format!("{}.{}", INLINE_IMAGE_BASE, inline_image_extension(token)),
            data_uri: token.to_string(),
        };
    }

    if is_web_url(token) {
        if settings.download_images && is_image_url(token) {
            return Route::Fetch {
                url: token.to_string(),
                filename: download_filename(token),
            };
        }
        return text_route(token, LINK_FILE_NAME, settings);
    }

    if let Some(path) = local_path(token) {
        if path.exists() {
            return Route::AddLocal(path);
        }
    }

    text_route(token, TEXT_FILE_NAME, settings)
}

fn text_route(token: &str, filename: &'static str, settings: &Settings) -> Route {
    if settings.csv_mode {
        Route::AppendCsv(token.to_string())
    } else {
        Route::SaveText {
            content: token.to_string(),
            filename,
        }
    }
}

/// Extension for an inline image, from the MIME subtype in its header
fn inline_image_extension(data_uri: &str) -> &'static str {
    let header = data_uri.split(',').next().unwrap_or_default().to_ascii_lowercase();
    if header.contains("webp") {
        "webp"
    } else if header.contains("jpeg") || header.contains("jpg") {
        "jpg"
    } else {
        "png"
    }
}

fn is_web_url(token: &str) -> bool {
    let lower = token.get(..8).unwrap_or(token).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Path component of a URL: everything after the authority, without
/// query or fragment
fn url_path(url: &str) -> &str {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let without_suffix = after_scheme
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    match without_suffix.find('/') {
        Some(slash) => &without_suffix[slash..],
        None => "",
    }
}

fn is_image_url(url: &str) -> bool {
    let path = url_path(url).to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(&format!(".{}", ext)))
}

/// Destination name for a download: the URL's percent-decoded basename,
/// or a generic name when it is missing or has no extension
pub fn download_filename(url: &str) -> String {
    let basename = url_path(url).rsplit('/').next().unwrap_or_default();
    let decoded = percent_decode_str(basename).decode_utf8_lossy();
    let name = decoded.replace(['/', '\\', '\0'], "_");

    if name.len() < 3 || !name.contains('.') || name.trim_matches('.').is_empty() {
        return FALLBACK_DOWNLOAD_NAME.to_string();
    }
    name
}

fn local_path(token: &str) -> Option<PathBuf> {
    if token.starts_with("file://") {
        return uri_list::parse_file_uri(token);
    }
    let path = Path::new(token);
    path.is_absolute().then(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn settings(download_images: bool, csv_mode: bool) -> Settings {
        Settings {
            download_images,
            csv_mode,
            ..Settings::default()
        }
    }

    #[test]
    fn test_tokens_split_and_clean() {
        let payload = "  file:///tmp/a.txt \r\n\n\0hello\0\r\n   \n";
        let tokens: Vec<String> = tokens(payload).collect();
        assert_eq!(tokens, vec!["file:///tmp/a.txt", "hello"]);
    }

    #[test]
    fn test_image_url_is_fetched() {
        let route = classify("https://example.com/pic.JPG?x=1", &settings(true, false));
        assert_eq!(
            route,
            Route::Fetch {
                url: "https://example.com/pic.JPG?x=1".to_string(),
                filename: "pic.JPG".to_string(),
            }
        );
    }

    #[test]
    fn test_image_url_in_csv_mode_is_only_fetched() {
        let route = classify("http://example.com/a/b.webp", &settings(true, true));
        assert!(matches!(route, Route::Fetch { .. }));
    }

    #[test]
    fn test_image_url_without_downloads_becomes_link() {
        let url = "https://example.com/pic.png";
        assert_eq!(
            classify(url, &settings(false, false)),
            Route::SaveText { content: url.to_string(), filename: LINK_FILE_NAME }
        );
        assert_eq!(classify(url, &settings(false, true)), Route::AppendCsv(url.to_string()));
    }

    #[test]
    fn test_page_url_becomes_link() {
        let url = "https://example.com/article?id=4.png";
        assert_eq!(
            classify(url, &settings(true, false)),
            Route::SaveText { content: url.to_string(), filename: LINK_FILE_NAME }
        );
    }

    #[test]
    fn test_inline_image_extension_from_mime() {
        let s = settings(true, false);
        let name = |token: &str| match classify(token, &s) {
            Route::InlineImage { filename, .. } => filename,
            other => panic!("unexpected route {:?}", other),
        };

        assert_eq!(name("data:image/jpeg;base64,AAAA"), "dropped_image.jpg");
        assert_eq!(name("data:image/webp;base64,AAAA"), "dropped_image.webp");
        assert_eq!(name("data:image/png;base64,AAAA"), "dropped_image.png");
        assert_eq!(name("data:image/gif;base64,AAAA"), "dropped_image.png");
    }

    #[test]
    fn test_inline_image_discarded_without_downloads() {
        assert_eq!(
            classify("data:image/jpeg;base64,/9j/4AAQ", &settings(false, true)),
            Route::Discard
        );
    }

    #[test]
    fn test_existing_local_path_and_uri() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("report final.pdf");
        fs::write(&file, b"pdf").unwrap();
        let s = settings(true, true);

        assert_eq!(classify(file.to_str().unwrap(), &s), Route::AddLocal(file.clone()));
        assert_eq!(classify(&uri_list::file_uri(&file), &s), Route::AddLocal(file));
    }

    #[test]
    fn test_missing_local_path_falls_back_to_text() {
        let token = "/definitely/not/here.txt";
        assert_eq!(
            classify(token, &settings(true, false)),
            Route::SaveText { content: token.to_string(), filename: TEXT_FILE_NAME }
        );
        assert_eq!(classify(token, &settings(true, true)), Route::AppendCsv(token.to_string()));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            classify("hello world", &settings(true, true)),
            Route::AppendCsv("hello world".to_string())
        );
        assert_eq!(
            classify("httpish but not a url", &settings(true, false)),
            Route::SaveText { content: "httpish but not a url".to_string(), filename: TEXT_FILE_NAME }
        );
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(download_filename("https://e.com/dir/my%20pic.png"), "my pic.png");
        assert_eq!(download_filename("https://e.com/img/a.gif#frag"), "a.gif");
        assert_eq!(download_filename("https://e.com/"), FALLBACK_DOWNLOAD_NAME);
        assert_eq!(download_filename("https://e.com"), FALLBACK_DOWNLOAD_NAME);
        assert_eq!(download_filename("https://e.com/photo"), FALLBACK_DOWNLOAD_NAME);
        assert_eq!(download_filename("https://e.com/x%2F..%2Fy.png"), "x_.._y.png");
    }
}
