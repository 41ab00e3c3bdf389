/// `text/uri-list` helpers: reading `file://` tokens from drops and
/// producing the payload for drags out of the shelf
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};

/// Characters left as-is in a `file://` path
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Resolve a `file://` URI to a local path.
///
/// Accepts an empty host or `localhost`; any other host is not local.
pub fn parse_file_uri(token: &str) -> Option<PathBuf> {
    let rest = token.strip_prefix("file://")?;
    let path = match rest.find('/') {
        Some(0) => rest,
        Some(slash) if &rest[..slash] == "localhost" => &rest[slash..],
        _ => return None,
    };

    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(PathBuf::from(decoded.into_owned()))
}

/// Build a `file://` URI for a local path
pub fn file_uri(path: &Path) -> String {
    format!(
        "file://{}",
        utf8_percent_encode(&path.to_string_lossy(), PATH_SEGMENT)
    )
}

/// Encode paths as a `text/uri-list` body, one CRLF-terminated URI each
pub fn encode<'a>(paths: impl IntoIterator<Item = &'a Path>) -> String {
    let mut uri_list = String::new();
    for path in paths {
        uri_list.push_str(&file_uri(path));
        uri_list.push_str("\r\n");
    }
    uri_list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_localhost() {
        assert_eq!(
            parse_file_uri("file:///home/user/document.txt"),
            Some(PathBuf::from("/home/user/document.txt"))
        );
        assert_eq!(
            parse_file_uri("file://localhost/tmp/a.png"),
            Some(PathBuf::from("/tmp/a.png"))
        );
    }

    #[test]
    fn test_parse_decodes_percent_escapes() {
        assert_eq!(
            parse_file_uri("file:///home/user/My%20Photos/caf%C3%A9.jpg"),
            Some(PathBuf::from("/home/user/My Photos/café.jpg"))
        );
    }

    #[test]
    fn test_parse_rejects_remote_and_non_file() {
        assert_eq!(parse_file_uri("file://server/share/a.txt"), None);
        assert_eq!(parse_file_uri("https://example.com/a.txt"), None);
        assert_eq!(parse_file_uri("/tmp/a.txt"), None);
    }

    #[test]
    fn test_encode_uses_crlf_and_keeps_slashes() {
        let paths = [PathBuf::from("/tmp/a b.txt"), PathBuf::from("/tmp/pic.png")];

        let body = encode(paths.iter().map(PathBuf::as_path));

        assert_eq!(body, "file:///tmp/a%20b.txt\r\nfile:///tmp/pic.png\r\n");
    }

    #[test]
    fn test_encoded_uri_parses_back() {
        let path = PathBuf::from("/tmp/dir #1/100% done.txt");
        assert_eq!(parse_file_uri(&file_uri(&path)), Some(path));
    }
}
