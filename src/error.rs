/// Error types for the shelf
///
/// Every failure here is handled where it happens: the shelf logs it and
/// carries on. Nothing in this enum ever reaches the user beyond the
/// status line.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShelfError {
    /// Filesystem operation failed on a specific path
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Inline image payload was not valid base64
    #[error("invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// data: URI without a `,` separating header and payload
    #[error("malformed data URI")]
    MalformedDataUri,

    /// State file could not be (de)serialized
    #[error("state serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport or status failure while fetching
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Pasted pixels could not be encoded
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// Pixel buffer does not match the advertised dimensions
    #[error("clipboard image of {width}x{height} has {len} bytes")]
    PixelBuffer { width: u32, height: u32, len: usize },

    /// Neither the cache root nor the home directory could be determined
    #[error("could not determine a cache directory")]
    NoCacheDir,
}

impl ShelfError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ShelfError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
