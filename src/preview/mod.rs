/// Image previews for shelf rows
///
/// This module handles:
/// - Centre-crop math for square thumbnails
/// - Decoding and resizing images on a blocking worker

pub mod thumbnail;
