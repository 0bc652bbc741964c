//! Audio container detection and cover image format inference.

use std::path::Path;

use lofty::file::FileType;
use lofty::picture::MimeType;
use lofty::probe::Probe;
use lofty::tag::TagType;

use crate::error::{Error, Result};
use crate::models::ImageFormat;

/// Containers we can tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// MP4 family (`ilst` atoms)
    Mp4,
    /// FLAC (Vorbis comments + PICTURE blocks)
    Flac,
}

impl Container {
    /// Canonical output extension, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => ".m4a",
            Container::Flac => ".flac",
        }
    }

    pub fn tag_type(self) -> TagType {
        match self {
            Container::Mp4 => TagType::Mp4Ilst,
            Container::Flac => TagType::VorbisComments,
        }
    }
}

/// Detect the container from the file contents. The extension is ignored,
/// input files usually have none.
pub fn sniff(path: &Path) -> Result<Container> {
    let detected = Probe::open(path)
        .map_err(|e| Error::unsupported(path, format!("unreadable file: {e}")))?
        .guess_file_type()
        .map_err(|e| Error::unsupported(path, format!("unreadable file: {e}")))?;

    match detected.file_type() {
        Some(FileType::Mp4) => Ok(Container::Mp4),
        Some(FileType::Flac) => Ok(Container::Flac),
        Some(other) => Err(Error::unsupported(path, format!("{other:?} container"))),
        None => Err(Error::unsupported(path, "unknown container")),
    }
}

impl ImageFormat {
    /// Infer the format from a cached cover path. Only JPEG and PNG are accepted.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg" | "jpeg") => Ok(ImageFormat::Jpeg),
            Some("png") => Ok(ImageFormat::Png),
            Some(other) => Err(Error::unsupported(
                path,
                format!("cover image .{other}, only jpg and png are supported"),
            )),
            None => Err(Error::unsupported(path, "cover image has no extension")),
        }
    }

    pub fn mime_type(self) -> MimeType {
        match self {
            ImageFormat::Jpeg => MimeType::Jpeg,
            ImageFormat::Png => MimeType::Png,
        }
    }
}
