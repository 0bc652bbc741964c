//! Error types for the cache tiers, the tag writer and the batch driver.
//!
//! Library modules return [`Error`]; `cli.rs` wraps it in `anyhow` for
//! reporting.

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file name is not a track id.
    #[error("invalid input {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// Audio container or cover image format we cannot tag.
    #[error("unsupported format for {path}: {detail}")]
    UnsupportedFormat { path: PathBuf, detail: String },

    /// Transport failure, malformed response or non-success envelope.
    #[error("remote service error for {url}: {detail}")]
    RemoteService { url: String, detail: String },

    /// Album and track data from the remote service disagree.
    #[error("inconsistent data for track {track_id} in album {album_id}: {detail}")]
    InconsistentData {
        track_id: u64,
        album_id: u64,
        detail: String,
    },

    #[error("unreadable cache entry {path}: {source}")]
    CacheEntry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tag error for {path}: {source}")]
    Tag {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn remote(url: impl Into<String>, detail: impl ToString) -> Self {
        Self::RemoteService {
            url: url.into(),
            detail: detail.to_string(),
        }
    }

    pub fn inconsistent(track_id: u64, album_id: u64, detail: impl Into<String>) -> Self {
        Self::InconsistentData {
            track_id,
            album_id,
            detail: detail.into(),
        }
    }

    pub fn tag(path: &Path, source: lofty::error::LoftyError) -> Self {
        Self::Tag {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn file(path: &Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_carries_url() {
        let err = Error::remote("https://x/menus/9", "remote responded \"fail\"");
        let msg = err.to_string();
        assert!(msg.contains("https://x/menus/9"));
        assert!(msg.contains("fail"));
    }

    #[test]
    fn test_inconsistent_error_names_ids() {
        let err = Error::inconsistent(7, 42, "track missing from album");
        let msg = err.to_string();
        assert!(msg.contains("track 7"));
        assert!(msg.contains("album 42"));
    }

    #[test]
    fn test_file_error_names_path() {
        let err = Error::file(
            Path::new("/music/123"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/music/123"));
    }
}
