//! Cover image cache keyed by URL.
//!
//! Images are stored byte for byte under the last path segment of their URL,
//! so the file extension is the only format signal the tagger gets.

use std::path::{Path, PathBuf};

use reqwest::Url;

use super::{LocalTier, RemoteTier, TieredCache};
use crate::error::{Error, Result};
use crate::sources::HttpGet;

pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(root: &Path, dir_name: &str) -> Result<Self> {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).map_err(|e| Error::file(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, url: &str) -> Result<PathBuf> {
        Ok(self.dir.join(file_name_for(url)?))
    }
}

/// Last non-empty path segment of `url`.
pub fn file_name_for(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::remote(url, format!("invalid cover url: {e}")))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| Error::remote(url, "cover url has no file name"))
}

impl LocalTier for ImageStore {
    type Key = String;
    type Value = PathBuf;
    type Payload = Vec<u8>;

    fn load(&self, url: &String) -> Result<Option<PathBuf>> {
        let path = self.path_for(url)?;
        Ok(path.is_file().then_some(path))
    }

    fn persist(&self, url: &String, bytes: Vec<u8>) -> Result<PathBuf> {
        let path = self.path_for(url)?;
        std::fs::write(&path, bytes).map_err(|e| Error::file(&path, e))?;
        Ok(path)
    }
}

pub struct ImageDownload<H> {
    http: H,
}

impl<H> ImageDownload<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }
}

impl<H: HttpGet> RemoteTier for ImageDownload<H> {
    type Key = String;
    type Payload = Vec<u8>;

    fn fetch(&self, url: &String) -> Result<Option<Vec<u8>>> {
        tracing::debug!("downloading cover {url}");
        self.http.get(url).map(Some)
    }
}

pub type CoverCache<H> = TieredCache<ImageStore, ImageDownload<H>>;

pub fn cover_cache<H: HttpGet>(root: &Path, dir_name: &str, http: H) -> Result<CoverCache<H>> {
    Ok(TieredCache::new(ImageStore::new(root, dir_name)?, ImageDownload::new(http)))
}
