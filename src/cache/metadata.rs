//! JSON metadata cache keyed by track or album id.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{LocalTier, RemoteTier, TieredCache};
use crate::error::{Error, Result};
use crate::sources::bilibili::{self, ALBUM_INFO_URL, TRACK_INFO_URL};
use crate::sources::HttpGet;

/// Placeholder substituted with the id in [`Resource::url_template`].
const ID_PLACEHOLDER: &str = "{id}";

/// Remote endpoint and local directory of one metadata kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub url_template: String,
    pub dir_name: String,
}

impl Resource {
    pub fn track() -> Self {
        Self {
            url_template: TRACK_INFO_URL.to_string(),
            dir_name: "audio".to_string(),
        }
    }

    pub fn album() -> Self {
        Self {
            url_template: ALBUM_INFO_URL.to_string(),
            dir_name: "album".to_string(),
        }
    }

    pub fn url_for(&self, id: u64) -> String {
        self.url_template.replace(ID_PLACEHOLDER, &id.to_string())
    }
}

/// `<root>/<dir_name>/<id>.json`
pub struct JsonStore<T> {
    dir: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T> {
    pub fn new(root: &Path, dir_name: &str) -> Result<Self> {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).map_err(|e| Error::file(&dir, e))?;
        Ok(Self {
            dir,
            _value: PhantomData,
        })
    }

    pub fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

/// A decoded payload together with the raw JSON it came from.
pub struct Fetched<T> {
    pub raw: Value,
    pub parsed: T,
}

impl<T: DeserializeOwned> LocalTier for JsonStore<T> {
    type Key = u64;
    type Value = T;
    type Payload = Fetched<T>;

    fn load(&self, id: &u64) -> Result<Option<T>> {
        let path = self.path_for(*id);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(|e| Error::file(&path, e))?;
        let value = serde_json::from_slice(&bytes).map_err(|source| Error::CacheEntry {
            path: path.clone(),
            source,
        })?;
        Ok(Some(value))
    }

    fn persist(&self, id: &u64, payload: Fetched<T>) -> Result<T> {
        let path = self.path_for(*id);
        let bytes = serde_json::to_vec(&payload.raw).map_err(|source| Error::CacheEntry {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, bytes).map_err(|e| Error::file(&path, e))?;
        Ok(payload.parsed)
    }
}

/// GETs `resource.url_template` and unwraps the `{ msg, data }` envelope.
pub struct JsonEndpoint<T, H> {
    http: H,
    resource: Resource,
    _value: PhantomData<fn() -> T>,
}

impl<T, H> JsonEndpoint<T, H> {
    pub fn new(http: H, resource: Resource) -> Self {
        Self {
            http,
            resource,
            _value: PhantomData,
        }
    }

    pub fn url_for(&self, id: u64) -> String {
        self.resource.url_for(id)
    }
}

impl<T: DeserializeOwned, H: HttpGet> RemoteTier for JsonEndpoint<T, H> {
    type Key = u64;
    type Payload = Fetched<T>;

    fn fetch(&self, id: &u64) -> Result<Option<Fetched<T>>> {
        let url = self.url_for(*id);
        tracing::debug!("fetching {url}");
        let body = self.http.get(&url)?;
        let Some(raw) = bilibili::unwrap_envelope(&url, &body)? else {
            return Ok(None);
        };
        let parsed = T::deserialize(&raw)
            .map_err(|e| Error::remote(&url, format!("unexpected payload: {e}")))?;
        Ok(Some(Fetched { raw, parsed }))
    }
}

pub type MetadataCache<T, H> = TieredCache<JsonStore<T>, JsonEndpoint<T, H>>;

pub fn metadata_cache<T, H>(root: &Path, resource: Resource, http: H) -> Result<MetadataCache<T, H>>
where
    T: DeserializeOwned + Clone,
    H: HttpGet,
{
    let store = JsonStore::new(root, &resource.dir_name)?;
    Ok(TieredCache::new(store, JsonEndpoint::new(http, resource)))
}
