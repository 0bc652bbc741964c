//! Three-tier lookup: process memory, a local store, then a remote fetch.
//!
//! Each tier only consults its own state and answers `Ok(None)` when it does
//! not hold the key. A value found in a slower tier is put into memory before
//! it is returned, and a remotely fetched value is persisted to the local tier
//! first, so a key is fetched at most once per cache instance.
//!
//! Concrete caches differ only in their [`LocalTier`] and [`RemoteTier`]:
//! - [`metadata`]: JSON files under the cache root, Bilibili JSON endpoints
//! - [`cover`]: image files named after the URL, plain image download

pub mod cover;
pub mod metadata;

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::Result;

/// Tier persisted on the local file system.
pub trait LocalTier {
    type Key;
    type Value;
    /// What the remote tier hands over for persisting.
    type Payload;

    fn load(&self, key: &Self::Key) -> Result<Option<Self::Value>>;

    /// Stores a remote payload and returns the value it resolves to.
    fn persist(&self, key: &Self::Key, payload: Self::Payload) -> Result<Self::Value>;
}

/// Tier backed by a remote service. Errors are fatal and never turned into misses.
pub trait RemoteTier {
    type Key;
    type Payload;

    fn fetch(&self, key: &Self::Key) -> Result<Option<Self::Payload>>;
}

/// Which tier answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Memory,
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_hits: usize,
    pub local_hits: usize,
    pub remote_fetches: usize,
    pub misses: usize,
}

pub struct TieredCache<L: LocalTier, R> {
    memory: HashMap<L::Key, L::Value>,
    local: L,
    remote: R,
    stats: CacheStats,
}

impl<L, R> TieredCache<L, R>
where
    L: LocalTier,
    L::Key: Eq + Hash + Clone + std::fmt::Debug,
    L::Value: Clone,
    R: RemoteTier<Key = L::Key, Payload = L::Payload>,
{
    pub fn new(local: L, remote: R) -> Self {
        Self {
            memory: HashMap::new(),
            local,
            remote,
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, key: &L::Key) -> Result<Option<L::Value>> {
        Ok(self.resolve(key)?.map(|(value, _)| value))
    }

    /// Like [`get`](Self::get) with a fallback when every tier misses.
    pub fn get_or(&mut self, key: &L::Key, default: L::Value) -> Result<L::Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Looks the key up fastest tier first and reports which tier answered.
    pub fn resolve(&mut self, key: &L::Key) -> Result<Option<(L::Value, Tier)>> {
        if let Some(value) = self.memory.get(key) {
            self.stats.memory_hits += 1;
            return Ok(Some((value.clone(), Tier::Memory)));
        }

        let (value, tier) = if let Some(value) = self.local.load(key)? {
            self.stats.local_hits += 1;
            (value, Tier::Local)
        } else if let Some(payload) = self.remote.fetch(key)? {
            self.stats.remote_fetches += 1;
            (self.local.persist(key, payload)?, Tier::Remote)
        } else {
            self.stats.misses += 1;
            tracing::debug!("{key:?}: missed every tier");
            return Ok(None);
        };

        tracing::debug!("{key:?}: resolved from {tier:?}");
        self.memory.insert(key.clone(), value.clone());
        Ok(Some((value, tier)))
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }
}
