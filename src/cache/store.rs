//! Cache store: lock, check, produce, commit
//!
//! `CacheStore::acquire` is the only way a payload becomes valid. It runs
//! the producer at most once per key across every process on the host and
//! writes the completion marker only after the producer succeeds.

use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::cache::lock::EntryLock;
use crate::error::{StepError, StepResult};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Lock file name inside every entry
pub const LOCK_FILE: &str = ".lock";

/// Completion marker name inside every entry
pub const SUCCESS_MARKER: &str = ".success";

/// Cache location, constructed explicitly and injected into the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    root: PathBuf,
}

impl CacheConfig {
    /// Use the given directory as cache root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default root: `~/.cache`
    pub fn from_home() -> StepResult<Self> {
        let home = dirs::home_dir().ok_or(StepError::HomeDirUnknown)?;
        Ok(Self::new(home.join(".cache")))
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Outcome of a successful acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    /// Marker was already present; the producer did not run
    Hit,
    /// Marker was absent; the producer ran and the marker was written
    Produced,
}

/// Cross-process, write-once artifact cache
#[derive(Debug, Clone)]
pub struct CacheStore {
    config: CacheConfig,
}

impl CacheStore {
    /// Create a store over the given cache root
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Cache configuration in use
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Resolve an identity string to its entry
    pub fn entry(&self, identity: &str) -> CacheEntry {
        self.entry_for_key(CacheKey::derive(identity))
    }

    /// Resolve an already derived key to its entry
    pub fn entry_for_key(&self, key: CacheKey) -> CacheEntry {
        CacheEntry::new(self.config.root.join(key.as_str()), key)
    }

    /// Make sure `entry` is complete, running `producer` if it is not
    ///
    /// Creates the entry directory, then blocks on the entry lock. Under the
    /// lock, a present marker returns [`Acquired::Hit`] immediately.
    /// Otherwise the producer runs exactly once; on success the marker is
    /// written before the lock is released. A failing producer leaves the
    /// entry incomplete and its error is returned wrapped with the entry
    /// path. Nothing is retried here.
    ///
    /// The producer must tolerate a partially populated payload left by an
    /// earlier failed or killed attempt.
    pub async fn acquire<F, Fut>(&self, entry: &CacheEntry, producer: F) -> StepResult<Acquired>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StepResult<()>>,
    {
        let dir = entry.dir();
        fs::create_dir_all(dir)
            .await
            .map_err(|e| StepError::CacheDirCreate {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let _lock = EntryLock::acquire(entry.lock_path()).await?;

        if entry.is_complete() {
            debug!("Cache hit: {}", dir.display());
            return Ok(Acquired::Hit);
        }

        info!("Cache miss, producing {}", dir.display());
        producer()
            .await
            .map_err(|e| StepError::producer(dir.display().to_string(), e))?;

        let marker = entry.marker_path();
        fs::File::create(&marker)
            .await
            .map_err(|e| StepError::CacheMarker {
                path: marker.clone(),
                source: e,
            })?;

        debug!("Marked complete: {}", dir.display());
        Ok(Acquired::Produced)
    }
}
