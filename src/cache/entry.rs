//! Cache entry state and housekeeping
//!
//! An entry is the directory addressed by one key. Its state is read from
//! the filesystem: the completion marker is the only proof of a valid
//! payload.

use crate::cache::key::CacheKey;
use crate::cache::lock::EntryLock;
use crate::cache::store::{CacheStore, LOCK_FILE, SUCCESS_MARKER};
use crate::error::{StepError, StepResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// State of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No directory exists (will be created)
    Missing,
    /// Directory exists without a marker: in progress, failed or crashed
    Incomplete,
    /// Marker present, payload is valid
    Complete,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

/// Directory, lock, marker and payload for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    dir: PathBuf,
    key: CacheKey,
}

impl CacheEntry {
    pub(crate) fn new(dir: PathBuf, key: CacheKey) -> Self {
        Self { dir, key }
    }

    /// Entry directory, `<root>/<key>`
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(SUCCESS_MARKER)
    }

    /// Producer-chosen payload location inside the entry
    pub fn payload(&self, subpath: impl AsRef<Path>) -> PathBuf {
        self.dir.join(subpath)
    }

    /// Whether the completion marker exists
    pub fn is_complete(&self) -> bool {
        self.marker_path().exists()
    }

    /// Whether the entry holds anything besides its lock file
    pub fn has_contents(&self) -> bool {
        fs::read_dir(&self.dir)
            .map(|mut children| {
                children.any(|child| child.is_ok_and(|c| c.file_name() != LOCK_FILE))
            })
            .unwrap_or(false)
    }

    /// Current state as seen on disk, without taking the lock
    pub fn state(&self) -> CacheState {
        if self.is_complete() {
            CacheState::Complete
        } else if self.dir.exists() {
            CacheState::Incomplete
        } else {
            CacheState::Missing
        }
    }
}

impl fmt::Display for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir.display())
    }
}

/// Listing row for an existing entry
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub entry: CacheEntry,
    pub state: CacheState,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// Result of a `clear` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearSummary {
    /// Entries removed
    pub removed: usize,
    /// Entries skipped because another process holds their lock
    pub in_use: usize,
}

impl CacheStore {
    /// List entries under the cache root
    ///
    /// Only directories named like a key and holding a lock file are
    /// reported, since the root may be shared with other tools.
    pub fn list(&self) -> StepResult<Vec<EntryInfo>> {
        let root = self.config().root();
        if !root.exists() {
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(root)
            .map_err(|e| StepError::io(format!("reading cache root {}", root.display()), e))?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry =
                dir_entry.map_err(|e| StepError::io("reading cache root entry", e))?;
            let name = dir_entry.file_name();
            let Some(key) = name.to_str().and_then(CacheKey::from_dir_name) else {
                continue;
            };

            let entry = self.entry_for_key(key);
            if !entry.lock_path().exists() || !entry.has_contents() {
                continue;
            }

            let metadata = fs::metadata(entry.dir())
                .map_err(|e| StepError::io(format!("reading {}", entry.dir().display()), e))?;
            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            entries.push(EntryInfo {
                state: entry.state(),
                size_bytes: dir_size(entry.dir()),
                modified_at,
                entry,
            });
        }

        entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(entries)
    }

    /// Empty entries whose lock can be taken without waiting
    ///
    /// The marker is deleted first so a concurrent reader never sees a
    /// complete entry with a half-removed payload. The `.lock` file itself
    /// is kept: a process already blocked on it must wake up holding the
    /// same lock that later callers will contend on. With
    /// `incomplete_only`, complete entries are left alone.
    pub fn clear(&self, incomplete_only: bool) -> StepResult<ClearSummary> {
        let mut summary = ClearSummary::default();

        for info in self.list()? {
            if incomplete_only && info.state == CacheState::Complete {
                continue;
            }

            let entry = &info.entry;
            let Some(_lock) = EntryLock::try_acquire(&entry.lock_path())? else {
                debug!("Skipping entry in use: {}", entry);
                summary.in_use += 1;
                continue;
            };

            purge(entry)?;
            summary.removed += 1;
        }

        Ok(summary)
    }
}

/// Remove the marker, then every other child except the lock file
///
/// Must be called with the entry lock held.
fn purge(entry: &CacheEntry) -> StepResult<()> {
    let marker = entry.marker_path();
    if marker.exists() {
        fs::remove_file(&marker)
            .map_err(|e| StepError::io(format!("removing marker {}", marker.display()), e))?;
    }

    let children = fs::read_dir(entry.dir())
        .map_err(|e| StepError::io(format!("reading entry {}", entry), e))?;
    for child in children {
        let child = child.map_err(|e| StepError::io(format!("reading entry {}", entry), e))?;
        if child.file_name() == LOCK_FILE {
            continue;
        }

        let path = child.path();
        let removed = match child.file_type() {
            Ok(ft) if ft.is_dir() => fs::remove_dir_all(&path),
            _ => fs::remove_file(&path),
        };
        removed.map_err(|e| StepError::io(format!("removing {}", path.display()), e))?;
    }

    Ok(())
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
