//! Advisory file lock guarding one cache entry
//!
//! The lock is an OS-level `flock` on the entry's `.lock` file, so it
//! excludes other processes as well as other handles in this process, and
//! the kernel drops it if the holder dies.

use crate::error::{StepError, StepResult};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Exclusive lock on an entry, released on drop
#[derive(Debug)]
pub(crate) struct EntryLock {
    file: File,
    path: PathBuf,
}

impl EntryLock {
    /// Block until the exclusive lock is held
    ///
    /// Contention never fails; this waits with no timeout. The blocking
    /// `flock` call runs on tokio's blocking pool.
    pub(crate) async fn acquire(path: PathBuf) -> StepResult<Self> {
        debug!("Taking lock {}", path.display());

        let lock_path = path.clone();
        let file = tokio::task::spawn_blocking(move || -> StepResult<File> {
            let file = open_lock_file(&lock_path)?;
            file.lock_exclusive().map_err(|e| StepError::CacheLock {
                path: lock_path.clone(),
                source: e,
            })?;
            Ok(file)
        })
        .await
        .map_err(|e| StepError::Internal(format!("lock task failed: {}", e)))??;

        debug!("Took lock {}", path.display());
        Ok(Self { file, path })
    }

    /// Take the lock only if nobody holds it
    pub(crate) fn try_acquire(path: &Path) -> StepResult<Option<Self>> {
        let file = open_lock_file(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                file,
                path: path.to_path_buf(),
            })),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(StepError::CacheLock {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

impl Drop for EntryLock {
    fn drop(&mut self) {
        // Release errors are not fatal: the marker alone decides completion.
        match FileExt::unlock(&self.file) {
            Ok(()) => debug!("Released lock {}", self.path.display()),
            Err(e) => error!("Failed to release lock {}: {}", self.path.display(), e),
        }
    }
}

fn open_lock_file(path: &Path) -> StepResult<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| StepError::CacheLock {
            path: path.to_path_buf(),
            source: e,
        })
}
