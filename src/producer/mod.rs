//! Cached producers for plugin artifacts
//!
//! Each producer derives an entry from its own identity convention, hands
//! the store a closure that writes straight into the entry's payload path,
//! and returns that path once the entry is complete.
//!
//! | Producer | Identity | Payload |
//! |----------|----------|---------|
//! | [`CacheCloner`] | repo + ref + commit | `data/` |
//! | [`Downloader`] | URL | `step.exe` |
//! | [`ModuleBuilder`] | source dir + module | `step.exe` |

pub mod build;
pub mod clone;
pub mod download;

pub use build::ModuleBuilder;
pub use clone::CacheCloner;
pub use download::{download_timeout, Downloader, DEFAULT_DOWNLOAD_TIMEOUT, TIMEOUT_ENV};

use crate::cache::Acquired;
use crate::error::{StepError, StepResult};
use std::path::{Path, PathBuf};

/// Payload file name for downloaded and built binaries
pub const BINARY_PAYLOAD: &str = "step.exe";

/// Payload directory name for cloned worktrees
pub const CLONE_PAYLOAD: &str = "data";

/// A completed cache payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Payload path inside the cache entry
    pub path: PathBuf,
    /// Whether this call produced it or found it cached
    pub outcome: Acquired,
}

impl Artifact {
    pub fn was_cached(&self) -> bool {
        self.outcome == Acquired::Hit
    }
}

/// Mark a produced binary as executable
#[cfg(unix)]
pub(crate) fn make_executable(path: &Path) -> StepResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o755);
    std::fs::set_permissions(path, perms)
        .map_err(|e| StepError::io(format!("setting permissions on {}", path.display()), e))
}

#[cfg(not(unix))]
pub(crate) fn make_executable(_path: &Path) -> StepResult<()> {
    Ok(())
}

/// Max number of output lines to include in build error messages.
const ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of command output for error diagnostics.
pub(crate) fn error_output_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > ERROR_TAIL_LINES {
        lines[total - ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}
