//! Configuration schema for stepcache
//!
//! Configuration is stored at `~/.config/stepcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Artifact cache settings
    pub cache: CacheSettings,

    /// Plugin repository clone settings
    pub clone: CloneConfig,

    /// Release binary download settings
    pub download: DownloadConfig,

    /// Module build settings
    pub build: BuildConfig,
}

/// Artifact cache settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache root directory (defaults to ~/.cache)
    pub root: Option<PathBuf>,
}

/// Clone settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    /// Fetch depth used when no commit is pinned
    pub depth: u32,

    /// Environment variable holding a token for HTTP basic auth
    pub token_env: String,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// Download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Request timeout in seconds, unless DRONE_DOWNLOAD_TIMEOUT_SECS is set
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Go toolchain binary
    pub go: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            go: "go".to_string(),
        }
    }
}
