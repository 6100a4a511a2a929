//! Cached release binary downloads
//!
//! The body is streamed straight into the entry payload. URLs ending in
//! `.zst` are decompressed on the fly, so the payload always holds the
//! usable binary.

use super::{make_executable, Artifact, BINARY_PAYLOAD};
use crate::cache::{identity, CacheStore};
use crate::error::{StepError, StepResult};
use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable overriding the request timeout, in seconds
pub const TIMEOUT_ENV: &str = "DRONE_DOWNLOAD_TIMEOUT_SECS";

/// Request timeout when neither config nor environment set one
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Compression formats recognised by URL suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Zstd,
}

impl Compression {
    fn from_url(url: &str) -> Self {
        // Ignore query strings such as signed-URL parameters
        let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
        if path.ends_with(".zst") {
            Self::Zstd
        } else {
            Self::None
        }
    }
}

/// Resolve the request timeout for one download attempt
///
/// A positive integer in `DRONE_DOWNLOAD_TIMEOUT_SECS` wins; anything else
/// falls back to `default`.
pub fn download_timeout(default: Duration) -> Duration {
    std::env::var(TIMEOUT_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

/// Download producer: one fetch per URL per host
#[derive(Debug, Clone)]
pub struct Downloader {
    store: CacheStore,
    default_timeout: Duration,
}

impl Downloader {
    pub fn new(store: CacheStore) -> Self {
        Self {
            store,
            default_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    /// Timeout used when the environment does not override it
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Return the cached binary for `url`, downloading on miss
    pub async fn download(&self, url: &str) -> StepResult<Artifact> {
        let entry = self.store.entry(&identity::download(url));
        let binpath = entry.payload(BINARY_PAYLOAD);

        let outcome = self
            .store
            .acquire(&entry, || async {
                let timeout = download_timeout(self.default_timeout);
                let url = url.to_string();
                let path = binpath.clone();

                tokio::task::spawn_blocking(move || fetch_to_file(&url, &path, timeout))
                    .await
                    .map_err(|e| StepError::Internal(format!("download task failed: {}", e)))?
            })
            .await?;

        Ok(Artifact {
            path: binpath,
            outcome,
        })
    }
}

/// Blocking GET of `url` into `path`, decompressing by suffix
fn fetch_to_file(url: &str, path: &Path, timeout: Duration) -> StepResult<()> {
    info!("Downloading {}", url);
    debug!("Download timeout: {}s", timeout.as_secs());

    let agent = ureq::config::Config::builder()
        .timeout_global(Some(timeout))
        .build()
        .new_agent();

    let response = agent.get(url).call().map_err(|e| StepError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let mut body = response.into_body().into_reader();

    // Truncates whatever an earlier failed attempt left behind
    let mut file = File::create(path)
        .map_err(|e| StepError::io(format!("creating file at path {}", path.display()), e))?;

    match Compression::from_url(url) {
        Compression::Zstd => {
            zstd::stream::copy_decode(&mut body, &mut file).map_err(|e| {
                StepError::Decompress {
                    url: url.to_string(),
                    source: e,
                }
            })?;
        }
        Compression::None => {
            io::copy(&mut body, &mut file).map_err(|e| StepError::Download {
                url: url.to_string(),
                reason: format!("failed to write download to file: {}", e),
            })?;
        }
    }

    file.sync_all()
        .map_err(|e| StepError::io(format!("flushing {}", path.display()), e))?;
    drop(file);

    make_executable(path)
}
