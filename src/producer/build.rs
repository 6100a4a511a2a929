//! Cached module builds
//!
//! The identity is the already fetched source directory plus the module, so
//! a build entry inherits the key stability of the clone entry it came from.

use super::{error_output_tail, make_executable, Artifact, BINARY_PAYLOAD};
use crate::cache::{identity, CacheStore};
use crate::error::{StepError, StepResult};
use std::path::Path;
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

/// Build producer: one compile per (source, module) per host
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    store: CacheStore,
    go: String,
}

impl ModuleBuilder {
    /// Build with the given Go toolchain binary
    pub fn new(store: CacheStore, go: impl Into<String>) -> Self {
        Self {
            store,
            go: go.into(),
        }
    }

    /// Return the cached binary for `module` in `source`, compiling on miss
    pub async fn build(&self, source: &Path, module: &str) -> StepResult<Artifact> {
        let entry = self.store.entry(&identity::build(source, module));
        let binpath = entry.payload(BINARY_PAYLOAD);

        let outcome = self
            .store
            .acquire(&entry, || async {
                if fs::try_exists(&binpath).await.unwrap_or(false) {
                    debug!("Removing stale binary {}", binpath.display());
                    fs::remove_file(&binpath).await.map_err(|e| {
                        StepError::io(format!("removing stale binary {}", binpath.display()), e)
                    })?;
                }

                self.compile(source, module, &binpath).await?;
                make_executable(&binpath)
            })
            .await?;

        Ok(Artifact {
            path: binpath,
            outcome,
        })
    }

    async fn compile(&self, source: &Path, module: &str, output: &Path) -> StepResult<()> {
        info!("Building module {} in {}", module, source.display());

        let shown_cmd = format!("{} build -o {} {}", self.go, output.display(), module);
        let out = Command::new(&self.go)
            .arg("build")
            .arg("-o")
            .arg(output)
            .arg(module)
            .current_dir(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| StepError::command_failed(shown_cmd, e))?;

        if !out.status.success() {
            let stdout = String::from_utf8_lossy(&out.stdout);
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(StepError::Build {
                module: module.to_string(),
                reason: error_output_tail(&stdout, &stderr),
            });
        }

        // A zero exit without an artifact must not be committed
        if !fs::try_exists(output).await.unwrap_or(false) {
            return Err(StepError::Build {
                module: module.to_string(),
                reason: format!("compiler produced no binary at {}", output.display()),
            });
        }
        Ok(())
    }
}
