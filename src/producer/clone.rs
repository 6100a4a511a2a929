//! Cached repository clones

use super::{Artifact, CLONE_PAYLOAD};
use crate::cache::{identity, CacheStore};
use crate::error::{StepError, StepResult};
use crate::vcs::{CloneParams, VcsClient};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// Clone producer: one network clone per (repo, ref, commit) per host
///
/// A floating ref and a pinned commit of the same repository are separate
/// entries, since the ref can move.
#[derive(Clone)]
pub struct CacheCloner {
    store: CacheStore,
    vcs: Arc<dyn VcsClient>,
}

impl CacheCloner {
    pub fn new(store: CacheStore, vcs: Arc<dyn VcsClient>) -> Self {
        Self { store, vcs }
    }

    /// Return the cached worktree for `repo` at `git_ref`/`sha`, cloning on miss
    pub async fn clone_repo(&self, repo: &str, git_ref: &str, sha: &str) -> StepResult<Artifact> {
        let entry = self.store.entry(&identity::clone(repo, git_ref, sha));
        let codedir = entry.payload(CLONE_PAYLOAD);

        let params = CloneParams {
            repo: repo.to_string(),
            git_ref: git_ref.to_string(),
            sha: sha.to_string(),
            dir: codedir.clone(),
        };

        let outcome = self
            .store
            .acquire(&entry, || async {
                // Leftovers from a failed or killed attempt
                if let Err(e) = fs::remove_dir_all(&codedir).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Cannot remove stale clone {}: {}", codedir.display(), e);
                    }
                }

                fs::create_dir_all(&codedir).await.map_err(|e| {
                    StepError::io(format!("creating code directory {}", codedir.display()), e)
                })?;

                debug!("Cloning {} ({} {}) into {}", repo, git_ref, sha, codedir.display());
                self.vcs.clone_repo(&params).await
            })
            .await?;

        Ok(Artifact {
            path: codedir,
            outcome,
        })
    }
}
