//! Version control client abstraction
//!
//! The clone producer only needs "populate this directory with this
//! repository at this ref/commit". The default implementation drives the
//! `git` CLI; tests substitute a counting fake.

mod git;

pub use git::GitCli;

use crate::error::StepResult;
use async_trait::async_trait;
use std::path::PathBuf;

/// What to clone and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneParams {
    /// Repository URL
    pub repo: String,
    /// Branch, tag or full ref; empty for the remote default
    pub git_ref: String,
    /// Commit to check out; empty to take the tip of `git_ref`
    pub sha: String,
    /// Existing, empty target directory
    pub dir: PathBuf,
}

/// Populates a directory with a repository worktree
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Clone `params.repo` into `params.dir`
    async fn clone_repo(&self, params: &CloneParams) -> StepResult<()>;
}
