//! `git` CLI client

use super::{CloneParams, VcsClient};
use crate::config::schema::CloneConfig;
use crate::error::{StepError, StepResult};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Clones by shelling out to `git`
///
/// Uses `init` + `fetch` + `checkout` so branches, tags and full refs
/// (`refs/heads/main`, `refs/pull/1/head`) all go through one path.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    depth: u32,
    token: Option<String>,
}

impl GitCli {
    /// Create a client with the given fetch depth and no credentials
    pub fn new(depth: u32) -> Self {
        Self {
            program: "git".to_string(),
            depth,
            token: None,
        }
    }

    /// Create a client from config, reading the token variable once
    pub fn from_config(config: &CloneConfig) -> Self {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty());
        Self {
            token,
            ..Self::new(config.depth)
        }
    }

    /// Use a different `git` executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a token for HTTP basic auth
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Arguments for `git fetch`, excluding auth
    ///
    /// Depth only applies when no commit is pinned, since a pinned commit
    /// may sit anywhere in the ref's history.
    fn fetch_args(&self, params: &CloneParams) -> Vec<String> {
        let mut args = vec!["fetch".to_string(), "--no-tags".to_string()];
        if params.sha.is_empty() && self.depth > 0 {
            args.push(format!("--depth={}", self.depth));
        }
        args.push("origin".to_string());
        args.push(if params.git_ref.is_empty() {
            "HEAD".to_string()
        } else {
            params.git_ref.clone()
        });
        args
    }

    /// Git config entries carrying `token:<token>` basic auth
    ///
    /// Passed through `GIT_CONFIG_COUNT`/`GIT_CONFIG_KEY_n`/`GIT_CONFIG_VALUE_n`
    /// so the header never shows up in the process command line.
    fn auth_env(&self) -> Vec<(String, String)> {
        match self.token {
            Some(ref token) => {
                let basic = STANDARD.encode(format!("token:{}", token));
                vec![
                    ("GIT_CONFIG_COUNT".to_string(), "1".to_string()),
                    ("GIT_CONFIG_KEY_0".to_string(), "http.extraHeader".to_string()),
                    (
                        "GIT_CONFIG_VALUE_0".to_string(),
                        format!("Authorization: Basic {}", basic),
                    ),
                ]
            }
            None => Vec::new(),
        }
    }

    async fn run(&self, dir: Option<&Path>, args: &[String]) -> StepResult<()> {
        let mut cmd = Command::new(&self.program);
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args);
        cmd.envs(self.auth_env());
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let shown_cmd = format!("{} {}", self.program, args.join(" "));
        debug!("Running: {}", shown_cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| StepError::command_failed(shown_cmd.clone(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StepError::command_exec(shown_cmd, stderr.trim()));
        }
        Ok(())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::from_config(&CloneConfig::default())
    }
}

#[async_trait]
impl VcsClient for GitCli {
    async fn clone_repo(&self, params: &CloneParams) -> StepResult<()> {
        let clone_err = |e: StepError| StepError::Clone {
            repo: params.repo.clone(),
            reason: e.to_string(),
        };

        let dir = params.dir.as_path();
        self.run(
            None,
            &[
                "init".to_string(),
                "--quiet".to_string(),
                dir.display().to_string(),
            ],
        )
        .await
        .map_err(|e| match e {
            // Keep the spawn error intact so the missing-git hint survives
            e @ StepError::CommandFailed { .. } => e,
            e => clone_err(e),
        })?;

        self.run(
            Some(dir),
            &[
                "remote".to_string(),
                "add".to_string(),
                "origin".to_string(),
                params.repo.clone(),
            ],
        )
        .await
        .map_err(clone_err)?;

        self.run(Some(dir), &self.fetch_args(params))
            .await
            .map_err(clone_err)?;

        let target = if params.sha.is_empty() {
            "FETCH_HEAD".to_string()
        } else {
            params.sha.clone()
        };
        self.run(
            Some(dir),
            &[
                "checkout".to_string(),
                "--quiet".to_string(),
                "--detach".to_string(),
                target,
            ],
        )
        .await
        .map_err(clone_err)
    }
}
