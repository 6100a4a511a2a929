//! Clone command - fetch a plugin repository through the cache

use crate::cache::CacheStore;
use crate::cli::args::CloneArgs;
use crate::config::Config;
use crate::error::{StepError, StepResult};
use crate::plugin::Flavor;
use crate::producer::CacheCloner;
use crate::ui::{TaskSpinner, UiContext};
use crate::vcs::GitCli;
use std::sync::Arc;
use tracing::debug;

/// Execute the clone command
pub async fn execute(args: CloneArgs, config: &Config, store: &CacheStore) -> StepResult<()> {
    let ctx = UiContext::detect();
    let vcs = Arc::new(GitCli::from_config(&config.clone));
    let cloner = CacheCloner::new(store.clone(), vcs);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Fetching {}", args.repo));

    let artifact = match cloner.clone_repo(&args.repo, &args.git_ref, &args.sha).await {
        Ok(artifact) => artifact,
        Err(e) => {
            spinner.stop_error(&format!("Clone of {} failed", args.repo));
            return Err(e);
        }
    };

    if artifact.was_cached() {
        spinner.stop(&format!("Using cached clone of {}", args.repo));
    } else {
        spinner.stop(&format!("Cloned {}", args.repo));
    }
    debug!("Worktree: {}", artifact.path.display());

    if args.detect {
        let flavor = Flavor::detect(&artifact.path)
            .ok_or_else(|| StepError::UnknownFlavor(artifact.path.clone()))?;
        println!("{}\t{}", flavor, artifact.path.display());
    } else {
        println!("{}", artifact.path.display());
    }

    Ok(())
}
