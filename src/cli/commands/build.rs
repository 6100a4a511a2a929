//! Build command - compile a module through the cache

use crate::cache::CacheStore;
use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::{StepError, StepResult};
use crate::producer::ModuleBuilder;
use crate::ui::{TaskSpinner, UiContext};

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config, store: &CacheStore) -> StepResult<()> {
    let ctx = UiContext::detect();

    // The source path is part of the identity, so normalize it first
    let source = args.source.canonicalize().map_err(|e| {
        StepError::io(format!("resolving source {}", args.source.display()), e)
    })?;

    let builder = ModuleBuilder::new(store.clone(), config.build.go.clone());

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Building {}", args.module));

    let artifact = match builder.build(&source, &args.module).await {
        Ok(artifact) => artifact,
        Err(e) => {
            spinner.stop_error(&format!("Build of {} failed", args.module));
            return Err(e);
        }
    };

    if artifact.was_cached() {
        spinner.stop(&format!("Using cached build of {}", args.module));
    } else {
        spinner.stop(&format!("Built {}", args.module));
    }

    println!("{}", artifact.path.display());
    Ok(())
}
