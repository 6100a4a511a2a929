//! Download command - fetch a release binary through the cache

use crate::cache::CacheStore;
use crate::cli::args::DownloadArgs;
use crate::config::Config;
use crate::error::StepResult;
use crate::plugin::expand_source;
use crate::producer::Downloader;
use crate::ui::{TaskSpinner, UiContext};
use std::time::Duration;

/// Execute the download command
pub async fn execute(args: DownloadArgs, config: &Config, store: &CacheStore) -> StepResult<()> {
    let ctx = UiContext::detect();
    let url = expand_source(&args.source, &args.git_ref)?;

    let downloader = Downloader::new(store.clone())
        .with_default_timeout(Duration::from_secs(config.download.timeout_secs));

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Downloading {}", url));

    let artifact = match downloader.download(&url).await {
        Ok(artifact) => artifact,
        Err(e) => {
            spinner.stop_error(&format!("Download of {} failed", url));
            return Err(e);
        }
    };

    if artifact.was_cached() {
        spinner.stop(&format!("Using cached download of {}", url));
    } else {
        spinner.stop(&format!("Downloaded {}", url));
    }

    println!("{}", artifact.path.display());
    Ok(())
}
