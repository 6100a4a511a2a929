//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stepcache - fetch, cache and identify CI step plugins
///
/// Clones plugin repositories, downloads release binaries and builds
/// modules through a host-wide cache that runs each acquisition once.
#[derive(Parser, Debug)]
#[command(name = "stepcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, global = true, env = "STEPCACHE_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STEPCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides [cache] root, defaults to ~/.cache)
    #[arg(long, global = true, env = "STEPCACHE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clone a plugin repository into the cache
    Clone(CloneArgs),

    /// Download a release binary into the cache
    Download(DownloadArgs),

    /// Build a module into the cache
    Build(BuildArgs),

    /// Inspect and clean the artifact cache
    Cache(CacheArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the clone command
#[derive(Parser, Debug)]
pub struct CloneArgs {
    /// Plugin repository URL
    #[arg(long)]
    pub repo: String,

    /// Branch, tag or full ref (remote default when empty)
    #[arg(long = "ref", default_value = "")]
    pub git_ref: String,

    /// Commit to pin (tip of the ref when empty)
    #[arg(long, default_value = "")]
    pub sha: String,

    /// Also detect and print the plugin flavor
    #[arg(long)]
    pub detect: bool,
}

/// Arguments for the download command
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Source URL, may contain {{ os }}, {{ arch }} and {{ release }}
    pub source: String,

    /// Plugin ref used to fill {{ release }}
    #[arg(long = "ref", default_value = "")]
    pub git_ref: String,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Source directory, usually a path printed by `clone`
    #[arg(long)]
    pub source: PathBuf,

    /// Module to build
    #[arg(long, default_value = ".")]
    pub module: String,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cache entries
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the entry directory for a raw identity string
    Key {
        /// Identity string to hash
        identity: String,
    },

    /// Print the cache root directory
    Path,

    /// Remove cache entries not currently in use
    Clear {
        /// Only remove entries without a completion marker
        #[arg(long)]
        incomplete: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
