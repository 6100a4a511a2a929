//! Error types for stepcache
//!
//! All modules use `StepResult<T>` as their return type.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for stepcache operations
pub type StepResult<T> = Result<T, StepError>;

/// All errors that can occur in stepcache
#[derive(Error, Debug)]
pub enum StepError {
    // Cache errors
    #[error("Failed to create cache directory {path}: {source}")]
    CacheDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to take cache lock {path}: {source}")]
    CacheLock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write completion marker {path}: {source}")]
    CacheMarker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to add item {key} to cache: {source}")]
    Producer {
        key: String,
        #[source]
        source: Box<StepError>,
    },

    // Producer errors
    #[error("Clone of {repo} failed: {reason}")]
    Clone { repo: String, reason: String },

    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to decompress {url}: {source}")]
    Decompress {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Build of module {module} failed: {reason}")]
    Build { module: String, reason: String },

    // Plugin errors
    #[error("Invalid source template {template}: {reason}")]
    SourceTemplate { template: String, reason: String },

    #[error("Unknown plugin type in {0}")]
    UnknownFlavor(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot determine home directory for the cache root")]
    HomeDirUnknown,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl StepError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Wrap a producer failure with the cache key it was producing
    pub fn producer(key: impl Into<String>, source: StepError) -> Self {
        Self::Producer {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Cache key attached to a producer failure, if any
    pub fn cache_key(&self) -> Option<&str> {
        match self {
            Self::Producer { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Check if error is worth retrying by the caller
    ///
    /// The cache never retries on its own; an entry left incomplete by a
    /// transport failure is simply redone on the next acquisition.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Producer { source, .. } => source.is_retryable(),
            Self::Download { .. } | Self::Clone { .. } => true,
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Producer { source, .. } => source.hint(),
            Self::CommandFailed { command, .. } if program_name(command) == "git" => {
                Some("Install git and make sure it is on PATH")
            }
            Self::CommandFailed { command, .. } if program_name(command) == "go" => {
                Some("Install the Go toolchain or set [build] go in the config file")
            }
            Self::Download { .. } => {
                Some("Raise DRONE_DOWNLOAD_TIMEOUT_SECS if the remote is slow")
            }
            Self::HomeDirUnknown => Some("Pass --cache-dir or set STEPCACHE_CACHE_DIR"),
            Self::UnknownFlavor(_) => {
                Some("Expected step.yml, plugin.yml or action.yml at the repository root")
            }
            _ => None,
        }
    }
}

/// File name of the program in a rendered command line, without `.exe`
fn program_name(command: &str) -> &str {
    let program = command.split_whitespace().next().unwrap_or_default();
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    name.strip_suffix(".exe").unwrap_or(name)
}
