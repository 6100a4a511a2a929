//! stepcache - fetch, cache and identify CI step plugins
//!
//! Plugins are cloned from git, downloaded as release binaries or built
//! from Go modules. Every acquisition goes through a host-wide cache keyed
//! by a hash of its identity, guarded by an advisory file lock so that
//! concurrent pipelines on the same machine produce each artifact once.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod plugin;
pub mod producer;
pub mod ui;
pub mod vcs;

pub use error::{StepError, StepResult};
