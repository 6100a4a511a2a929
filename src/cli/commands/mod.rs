//! CLI command implementations
//!
//! `clone`, `download` and `build` print exactly one path on stdout so a
//! pipeline can capture it; progress goes to stderr.

pub mod build;
pub mod cache;
pub mod clone;
pub mod config;
pub mod download;

pub use build::execute as build;
pub use cache::execute as cache;
pub use clone::execute as clone;
pub use config::execute as config;
pub use download::execute as download;
