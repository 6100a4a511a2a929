//! Plugin flavor detection and release source templates

pub mod flavor;
pub mod source;

pub use flavor::Flavor;
pub use source::{expand_source, release_name};
