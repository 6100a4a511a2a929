//! Idempotent, cross-process artifact cache
//!
//! Guards every expensive acquisition (clone, download, build) so that the
//! work runs at most once per key on a host, no matter how many processes
//! ask for it at the same time.
//!
//! # Layout
//!
//! ```text
//! <root>/<sha256(identity)>/
//!     .lock       advisory file lock, held while checking and producing
//!     .success    zero-byte completion marker
//!     <payload>   producer-defined (data/, step.exe, ...)
//! ```
//!
//! # Entry States
//!
//! | State | Marker | Description |
//! |-------|--------|-------------|
//! | Missing | - | No directory yet |
//! | Incomplete | absent | In progress, failed, or crashed; redone on next acquire |
//! | Complete | present | Payload is valid and never rewritten |

pub mod entry;
pub mod key;
mod lock;
pub mod store;

pub use entry::{format_bytes, CacheEntry, CacheState, ClearSummary, EntryInfo};
pub use key::{identity, CacheKey};
pub use store::{Acquired, CacheConfig, CacheStore, LOCK_FILE, SUCCESS_MARKER};
