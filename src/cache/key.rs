//! Cache key derivation
//!
//! Maps a logical identity string to a fixed-length, filesystem-safe key.
//! Same identity = same key, in every process and across runs.

use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a key in hex characters
pub const KEY_LEN: usize = 64;

/// Stable hash-derived identifier for one cacheable artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for an identity string (hex-encoded SHA-256)
    pub fn derive(identity: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse a directory name back into a key
    ///
    /// Returns `None` for anything that is not exactly 64 lowercase hex
    /// characters, which keeps foreign directories under a shared root
    /// (such as `~/.cache`) out of listings.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let valid = name.len() == KEY_LEN
            && name
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(name.to_string()))
    }

    /// The key as a string, usable as a directory name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identity strings for each producer
///
/// Fields are joined with NUL, which cannot occur in URLs, refs or paths,
/// so `("ab", "c")` and `("a", "bc")` never share an identity. Each
/// convention is tagged with its producer kind so a download URL can never
/// alias a clone or build identity.
pub mod identity {
    use std::path::Path;

    const SEP: char = '\0';

    /// Identity of a repository clone: URL + ref + commit
    pub fn clone(repo: &str, git_ref: &str, sha: &str) -> String {
        format!("clone{SEP}{repo}{SEP}{git_ref}{SEP}{sha}")
    }

    /// Identity of a downloaded artifact: the literal URL
    pub fn download(url: &str) -> String {
        format!("download{SEP}{url}")
    }

    /// Identity of a compiled module: source directory + module path
    ///
    /// Non-UTF-8 directories are hex encoded from their raw bytes under a
    /// separate tag, so distinct paths never collapse to the same string.
    pub fn build(source: &Path, module: &str) -> String {
        match source.to_str() {
            Some(source) => format!("build{SEP}{source}{SEP}{module}"),
            None => {
                let raw = hex::encode(source.as_os_str().as_encoded_bytes());
                format!("build-raw{SEP}{raw}{SEP}{module}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;

    #[test]
    fn derive_deterministic() {
        let a = CacheKey::derive("A");
        let b = CacheKey::derive("A");

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), KEY_LEN);
    }

    #[test]
    fn derive_known_value() {
        // sha256("abc")
        assert_eq!(
            CacheKey::derive("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn derive_distinct_inputs() {
        let inputs = ["A", "B", "a", "", " ", "A ", "https://x/y.git", "https://x/y.git/"];
        let keys: HashSet<_> = inputs.iter().map(|i| CacheKey::derive(i)).collect();
        assert_eq!(keys.len(), inputs.len());
    }

    #[test]
    fn clone_identity_fields_do_not_bleed() {
        assert_ne!(
            identity::clone("https://x/y.git", "main", ""),
            identity::clone("https://x/y.git", "mai", "n")
        );
        assert_ne!(
            identity::clone("https://x/y", ".gitmain", ""),
            identity::clone("https://x/y.git", "main", "")
        );
    }

    #[test]
    fn ref_only_and_pinned_clones_differ() {
        let floating = identity::clone("https://x/y.git", "main", "");
        let pinned = identity::clone(
            "https://x/y.git",
            "main",
            "5a4ac9002d0be2fb38bd78e4b4dbde5606d7042f",
        );
        assert_ne!(CacheKey::derive(&floating), CacheKey::derive(&pinned));
    }

    #[test]
    fn producer_kinds_do_not_alias() {
        let url = "https://example.com/step";
        assert_ne!(identity::download(url), identity::build(Path::new(url), ""));
        assert_ne!(identity::download(url), identity::clone(url, "", ""));
    }

    #[test]
    fn build_identity_includes_module() {
        let src = Path::new("/work/step");
        assert_ne!(identity::build(src, "."), identity::build(src, "./cmd/tool"));
    }

    #[cfg(unix)]
    #[test]
    fn build_identity_keeps_non_utf8_paths_apart() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let a = Path::new(OsStr::from_bytes(b"/work/\xff"));
        let b = Path::new(OsStr::from_bytes(b"/work/\xfe"));
        assert_eq!(a.display().to_string(), b.display().to_string());
        assert_ne!(identity::build(a, "."), identity::build(b, "."));
        assert_ne!(
            identity::build(a, "."),
            identity::build(Path::new(&a.display().to_string()), ".")
        );
    }

    #[test]
    fn from_dir_name_filters_foreign_dirs() {
        let key = CacheKey::derive("x");
        assert_eq!(CacheKey::from_dir_name(key.as_str()), Some(key));
        assert!(CacheKey::from_dir_name("pip").is_none());
        assert!(CacheKey::from_dir_name(&"G".repeat(KEY_LEN)).is_none());
        assert!(CacheKey::from_dir_name(&"A".repeat(KEY_LEN)).is_none());
    }
}
