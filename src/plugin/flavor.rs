//! Plugin flavor detection from a fetched source tree

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Supported plugin flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Bitrise step (step.yml)
    Bitrise,
    /// Harness plugin (plugin.yml)
    Harness,
    /// GitHub Action (action.yml / action.yaml)
    Github,
}

impl Flavor {
    /// Manifest files identifying this flavor
    fn manifests(&self) -> &'static [&'static str] {
        match self {
            Self::Bitrise => &["step.yml"],
            Self::Harness => &["plugin.yml"],
            Self::Github => &["action.yml", "action.yaml"],
        }
    }

    /// All flavors in detection priority order
    fn all() -> &'static [Self] {
        &[Self::Bitrise, Self::Harness, Self::Github]
    }

    /// Detect the flavor of the plugin rooted at `root`
    pub fn detect(root: &Path) -> Option<Self> {
        Self::all().iter().copied().find(|flavor| {
            flavor
                .manifests()
                .iter()
                .any(|name| root.join(name).is_file())
        })
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bitrise => "bitrise",
            Self::Harness => "harness",
            Self::Github => "github",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn detect_each_flavor() {
        for (file, expected) in [
            ("step.yml", Flavor::Bitrise),
            ("plugin.yml", Flavor::Harness),
            ("action.yml", Flavor::Github),
            ("action.yaml", Flavor::Github),
        ] {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(file), "").unwrap();
            assert_eq!(Flavor::detect(dir.path()), Some(expected), "{file}");
        }
    }

    #[test]
    fn detect_priority_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("action.yml"), "").unwrap();
        fs::write(dir.path().join("step.yml"), "").unwrap();
        assert_eq!(Flavor::detect(dir.path()), Some(Flavor::Bitrise));
    }

    #[test]
    fn detect_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("step.yml")).unwrap();
        assert_eq!(Flavor::detect(dir.path()), None);
    }

    #[test]
    fn detect_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Flavor::detect(dir.path()), None);
    }

    #[test]
    fn flavor_display() {
        assert_eq!(Flavor::Github.to_string(), "github");
        assert_eq!(Flavor::Bitrise.to_string(), "bitrise");
    }
}
