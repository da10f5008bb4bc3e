//! Package manifest (package.json) parsing
//!
//! Every discovered package directory must carry a `package.json`. Only the
//! fields the build pipeline consumes are modeled; everything else is
//! ignored. Dependency iteration preserves declaration order, which in turn
//! fixes the discovery order of the whole build.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::error::DiscoveryError;

/// The parsed package.json of one package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    /// Package name (unique key across the collection)
    pub name: String,

    /// Entry point module, relative to the package folder
    #[serde(default)]
    pub main: Option<String>,

    /// Declared dependencies, in declaration order
    #[serde(default)]
    pub dependencies: serde_json::Map<String, serde_json::Value>,

    /// Whether this package advertises itself as a bundler
    #[serde(default)]
    pub bundler: bool,
}

impl PackageManifest {
    /// Parse a manifest from JSON text
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load the manifest of the package rooted at `folder`
    pub fn load(folder: &Path) -> Result<Self, DiscoveryError> {
        let path = folder.join(defaults::MANIFEST_FILE);
        if !path.is_file() {
            return Err(DiscoveryError::ManifestMissing { path });
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| DiscoveryError::ManifestParse {
                path: path.clone(),
                error: e.to_string(),
            })?;

        Self::from_json(&content).map_err(|e| DiscoveryError::ManifestParse {
            path,
            error: e.to_string(),
        })
    }

    /// Dependency names in declaration order
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Absolute path of the entry point module
    pub fn entry_point(&self, folder: &Path) -> PathBuf {
        let main = self.main.as_deref().unwrap_or(defaults::DEFAULT_ENTRY);
        folder.join(main.trim_start_matches("./"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_manifest() {
        let m = PackageManifest::from_json(r#"{"name": "app"}"#).unwrap();
        assert_eq!(m.name, "app");
        assert!(m.main.is_none());
        assert!(m.dependencies.is_empty());
        assert!(!m.bundler);
    }

    #[test]
    fn test_parse_full_manifest_preserves_dependency_order() {
        let m = PackageManifest::from_json(
            r#"{
                "name": "app",
                "main": "./src/index.js",
                "dependencies": {"@yaje/core": "^1", "@yaje/vite": "^1", "aaa": "*"},
                "bundler": false
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = m.dependency_names().collect();
        assert_eq!(names, vec!["@yaje/core", "@yaje/vite", "aaa"]);
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let m = PackageManifest::from_json(
            r#"{"name": "app", "version": "1.0.0", "scripts": {"test": "x"}}"#,
        )
        .unwrap();
        assert_eq!(m.name, "app");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(PackageManifest::from_json("{not json").is_err());
        assert!(PackageManifest::from_json(r#"{"main": "x"}"#).is_err());
    }

    #[test]
    fn test_entry_point_defaults_to_index_js() {
        let m = PackageManifest::from_json(r#"{"name": "app"}"#).unwrap();
        assert_eq!(
            m.entry_point(Path::new("/proj")),
            PathBuf::from("/proj/index.js")
        );

        let m = PackageManifest::from_json(r#"{"name": "app", "main": "./src/index.js"}"#).unwrap();
        assert_eq!(
            m.entry_point(Path::new("/proj")),
            PathBuf::from("/proj/src/index.js")
        );
    }
}
