//! Tracked package collection
//!
//! Discovery inserts one [`TrackedPackage`] per package name; the collection
//! preserves insertion order, which downstream phases rely on for
//! deterministic compile arguments, loading-function order, and link order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use crate::config::defaults;
use crate::core::instructions::BuildInstructions;
use crate::core::manifest::PackageManifest;
use crate::error::DiscoveryError;

/// Record of one discovered package
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPackage {
    /// Parsed package.json
    pub manifest: PackageManifest,
    /// Absolute package directory
    pub package_folder: PathBuf,
    /// Evaluated build configuration, present iff the package is native
    pub instructions: Option<BuildInstructions>,
}

impl TrackedPackage {
    /// Whether the package carries native build instructions
    pub fn is_native(&self) -> bool {
        self.instructions.is_some()
    }

    /// Whether the package advertises itself as a bundler
    pub fn is_bundler(&self) -> bool {
        self.manifest.bundler
    }
}

/// Insertion-ordered mapping from package name to tracked package
#[derive(Debug, Clone, Default)]
pub struct PackageCollection {
    order: Vec<String>,
    entries: HashMap<String, TrackedPackage>,
}

impl PackageCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a package by name
    pub fn get(&self, name: &str) -> Option<&TrackedPackage> {
        self.entries.get(name)
    }

    /// Whether a package with this name is tracked
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert or replace a package
    ///
    /// Replacing keeps the original insertion position.
    pub fn set(&mut self, name: &str, package: TrackedPackage) {
        if self.entries.insert(name.to_string(), package).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Number of tracked packages
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate packages in insertion (discovery) order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedPackage> {
        self.order
            .iter()
            .map(|name| &self.entries[name])
    }

    /// The runtime support package
    ///
    /// Fails unless a native package named `@yaje/core` is tracked.
    pub fn get_core(&self) -> Result<&TrackedPackage, DiscoveryError> {
        self.get(defaults::CORE_PACKAGE)
            .filter(|p| p.is_native())
            .ok_or(DiscoveryError::CoreMissing)
    }

    /// The first package advertising itself as a bundler
    pub fn get_bundler(&self) -> Result<&TrackedPackage, DiscoveryError> {
        self.iter()
            .find(|p| p.is_bundler())
            .ok_or(DiscoveryError::BundlerMissing)
    }

    /// Whether `name` transitively depends on the core package
    pub fn depends_on_core(&self, name: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(name);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(package) = self.get(current) else {
                continue;
            };
            for dependency in package.manifest.dependency_names() {
                if dependency == defaults::CORE_PACKAGE {
                    return true;
                }
                queue.push_back(dependency);
            }
        }

        false
    }

    /// Native packages participating in the build, in discovery order
    ///
    /// A native package participates only if it is the core package itself
    /// or transitively depends on it.
    pub fn native_build_set(&self) -> Vec<&TrackedPackage> {
        self.iter()
            .filter(|p| p.is_native())
            .filter(|p| {
                p.manifest.name == defaults::CORE_PACKAGE
                    || self.depends_on_core(&p.manifest.name)
            })
            .collect()
    }

    /// Native build-set packages that `name` transitively depends on,
    /// in discovery order and excluding `name` itself
    pub fn native_dependencies_of(&self, name: &str) -> Vec<&TrackedPackage> {
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(name);

        while let Some(current) = queue.pop_front() {
            let Some(package) = self.get(current) else {
                continue;
            };
            for dependency in package.manifest.dependency_names() {
                if reachable.insert(dependency) {
                    queue.push_back(dependency);
                }
            }
        }

        self.native_build_set()
            .into_iter()
            .filter(|p| p.manifest.name != name && reachable.contains(p.manifest.name.as_str()))
            .collect()
    }
}

impl PartialEq for PackageCollection {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, deps: &[&str], native: bool, bundler: bool) -> TrackedPackage {
        let mut dependencies = serde_json::Map::new();
        for dep in deps {
            dependencies.insert((*dep).to_string(), serde_json::Value::String("*".into()));
        }
        TrackedPackage {
            manifest: PackageManifest {
                name: name.to_string(),
                main: None,
                dependencies,
                bundler,
            },
            package_folder: PathBuf::from("/packages").join(name),
            instructions: native.then(|| BuildInstructions {
                name: name.to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut c = PackageCollection::new();
        c.set("b", package("b", &[], false, false));
        c.set("a", package("a", &[], false, false));
        c.set("c", package("c", &[], false, false));

        let names: Vec<&str> = c.iter().map(|p| p.manifest.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut c = PackageCollection::new();
        c.set("a", package("a", &[], false, false));
        c.set("b", package("b", &[], false, false));
        c.set("a", package("a", &[], true, false));

        let names: Vec<&str> = c.iter().map(|p| p.manifest.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(c.get("a").unwrap().is_native());
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_get_core_requires_native_core() {
        let mut c = PackageCollection::new();
        assert!(c.get_core().is_err());

        c.set("@yaje/core", package("@yaje/core", &[], false, false));
        assert!(c.get_core().is_err());

        c.set("@yaje/core", package("@yaje/core", &[], true, false));
        assert!(c.get_core().is_ok());
    }

    #[test]
    fn test_get_bundler_returns_first() {
        let mut c = PackageCollection::new();
        assert!(c.get_bundler().is_err());

        c.set("app", package("app", &[], false, false));
        c.set("@yaje/vite", package("@yaje/vite", &[], false, true));
        c.set("@yaje/esbuild", package("@yaje/esbuild", &[], false, true));

        assert_eq!(c.get_bundler().unwrap().manifest.name, "@yaje/vite");
    }

    #[test]
    fn test_depends_on_core_transitive() {
        let mut c = PackageCollection::new();
        c.set("app", package("app", &["lib"], false, false));
        c.set("lib", package("lib", &["@yaje/core"], true, false));
        c.set("@yaje/core", package("@yaje/core", &[], true, false));
        c.set("styling", package("styling", &[], true, false));

        assert!(c.depends_on_core("app"));
        assert!(c.depends_on_core("lib"));
        assert!(!c.depends_on_core("styling"));
        assert!(!c.depends_on_core("@yaje/core"));
    }

    #[test]
    fn test_native_build_set_prunes_core_unreachable() {
        let mut c = PackageCollection::new();
        c.set("app", package("app", &["lib", "styling"], false, false));
        c.set("lib", package("lib", &["@yaje/core"], true, false));
        c.set("@yaje/core", package("@yaje/core", &[], true, false));
        c.set("styling", package("styling", &[], true, false));

        let names: Vec<&str> = c
            .native_build_set()
            .iter()
            .map(|p| p.manifest.name.as_str())
            .collect();
        assert_eq!(names, vec!["lib", "@yaje/core"]);
    }

    #[test]
    fn test_depends_on_core_tolerates_cycles() {
        let mut c = PackageCollection::new();
        c.set("a", package("a", &["b"], false, false));
        c.set("b", package("b", &["a"], false, false));

        assert!(!c.depends_on_core("a"));
    }

    #[test]
    fn test_native_dependencies_of_in_discovery_order() {
        let mut c = PackageCollection::new();
        c.set("app", package("app", &["fs", "net"], false, false));
        c.set("fs", package("fs", &["@yaje/core"], true, false));
        c.set("@yaje/core", package("@yaje/core", &[], true, false));
        c.set("net", package("net", &["@yaje/core", "fs"], true, false));

        let names: Vec<&str> = c
            .native_dependencies_of("net")
            .iter()
            .map(|p| p.manifest.name.as_str())
            .collect();
        assert_eq!(names, vec!["fs", "@yaje/core"]);

        assert!(c.native_dependencies_of("@yaje/core").is_empty());
    }
}
