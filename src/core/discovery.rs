//! Package discovery
//!
//! Starting at the project root, walks declared dependencies depth-first in
//! manifest declaration order. Each package is processed at most once
//! (deduplicated by name before recursion), which makes dependency cycles
//! harmless; a back-edge closing a cycle is logged. Dependency directories
//! are resolved the node way: walking parent directories looking for
//! `node_modules/<name>`.

use std::path::{Path, PathBuf};

use crate::core::collection::{PackageCollection, TrackedPackage};
use crate::core::instructions::BuildInstructions;
use crate::core::manifest::PackageManifest;
use crate::core::triple::TargetTriple;
use crate::error::{DiscoveryError, FilesystemError, YajeError};

/// Discover the package tree rooted at `root` into `collection`
///
/// Returns the root package name. The collection is populated in discovery
/// order: a package is inserted before its dependencies are visited.
pub fn discover(
    root: &Path,
    target: &TargetTriple,
    collection: &mut PackageCollection,
) -> Result<String, YajeError> {
    let root = std::fs::canonicalize(root).map_err(|e| {
        YajeError::Filesystem(FilesystemError::ReadFile {
            path: root.to_path_buf(),
            error: e.to_string(),
        })
    })?;

    let mut stack = Vec::new();
    visit(&root, target, collection, &mut stack)
}

fn visit(
    folder: &Path,
    target: &TargetTriple,
    collection: &mut PackageCollection,
    stack: &mut Vec<String>,
) -> Result<String, YajeError> {
    let manifest = PackageManifest::load(folder)?;
    let name = manifest.name.clone();

    if collection.has(&name) {
        return Ok(name);
    }

    tracing::debug!("discovered package '{}' at {}", name, folder.display());

    let mut package = TrackedPackage {
        manifest,
        package_folder: folder.to_path_buf(),
        instructions: None,
    };
    collection.set(&name, package.clone());

    if BuildInstructions::config_path(folder).is_file() {
        let instructions = BuildInstructions::load(&name, folder, target)?;
        tracing::debug!(
            "package '{}' is native ({} sources, {} loading functions)",
            name,
            instructions.sources.len(),
            instructions.loading_functions.len()
        );
        package.instructions = Some(instructions);
        collection.set(&name, package.clone());
    }

    stack.push(name.clone());
    let dependency_names: Vec<String> = package
        .manifest
        .dependency_names()
        .map(str::to_string)
        .collect();
    for dependency in dependency_names {
        if collection.has(&dependency) {
            if stack.iter().any(|n| n == &dependency) {
                tracing::warn!(
                    "dependency cycle: '{}' depends back on '{}'",
                    name,
                    dependency
                );
            }
            continue;
        }
        let dependency_folder = resolve_package_folder(folder, &name, &dependency)?;
        visit(&dependency_folder, target, collection, stack)?;
    }
    stack.pop();

    Ok(name)
}

/// Resolve a dependency directory by walking parent directories looking for
/// `node_modules/<name>`
fn resolve_package_folder(
    from: &Path,
    package: &str,
    dependency: &str,
) -> Result<PathBuf, DiscoveryError> {
    let mut current = Some(from);
    while let Some(dir) = current {
        let candidate = dir.join("node_modules").join(dependency);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        current = dir.parent();
    }

    Err(DiscoveryError::UnresolvedDependency {
        package: package.to_string(),
        dependency: dependency.to_string(),
    })
}
