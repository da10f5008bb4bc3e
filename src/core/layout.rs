//! Build output layout
//!
//! All build artifacts live under `<project>/.yaje/<targetTriple>/`:
//! per-module object files under `obj/`, static archives plus the bundle
//! and entry objects under `modules/`, generated sources and the bundled
//! JavaScript under `gen/`, and hash sidecars under `cache/`.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::triple::TargetTriple;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Derived output directories for one target
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    target_folder: PathBuf,
    obj_folder: PathBuf,
    mod_folder: PathBuf,
    gen_folder: PathBuf,
    cache_folder: PathBuf,
}

impl OutputLayout {
    /// Derive the layout for `project_dir` and `target`
    pub fn new(project_dir: &Path, target: &TargetTriple) -> Self {
        let target_folder = project_dir
            .join(defaults::OUTPUT_ROOT)
            .join(target.to_string());
        Self {
            obj_folder: target_folder.join("obj"),
            mod_folder: target_folder.join("modules"),
            gen_folder: target_folder.join("gen"),
            cache_folder: target_folder.join("cache"),
            target_folder,
        }
    }

    /// Create every directory; idempotent
    pub fn ensure(&self) -> Result<(), FilesystemError> {
        for dir in [
            &self.obj_folder,
            &self.mod_folder,
            &self.gen_folder,
            &self.cache_folder,
        ] {
            filesystem::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Root folder for this target
    pub fn target_folder(&self) -> &Path {
        &self.target_folder
    }

    /// Per-module object file root
    pub fn obj_folder(&self) -> &Path {
        &self.obj_folder
    }

    /// Static archives, bundle object, and entry object
    pub fn mod_folder(&self) -> &Path {
        &self.mod_folder
    }

    /// Generated sources and bundler output
    pub fn gen_folder(&self) -> &Path {
        &self.gen_folder
    }

    /// Hash sidecars
    pub fn cache_folder(&self) -> &Path {
        &self.cache_folder
    }

    /// Object directory of one module
    pub fn module_object_dir(&self, module: &str) -> PathBuf {
        self.obj_folder.join(module)
    }

    /// Sidecar directory of one module
    pub fn module_cache_dir(&self, module: &str) -> PathBuf {
        self.cache_folder.join(module)
    }

    /// Bundled JavaScript artifact
    pub fn bundle_file(&self) -> PathBuf {
        self.gen_folder.join(defaults::BUNDLE_FILE)
    }

    /// Embedded bundle object
    pub fn bundle_object(&self) -> PathBuf {
        self.mod_folder.join("bundle.o")
    }

    /// Bundle content hash sidecar
    pub fn bundle_sidecar(&self) -> PathBuf {
        self.cache_folder.join("bundle.hash")
    }

    /// Generated entry-point translation unit
    pub fn entry_source(&self) -> PathBuf {
        self.gen_folder.join("main.c")
    }

    /// Compiled entry-point object
    pub fn entry_object(&self) -> PathBuf {
        self.mod_folder.join("main.o")
    }

    /// Entry-point hash sidecar
    pub fn entry_sidecar(&self) -> PathBuf {
        self.cache_folder.join("main.hash")
    }

    /// Final executable (`a`, or `a.exe` on Windows targets)
    pub fn executable(&self, target: &TargetTriple) -> PathBuf {
        let name = if target.is_windows() { "a.exe" } else { "a" };
        self.target_folder.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let target = TargetTriple::new("x86_64", "unknown", "linux", "gnu");
        let layout = OutputLayout::new(Path::new("/proj"), &target);

        let base = PathBuf::from("/proj/.yaje/x86_64-unknown-linux-gnu");
        assert_eq!(layout.target_folder(), base.as_path());
        assert_eq!(layout.obj_folder(), base.join("obj").as_path());
        assert_eq!(layout.mod_folder(), base.join("modules").as_path());
        assert_eq!(layout.gen_folder(), base.join("gen").as_path());
        assert_eq!(layout.cache_folder(), base.join("cache").as_path());
        assert_eq!(layout.bundle_file(), base.join("gen/bundle.js"));
        assert_eq!(layout.entry_source(), base.join("gen/main.c"));
        assert_eq!(layout.executable(&target), base.join("a"));
    }

    #[test]
    fn test_executable_suffix_on_windows_targets() {
        let target = TargetTriple::new("x86_64", "pc", "windows", "msvc");
        let layout = OutputLayout::new(Path::new("/proj"), &target);
        assert!(layout.executable(&target).ends_with("a.exe"));
    }

    #[test]
    fn test_module_dirs_keyed_by_name() {
        let target = TargetTriple::new("x86_64", "unknown", "linux", "gnu");
        let layout = OutputLayout::new(Path::new("/proj"), &target);
        assert_eq!(
            layout.module_object_dir("@yaje/core"),
            layout.obj_folder().join("@yaje/core")
        );
        assert_eq!(
            layout.module_cache_dir("@yaje/core"),
            layout.cache_folder().join("@yaje/core")
        );
    }
}
