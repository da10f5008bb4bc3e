//! Native build driver
//!
//! Coordinates the native half of the build: per-module incremental
//! compilation and archiving, bundle embedding, entry-point generation,
//! and the final link. Phases run sequentially; incremental decisions live
//! at the object layer, keyed by hash sidecars, while archiving and
//! linking always re-run.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::args;
use crate::core::collection::PackageCollection;
use crate::core::entry;
use crate::core::instructions::BuildInstructions;
use crate::core::layout::OutputLayout;
use crate::core::triple::TargetTriple;
use crate::error::YajeError;
use crate::infra::filesystem;
use crate::infra::hash;
use crate::infra::toolchain::Toolchain;

/// Driver over one package collection, layout, and toolchain
pub struct BuildDriver<'a> {
    collection: &'a PackageCollection,
    layout: &'a OutputLayout,
    toolchain: &'a Toolchain,
    target: &'a TargetTriple,
}

impl<'a> BuildDriver<'a> {
    /// Create a driver; the layout directories must already exist
    pub fn new(
        collection: &'a PackageCollection,
        layout: &'a OutputLayout,
        toolchain: &'a Toolchain,
        target: &'a TargetTriple,
    ) -> Self {
        Self {
            collection,
            layout,
            toolchain,
            target,
        }
    }

    /// Run the native build phases and return the executable path
    pub fn run(&self, bundle: &[u8]) -> Result<PathBuf, YajeError> {
        let modules = self.collection.native_build_set();
        tracing::info!("building {} native modules", modules.len());

        let mut archives = Vec::with_capacity(modules.len());
        for package in &modules {
            let instructions = package
                .instructions
                .as_ref()
                .expect("native build set only holds native packages");
            let deps: Vec<&BuildInstructions> = self
                .collection
                .native_dependencies_of(&package.manifest.name)
                .into_iter()
                .filter_map(|p| p.instructions.as_ref())
                .collect();
            archives.push(self.compile_module(instructions, &deps)?);
        }

        let bundle_object = self.embed_bundle(bundle)?;

        let core = self.collection.get_core()?;
        let core_includes = core
            .instructions
            .as_ref()
            .expect("core package is native")
            .include_dirs
            .clone();
        let loading_functions: Vec<String> = modules
            .iter()
            .filter_map(|p| p.instructions.as_ref())
            .flat_map(|i| i.loading_functions.iter().cloned())
            .collect();
        let entry_object = self.build_entry(&loading_functions, &core_includes)?;

        let module_instructions: Vec<&BuildInstructions> = modules
            .iter()
            .filter_map(|p| p.instructions.as_ref())
            .collect();
        self.link(&archives, &bundle_object, &entry_object, &module_instructions)
    }

    /// Compile one module's translation units and archive the objects
    ///
    /// Unchanged units (same source, headers, and arguments) are skipped;
    /// the archive is recreated unconditionally.
    fn compile_module(
        &self,
        instructions: &BuildInstructions,
        deps: &[&BuildInstructions],
    ) -> Result<PathBuf, YajeError> {
        tracing::info!("compiling module {}", instructions.name);

        let compile_args = args::assemble(instructions, deps, &args::base_cflags(self.target));
        let object_dir = self.layout.module_object_dir(&instructions.name);
        let cache_dir = self.layout.module_cache_dir(&instructions.name);
        filesystem::create_dir_all(&object_dir)?;
        filesystem::create_dir_all(&cache_dir)?;

        let mut objects = Vec::new();
        for (source, stem) in instructions.object_stems() {
            let object = object_dir.join(format!("{stem}.o"));
            let sidecar = cache_dir.join(format!("{stem}.hash"));

            let header_deps = self.toolchain.scan_dependencies(&compile_args, &source);
            let unit_hash = hash::unit_hash(&compile_args, &source, &header_deps)?;

            let fresh = object.exists()
                && hash::read_sidecar(&sidecar).as_deref() == Some(unit_hash.as_str());
            if fresh {
                tracing::debug!("{} is up to date", object.display());
            } else {
                tracing::debug!("compiling {}", source.display());
                self.toolchain.compile(&compile_args, &source, &object)?;
                hash::write_sidecar(&sidecar, &unit_hash)?;
            }
            objects.push(object);
        }

        let digest = hash::short_path_digest(&object_dir);
        let archive = self.layout.mod_folder().join(format!("lib_{digest}.a"));
        self.toolchain.archive(&objects, &archive)?;
        Ok(archive)
    }

    /// Embed the bundle bytes as a C object, skipping when unchanged
    fn embed_bundle(&self, bundle: &[u8]) -> Result<PathBuf, YajeError> {
        let object = self.layout.bundle_object();
        let sidecar = self.layout.bundle_sidecar();
        let bundle_hash = hash::content_hash(bundle);

        if object.exists() && hash::read_sidecar(&sidecar).as_deref() == Some(bundle_hash.as_str()) {
            tracing::debug!("embedded bundle is up to date");
            return Ok(object);
        }

        tracing::info!("embedding bundle ({} bytes)", bundle.len());
        self.toolchain.embed(
            bundle,
            defaults::BUNDLE_SYMBOL_PREFIX,
            self.target,
            &[],
            &object,
        )?;
        hash::write_sidecar(&sidecar, &bundle_hash)?;
        Ok(object)
    }

    /// Generate and compile the entry point, with the same hash discipline
    /// as module units
    fn build_entry(
        &self,
        loading_functions: &[String],
        core_includes: &[PathBuf],
    ) -> Result<PathBuf, YajeError> {
        let source = self.layout.entry_source();
        filesystem::write_file(&source, entry::render_entry_point(loading_functions).as_bytes())?;

        let compile_args = entry::entry_cflags(core_includes, self.target);
        let header_deps = self.toolchain.scan_dependencies(&compile_args, &source);
        let unit_hash = hash::unit_hash(&compile_args, &source, &header_deps)?;

        let object = self.layout.entry_object();
        let sidecar = self.layout.entry_sidecar();
        let fresh = object.exists()
            && hash::read_sidecar(&sidecar).as_deref() == Some(unit_hash.as_str());
        if fresh {
            tracing::debug!("entry point is up to date");
        } else {
            tracing::info!("compiling entry point");
            self.toolchain.compile(&compile_args, &source, &object)?;
            hash::write_sidecar(&sidecar, &unit_hash)?;
        }
        Ok(object)
    }

    /// Link archives, bundle object, and entry object into the executable
    fn link(
        &self,
        archives: &[PathBuf],
        bundle_object: &Path,
        entry_object: &Path,
        modules: &[&BuildInstructions],
    ) -> Result<PathBuf, YajeError> {
        let mut inputs: Vec<PathBuf> = archives.to_vec();
        inputs.push(bundle_object.to_path_buf());
        inputs.push(entry_object.to_path_buf());

        let mut flags = args::base_lflags();
        for instructions in modules {
            for dir in &instructions.library_lookup {
                flags.push("-L".to_string());
                flags.push(dir.display().to_string());
            }
            flags.extend(instructions.lflags.iter().cloned());
        }
        for instructions in modules {
            for library in &instructions.link_libraries {
                let flag = format!("-l{library}");
                if !flags.contains(&flag) {
                    flags.push(flag);
                }
            }
        }

        let executable = self.layout.executable(self.target);
        tracing::info!("linking {}", executable.display());
        self.toolchain.link(&inputs, &flags, &executable)?;
        Ok(executable)
    }
}
