//! Compilation database generation
//!
//! Emits `compile_commands.json` entries for every native translation unit
//! using the same argument assembly as the build, so editors and language
//! servers see exactly what the compiler will see. Works without a
//! runtime core package: the generated entry point is simply omitted.

use serde::Serialize;

use crate::core::args;
use crate::core::collection::{PackageCollection, TrackedPackage};
use crate::core::entry;
use crate::core::instructions::BuildInstructions;
use crate::core::layout::OutputLayout;
use crate::core::triple::TargetTriple;
use crate::infra::toolchain;

/// One compilation database entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompileCommand {
    /// Working directory the arguments are relative to
    pub directory: String,
    /// Full argument vector, compiler binary first
    pub arguments: Vec<String>,
    /// Source file
    pub file: String,
    /// Object file the unit compiles to
    pub output: String,
}

/// Generate compilation database entries for every native module
pub fn generate(
    collection: &PackageCollection,
    layout: &OutputLayout,
    target: &TargetTriple,
) -> Vec<CompileCommand> {
    let clang = toolchain::clang_binary();
    let modules = participating_modules(collection);
    let base = args::base_cflags(target);

    let mut commands = Vec::new();
    for package in &modules {
        let instructions = package
            .instructions
            .as_ref()
            .expect("participating modules are native");
        let deps: Vec<&BuildInstructions> = collection
            .native_dependencies_of(&package.manifest.name)
            .into_iter()
            .filter_map(|p| p.instructions.as_ref())
            .collect();
        let compile_args = args::assemble(instructions, &deps, &base);
        let object_dir = layout.module_object_dir(&instructions.name);

        for (source, stem) in instructions.object_stems() {
            let object = object_dir.join(format!("{stem}.o"));
            let mut arguments = vec![clang.clone()];
            arguments.extend(compile_args.iter().cloned());
            arguments.push(source.display().to_string());
            arguments.push("-o".to_string());
            arguments.push(object.display().to_string());

            commands.push(CompileCommand {
                directory: package.package_folder.display().to_string(),
                arguments,
                file: source.display().to_string(),
                output: object.display().to_string(),
            });
        }
    }

    // The generated entry point needs the core include directories; without
    // a core package the database is still useful, so it is just skipped.
    if let Ok(core) = collection.get_core() {
        let core_includes = &core
            .instructions
            .as_ref()
            .expect("core package is native")
            .include_dirs;
        let entry_source = layout.entry_source();
        let mut arguments = vec![clang.clone()];
        arguments.extend(entry::entry_cflags(core_includes, target));
        arguments.push(entry_source.display().to_string());
        arguments.push("-o".to_string());
        arguments.push(layout.entry_object().display().to_string());

        commands.push(CompileCommand {
            directory: core.package_folder.display().to_string(),
            arguments,
            file: entry_source.display().to_string(),
            output: layout.entry_object().display().to_string(),
        });
    } else {
        tracing::debug!("no core package; omitting entry point from compilation database");
    }

    commands
}

/// Native modules included in the database
///
/// Mirrors the build's pruning when a core package is present; without one
/// every native module is included.
fn participating_modules(collection: &PackageCollection) -> Vec<&TrackedPackage> {
    if collection.get_core().is_ok() {
        collection.native_build_set()
    } else {
        collection.iter().filter(|p| p.is_native()).collect()
    }
}
