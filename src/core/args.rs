//! Compiler argument assembly
//!
//! Produces the ordered argument vector for compiling one module's
//! translation units: include directories and macro definitions of every
//! dependency followed by the module's own, the module's library search
//! paths, its extra compiler flags, and finally the base flag set.

use crate::core::instructions::BuildInstructions;
use crate::core::triple::TargetTriple;

/// Warning suppressions appended to every compile
const WARNING_SUPPRESSIONS: &[&str] = &[
    "-Wno-unused-parameter",
    "-Wno-unused-command-line-argument",
    "-Wno-gnu-zero-variadic-macro-arguments",
];

/// Base compile flags for a target
pub fn base_cflags(target: &TargetTriple) -> Vec<String> {
    let mut flags: Vec<String> = [
        "-std=gnu11",
        "-Wall",
        "-Wextra",
        "-Wformat=2",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    flags.extend(WARNING_SUPPRESSIONS.iter().map(|s| s.to_string()));
    flags.extend(
        ["-fwrapv", "-funsigned-char", "-g", "-target"]
            .iter()
            .map(|s| s.to_string()),
    );
    flags.push(target.to_string());
    flags.push("-c".to_string());
    flags
}

/// Base link flags
pub fn base_lflags() -> Vec<String> {
    vec!["-g".to_string()]
}

/// Assemble the compile argument vector for `module` against its native
/// dependency set `deps`
///
/// Order is deterministic: for each dependency (in discovery order) and
/// then the module itself, `-I` directories followed by `-D` macros; then
/// the module's `-L` lookup directories and extra cflags; then `base`.
pub fn assemble(
    module: &BuildInstructions,
    deps: &[&BuildInstructions],
    base: &[String],
) -> Vec<String> {
    let mut args = Vec::new();

    for instructions in deps.iter().copied().chain(std::iter::once(module)) {
        for dir in &instructions.include_dirs {
            args.push("-I".to_string());
            args.push(dir.display().to_string());
        }
        for (name, value) in &instructions.define_macros {
            args.push("-D".to_string());
            args.push(value.render(name));
        }
    }

    for dir in &module.library_lookup {
        args.push("-L".to_string());
        args.push(dir.display().to_string());
    }

    args.extend(module.cflags.iter().cloned());
    args.extend(base.iter().cloned());
    args
}
