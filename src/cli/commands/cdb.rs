//! Cdb command implementation
//!
//! Generates a compile_commands.json covering every native translation
//! unit, using the same discovery graph and argument assembly as the
//! build.

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::status;
use crate::core::cdb;
use crate::core::collection::PackageCollection;
use crate::core::discovery;
use crate::core::layout::OutputLayout;
use crate::core::triple::TargetTriple;
use crate::infra::filesystem;

/// Execute the cdb command
pub async fn execute(
    project_dir: &Path,
    target: &TargetTriple,
    output: Option<String>,
) -> Result<()> {
    let mut collection = PackageCollection::new();
    discovery::discover(project_dir, target, &mut collection)
        .context("Package discovery failed")?;

    let layout = OutputLayout::new(project_dir, target);
    let commands = cdb::generate(&collection, &layout, target);

    let path = match output {
        Some(output) => project_dir.join(output),
        None => project_dir.join("compile_commands.json"),
    };
    let json = serde_json::to_string_pretty(&commands)?;
    filesystem::write_file(&path, json.as_bytes())?;

    println!(
        "{} Wrote {} compile commands to {}",
        status::SUCCESS,
        commands.len(),
        path.display()
    );

    Ok(())
}
