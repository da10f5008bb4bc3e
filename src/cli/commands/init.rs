//! Init command implementation
//!
//! Scaffolds a new yaje project: a package.json manifest and a minimal
//! entry module.

use anyhow::{bail, Result};
use std::path::Path;

use crate::cli::output::status;
use crate::config::defaults;
use crate::core::init;
use crate::infra::filesystem;

/// Execute the init command
pub async fn execute(project_dir: &Path, force: bool) -> Result<()> {
    let manifest_path = project_dir.join(defaults::MANIFEST_FILE);
    if manifest_path.exists() && !force {
        bail!(
            "'{}' already exists. Use --force to overwrite it.",
            manifest_path.display()
        );
    }

    let name = init::project_name_from_dir(project_dir);
    filesystem::write_file(
        &manifest_path,
        init::generate_manifest_content(&name).as_bytes(),
    )?;

    let entry_path = project_dir.join("src").join("index.js");
    if !entry_path.exists() || force {
        filesystem::write_file(&entry_path, init::generate_entry_content(&name).as_bytes())?;
    }

    println!("{} Initialized project '{name}'", status::SUCCESS);
    println!("  Manifest: {}", manifest_path.display());
    println!("  Entry:    {}", entry_path.display());
    println!("\nInstall the dependencies (npm install) and run 'yaje build'.");

    Ok(())
}
