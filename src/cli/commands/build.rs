//! Build command implementation
//!
//! Runs the full pipeline: package discovery, managed bundling, and the
//! native build, producing a standalone executable under the target
//! folder.

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::{self, status};
use crate::core::collection::PackageCollection;
use crate::core::discovery;
use crate::core::driver::BuildDriver;
use crate::core::layout::OutputLayout;
use crate::core::triple::TargetTriple;
use crate::infra::bundler;
use crate::infra::filesystem;
use crate::infra::toolchain::Toolchain;

/// Execute the build command
pub async fn execute(project_dir: &Path, target: &TargetTriple) -> Result<()> {
    tracing::info!("building for target {target}");

    let toolchain = Toolchain::probe()?;
    let layout = OutputLayout::new(project_dir, target);
    layout.ensure()?;

    let spinner = output::create_spinner("Discovering packages...");
    let mut collection = PackageCollection::new();
    let root_name = discovery::discover(project_dir, target, &mut collection)
        .context("Package discovery failed")?;
    spinner.finish_with_message(format!(
        "{} Discovered {} packages",
        status::SUCCESS,
        collection.len()
    ));

    let root = collection
        .get(&root_name)
        .expect("discovery inserts the root package");
    let entry_point = root.manifest.entry_point(&root.package_folder);
    let bundler_package = collection.get_bundler()?;

    let spinner = output::create_spinner(format!(
        "Bundling with {}...",
        bundler_package.manifest.name
    ).as_str());
    let gateway = bundler::load_bundler(bundler_package, &layout)?;
    gateway.init()?;
    let bundle_file = gateway.bundle(&entry_point)?;
    let bundle = filesystem::read_bytes(&bundle_file)?;
    spinner.finish_with_message(format!(
        "{} Bundled {} ({} bytes)",
        status::SUCCESS,
        entry_point.display(),
        bundle.len()
    ));

    // The runtime core must be present before any native work starts
    collection.get_core()?;

    let driver = BuildDriver::new(&collection, &layout, &toolchain, target);
    let executable = driver.run(&bundle).context("Native build failed")?;

    println!("{} Build complete!", status::SUCCESS);
    println!("  Target:     {target}");
    println!("  Executable: {}", executable.display());

    Ok(())
}
