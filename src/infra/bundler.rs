//! Managed bundling gateway
//!
//! A package advertising `"bundler": true` in its manifest selects one of
//! the known bundler implementations by name. Each implementation shells
//! out to the corresponding Node CLI through `npx` and must produce a
//! single ES-module chunk with inlined dynamic imports, no minification,
//! and no sourcemaps. The gateway enforces the artifact contract: exactly
//! one `.js` file, at `<gen>/bundle.js`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::defaults;
use crate::core::collection::TrackedPackage;
use crate::core::layout::OutputLayout;
use crate::error::BundleError;
use crate::infra::filesystem;

/// Capability interface every bundler fulfills
pub trait Bundler: std::fmt::Debug {
    /// Verify the bundler can run in this environment
    fn init(&self) -> Result<(), BundleError>;

    /// Bundle `entry` into a single ES module, returning the artifact path
    fn bundle(&self, entry: &Path) -> Result<PathBuf, BundleError>;
}

/// Select the bundler implementation advertised by `package`
///
/// The trailing segment of the package name picks the implementation:
/// `@yaje/vite` selects Vite, `@yaje/esbuild` selects esbuild, and so on.
pub fn load_bundler(
    package: &TrackedPackage,
    layout: &OutputLayout,
) -> Result<Box<dyn Bundler>, BundleError> {
    let name = &package.manifest.name;
    let short = name.rsplit('/').next().unwrap_or(name);
    let gen_folder = layout.gen_folder().to_path_buf();

    match short {
        "vite" => Ok(Box::new(ViteBundler { gen_folder })),
        "rollup" => Ok(Box::new(RollupBundler { gen_folder })),
        "webpack" => Ok(Box::new(WebpackBundler { gen_folder })),
        "esbuild" => Ok(Box::new(EsbuildBundler { gen_folder })),
        _ => Err(BundleError::UnknownBundler {
            package: name.clone(),
        }),
    }
}

/// Vite-backed bundler; materializes a config file under the gen folder
#[derive(Debug)]
pub struct ViteBundler {
    gen_folder: PathBuf,
}

/// Rollup-backed bundler; driven entirely by CLI flags
#[derive(Debug)]
pub struct RollupBundler {
    gen_folder: PathBuf,
}

/// Webpack-backed bundler; materializes a config file under the gen folder
#[derive(Debug)]
pub struct WebpackBundler {
    gen_folder: PathBuf,
}

/// esbuild-backed bundler; driven entirely by CLI flags
#[derive(Debug)]
pub struct EsbuildBundler {
    gen_folder: PathBuf,
}

impl Bundler for ViteBundler {
    fn init(&self) -> Result<(), BundleError> {
        probe_npx()
    }

    fn bundle(&self, entry: &Path) -> Result<PathBuf, BundleError> {
        let config = self.gen_folder.join("vite.config.mjs");
        let content = format!(
            r#"import {{ defineConfig }} from "vite";

export default defineConfig({{
    logLevel: "warn",
    build: {{
        outDir: "{out}",
        emptyOutDir: false,
        minify: false,
        sourcemap: false,
        lib: {{
            entry: "{entry}",
            formats: ["es"],
            fileName: () => "{bundle}",
        }},
        rollupOptions: {{
            output: {{ inlineDynamicImports: true }},
        }},
    }},
}});
"#,
            out = display_forward(&self.gen_folder),
            entry = display_forward(entry),
            bundle = defaults::BUNDLE_FILE,
        );
        filesystem::write_file(&config, content.as_bytes()).map_err(|e| BundleError::Bundle {
            entry: entry.to_path_buf(),
            message: e.to_string(),
        })?;

        run_npx(
            entry,
            &["vite", "build", "--config", &config.display().to_string()],
        )?;
        expect_single_artifact(&self.gen_folder)
    }
}

impl Bundler for RollupBundler {
    fn init(&self) -> Result<(), BundleError> {
        probe_npx()
    }

    fn bundle(&self, entry: &Path) -> Result<PathBuf, BundleError> {
        let outfile = self.gen_folder.join(defaults::BUNDLE_FILE);
        run_npx(
            entry,
            &[
                "rollup",
                &entry.display().to_string(),
                "--format",
                "es",
                "--file",
                &outfile.display().to_string(),
                "--inlineDynamicImports",
                "--silent",
            ],
        )?;
        expect_single_artifact(&self.gen_folder)
    }
}

impl Bundler for WebpackBundler {
    fn init(&self) -> Result<(), BundleError> {
        probe_npx()
    }

    fn bundle(&self, entry: &Path) -> Result<PathBuf, BundleError> {
        let config = self.gen_folder.join("webpack.config.cjs");
        let content = format!(
            r#"module.exports = {{
    mode: "none",
    entry: "{entry}",
    output: {{
        path: "{out}",
        filename: "{bundle}",
        library: {{ type: "module" }},
    }},
    experiments: {{ outputModule: true }},
    devtool: false,
    optimization: {{ minimize: false }},
}};
"#,
            entry = display_forward(entry),
            out = display_forward(&self.gen_folder),
            bundle = defaults::BUNDLE_FILE,
        );
        filesystem::write_file(&config, content.as_bytes()).map_err(|e| BundleError::Bundle {
            entry: entry.to_path_buf(),
            message: e.to_string(),
        })?;

        run_npx(
            entry,
            &["webpack", "--config", &config.display().to_string()],
        )?;
        expect_single_artifact(&self.gen_folder)
    }
}

impl Bundler for EsbuildBundler {
    fn init(&self) -> Result<(), BundleError> {
        probe_npx()
    }

    fn bundle(&self, entry: &Path) -> Result<PathBuf, BundleError> {
        let outfile = self.gen_folder.join(defaults::BUNDLE_FILE);
        run_npx(
            entry,
            &[
                "esbuild",
                &entry.display().to_string(),
                "--bundle",
                "--format=esm",
                &format!("--outfile={}", outfile.display()),
            ],
        )?;
        expect_single_artifact(&self.gen_folder)
    }
}

/// Verify `npx` is available
fn probe_npx() -> Result<(), BundleError> {
    let output = Command::new("npx").arg("--version").output();
    match output {
        Ok(output) if output.status.success() => Ok(()),
        _ => Err(BundleError::Init {
            message: "npx not found in PATH; a Node.js installation is required for bundling"
                .to_string(),
        }),
    }
}

/// Run a bundler CLI through npx, surfacing stderr on failure
fn run_npx(entry: &Path, args: &[&str]) -> Result<(), BundleError> {
    tracing::debug!("running npx {}", args.join(" "));
    let output = Command::new("npx")
        .arg("--yes")
        .args(args)
        .output()
        .map_err(|e| BundleError::Bundle {
            entry: entry.to_path_buf(),
            message: format!("failed to spawn npx: {e}"),
        })?;

    if !output.status.success() {
        return Err(BundleError::Bundle {
            entry: entry.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Enforce the artifact contract: exactly one `.js` file, named bundle.js
fn expect_single_artifact(gen_folder: &Path) -> Result<PathBuf, BundleError> {
    let artifacts: Vec<PathBuf> = std::fs::read_dir(gen_folder)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "js"))
                .collect()
        })
        .unwrap_or_default();

    let expected = gen_folder.join(defaults::BUNDLE_FILE);
    if artifacts.len() == 1 && artifacts[0] == expected {
        Ok(expected)
    } else {
        Err(BundleError::ArtifactCount {
            dir: gen_folder.to_path_buf(),
            found: artifacts.len(),
        })
    }
}

/// Render a path with forward slashes for embedding in generated JS configs
fn display_forward(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
