//! Error types for yaje
//!
//! Domain-specific error types using thiserror. The taxonomy is closed:
//! environment, discovery, configuration, tool invocation, bundling, and
//! filesystem failures. Every build failure is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Environment errors (missing tools, bad target triples)
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// Required external tool missing from PATH
    #[error("Required tool '{tool}' not found in PATH. {suggestion}")]
    ToolMissing { tool: String, suggestion: String },

    /// Target triple string could not be parsed
    #[error("Cannot parse target triple '{value}' (expected 2, 3, or 4 hyphenated parts)")]
    UnparseableTriple { value: String },
}

/// Package discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// No package.json at the expected location
    #[error("Manifest not found at '{path}'")]
    ManifestMissing { path: PathBuf },

    /// package.json exists but is not valid JSON
    #[error("Failed to parse manifest '{path}': {error}")]
    ManifestParse { path: PathBuf, error: String },

    /// Dependency cannot be located in any enclosing node_modules
    #[error("Cannot resolve dependency '{dependency}' of '{package}': no enclosing node_modules/{dependency}")]
    UnresolvedDependency { package: String, dependency: String },

    /// The collection holds no native package named @yaje/core
    #[error("No native package named '@yaje/core' in the dependency graph")]
    CoreMissing,

    /// The collection holds no package flagged as a bundler
    #[error("No bundler package in the dependency graph. Add one (e.g. @yaje/vite) to the dependencies")]
    BundlerMissing,
}

/// Build configuration (yaje.build.toml) errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Build configuration file is not valid TOML
    #[error("Failed to parse build configuration '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// A configured path does not exist on disk
    #[error("Path '{path}' referenced by '{file}' does not exist")]
    PathNotFound { file: PathBuf, path: PathBuf },

    /// A configured directory path points at something else
    #[error("Path '{path}' referenced by '{file}' is not a directory")]
    NotADirectory { file: PathBuf, path: PathBuf },

    /// Macro value is not a string, integer, or `true`
    #[error("Macro '{name}' has unsupported value kind '{kind}' (expected string, integer, or true)")]
    MacroValueKind { name: String, kind: String },

    /// Loading function is not a valid C identifier
    #[error("Loading function '{name}' is not a valid C identifier")]
    InvalidLoadingFunction { name: String },

    /// Conditional block predicate could not be parsed
    #[error("Invalid predicate '{expression}': {message}")]
    Predicate { expression: String, message: String },
}

/// External tool invocation errors (compiler, archiver, linker, embedder)
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool process could not be spawned at all
    #[error("Failed to spawn '{tool}': {error}")]
    Spawn { tool: String, error: String },

    /// C compiler exited non-zero for a translation unit
    #[error("Compilation of '{source_file}' failed\n  command: {command}\n{stderr}")]
    CompileFailed {
        source_file: PathBuf,
        command: String,
        stderr: String,
    },

    /// Archiver exited non-zero
    #[error("Archiving '{archive}' failed: {stderr}")]
    ArchiveFailed { archive: PathBuf, stderr: String },

    /// Linker exited non-zero
    #[error("Link failed\n  command: {command}\n{stderr}")]
    LinkFailed { command: String, stderr: String },

    /// Bundle embedding compile exited non-zero
    #[error("Embedding bundle object failed: {stderr}")]
    EmbedFailed { stderr: String },
}

/// Managed bundling errors
#[derive(Error, Debug)]
pub enum BundleError {
    /// The bundler package name maps to no known implementation
    #[error("Package '{package}' does not map to a known bundler (vite, rollup, webpack, esbuild)")]
    UnknownBundler { package: String },

    /// Bundler initialization failed
    #[error("Bundler initialization failed: {message}")]
    Init { message: String },

    /// Bundler failed while producing the bundle
    #[error("Bundling '{entry}' failed: {message}")]
    Bundle { entry: PathBuf, message: String },

    /// The bundler produced a number of .js artifacts other than one
    #[error("Bundler produced {found} JavaScript artifacts in '{dir}' (expected exactly 1)")]
    ArtifactCount { dir: PathBuf, found: usize },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to remove file
    #[error("Failed to remove file '{path}': {error}")]
    RemoveFile { path: PathBuf, error: String },
}

/// Top-level yaje error type
#[derive(Error, Debug)]
pub enum YajeError {
    /// Environment error
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool invocation error
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Bundling error
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
