//! Default configuration values

/// C compiler driver invoked for compile, embed, and link steps
pub const CLANG_BINARY: &str = "clang";

/// Archiver invoked to build per-module static libraries
pub const AR_BINARY: &str = "llvm-ar";

/// Environment variable overriding the C compiler binary
pub const ENV_CLANG: &str = "YAJE_CLANG";

/// Environment variable overriding the archiver binary
pub const ENV_AR: &str = "YAJE_LLVM_AR";

/// Output root created under the project directory
pub const OUTPUT_ROOT: &str = ".yaje";

/// Package manifest file name
pub const MANIFEST_FILE: &str = "package.json";

/// Declarative native build configuration file name
pub const BUILD_CONFIG_FILE: &str = "yaje.build.toml";

/// Name of the runtime support package every native module must reach
pub const CORE_PACKAGE: &str = "@yaje/core";

/// Symbol prefix of the embedded bundle object (`<prefix>_LENGTH`, `<prefix>_DATA`)
pub const BUNDLE_SYMBOL_PREFIX: &str = "JS_BUNDLE";

/// Entry point used when a manifest has no `main` field
pub const DEFAULT_ENTRY: &str = "index.js";

/// File name of the bundled JavaScript artifact under the gen folder
pub const BUNDLE_FILE: &str = "bundle.js";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
