//! Native build configuration (yaje.build.toml) parsing
//!
//! A package becomes a native module by carrying a declarative
//! `yaje.build.toml`. The base `[native]` section and every matching
//! `[[when]]` conditional block are folded, in declaration order, into a
//! frozen [`BuildInstructions`] value describing sources, include
//! directories, macros, libraries, loading functions, and extra flags.
//!
//! ```toml
//! [native]
//! sources = ["native", { path = "src/c", recursive = true }]
//! include-dirs = ["native/include"]
//! loading-functions = ["js_fs_init"]
//!
//! [native.defines]
//! FS_BUFSZ = 4096
//!
//! [[when]]
//! cond = 'platform == "windows"'
//! [when.native]
//! link-libraries = ["ws2_32"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::defaults;
use crate::core::predicate::Predicate;
use crate::core::triple::TargetTriple;
use crate::error::ConfigError;

/// Value of a preprocessor macro definition
#[derive(Debug, Clone, PartialEq)]
pub enum MacroValue {
    /// Name-only definition (`-D NAME`)
    Flag,
    /// Numeric definition (`-D NAME=4096`)
    Number(i64),
    /// String definition (`-D NAME="text"`)
    Text(String),
}

impl MacroValue {
    /// Serialize as the value handed to `-D`
    pub fn render(&self, name: &str) -> String {
        match self {
            MacroValue::Flag => name.to_string(),
            MacroValue::Number(n) => format!("{name}={n}"),
            MacroValue::Text(s) => format!("{name}=\"{s}\""),
        }
    }
}

/// Frozen native-build description for one module
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildInstructions {
    /// Package name (unique key)
    pub name: String,
    /// Absolute paths of the C translation units, in configuration order
    pub sources: Vec<PathBuf>,
    /// Absolute include directories
    pub include_dirs: Vec<PathBuf>,
    /// Macro definitions in declaration order
    pub define_macros: Vec<(String, MacroValue)>,
    /// Library search directories (`-L`)
    pub library_lookup: Vec<PathBuf>,
    /// Plain library names (`-l<name>`)
    pub link_libraries: Vec<String>,
    /// C symbols invoked at runtime initialization, in configuration order
    pub loading_functions: Vec<String>,
    /// Module-local extra compiler flags
    pub cflags: Vec<String>,
    /// Module-local extra linker flags
    pub lflags: Vec<String>,
}

/// A source entry: either a bare path or a path with a recursive flag
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SourceSpec {
    Plain(String),
    Detailed {
        path: String,
        #[serde(default)]
        recursive: bool,
    },
}

impl SourceSpec {
    fn parts(&self) -> (&str, bool) {
        match self {
            SourceSpec::Plain(path) => (path, false),
            SourceSpec::Detailed { path, recursive } => (path, *recursive),
        }
    }
}

/// One configuration section, base or conditional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct NativeSection {
    #[serde(default)]
    sources: Vec<SourceSpec>,
    #[serde(default)]
    include_dirs: Vec<String>,
    #[serde(default)]
    defines: toml::map::Map<String, toml::Value>,
    #[serde(default)]
    library_lookup: Vec<String>,
    #[serde(default)]
    link_libraries: Vec<String>,
    #[serde(default)]
    loading_functions: Vec<String>,
    #[serde(default)]
    cflags: Vec<String>,
    #[serde(default)]
    lflags: Vec<String>,
}

/// A `[[when]]` block gated by a platform predicate
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionalSection {
    cond: String,
    #[serde(default)]
    native: NativeSection,
}

/// Top-level structure of yaje.build.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildConfig {
    #[serde(default)]
    native: NativeSection,
    #[serde(default)]
    when: Vec<ConditionalSection>,
}

impl BuildInstructions {
    /// Path of the build configuration file inside a package folder
    pub fn config_path(folder: &Path) -> PathBuf {
        folder.join(defaults::BUILD_CONFIG_FILE)
    }

    /// Load and evaluate the build configuration of the package rooted at
    /// `folder`, against `target`
    ///
    /// Applies the base `[native]` section, then every `[[when]]` block
    /// whose predicate holds for the target, in declaration order.
    pub fn load(
        name: &str,
        folder: &Path,
        target: &TargetTriple,
    ) -> Result<Self, ConfigError> {
        let file = Self::config_path(folder);
        let content = std::fs::read_to_string(&file).map_err(|e| ConfigError::Parse {
            path: file.clone(),
            error: e.to_string(),
        })?;
        let config: BuildConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: file.clone(),
            error: e.to_string(),
        })?;

        let mut instructions = BuildInstructions {
            name: name.to_string(),
            ..Default::default()
        };

        instructions.apply(&config.native, folder, &file)?;
        for block in &config.when {
            let predicate = Predicate::parse(&block.cond)?;
            if predicate.eval(target) {
                instructions.apply(&block.native, folder, &file)?;
            } else {
                tracing::debug!(
                    "skipping conditional block '{}' for {} (target {})",
                    block.cond,
                    name,
                    target
                );
            }
        }

        Ok(instructions)
    }

    /// Sources paired with their disambiguated object stems
    ///
    /// Duplicate basenames across directories get a running counter suffix
    /// so their object files do not collide.
    pub fn object_stems(&self) -> Vec<(PathBuf, String)> {
        let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        self.sources
            .iter()
            .map(|source| {
                let stem = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "unit".to_string());
                let count = seen.entry(stem.clone()).or_insert(0);
                let disambiguated = if *count == 0 {
                    stem.clone()
                } else {
                    format!("{stem}_{count}")
                };
                *count += 1;
                (source.clone(), disambiguated)
            })
            .collect()
    }

    fn apply(
        &mut self,
        section: &NativeSection,
        folder: &Path,
        file: &Path,
    ) -> Result<(), ConfigError> {
        for spec in &section.sources {
            let (raw, recursive) = spec.parts();
            let path = resolve_existing(folder, raw, file)?;
            if path.is_dir() {
                for unit in collect_c_files(&path, recursive) {
                    push_unique_path(&mut self.sources, unit);
                }
            } else {
                push_unique_path(&mut self.sources, path);
            }
        }

        for raw in &section.include_dirs {
            let dir = resolve_directory(folder, raw, file)?;
            push_unique_path(&mut self.include_dirs, dir);
        }

        for (name, value) in &section.defines {
            let value = match value {
                toml::Value::String(s) => MacroValue::Text(s.clone()),
                toml::Value::Integer(n) => MacroValue::Number(*n),
                toml::Value::Boolean(true) => MacroValue::Flag,
                other => {
                    return Err(ConfigError::MacroValueKind {
                        name: name.clone(),
                        kind: other.type_str().to_string(),
                    })
                }
            };
            match self.define_macros.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = value,
                None => self.define_macros.push((name.clone(), value)),
            }
        }

        for raw in &section.library_lookup {
            let dir = resolve_directory(folder, raw, file)?;
            push_unique_path(&mut self.library_lookup, dir);
        }

        for library in &section.link_libraries {
            push_unique(&mut self.link_libraries, library.clone());
        }

        for function in &section.loading_functions {
            if !is_c_identifier(function) {
                return Err(ConfigError::InvalidLoadingFunction {
                    name: function.clone(),
                });
            }
            push_unique(&mut self.loading_functions, function.clone());
        }

        self.cflags.extend(section.cflags.iter().cloned());
        self.lflags.extend(section.lflags.iter().cloned());

        Ok(())
    }
}

fn resolve_existing(folder: &Path, raw: &str, file: &Path) -> Result<PathBuf, ConfigError> {
    let path = folder.join(raw);
    if !path.exists() {
        return Err(ConfigError::PathNotFound {
            file: file.to_path_buf(),
            path,
        });
    }
    Ok(path)
}

fn resolve_directory(folder: &Path, raw: &str, file: &Path) -> Result<PathBuf, ConfigError> {
    let path = resolve_existing(folder, raw, file)?;
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            file: file.to_path_buf(),
            path,
        });
    }
    Ok(path)
}

/// Collect `*.c` files under `dir`, sorted by path for determinism
fn collect_c_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    WalkDir::new(dir)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "c"))
        .collect()
}

fn push_unique_path(list: &mut Vec<PathBuf>, value: PathBuf) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_value_render() {
        assert_eq!(MacroValue::Flag.render("DEBUG"), "DEBUG");
        assert_eq!(MacroValue::Number(4096).render("BUFSZ"), "BUFSZ=4096");
        assert_eq!(
            MacroValue::Text("1.2".to_string()).render("VERSION"),
            "VERSION=\"1.2\""
        );
    }

    #[test]
    fn test_is_c_identifier() {
        assert!(is_c_identifier("js_fs_init"));
        assert!(is_c_identifier("_private"));
        assert!(is_c_identifier("Init2"));
        assert!(!is_c_identifier("2init"));
        assert!(!is_c_identifier("js-fs-init"));
        assert!(!is_c_identifier(""));
    }

    #[test]
    fn test_object_stems_disambiguates_duplicates() {
        let instructions = BuildInstructions {
            sources: vec![
                PathBuf::from("/m/a/util.c"),
                PathBuf::from("/m/b/util.c"),
                PathBuf::from("/m/main.c"),
                PathBuf::from("/m/c/util.c"),
            ],
            ..Default::default()
        };

        let stems: Vec<String> = instructions
            .object_stems()
            .into_iter()
            .map(|(_, stem)| stem)
            .collect();
        assert_eq!(stems, vec!["util", "util_1", "main", "util_2"]);
    }
}
