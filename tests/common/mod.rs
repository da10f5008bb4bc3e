//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a
//! temporary project fixture, package-tree builders, and counting
//! stand-ins for the compiler and archiver.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up package trees.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write a package.json under `rel_dir`
    pub fn write_package(&self, rel_dir: &str, name: &str, deps: &[&str], bundler: bool) {
        let deps_json: Vec<String> = deps.iter().map(|d| format!("\"{d}\": \"*\"")).collect();
        let bundler_field = if bundler { ",\n    \"bundler\": true" } else { "" };
        let manifest = format!(
            "{{\n    \"name\": \"{name}\",\n    \"main\": \"./index.js\",\n    \"dependencies\": {{ {} }}{bundler_field}\n}}\n",
            deps_json.join(", ")
        );
        let file = if rel_dir.is_empty() {
            "package.json".to_string()
        } else {
            format!("{rel_dir}/package.json")
        };
        self.create_file(&file, &manifest);
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the standard fixture tree used across tests:
///
/// - root package `app` depending on `@yaje/fs` and `@yaje/vite`
/// - `@yaje/fs`, native, depending on `@yaje/core`, one source + header
/// - `@yaje/core`, native, with the runtime support header
/// - `@yaje/vite`, flagged as a bundler
pub fn setup_basic_project(project: &TestProject) {
    project.create_file(
        "package.json",
        r#"{
    "name": "app",
    "main": "./src/index.js",
    "dependencies": { "@yaje/fs": "*", "@yaje/vite": "*" }
}
"#,
    );
    project.create_file("src/index.js", "console.log(\"hi\");\n");

    project.write_package("node_modules/@yaje/fs", "@yaje/fs", &["@yaje/core"], false);
    project.create_file(
        "node_modules/@yaje/fs/yaje.build.toml",
        r#"[native]
sources = ["native"]
include-dirs = ["native"]
loading-functions = ["js_fs_init"]
"#,
    );
    project.create_file(
        "node_modules/@yaje/fs/native/fs.c",
        "#include \"fs.h\"\n\nvoid js_fs_init(void *rt, void *ctx) { (void)rt; (void)ctx; }\n",
    );
    project.create_file(
        "node_modules/@yaje/fs/native/fs.h",
        "#define FS_API 1\n",
    );

    project.write_package("node_modules/@yaje/core", "@yaje/core", &[], false);
    project.create_file(
        "node_modules/@yaje/core/yaje.build.toml",
        r#"[native]
sources = ["native"]
include-dirs = ["native"]
"#,
    );
    project.create_file(
        "node_modules/@yaje/core/native/yaje.c",
        "#include \"yaje.h\"\n",
    );
    project.create_file(
        "node_modules/@yaje/core/native/yaje.h",
        "#define YAJE_CORE 1\n",
    );

    project.write_package("node_modules/@yaje/vite", "@yaje/vite", &[], true);
}

/// Write a counting stand-in for the C compiler driver
///
/// The script logs one classified line per invocation (VERSION, SCAN,
/// COMPILE, EMBED, LINK) to `log`. Dependency scans emit a make-style
/// line listing every header next to the source, so header invalidation
/// behaves like the real tool. Any `-o` output file is created empty.
#[cfg(unix)]
pub fn write_fake_clang(dir: &Path, log: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
log="{log}"
stdin_used=no
last=""
for a in "$@"; do
  [ "$a" = "-" ] && stdin_used=yes
  last="$a"
done
[ "$stdin_used" = yes ] && cat > /dev/null
case " $* " in
  *" --version "*)
    echo "clang version 17.0.3"
    echo "VERSION" >> "$log"
    exit 0
    ;;
esac
case " $* " in
  *" -MM "*)
    dir=$(dirname "$last")
    printf 'unit.o: %s' "$last"
    for h in "$dir"/*.h; do
      [ -e "$h" ] && printf ' %s' "$h"
    done
    printf '\n'
    echo "SCAN $last" >> "$log"
    exit 0
    ;;
esac
out=""
prev=""
for a in "$@"; do
  [ "$prev" = "-o" ] && out="$a"
  prev="$a"
done
if [ "$stdin_used" = yes ]; then
  echo "EMBED $*" >> "$log"
else
  case " $* " in
    *" -c "*) echo "COMPILE $*" >> "$log" ;;
    *) echo "LINK $*" >> "$log" ;;
  esac
fi
[ -n "$out" ] && : > "$out"
exit 0
"#,
        log = log.display()
    );
    write_script(&dir.join("fake-clang"), &script)
}

/// Write a counting stand-in for the archiver
#[cfg(unix)]
pub fn write_fake_ar(dir: &Path, log: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
log="{log}"
case " $* " in
  *" --version "*)
    echo "LLVM version 17.0.3"
    echo "VERSION" >> "$log"
    exit 0
    ;;
esac
echo "ARCHIVE $*" >> "$log"
: > "$2"
exit 0
"#,
        log = log.display()
    );
    write_script(&dir.join("fake-ar"), &script)
}

#[cfg(unix)]
fn write_script(path: &Path, content: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, content).expect("Failed to write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    path.to_path_buf()
}

/// Count logged invocations of one kind
pub fn count_invocations(log: &Path, kind: &str) -> usize {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .filter(|line| line.starts_with(kind))
        .count()
}

/// Truncate the invocation log between runs
pub fn reset_log(log: &Path) {
    std::fs::write(log, "").expect("Failed to reset log");
}
