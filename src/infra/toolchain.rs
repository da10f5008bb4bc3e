//! Toolchain management
//!
//! Resolves and invokes the clang-compatible compiler driver and the
//! archiver. Tool presence is probed via `--version` before the build
//! starts; every invocation passes an argv-style array, never a shell
//! string, and a non-zero exit surfaces the tool's stderr.
//!
//! The binaries can be overridden with the `YAJE_CLANG` and `YAJE_LLVM_AR`
//! environment variables, which is also the seam test harnesses use to
//! substitute counting stand-ins.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::config::defaults;
use crate::core::triple::TargetTriple;
use crate::error::{EnvironmentError, ToolError};
use crate::infra::filesystem;

/// Resolved C compiler binary name
pub fn clang_binary() -> String {
    std::env::var(defaults::ENV_CLANG).unwrap_or_else(|_| defaults::CLANG_BINARY.to_string())
}

/// Resolved archiver binary name
pub fn ar_binary() -> String {
    std::env::var(defaults::ENV_AR).unwrap_or_else(|_| defaults::AR_BINARY.to_string())
}

/// Probed compiler and archiver pair
#[derive(Debug, Clone)]
pub struct Toolchain {
    clang: String,
    ar: String,
}

impl Toolchain {
    /// Build a toolchain from explicit binary names, without probing
    pub fn new(clang: &str, ar: &str) -> Self {
        Self {
            clang: clang.to_string(),
            ar: ar.to_string(),
        }
    }

    /// Resolve both binaries and verify they respond to `--version`
    pub fn probe() -> Result<Self, EnvironmentError> {
        let clang = clang_binary();
        let ar = ar_binary();

        let clang_version = probe_tool(&clang, "Install LLVM/clang or point YAJE_CLANG at a clang driver")?;
        let ar_version = probe_tool(&ar, "Install LLVM or point YAJE_LLVM_AR at llvm-ar")?;

        tracing::info!(
            "toolchain: {} ({}), {} ({})",
            clang,
            clang_version.as_deref().unwrap_or("unknown version"),
            ar,
            ar_version.as_deref().unwrap_or("unknown version"),
        );

        Ok(Self { clang, ar })
    }

    /// The compiler binary name
    pub fn clang(&self) -> &str {
        &self.clang
    }

    /// The archiver binary name
    pub fn ar(&self) -> &str {
        &self.ar
    }

    /// Compile one translation unit: `clang <args> <source> -o <object>`
    pub fn compile(
        &self,
        args: &[String],
        source: &Path,
        object: &Path,
    ) -> Result<(), ToolError> {
        let mut full: Vec<String> = args.to_vec();
        full.push(source.display().to_string());
        full.push("-o".to_string());
        full.push(object.display().to_string());

        let output = run(&self.clang, &full)?;
        if !output.status.success() {
            return Err(ToolError::CompileFailed {
                source_file: source.to_path_buf(),
                command: render_command(&self.clang, &full),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    /// Scan the header dependencies of one translation unit
    ///
    /// Runs the compiler in dependency-only mode (`-MM`) with only the
    /// `-I`, `-D`, and `-target` arguments and parses the make-style
    /// output. A failed scan yields an empty list, keeping the unit
    /// eligible for recompilation until a scan succeeds.
    pub fn scan_dependencies(&self, args: &[String], source: &Path) -> Vec<PathBuf> {
        let mut scan_args = preprocessor_args(args);
        scan_args.push("-MM".to_string());
        scan_args.push(source.display().to_string());

        let output = match run(&self.clang, &scan_args) {
            Ok(output) => output,
            Err(_) => return Vec::new(),
        };
        if !output.status.success() {
            tracing::debug!(
                "dependency scan failed for {}; treating as no known headers",
                source.display()
            );
            return Vec::new();
        }

        let source_dir = source.parent().unwrap_or_else(|| Path::new("."));
        parse_make_dependencies(&String::from_utf8_lossy(&output.stdout), source_dir)
    }

    /// Archive objects into a static library, recreating it from scratch
    pub fn archive(&self, objects: &[PathBuf], archive: &Path) -> Result<(), ToolError> {
        filesystem::remove_file_if_exists(archive).map_err(|e| ToolError::ArchiveFailed {
            archive: archive.to_path_buf(),
            stderr: e.to_string(),
        })?;

        let mut args = vec!["rcs".to_string(), archive.display().to_string()];
        args.extend(objects.iter().map(|o| o.display().to_string()));

        let output = run(&self.ar, &args)?;
        if !output.status.success() {
            return Err(ToolError::ArchiveFailed {
                archive: archive.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    /// Link inputs into the final executable
    pub fn link(
        &self,
        inputs: &[PathBuf],
        flags: &[String],
        executable: &Path,
    ) -> Result<(), ToolError> {
        let mut args: Vec<String> = inputs.iter().map(|i| i.display().to_string()).collect();
        args.extend(flags.iter().cloned());
        args.push("-o".to_string());
        args.push(executable.display().to_string());

        let output = run(&self.clang, &args)?;
        if !output.status.success() {
            return Err(ToolError::LinkFailed {
                command: render_command(&self.clang, &args),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    /// Compile the embedded-bundle object from piped C source
    ///
    /// The payload is materialized as a length constant and a byte array
    /// with a trailing null sentinel, fed to the compiler on stdin.
    pub fn embed(
        &self,
        payload: &[u8],
        symbol_prefix: &str,
        target: &TargetTriple,
        extra_flags: &[String],
        object: &Path,
    ) -> Result<(), ToolError> {
        let source = render_bundle_source(symbol_prefix, payload);

        let mut args: Vec<String> = extra_flags.to_vec();
        args.extend(
            ["-x", "c", "-c", "-target"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(target.to_string());
        args.push("-".to_string());
        args.push("-o".to_string());
        args.push(object.display().to_string());

        let mut child = Command::new(&self.clang)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::Spawn {
                tool: self.clang.clone(),
                error: e.to_string(),
            })?;

        let write_result = child
            .stdin
            .take()
            .map(|mut stdin| stdin.write_all(source.as_bytes()));

        let output = child.wait_with_output().map_err(|e| ToolError::Spawn {
            tool: self.clang.clone(),
            error: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(ToolError::EmbedFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        if let Some(Err(e)) = write_result {
            return Err(ToolError::EmbedFailed {
                stderr: format!("failed to pipe bundle source: {e}"),
            });
        }
        Ok(())
    }
}

/// Run a tool with argv-style arguments, capturing output
fn run(binary: &str, args: &[String]) -> Result<Output, ToolError> {
    tracing::debug!("running {}", render_command(binary, args));
    Command::new(binary)
        .args(args)
        .output()
        .map_err(|e| ToolError::Spawn {
            tool: binary.to_string(),
            error: e.to_string(),
        })
}

/// Probe a tool via `--version`, extracting its version for diagnostics
fn probe_tool(binary: &str, suggestion: &str) -> Result<Option<String>, EnvironmentError> {
    let output = Command::new(binary).arg("--version").output();
    match output {
        Ok(output) if output.status.success() => {
            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            Ok(extract_version(&combined))
        }
        _ => Err(EnvironmentError::ToolMissing {
            tool: binary.to_string(),
            suggestion: suggestion.to_string(),
        }),
    }
}

/// Extract a version string like "17.0.3" from tool output
fn extract_version(output: &str) -> Option<String> {
    let version_regex = regex::Regex::new(r"v?(\d+\.\d+(?:\.\d+)?)").ok()?;
    version_regex
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Keep only the `-I`, `-D`, and `-target` pairs of an argument vector
fn preprocessor_args(args: &[String]) -> Vec<String> {
    let mut kept = Vec::new();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == "-I" || arg == "-D" || arg == "-target" {
            if let Some(value) = iter.next() {
                kept.push(arg.clone());
                kept.push(value.clone());
            }
        }
    }
    kept
}

/// Parse make-style dependency output
///
/// Joins continuation lines, drops the `<obj>:` prefix, splits on
/// whitespace, and resolves each token relative to the source directory.
fn parse_make_dependencies(output: &str, source_dir: &Path) -> Vec<PathBuf> {
    let joined = output.replace("\\\r\n", " ").replace("\\\n", " ");
    let list = match joined.split_once(':') {
        Some((_, rest)) => rest,
        None => &joined,
    };

    list.split_whitespace()
        .map(|token| {
            let path = Path::new(token);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                source_dir.join(path)
            }
        })
        .collect()
}

/// Render an argv array as a display-only command line
pub fn render_command(binary: &str, args: &[String]) -> String {
    let mut rendered = String::from(binary);
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Render the C translation unit embedding a payload
///
/// The length constant reflects the content length; a trailing null byte
/// is appended after the content so the data doubles as a C string.
pub fn render_bundle_source(prefix: &str, payload: &[u8]) -> String {
    let mut source = String::from("#include <stddef.h>\n\n");
    source.push_str(&format!("size_t {prefix}_LENGTH = {};\n", payload.len()));
    source.push_str(&format!("unsigned char {prefix}_DATA[] = {{"));

    for (index, byte) in payload.iter().enumerate() {
        if index % 16 == 0 {
            source.push_str("\n    ");
        } else {
            source.push(' ');
        }
        source.push_str(&format!("0x{byte:02x},"));
    }

    if payload.is_empty() {
        source.push_str(" 0x00 };\n");
    } else {
        source.push_str("\n    0x00\n};\n");
    }
    source
}
