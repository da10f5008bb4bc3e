//! Project scaffolding logic
//!
//! Generates the starting files of a new yaje project: a `package.json`
//! manifest depending on the runtime core and a bundler, and a minimal
//! entry module.

use std::path::Path;

/// Generate the manifest content for a new project
pub fn generate_manifest_content(project_name: &str) -> String {
    format!(
        r#"{{
    "name": "{project_name}",
    "main": "./src/index.js",
    "dependencies": {{
        "@yaje/core": "^1",
        "@yaje/vite": "^1"
    }}
}}
"#
    )
}

/// Generate the entry module content for a new project
pub fn generate_entry_content(project_name: &str) -> String {
    format!("console.log(\"hello from {project_name}\");\n")
}

/// Derive a project name from its directory
pub fn project_name_from_dir(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}
