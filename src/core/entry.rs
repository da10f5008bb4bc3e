//! Entry-point generation
//!
//! Emits the C translation unit that boots the runtime: one extern
//! declaration per native loading function, a `yaje_core_load_modules`
//! definition invoking them in discovery order, and `main`, which
//! constructs the runtime/context pair, loads the modules, evaluates the
//! embedded bundle, and tears everything down. Output is byte-identical
//! for identical input lists.

use std::path::PathBuf;

use crate::core::triple::TargetTriple;

const MAIN_DEFINITION: &str = r#"int main(int argc, char **argv) {
    (void)argc;
    (void)argv;

    JSRuntime *rt = NULL;
    JSContext *ctx = NULL;
    yaje_core_ctor(&rt, &ctx);
    yaje_core_load_modules(rt, ctx);

    int status = yaje_core_execute(rt, ctx);

    yaje_core_free(&rt, &ctx);
    return status;
}
"#;

/// Render the entry-point translation unit for an ordered list of loading
/// functions
pub fn render_entry_point(loading_functions: &[String]) -> String {
    let mut source = String::from("#include \"yaje.h\"\n\n");

    for function in loading_functions {
        source.push_str(&format!(
            "extern void {function}(JSRuntime *rt, JSContext *ctx);\n"
        ));
    }
    if !loading_functions.is_empty() {
        source.push('\n');
    }

    source.push_str("void yaje_core_load_modules(JSRuntime *rt, JSContext *ctx) {\n");
    if loading_functions.is_empty() {
        source.push_str("    (void)rt;\n    (void)ctx;\n");
    } else {
        for function in loading_functions {
            source.push_str(&format!("    {function}(rt, ctx);\n"));
        }
    }
    source.push_str("}\n\n");

    source.push_str(MAIN_DEFINITION);
    source
}

/// Compile arguments for the generated entry point
pub fn entry_cflags(core_include_dirs: &[PathBuf], target: &TargetTriple) -> Vec<String> {
    let mut args = Vec::new();
    for dir in core_include_dirs {
        args.push("-I".to_string());
        args.push(dir.display().to_string());
    }
    args.extend(
        ["-g", "-fwrapv", "-Wall", "-target"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.push(target.to_string());
    args.push("-c".to_string());
    args
}
