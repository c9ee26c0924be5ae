//! Compile command - compile markup documents to render modules.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use walkdir::WalkDir;

use weft_compiler::{CompileOptions, Compiler};

#[derive(Args)]
pub struct CompileArgs {
    /// Markup file, or a directory of .html documents
    input: PathBuf,

    /// Output file (single input) or output directory (directory
    /// input); defaults to stdout / alongside the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML file with compile options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Prefix applied to rewritten local resource references
    #[arg(long)]
    url_root: Option<String>,

    /// Skip the minifier pass
    #[arg(long)]
    no_minimize: bool,

    /// Name of the generated render function (single input only;
    /// directory inputs derive it from each file name)
    #[arg(long, default_value = "render")]
    fn_name: String,
}

pub fn execute(args: CompileArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input not found: {}", args.input.display());
    }

    let mut options = match &args.options {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading options file {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("parsing options file {}", path.display()))?
        }
        None => CompileOptions::default(),
    };
    if let Some(root) = args.url_root {
        options.url_root = root;
    }
    if args.no_minimize {
        options.minimize = false;
    }

    let compiler = Compiler::new(options);

    if args.input.is_dir() {
        compile_directory(&compiler, &args.input, args.output.as_deref())
    } else {
        compile_file(
            &compiler,
            &args.input,
            args.output.as_deref(),
            &args.fn_name,
        )
    }
}

fn compile_file(
    compiler: &Compiler,
    input: &Path,
    output: Option<&Path>,
    fn_name: &str,
) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let base_dir = input.parent().unwrap_or_else(|| Path::new("."));

    let template = compiler
        .compile(&source, base_dir)
        .with_context(|| format!("compiling {}", input.display()))?;
    let module = compiler.emit(&template, fn_name);

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, module)?;
            info!("Compiled {} -> {}", input.display(), path.display());
        }
        None => print!("{}", module),
    }
    Ok(())
}

fn compile_directory(compiler: &Compiler, input: &Path, output: Option<&Path>) -> Result<()> {
    let out_dir = output.unwrap_or(input);
    let mut compiled = 0usize;

    for entry in WalkDir::new(input)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let source_path = entry.path();
        if source_path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template");
        // Mirror the input layout so same-named files in different
        // subdirectories keep distinct outputs.
        let relative = source_path.strip_prefix(input).unwrap_or(source_path);
        let target = out_dir.join(relative).with_extension("rs");
        compile_file(compiler, source_path, Some(&target), &fn_ident(stem))?;
        compiled += 1;
    }

    info!("Compiled {} documents from {}", compiled, input.display());
    Ok(())
}

/// Derive a valid function identifier from a file stem.
fn fn_ident(stem: &str) -> String {
    let mut out: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if out.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(true) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fn_ident() {
        assert_eq!(fn_ident("my-widget"), "my_widget");
        assert_eq!(fn_ident("NavBar"), "navbar");
        assert_eq!(fn_ident("3d"), "_3d");
        assert_eq!(fn_ident(""), "_");
    }

    #[test]
    fn test_compile_file_writes_module() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("card.html");
        fs::write(&input, "<p>${title}</p>").unwrap();
        let output = dir.path().join("out/card.rs");

        let compiler = Compiler::new(CompileOptions::new().minimize(false));
        compile_file(&compiler, &input, Some(&output), "card").unwrap();

        let module = fs::read_to_string(&output).unwrap();
        assert!(module.contains("pub fn card(props: Option<Props>)"));
        assert!(module.contains("${title}"));
    }

    #[test]
    fn test_compile_directory_mirrors_layout() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("src");
        fs::create_dir_all(input.join("nav")).unwrap();
        fs::create_dir_all(input.join("footer")).unwrap();
        fs::write(input.join("nav/index.html"), "<nav>n</nav>").unwrap();
        fs::write(input.join("footer/index.html"), "<footer>f</footer>").unwrap();
        let out = dir.path().join("gen");

        let compiler = Compiler::new(CompileOptions::new().minimize(false));
        compile_directory(&compiler, &input, Some(&out)).unwrap();

        let nav = fs::read_to_string(out.join("nav/index.rs")).unwrap();
        let footer = fs::read_to_string(out.join("footer/index.rs")).unwrap();
        assert!(nav.contains("<nav>n</nav>"));
        assert!(footer.contains("<footer>f</footer>"));
    }

    #[test]
    fn test_execute_with_options_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("page.html");
        fs::write(&input, "<!-- note --><p>x</p>  <p>y</p>").unwrap();
        let options = dir.path().join("weft.yaml");
        fs::write(&options, "minimize: true\nremoveComments: true\n").unwrap();
        let output = dir.path().join("page.rs");

        execute(CompileArgs {
            input,
            output: Some(output.clone()),
            options: Some(options),
            url_root: None,
            no_minimize: false,
            fn_name: "render".into(),
        })
        .unwrap();

        let module = fs::read_to_string(&output).unwrap();
        assert!(!module.contains("note"));
        assert!(module.contains("<p>x</p><p>y</p>"));
    }
}
