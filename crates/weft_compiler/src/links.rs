//! Stylesheet `<link>` extraction and the stylesheet compiler seam.
//!
//! Link extraction runs on a dedicated pattern, independent of the
//! attribute reference scanner: it must see the whole `<link>` element
//! so it can remove it from the markup after compiling its target.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// External stylesheet compiler collaborator. Given an absolute file
/// path, synchronously returns compiled CSS text; a compile error is
/// fatal to the document and propagated unmodified.
#[cfg_attr(test, mockall::automock)]
pub trait StyleCompiler {
    fn compile(&self, path: &Path) -> anyhow::Result<String>;
}

/// Default stylesheet compiler: treats the file as already-compiled CSS
/// and returns its contents.
#[derive(Debug, Default)]
pub struct FileStyleCompiler;

impl StyleCompiler for FileStyleCompiler {
    fn compile(&self, path: &Path) -> anyhow::Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<link\b[^>]*>").unwrap())
}

fn rel_stylesheet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"(?i)rel\s*=\s*(?:"stylesheet"|'stylesheet'|stylesheet)"#).unwrap())
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap()
    })
}

/// Extract stylesheet links whose href resolves to a local file: each is
/// compiled via `compiler`, removed from the markup, and its output
/// aggregated. Returns the rewritten markup and the concatenated CSS.
pub fn extract_stylesheets(
    markup: &str,
    base_dir: &Path,
    compiler: &dyn StyleCompiler,
) -> CompileResult<(String, String)> {
    let mut css = String::new();
    let mut removals = Vec::new();

    for found in link_pattern().find_iter(markup) {
        let tag = found.as_str();
        if !rel_stylesheet_pattern().is_match(tag) {
            continue;
        }
        let Some(href) = href_pattern()
            .captures(tag)
            .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        else {
            continue;
        };
        let href = href.as_str();
        if !is_local_reference(href) {
            continue;
        }
        let path = base_dir.join(strip_fragment(href));
        if !path.exists() {
            continue;
        }
        debug!(href, path = %path.display(), "compiling stylesheet link");
        let compiled = compiler
            .compile(&path)
            .map_err(|e| CompileError::StylesheetCompile {
                path: path.clone(),
                message: format!("{e:#}"),
            })?;
        css.push_str(&compiled);
        removals.push((found.start(), found.end()));
    }

    // Reverse order keeps earlier offsets valid while later spans are
    // cut out.
    let mut out = markup.to_string();
    for (start, end) in removals.into_iter().rev() {
        out.replace_range(start..end, "");
    }
    Ok((out, css))
}

/// Whether a reference can be resolved against the local document base:
/// scheme-prefixed URLs (`http:`, `mailto:`, `data:`, ...),
/// protocol-relative `//` references, and bare fragments are external.
pub fn is_local_reference(value: &str) -> bool {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    let scheme = SCHEME.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap());
    !value.is_empty()
        && !value.starts_with("//")
        && !value.starts_with('#')
        && !scheme.is_match(value)
}

/// Normalize away a fragment identifier.
pub fn strip_fragment(value: &str) -> &str {
    value.split('#').next().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_local_reference() {
        assert!(is_local_reference("styles/app.css"));
        assert!(is_local_reference("./a.css"));
        assert!(!is_local_reference("http://x/a.css"));
        assert!(!is_local_reference("HTTPS://x/a.css"));
        assert!(!is_local_reference("mailto:a@b.c"));
        assert!(!is_local_reference("//cdn/a.css"));
        assert!(!is_local_reference("#anchor"));
        assert!(!is_local_reference(""));
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("a.css#section"), "a.css");
        assert_eq!(strip_fragment("a.css"), "a.css");
    }

    #[test]
    fn test_extracts_and_removes_local_link() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.css"), "p{color:red}").unwrap();

        let markup = r#"<link rel="stylesheet" href="app.css"><p>x</p>"#;
        let (out, css) =
            extract_stylesheets(markup, dir.path(), &FileStyleCompiler).unwrap();
        assert_eq!(out, "<p>x</p>");
        assert_eq!(css, "p{color:red}");
    }

    #[test]
    fn test_external_links_left_alone() {
        let dir = tempdir().unwrap();
        let markup = r#"<link rel="stylesheet" href="https://cdn/app.css">"#;
        let (out, css) =
            extract_stylesheets(markup, dir.path(), &FileStyleCompiler).unwrap();
        assert_eq!(out, markup);
        assert!(css.is_empty());
    }

    #[test]
    fn test_missing_file_left_alone() {
        let dir = tempdir().unwrap();
        let markup = r#"<link rel="stylesheet" href="ghost.css">"#;
        let (out, css) =
            extract_stylesheets(markup, dir.path(), &FileStyleCompiler).unwrap();
        assert_eq!(out, markup);
        assert!(css.is_empty());
    }

    #[test]
    fn test_non_stylesheet_links_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fav.ico"), "x").unwrap();
        let markup = r#"<link rel="icon" href="fav.ico">"#;
        let (out, css) =
            extract_stylesheets(markup, dir.path(), &FileStyleCompiler).unwrap();
        assert_eq!(out, markup);
        assert!(css.is_empty());
    }

    #[test]
    fn test_compiler_error_propagates() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.scss"), "$oops").unwrap();

        let mut mock = MockStyleCompiler::new();
        mock.expect_compile()
            .returning(|_| Err(anyhow::anyhow!("unexpected end of selector")));

        let markup = r#"<link rel="stylesheet" href="bad.scss">"#;
        let err = extract_stylesheets(markup, dir.path(), &mock).unwrap_err();
        assert!(err.to_string().contains("unexpected end of selector"));
    }

    #[test]
    fn test_multiple_links_aggregate_in_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "a{}").unwrap();
        fs::write(dir.path().join("b.css"), "b{}").unwrap();
        let markup = concat!(
            r#"<link rel="stylesheet" href="a.css">"#,
            "<div>x</div>",
            r#"<link rel=stylesheet href='b.css'>"#
        );
        let (out, css) =
            extract_stylesheets(markup, dir.path(), &FileStyleCompiler).unwrap();
        assert_eq!(out, "<div>x</div>");
        assert_eq!(css, "a{}b{}");
    }
}
