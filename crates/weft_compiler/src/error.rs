//! Error types for template compilation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur while compiling a markup document.
///
/// Per-reference misses (unknown files, unresolvable expressions) are
/// absorbed by the pipeline and never surface here; only hard resource
/// failures abort a compilation.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Stylesheet compilation failed for {path}: {message}")]
    StylesheetCompile { path: PathBuf, message: String },

    #[error("Minification failed: {0}")]
    Minify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
