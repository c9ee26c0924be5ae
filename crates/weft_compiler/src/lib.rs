//! # weft_compiler
//!
//! Compiles markup documents containing `${...}` interpolation markers
//! into reusable template artifacts. The pipeline protects local
//! resource references behind placeholder tokens, inlines compiled
//! stylesheet links, rewrites event-handler attributes to bare path
//! expressions, minifies, and bakes the result into a
//! [`CompiledTemplate`] callable with a properties object — or emits it
//! as the source text of an exported render function.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use weft_compiler::{CompileOptions, Compiler};
//! use weft_runtime::Props;
//!
//! let compiler = Compiler::new(CompileOptions::default());
//! let template = compiler.compile("<h3>${this.title}</h3>", Path::new(".")).unwrap();
//!
//! let nodes = template.render(Props::new().with_value("title", "Hi"));
//! assert_eq!(nodes.get(0).unwrap().text_content(), "Hi");
//! ```

pub mod codegen;
pub mod error;
pub mod links;
pub mod minify;
pub mod options;
pub mod pipeline;
pub mod placeholder;
pub mod scanner;

pub use codegen::Skeleton;
pub use error::{CompileError, CompileResult};
pub use links::{FileStyleCompiler, StyleCompiler};
pub use minify::{DefaultMinifier, Minifier};
pub use options::CompileOptions;
pub use pipeline::{CompiledTemplate, Compiler};
pub use placeholder::PlaceholderMap;
pub use scanner::{scan_attributes, RefMatch};
