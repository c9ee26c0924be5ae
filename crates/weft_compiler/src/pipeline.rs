//! The compilation pipeline.
//!
//! Turns one markup source document plus configuration into a
//! [`CompiledTemplate`]: local resource references are protected behind
//! placeholder tokens, stylesheet links are compiled and inlined, event
//! attributes are rewritten to bare path expressions, and the result is
//! minified. Each step is a pure transformation of the working string;
//! the steps are strictly sequential because each depends on the text
//! produced by the previous one.
//!
//! Compilation is self-contained per document; a build orchestrator may
//! run compilers concurrently over independent documents with shared
//! read-only configuration.

use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info};
use weft_dom::{parse_fragment, Node, NodeList};
use weft_runtime::{bind_events, connect, interpolate, ConnectedNodes, Props};

use crate::codegen::{compile_expression, split_top_level, Part, Skeleton};
use crate::error::{CompileError, CompileResult};
use crate::links::{
    extract_stylesheets, is_local_reference, strip_fragment, FileStyleCompiler, StyleCompiler,
};
use crate::minify::{DefaultMinifier, Minifier};
use crate::options::CompileOptions;
use crate::placeholder::PlaceholderMap;
use crate::scanner::scan_attributes;

/// Compiles markup documents into template artifacts.
pub struct Compiler {
    options: CompileOptions,
    minifier: Box<dyn Minifier>,
    styles: Box<dyn StyleCompiler>,
}

impl Compiler {
    /// Compiler with the built-in minifier and stylesheet compiler.
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            minifier: Box::new(DefaultMinifier::new()),
            styles: Box::new(FileStyleCompiler),
        }
    }

    /// Compiler with injected collaborators.
    pub fn with_collaborators(
        options: CompileOptions,
        minifier: Box<dyn Minifier>,
        styles: Box<dyn StyleCompiler>,
    ) -> Self {
        Self {
            options,
            minifier,
            styles,
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one markup source. `base_dir` is the directory local
    /// resource references resolve against.
    pub fn compile(&self, source: &str, base_dir: &Path) -> CompileResult<CompiledTemplate> {
        // Stylesheet links go first: a link that is about to be removed
        // must not have its href tokenized by reference protection.
        let (mut working, css) = extract_stylesheets(source, base_dir, self.styles.as_ref())?;

        let mut placeholders = PlaceholderMap::new();
        working = self.protect_references(&working, base_dir, &mut placeholders);

        if self.options.interpolate {
            working = unwrap_event_markers(&working);
        }

        if self.options.minimize {
            working = self
                .minifier
                .minify(&working, &self.options)
                .map_err(|e| CompileError::Minify(format!("{e:#}")))?;
        }

        working = placeholders.restore(&working);

        if !css.is_empty() {
            working = format!("<style>{}</style>{}", css, working);
        }

        info!(
            bytes = working.len(),
            references = placeholders.len(),
            "compiled template"
        );
        Ok(CompiledTemplate { markup: working })
    }

    /// Emit the compiled template as a source-text module exporting one
    /// render function.
    pub fn emit(&self, template: &CompiledTemplate, fn_name: &str) -> String {
        Skeleton::new(fn_name, compile_expression(&template.markup)).build()
    }

    /// Replace resolvable local resource references with collision-free
    /// placeholder tokens, recording the value each token stands for.
    fn protect_references(
        &self,
        source: &str,
        base_dir: &Path,
        placeholders: &mut PlaceholderMap,
    ) -> String {
        let matches =
            scan_attributes(source, |tag, attr| self.options.accepts_reference(tag, attr));
        let mut working = source.to_string();
        // Rewrites run in reverse offset order: earlier offsets stay
        // valid while later spans of the string change.
        for found in matches.iter().rev() {
            if !is_local_reference(&found.value) {
                continue;
            }
            let normalized = strip_fragment(&found.value).to_string();
            if !base_dir.join(&normalized).exists() {
                debug!(value = %found.value, "reference target missing, left as-is");
                continue;
            }
            let restored = if self.options.url_root.is_empty() {
                normalized
            } else {
                join_url(&self.options.url_root, &normalized)
            };
            let token = placeholders.insert(&working, restored);
            working.replace_range(found.start..found.start + found.len, &token);
        }
        working
    }
}

/// Strip the interpolation marker wrapper from `on*` attribute values,
/// leaving the bare path expression as the literal attribute value.
/// This keeps the minifier unaware of markers inside event attributes
/// and gives the runtime binder a single expression syntax.
fn unwrap_event_markers(markup: &str) -> String {
    let matches = scan_attributes(markup, |_, attr| attr.starts_with("on"));
    let mut working = markup.to_string();
    for found in matches.iter().rev() {
        let value = found.value.trim();
        let Some(inner) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) else {
            continue;
        };
        if inner.contains("${") {
            // Nested markers stay for the runtime evaluator.
            continue;
        }
        working.replace_range(found.start..found.start + found.len, inner);
    }
    working
}

fn join_url(root: &str, value: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), value.trim_start_matches('/'))
}

/// A compiled template artifact: callable any number of times with
/// different properties; stateless between calls.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    markup: String,
}

impl CompiledTemplate {
    /// The baked markup string, interpolation markers intact.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Render against a properties object: evaluate the baked markup,
    /// parse it as a fragment, bind event attributes with the props as
    /// context, and return the connected node list.
    ///
    /// Evaluation splits at top-level markers and resolves each marker
    /// on its own — the same shape the emitted module uses — so static
    /// document text is never treated as an expression.
    pub fn render(&self, props: Props) -> ConnectedNodes {
        let props = Rc::new(props);
        let mut markup = String::with_capacity(self.markup.len());
        for part in split_top_level(&self.markup) {
            match part {
                Part::Literal(text) => markup.push_str(text),
                Part::Marker(marker) => {
                    markup.push_str(&interpolate::resolve(marker, props.as_ref()))
                }
            }
        }
        let fragment = Node::element("#fragment");
        for node in parse_fragment(&markup) {
            fragment.append(node);
        }
        bind_events(Some(&fragment), &props);
        let mut nodes = NodeList::new();
        for child in fragment.children() {
            nodes.push(child);
        }
        connect(nodes, None)
    }
}
