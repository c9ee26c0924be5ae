//! Code generation: the fixed function skeleton.
//!
//! The baked markup still carries raw interpolation markers. This
//! module turns it into the host-language "string built from static
//! parts plus evaluated expressions" and wraps that in the exported
//! render function. The skeleton is a builder with named insertion
//! points rather than concatenation scattered through the pipeline.

/// Escape text for embedding inside a double-quoted source literal.
/// Both quote characters are escaped so the output survives either
/// delimiter choice downstream.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

pub(crate) enum Part<'a> {
    Literal(&'a str),
    /// A top-level marker, wrapper included.
    Marker(&'a str),
}

/// Compile baked markup into a source-text expression evaluating to the
/// interpolated string: static parts become literals, top-level markers
/// become evaluator calls against the props.
pub fn compile_expression(markup: &str) -> String {
    let parts = split_top_level(markup);
    if parts.len() == 1 {
        if let Part::Literal(text) = parts[0] {
            return format!("\"{}\".to_string()", escape_literal(text));
        }
    }

    let mut out = String::from("[\n");
    for part in &parts {
        match part {
            Part::Literal(text) => {
                out.push_str(&format!(
                    "        \"{}\".to_string(),\n",
                    escape_literal(text)
                ));
            }
            Part::Marker(marker) => {
                out.push_str(&format!(
                    "        weft_runtime::resolve(\"{}\", props.as_ref()),\n",
                    escape_literal(marker)
                ));
            }
        }
    }
    out.push_str("    ]\n    .concat()");
    out
}

pub(crate) fn split_top_level(s: &str) -> Vec<Part<'_>> {
    let mut parts = Vec::new();
    let mut lit_start = 0;
    let mut i = 0;
    while i < s.len() {
        if s[i..].starts_with("${") {
            if let Some(len) = marker_len(&s[i..]) {
                if i > lit_start {
                    parts.push(Part::Literal(&s[lit_start..i]));
                }
                parts.push(Part::Marker(&s[i..i + len]));
                i += len;
                lit_start = i;
                continue;
            }
        }
        i += s[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
    }
    if lit_start < s.len() || parts.is_empty() {
        parts.push(Part::Literal(&s[lit_start..]));
    }
    parts
}

/// Byte length of the marker starting at the beginning of `s`,
/// accounting for nesting. `None` when unterminated.
fn marker_len(s: &str) -> Option<usize> {
    debug_assert!(s.starts_with("${"));
    let mut depth = 1;
    let mut i = 2;
    while i < s.len() {
        let rest = &s[i..];
        if rest.starts_with("${") {
            depth += 1;
            i += 2;
        } else if rest.starts_with('}') {
            depth -= 1;
            i += 1;
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
        }
    }
    None
}

/// Builder for the exported render function wrapping a compiled
/// expression.
#[derive(Debug, Clone)]
pub struct Skeleton {
    fn_name: String,
    expression: String,
}

impl Skeleton {
    pub fn new(fn_name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            fn_name: fn_name.into(),
            expression: expression.into(),
        }
    }

    /// Emit the module source: one exported function taking an optional
    /// properties object, evaluating the compiled expression, parsing
    /// the result as a fragment, binding events with the props as
    /// context, and returning the connected node list.
    pub fn build(&self) -> String {
        format!(
            r##"// Generated by weft. Do not edit by hand.

use std::rc::Rc;

use weft_dom::{{parse_fragment, Node, NodeList}};
use weft_runtime::{{bind_events, connect, ConnectedNodes, Props}};

pub fn {name}(props: Option<Props>) -> ConnectedNodes {{
    let props = Rc::new(props.unwrap_or_default());
    let markup = {expression};
    let fragment = Node::element("#fragment");
    for node in parse_fragment(&markup) {{
        fragment.append(node);
    }}
    bind_events(Some(&fragment), &props);
    let mut nodes = NodeList::new();
    for child in fragment.children() {{
        nodes.push(child);
    }}
    connect(nodes, None)
}}
"##,
            name = self.fn_name,
            expression = self.expression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal_quotes() {
        assert_eq!(escape_literal(r#"a "b" 'c'"#), r#"a \"b\" \'c\'"#);
        assert_eq!(escape_literal("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_static_only_expression() {
        let expr = compile_expression("<p>x</p>");
        assert_eq!(expr, "\"<p>x</p>\".to_string()");
    }

    #[test]
    fn test_mixed_expression_parts() {
        let expr = compile_expression("<h1>${title}</h1>");
        assert!(expr.contains("\"<h1>\".to_string()"));
        assert!(expr.contains("weft_runtime::resolve(\"${title}\", props.as_ref())"));
        assert!(expr.contains("\"</h1>\".to_string()"));
        assert!(expr.ends_with(".concat()"));
    }

    #[test]
    fn test_nested_marker_kept_whole() {
        let expr = compile_expression("${a.${b}}");
        assert!(expr.contains("weft_runtime::resolve(\"${a.${b}}\", props.as_ref())"));
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        let expr = compile_expression("text ${oops");
        assert_eq!(expr, "\"text ${oops\".to_string()");
    }

    #[test]
    fn test_skeleton_named_insertion_points() {
        let src = Skeleton::new("render", "\"<p>x</p>\".to_string()").build();
        assert!(src.contains("pub fn render(props: Option<Props>) -> ConnectedNodes {"));
        assert!(src.contains("let markup = \"<p>x</p>\".to_string();"));
        assert!(src.contains("bind_events(Some(&fragment), &props);"));
        assert!(src.contains("connect(nodes, None)"));
    }
}
