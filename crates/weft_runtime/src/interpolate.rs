//! Interpolation expression evaluator.
//!
//! Expressions are dotted paths wrapped in `${...}` markers, resolved
//! against a [`Scope`]. Markers may nest; resolution is innermost-first
//! via an explicit recursive-descent scan over marker boundaries, so
//! every marker is resolved exactly once and termination is structural
//! rather than depending on replacement-loop progress.
//!
//! An unresolvable path never errors: it degrades to the literal
//! `${path}` text, keeping partially-populated templates renderable.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::scope::{value_to_string, Scope};

const MARK_OPEN: &str = "${";

/// Dotted-identifier path: identifier segments (or numeric indexes after
/// the first) separated by dots.
fn path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(?:\.(?:[A-Za-z_$][A-Za-z0-9_$]*|\d+))*$").unwrap()
    })
}

/// Strip one leading `this.` / `props.` receiver prefix. The two are
/// equivalent inside expressions; comparison is case-insensitive.
pub fn strip_receiver(expression: &str) -> &str {
    for prefix in ["this.", "props."] {
        if let Some(head) = expression.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) && expression.len() > prefix.len() {
                return &expression[prefix.len()..];
            }
        }
    }
    expression
}

/// Resolve every interpolation marker in `expression` against `scope`.
///
/// Strings without markers pass through unchanged (minus a leading
/// receiver prefix). Nested markers resolve innermost-first.
pub fn resolve(expression: &str, scope: &dyn Scope) -> String {
    let expression = strip_receiver(expression);
    if !expression.contains(MARK_OPEN) {
        return expression.to_string();
    }
    let segments = parse_segments(expression);
    let resolved = resolve_segments(&segments, scope);
    trace!(input = expression, output = resolved.as_str(), "resolved expression");
    resolved
}

/// Resolve a bare path against `scope`, returning `fallback` on a miss.
///
/// Exact top-level keys win immediately (including keys that contain
/// dots); a path naming a scope handler resolves to itself, leaving the
/// substitution to the event binder; otherwise dotted-identifier paths
/// are walked segment by segment, falling back the moment a segment is
/// missing. Shared with external collaborators such as locale message
/// formatting.
pub fn lookup(path: &str, scope: &dyn Scope, fallback: &str) -> String {
    if let Some(value) = scope.value(path) {
        return value_to_string(&value);
    }
    if scope.handler(path).is_some() {
        return path.to_string();
    }
    if !path_pattern().is_match(path) {
        return fallback.to_string();
    }

    let mut segments = path.split('.');
    let first = match segments.next() {
        Some(s) => s,
        None => return fallback.to_string(),
    };
    let mut current = match scope.value(first) {
        Some(v) => v,
        None => return fallback.to_string(),
    };
    for segment in segments {
        let next = match &current {
            Value::Object(map) => map.get(segment).cloned(),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned()),
            _ => None,
        };
        current = match next {
            Some(v) => v,
            None => return fallback.to_string(),
        };
    }
    value_to_string(&current)
}

enum Segment {
    Literal(String),
    Marker(Vec<Segment>),
}

fn parse_segments(s: &str) -> Vec<Segment> {
    let (segments, _consumed, _closed) = parse_until(s, false);
    segments
}

/// Parse until an unmatched `}` (when `inner`) or end of input. Returns
/// the segments, the bytes consumed (including any closing brace), and
/// whether the closing brace was seen.
fn parse_until(s: &str, inner: bool) -> (Vec<Segment>, usize, bool) {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if rest.starts_with(MARK_OPEN) {
            let (child, used, closed) = parse_until(&s[i + 2..], true);
            if closed {
                flush_literal(&mut segments, &mut literal);
                segments.push(Segment::Marker(child));
            } else {
                // Unterminated marker: the opener is literal text.
                literal.push_str(MARK_OPEN);
                flush_literal(&mut segments, &mut literal);
                segments.extend(child);
            }
            i += 2 + used;
        } else if inner && rest.starts_with('}') {
            flush_literal(&mut segments, &mut literal);
            return (segments, i + 1, true);
        } else {
            let ch = rest.chars().next().expect("non-empty remainder");
            literal.push(ch);
            i += ch.len_utf8();
        }
    }
    flush_literal(&mut segments, &mut literal);
    (segments, i, false)
}

fn flush_literal(segments: &mut Vec<Segment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn resolve_segments(segments: &[Segment], scope: &dyn Scope) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Marker(inner) => {
                // Inner markers first: the marker body may itself be
                // built from interpolated parts.
                let path = resolve_segments(inner, scope);
                out.push_str(&resolve_marker(&path, scope));
            }
        }
    }
    out
}

fn resolve_marker(path: &str, scope: &dyn Scope) -> String {
    let path = strip_receiver(path.trim());
    if is_compound_key(path) {
        // Compound keys never round-trip through the `${...}` fallback;
        // a miss yields the bare path text.
        return lookup(path, scope, path);
    }
    let fallback = format!("${{{}}}", path);
    lookup(path, scope, &fallback)
}

/// A key that is not a plain dotted path: it still carries marker or
/// bracket/quote syntax after inner resolution.
fn is_compound_key(path: &str) -> bool {
    path.contains(MARK_OPEN)
        || path.contains(|c: char| matches!(c, '[' | ']' | '{' | '}' | '\'' | '"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Props;
    use serde_json::json;

    fn scope() -> Props {
        Props::new()
            .with_value("title", "Hi")
            .with_value("a", json!({"b": "x", "c": "ok"}))
            .with_value("b", "c")
    }

    #[test]
    fn test_resolve_simple_path() {
        assert_eq!(resolve("${a.b}", &scope()), "x");
    }

    #[test]
    fn test_resolve_miss_falls_back_to_literal() {
        assert_eq!(resolve("${a.z}", &scope()), "${a.z}");
        assert_eq!(resolve("${nope}", &scope()), "${nope}");
    }

    #[test]
    fn test_resolve_nested_innermost_first() {
        assert_eq!(resolve("${a.${b}}", &scope()), "ok");
    }

    #[test]
    fn test_resolve_nested_miss_does_not_rewrap() {
        // The inner miss leaves `${z}` in the outer path, which is then
        // a compound key and must not grow another marker wrapper.
        assert_eq!(resolve("${a.${z}}", &scope()), "a.${z}");
    }

    #[test]
    fn test_receiver_prefixes_equivalent() {
        assert_eq!(resolve("${this.title}", &scope()), "Hi");
        assert_eq!(resolve("${props.title}", &scope()), "Hi");
        assert_eq!(resolve("${This.title}", &scope()), "Hi");
        assert_eq!(resolve("this.title", &scope()), "title");
    }

    #[test]
    fn test_plain_text_identity() {
        assert_eq!(resolve("no markers here", &scope()), "no markers here");
        assert_eq!(resolve("", &scope()), "");
    }

    #[test]
    fn test_multiple_top_level_markers() {
        assert_eq!(
            resolve("<h1>${title}</h1><p>${a.b}</p>", &scope()),
            "<h1>Hi</h1><p>x</p>"
        );
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        assert_eq!(resolve("before ${title", &scope()), "before ${title");
    }

    #[test]
    fn test_exact_key_with_dots_wins() {
        let s = Props::new()
            .with_value("a.b", "direct")
            .with_value("a", json!({"b": "walked"}));
        assert_eq!(resolve("${a.b}", &s), "direct");
    }

    #[test]
    fn test_lookup_walks_arrays_by_index() {
        let s = Props::new().with_value("items", json!(["zero", "one"]));
        assert_eq!(lookup("items.1", &s, "-"), "one");
        assert_eq!(lookup("items.9", &s, "-"), "-");
    }

    #[test]
    fn test_lookup_fallback_on_non_path() {
        assert_eq!(lookup("not a path!", &scope(), "fb"), "fb");
        assert_eq!(lookup("", &scope(), "fb"), "fb");
    }

    #[test]
    fn test_lookup_handler_name_resolves_to_itself() {
        let s = Props::new().with_handler("go", |_, _| {});
        assert_eq!(lookup("go", &s, "${go}"), "go");
    }

    #[test]
    fn test_non_string_values_stringified() {
        let s = Props::new().with_value("n", 42).with_value("flag", true);
        assert_eq!(resolve("${n}/${flag}", &s), "42/true");
    }

    #[test]
    fn test_deep_nesting_terminates() {
        // ${${${k}}} chases k -> k2 -> v -> done
        let s = Props::new()
            .with_value("k", "k2")
            .with_value("k2", "v")
            .with_value("v", "done");
        assert_eq!(resolve("${${${k}}}", &s), "done");
    }
}
