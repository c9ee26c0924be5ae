//! Tolerant markup fragment parser.
//!
//! Produces a [`NodeList`] of top-level nodes from a markup string. The
//! parser never fails: unterminated tags close at end of input, stray
//! closing tags are ignored, and anything unrecognizable degrades to
//! text. Every iteration of the main loop consumes at least one byte,
//! so parsing completes in a single pass over the input.

use tracing::trace;

use crate::node::{Node, NodeList};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Parse a markup string into an ordered list of top-level nodes.
pub fn parse_fragment(markup: &str) -> NodeList {
    Parser::new(markup).run()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    roots: NodeList,
    stack: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            roots: NodeList::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> NodeList {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            if let Some(lt) = rest.find('<') {
                if lt > 0 {
                    let text = &rest[..lt];
                    self.append(Node::text(text));
                    self.pos += lt;
                }
                self.parse_markup_node();
            } else {
                // Trailing text, no more tags.
                self.append(Node::text(rest));
                self.pos = self.src.len();
            }
        }
        trace!(roots = self.roots.len(), "parsed fragment");
        self.roots
    }

    /// Parse the construct starting at `<`. Always consumes at least one
    /// byte.
    fn parse_markup_node(&mut self) {
        let rest = &self.src[self.pos..];
        debug_assert!(rest.starts_with('<'));

        if rest.starts_with("<!--") {
            self.parse_comment();
        } else if rest.starts_with("<![CDATA[") {
            self.skip_until(9, "]]>");
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            // Doctype or processing instruction: skip whole node.
            self.skip_until(2, ">");
        } else if rest.starts_with("</") {
            self.parse_close_tag();
        } else if rest[1..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
        {
            self.parse_open_tag();
        } else {
            // A lone `<` that opens nothing: literal text.
            self.append(Node::text("<"));
            self.pos += 1;
        }
    }

    fn parse_comment(&mut self) {
        let body_start = self.pos + 4;
        match self.src[body_start..].find("-->") {
            Some(end) => {
                let body = &self.src[body_start..body_start + end];
                self.append(Node::comment(body));
                self.pos = body_start + end + 3;
            }
            None => {
                // Unterminated comment swallows the rest of the input.
                self.append(Node::comment(&self.src[body_start..]));
                self.pos = self.src.len();
            }
        }
    }

    fn parse_close_tag(&mut self) {
        let name_start = self.pos + 2;
        let name = read_name(&self.src[name_start..]);
        let tag = name.to_ascii_lowercase();
        // Pop to the nearest matching open element; ignore strays.
        if let Some(idx) = self.stack.iter().rposition(|n| n.tag().as_deref() == Some(tag.as_str())) {
            self.stack.truncate(idx);
        }
        match self.src[self.pos..].find('>') {
            Some(gt) => self.pos += gt + 1,
            None => self.pos = self.src.len(),
        }
    }

    fn parse_open_tag(&mut self) {
        let name_start = self.pos + 1;
        let name = read_name(&self.src[name_start..]);
        let tag = name.to_ascii_lowercase();
        let element = Node::element(tag.clone());
        self.pos = name_start + name.len();

        let self_closing = self.parse_attributes(&element);
        self.append(element.clone());

        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            self.consume_raw_text(&element, &tag);
            return;
        }
        self.stack.push(element);
    }

    /// Parse attributes until the end of the tag. Returns whether the
    /// tag was self-closing. Leaves `pos` just past the closing `>` (or
    /// at end of input for unterminated tags).
    fn parse_attributes(&mut self, element: &Node) -> bool {
        loop {
            self.skip_whitespace();
            let rest = &self.src[self.pos..];
            if rest.is_empty() {
                return false;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return false;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            let name = read_name(rest);
            if name.is_empty() {
                // Unrecognizable byte inside a tag: consume it and move
                // on rather than looping forever.
                self.pos += rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
                continue;
            }
            self.pos += name.len();
            let name = name.to_ascii_lowercase();

            self.skip_whitespace();
            if !self.src[self.pos..].starts_with('=') {
                element.set_attr(name, "");
                continue;
            }
            self.pos += 1;
            self.skip_whitespace();
            let value = self.parse_attr_value();
            element.set_attr(name, value);
        }
    }

    fn parse_attr_value(&mut self) -> String {
        let rest = &self.src[self.pos..];
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(end) => {
                        self.pos += 1 + end + 1;
                        body[..end].to_string()
                    }
                    None => {
                        // Unterminated quoted value: take the rest.
                        self.pos = self.src.len();
                        body.to_string()
                    }
                }
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                rest[..end].to_string()
            }
        }
    }

    /// Consume the raw text content of a `<style>`/`<script>` element up
    /// to its matching close tag.
    fn consume_raw_text(&mut self, element: &Node, tag: &str) {
        let close = format!("</{}", tag);
        let haystack = self.src[self.pos..].to_ascii_lowercase();
        match haystack.find(&close) {
            Some(end) => {
                if end > 0 {
                    element.append(Node::text(&self.src[self.pos..self.pos + end]));
                }
                self.pos += end;
                match self.src[self.pos..].find('>') {
                    Some(gt) => self.pos += gt + 1,
                    None => self.pos = self.src.len(),
                }
            }
            None => {
                element.append(Node::text(&self.src[self.pos..]));
                self.pos = self.src.len();
            }
        }
    }

    fn skip_until(&mut self, prefix_len: usize, terminator: &str) {
        let start = self.pos + prefix_len;
        match self.src.get(start..).and_then(|s| s.find(terminator)) {
            Some(end) => self.pos = start + end + terminator.len(),
            None => self.pos = self.src.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        self.pos += rest.len() - trimmed.len();
    }

    fn append(&mut self, node: Node) {
        match self.stack.last() {
            Some(parent) => parent.append(node),
            None => self.roots.push(node),
        }
    }
}

/// Read a tag or attribute name prefix: letters, digits, `-`, `_`, `:`.
fn read_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
        .unwrap_or(s.len());
    &s[..end]
}
