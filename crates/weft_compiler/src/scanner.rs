//! Attribute reference scanner.
//!
//! Tokenizes raw markup to locate attribute values of interest, keeping
//! their absolute byte offsets so the pipeline can rewrite the source
//! in place later. The scan is a two-state machine: `Outside` a tag
//! (skipping comments, CDATA, doctype/processing-instruction nodes and
//! closing tags) and `InsideTag` (consuming attributes until `>`).
//!
//! Malformed input never hangs the scan: every state transition
//! consumes at least one byte, and scanning simply stops matching
//! inside ill-formed regions.

use tracing::trace;

/// A located attribute value. `start`/`len` address the value bytes in
/// the original markup, excluding any surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMatch {
    pub start: usize,
    pub len: usize,
    pub value: String,
}

/// Scan `markup` for attribute values accepted by `predicate`, which is
/// invoked with the lowercase open tag name and attribute name. Matches
/// are returned in source order.
pub fn scan_attributes<F>(markup: &str, predicate: F) -> Vec<RefMatch>
where
    F: Fn(&str, &str) -> bool,
{
    let mut matches = Vec::new();
    let mut pos = 0;

    while pos < markup.len() {
        let rest = &markup[pos..];
        let Some(lt) = rest.find('<') else { break };
        pos += lt;
        let rest = &markup[pos..];

        if rest.starts_with("<!--") {
            pos = skip_past(markup, pos + 4, "-->");
        } else if rest.starts_with("<![CDATA[") {
            pos = skip_past(markup, pos + 9, "]]>");
        } else if rest.starts_with("<!") || rest.starts_with("<?") || rest.starts_with("</") {
            pos = skip_past(markup, pos + 2, ">");
        } else if rest[1..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
        {
            let name = read_name(&rest[1..]);
            let tag = name.to_ascii_lowercase();
            pos += 1 + name.len();
            pos = scan_inside_tag(markup, pos, &tag, &predicate, &mut matches);
        } else {
            // `<` that opens nothing.
            pos += 1;
        }
    }

    trace!(count = matches.len(), "attribute scan complete");
    matches
}

/// Scan attributes of the currently open tag starting at `pos`. Returns
/// the position just past the closing `>` (or end of input).
fn scan_inside_tag<F>(
    markup: &str,
    mut pos: usize,
    tag: &str,
    predicate: &F,
    matches: &mut Vec<RefMatch>,
) -> usize
where
    F: Fn(&str, &str) -> bool,
{
    loop {
        pos = skip_whitespace(markup, pos);
        let rest = &markup[pos..];
        if rest.is_empty() {
            return pos;
        }
        if rest.starts_with('>') {
            return pos + 1;
        }
        if rest.starts_with("/>") {
            return pos + 2;
        }
        if rest.starts_with('/') {
            pos += 1;
            continue;
        }

        let name = read_name(rest);
        if name.is_empty() {
            // Not an attribute name: consume one char to keep moving.
            pos += rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            continue;
        }
        let attr = name.to_ascii_lowercase();
        pos += name.len();

        pos = skip_whitespace(markup, pos);
        if !markup[pos..].starts_with('=') {
            // Valueless attribute.
            continue;
        }
        pos += 1;
        pos = skip_whitespace(markup, pos);

        let rest = &markup[pos..];
        let (start, len, end_pos) = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(end) => (pos + 1, end, pos + 1 + end + 1),
                    None => {
                        // Unterminated quote: the region is ill-formed;
                        // stop matching here.
                        return markup.len();
                    }
                }
            }
            Some(_) => {
                let end = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                (pos, end, pos + end)
            }
            None => return pos,
        };

        if predicate(tag, &attr) {
            matches.push(RefMatch {
                start,
                len,
                value: markup[start..start + len].to_string(),
            });
        }
        pos = end_pos;
    }
}

fn skip_past(markup: &str, from: usize, terminator: &str) -> usize {
    match markup.get(from..).and_then(|s| s.find(terminator)) {
        Some(end) => from + end + terminator.len(),
        None => markup.len(),
    }
}

fn skip_whitespace(markup: &str, pos: usize) -> usize {
    let rest = &markup[pos..];
    let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
    pos + (rest.len() - trimmed.len())
}

fn read_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
        .unwrap_or(s.len());
    &s[..end]
}
