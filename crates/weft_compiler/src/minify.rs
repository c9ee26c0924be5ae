//! Markup minifier seam and the built-in default implementation.

use regex::Regex;

use crate::options::CompileOptions;

/// External minifier collaborator: returns minified markup text for the
/// configured subset of options.
#[cfg_attr(test, mockall::automock)]
pub trait Minifier {
    fn minify(&self, markup: &str, options: &CompileOptions) -> anyhow::Result<String>;
}

/// Built-in minifier implementing the recognized option toggles.
pub struct DefaultMinifier {
    comment: Regex,
    cdata: Regex,
    doctype: Regex,
    script_type: Regex,
    style_type: Regex,
    closing_slash: Regex,
    inter_tag: Regex,
    ws_run: Regex,
}

impl Default for DefaultMinifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultMinifier {
    pub fn new() -> Self {
        Self {
            comment: Regex::new(r"(?s)<!--.*?-->").unwrap(),
            cdata: Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap(),
            doctype: Regex::new(r"(?i)<!doctype[^>]*>").unwrap(),
            script_type: Regex::new(
                r#"(?is)(<script\b[^>]*?)\s+type\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#,
            )
            .unwrap(),
            style_type: Regex::new(
                r#"(?is)(<style\b[^>]*?)\s+type\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#,
            )
            .unwrap(),
            closing_slash: Regex::new(r"\s*/>").unwrap(),
            inter_tag: Regex::new(r">\s+<").unwrap(),
            ws_run: Regex::new(r"[ \t\r\n]+").unwrap(),
        }
    }
}

impl Minifier for DefaultMinifier {
    fn minify(&self, markup: &str, options: &CompileOptions) -> anyhow::Result<String> {
        let mut out = markup.to_string();

        if options.remove_comments {
            out = self.comment.replace_all(&out, "").into_owned();
        }
        // CDATA wrapping never survives minimal output; the inner text
        // stays.
        out = self.cdata.replace_all(&out, "$1").into_owned();
        if options.use_short_doctype {
            out = self.doctype.replace_all(&out, "<!doctype html>").into_owned();
        }
        if options.remove_script_type_attributes {
            out = self.script_type.replace_all(&out, "$1").into_owned();
        }
        if options.remove_style_type_attributes {
            out = self.style_type.replace_all(&out, "$1").into_owned();
        }
        if !options.keep_closing_slash {
            out = self.closing_slash.replace_all(&out, ">").into_owned();
        }
        if options.collapse_whitespace {
            if options.conservative_collapse {
                out = self.ws_run.replace_all(&out, " ").into_owned();
            } else {
                out = self.inter_tag.replace_all(&out, "><").into_owned();
                out = self.ws_run.replace_all(&out, " ").into_owned();
                out = out.trim().to_string();
            }
        }
        Ok(out)
    }
}
