//! Compilation configuration.

use serde::Deserialize;

/// Options controlling the compilation pipeline and the minifier.
///
/// Defaults favor minimal output size. Loadable from a config file via
/// serde; every field falls back to its default when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Run the minifier pass at all.
    pub minimize: bool,
    /// Strip markup comments.
    pub remove_comments: bool,
    /// Collapse whitespace runs.
    pub collapse_whitespace: bool,
    /// Collapse to a single space instead of removing inter-tag
    /// whitespace entirely.
    pub conservative_collapse: bool,
    /// Rewrite any doctype to the short `<!doctype html>` form.
    pub use_short_doctype: bool,
    /// Preserve `/>` self-closing slashes.
    pub keep_closing_slash: bool,
    /// Strip `type` attributes from `<script>` elements.
    pub remove_script_type_attributes: bool,
    /// Strip `type` attributes from `<style>` elements.
    pub remove_style_type_attributes: bool,
    /// Attribute references to protect and rewrite: `tag:attr` entries,
    /// or `:attr` wildcards matching the attribute on any tag.
    pub attributes: Vec<String>,
    /// Rewrite marker-wrapped `on*` attributes to bare path expressions.
    pub interpolate: bool,
    /// Prefix applied to rewritten local resource references.
    pub url_root: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            minimize: true,
            remove_comments: true,
            collapse_whitespace: true,
            conservative_collapse: false,
            use_short_doctype: true,
            keep_closing_slash: false,
            remove_script_type_attributes: true,
            remove_style_type_attributes: true,
            attributes: vec!["img:src".into(), "link:href".into()],
            interpolate: true,
            url_root: String::new(),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    pub fn with_attribute(mut self, entry: impl Into<String>) -> Self {
        self.attributes.push(entry.into());
        self
    }

    pub fn with_attributes(mut self, entries: Vec<String>) -> Self {
        self.attributes = entries;
        self
    }

    pub fn with_url_root(mut self, url_root: impl Into<String>) -> Self {
        self.url_root = url_root.into();
        self
    }

    pub fn conservative_collapse(mut self, conservative: bool) -> Self {
        self.conservative_collapse = conservative;
        self
    }

    /// Whether a `tag:attr` pair is accepted by the configured
    /// `attributes` entries. A leading-colon entry (`:src`) matches the
    /// attribute on any tag.
    pub fn accepts_reference(&self, tag: &str, attr: &str) -> bool {
        self.attributes.iter().any(|entry| {
            match entry.split_once(':') {
                Some(("", want_attr)) => attr.eq_ignore_ascii_case(want_attr),
                Some((want_tag, want_attr)) => {
                    tag.eq_ignore_ascii_case(want_tag) && attr.eq_ignore_ascii_case(want_attr)
                }
                // Bare entry: attribute name on any tag.
                None => attr.eq_ignore_ascii_case(entry),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_favor_minimal_output() {
        let opts = CompileOptions::default();
        assert!(opts.minimize);
        assert!(opts.remove_comments);
        assert!(opts.collapse_whitespace);
        assert!(opts.use_short_doctype);
        assert!(!opts.keep_closing_slash);
        assert!(!opts.conservative_collapse);
    }

    #[test]
    fn test_accepts_reference_forms() {
        let opts = CompileOptions::new().with_attributes(vec![
            "img:src".into(),
            ":href".into(),
            "poster".into(),
        ]);
        assert!(opts.accepts_reference("img", "src"));
        assert!(!opts.accepts_reference("script", "src"));
        assert!(opts.accepts_reference("a", "href"));
        assert!(opts.accepts_reference("link", "href"));
        assert!(opts.accepts_reference("video", "poster"));
        assert!(!opts.accepts_reference("video", "src"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let opts: CompileOptions = serde_yaml::from_str(
            "minimize: false\nurlRoot: /static/\nattributes:\n  - ':src'\n",
        )
        .unwrap();
        assert!(!opts.minimize);
        assert_eq!(opts.url_root, "/static/");
        assert_eq!(opts.attributes, vec![":src"]);
        // Untouched fields keep their defaults.
        assert!(opts.remove_comments);
    }
}
