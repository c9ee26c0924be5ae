//! Placeholder tokens protecting attribute values from minification.
//!
//! A placeholder is a generated string guaranteed not to already occur
//! in the working markup, substituted for a reference value so the
//! minifier cannot corrupt it, and swapped back afterward.

use uuid::Uuid;

/// Records `token -> value` substitutions for one compilation pass.
#[derive(Debug, Default)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a token not occurring in `source` or among existing
    /// tokens, and record it as standing in for `value`. Collisions are
    /// astronomically unlikely but handled by regenerating.
    pub fn insert(&mut self, source: &str, value: impl Into<String>) -> String {
        let value = value.into();
        loop {
            let token = format!("weft-ref-{}", Uuid::new_v4().simple());
            let collides =
                source.contains(&token) || self.entries.iter().any(|(t, _)| *t == token);
            if !collides {
                self.entries.push((token.clone(), value));
                return token;
            }
        }
    }

    /// Substitute every recorded token back with its value.
    pub fn restore(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (token, value) in &self.entries {
            out = out.replace(token, value);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
