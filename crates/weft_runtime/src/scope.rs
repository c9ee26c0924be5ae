//! Render scope: the object interpolation expressions resolve against.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use weft_dom::Event;

/// A named event handler carried by a scope. Invoked with the scope as
/// receiver and the dispatched event.
pub type Handler = Rc<dyn Fn(&Props, &Event)>;

/// Capability interface for expression resolution.
///
/// A scope supports two lookups: a top-level value by exact key, and a
/// named handler. The standard implementation is [`Props`]; anything
/// that can answer these two questions can back interpolation.
pub trait Scope {
    /// Exact top-level value for `key`, if present.
    fn value(&self, key: &str) -> Option<Value>;

    /// Named handler for `name`, if present.
    fn handler(&self, name: &str) -> Option<Handler>;
}

/// The standard render scope: a JSON object of values plus a table of
/// named handlers.
#[derive(Clone, Default)]
pub struct Props {
    values: serde_json::Map<String, Value>,
    handlers: HashMap<String, Handler>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope from a JSON value. Non-object values produce an
    /// empty scope.
    pub fn from_value(value: Value) -> Self {
        let values = match value {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            values,
            handlers: HashMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Props, &Event) + 'static,
    {
        self.handlers.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn values(&self) -> &serde_json::Map<String, Value> {
        &self.values
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.keys().map(|k| k.as_str()).collect()
    }
}

impl Scope for Props {
    fn value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn handler(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("values", &self.values)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Render a JSON value the way it reads inside interpolated text:
/// strings without quotes, everything else in canonical form.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_values() {
        let props = Props::new().with_value("title", "Hi").with_value("n", 3);
        assert_eq!(props.value("title"), Some(json!("Hi")));
        assert_eq!(props.value("n"), Some(json!(3)));
        assert_eq!(props.value("missing"), None);
    }

    #[test]
    fn test_from_value_non_object_is_empty() {
        let props = Props::from_value(json!([1, 2]));
        assert!(props.values().is_empty());
    }

    #[test]
    fn test_value_to_string_unquoted() {
        assert_eq!(value_to_string(&json!("x")), "x");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
    }
}
