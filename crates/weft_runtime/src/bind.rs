//! Runtime event binder.
//!
//! Walks a realized fragment and turns `on*` attributes into real event
//! listeners resolved against the render scope. The attribute is removed
//! whether or not a handler was found, so a second pass over the same
//! tree is a no-op and the host never sees the raw attribute.

use std::rc::Rc;

use tracing::debug;
use weft_dom::Node;

use crate::interpolate;
use crate::scope::{Props, Scope};

/// Bind event-handler attributes under `root` to handlers on `props`.
///
/// Every descendant element of `root` (root itself excluded) is checked
/// for attributes starting with the two-character `on` prefix. The
/// attribute value is resolved through the expression evaluator; if the
/// resolved value names a handler on the scope, it is attached as a
/// listener for the event named by the attribute minus the prefix,
/// invoked with `props` as receiver. No-op on an absent root.
pub fn bind_events(root: Option<&Node>, props: &Rc<Props>) -> Option<Node> {
    let root = root?;
    for element in root.descendants() {
        if !element.is_element() {
            continue;
        }
        for name in element.attr_names() {
            if !name.starts_with("on") || name.len() <= 2 {
                continue;
            }
            let value = element.attr(&name).unwrap_or_default();
            let resolved = interpolate::resolve(&value, props.as_ref());
            if let Some(handler) = props.handler(&resolved) {
                let event = name[2..].to_string();
                let scope = props.clone();
                element.add_listener(event, Rc::new(move |ev| handler(scope.as_ref(), ev)));
            } else {
                debug!(attribute = %name, value = %resolved, "no handler for event attribute");
            }
            // Removed unconditionally: re-binding never double-attaches
            // and the attribute never reaches native handling.
            element.remove_attr(&name);
        }
    }
    Some(root.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use weft_dom::parse_fragment;

    fn fragment_root(markup: &str) -> Node {
        let root = Node::element("#fragment");
        for node in parse_fragment(markup) {
            root.append(node);
        }
        root
    }

    #[test]
    fn test_bind_attaches_and_removes_attribute() {
        let root = fragment_root(r#"<button onclick="go">x</button>"#);
        let hits = Rc::new(Cell::new(0));
        let hits2 = hits.clone();
        let props = Rc::new(Props::new().with_handler("go", move |_, _| {
            hits2.set(hits2.get() + 1);
        }));

        bind_events(Some(&root), &props);

        let button = &root.children()[0];
        assert!(button.attr("onclick").is_none());
        assert_eq!(button.dispatch("click"), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_bind_resolves_receiver_path() {
        let root = fragment_root(r#"<a onclick="this.itemClick">x</a>"#);
        let props = Rc::new(Props::new().with_handler("itemClick", |_, _| {}));
        bind_events(Some(&root), &props);
        assert_eq!(root.children()[0].listener_count("click"), 1);
    }

    #[test]
    fn test_bind_marker_wrapped_value() {
        // Direct runtime path, without the compile-time marker strip.
        let root = fragment_root(r#"<a onclick="${go}">x</a>"#);
        let props = Rc::new(Props::new().with_handler("go", |_, _| {}));
        bind_events(Some(&root), &props);
        assert_eq!(root.children()[0].listener_count("click"), 1);
    }

    #[test]
    fn test_bind_idempotent() {
        let root = fragment_root(r#"<button onclick="go">x</button>"#);
        let props = Rc::new(Props::new().with_handler("go", |_, _| {}));
        bind_events(Some(&root), &props);
        bind_events(Some(&root), &props);
        let button = &root.children()[0];
        assert_eq!(button.listener_count("click"), 1);
        assert!(button.attr_names().iter().all(|n| !n.starts_with("on")));
    }

    #[test]
    fn test_missing_target_removes_attribute_silently() {
        let root = fragment_root(r#"<button onclick="nothing">x</button>"#);
        let props = Rc::new(Props::new());
        bind_events(Some(&root), &props);
        let button = &root.children()[0];
        assert!(button.attr("onclick").is_none());
        assert_eq!(button.dispatch("click"), 0);
    }

    #[test]
    fn test_absent_root_is_noop() {
        assert!(bind_events(None, &Rc::new(Props::new())).is_none());
    }

    #[test]
    fn test_non_event_attributes_untouched() {
        let root = fragment_root(r##"<a data-x="1" href="#" onclick="go">x</a>"##);
        let props = Rc::new(Props::new().with_handler("go", |_, _| {}));
        bind_events(Some(&root), &props);
        let a = &root.children()[0];
        assert_eq!(a.attr("data-x").as_deref(), Some("1"));
        assert_eq!(a.attr("href").as_deref(), Some("#"));
    }
}
