//! Node tree model.
//!
//! Nodes are cheap reference-counted handles; cloning a [`Node`] clones
//! the handle, not the subtree. Interior mutability keeps the API close
//! to how a document fragment is actually used by the runtime: walk,
//! read attributes, remove attributes, attach listeners, append.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::event::{Event, Listener};

enum Payload {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
        shadow: Option<Node>,
        listeners: HashMap<String, Vec<Listener>>,
    },
    Text(String),
    Comment(String),
}

/// A handle to a node in the tree.
#[derive(Clone)]
pub struct Node(Rc<RefCell<Payload>>);

impl Node {
    /// Create an element node with the given tag name.
    pub fn element(tag: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(Payload::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            shadow: None,
            listeners: HashMap::new(),
        })))
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(Payload::Text(content.into()))))
    }

    /// Create a comment node.
    pub fn comment(content: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(Payload::Comment(content.into()))))
    }

    /// Whether this node is an element.
    pub fn is_element(&self) -> bool {
        matches!(&*self.0.borrow(), Payload::Element { .. })
    }

    /// Tag name, lowercase as parsed. `None` for text/comment nodes.
    pub fn tag(&self) -> Option<String> {
        match &*self.0.borrow() {
            Payload::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    /// Two handles pointing at the same node.
    pub fn same_node(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Attribute value, if present. Non-elements have no attributes.
    pub fn attr(&self, name: &str) -> Option<String> {
        match &*self.0.borrow() {
            Payload::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Set an attribute, replacing any existing value, preserving order
    /// of first appearance.
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Payload::Element { attrs, .. } = &mut *self.0.borrow_mut() {
            let name = name.into();
            let value = value.into();
            if let Some(entry) = attrs.iter_mut().find(|(n, _)| *n == name) {
                entry.1 = value;
            } else {
                attrs.push((name, value));
            }
        }
    }

    /// Remove an attribute. Silently ignores absent names.
    pub fn remove_attr(&self, name: &str) {
        if let Payload::Element { attrs, .. } = &mut *self.0.borrow_mut() {
            attrs.retain(|(n, _)| n != name);
        }
    }

    /// Attribute names in document order.
    pub fn attr_names(&self) -> Vec<String> {
        match &*self.0.borrow() {
            Payload::Element { attrs, .. } => attrs.iter().map(|(n, _)| n.clone()).collect(),
            _ => Vec::new(),
        }
    }

    /// Append a child node.
    pub fn append(&self, child: Node) {
        if let Payload::Element { children, .. } = &mut *self.0.borrow_mut() {
            children.push(child);
        }
    }

    /// Child handles in order.
    pub fn children(&self) -> Vec<Node> {
        match &*self.0.borrow() {
            Payload::Element { children, .. } => children.clone(),
            _ => Vec::new(),
        }
    }

    /// Remove all children.
    pub fn clear_children(&self) {
        if let Payload::Element { children, .. } = &mut *self.0.borrow_mut() {
            children.clear();
        }
    }

    /// All descendants in depth-first order, excluding this node.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Attach an open shadow root, creating it on first call.
    pub fn attach_shadow(&self) -> Option<Node> {
        if let Payload::Element { shadow, .. } = &mut *self.0.borrow_mut() {
            if shadow.is_none() {
                *shadow = Some(Node::element("#shadow-root"));
            }
            return shadow.clone();
        }
        None
    }

    /// The open shadow root, if one has been attached.
    pub fn shadow_root(&self) -> Option<Node> {
        match &*self.0.borrow() {
            Payload::Element { shadow, .. } => shadow.clone(),
            _ => None,
        }
    }

    /// Attach a listener for a named event.
    pub fn add_listener(&self, event: impl Into<String>, listener: Listener) {
        if let Payload::Element { listeners, .. } = &mut *self.0.borrow_mut() {
            listeners.entry(event.into()).or_default().push(listener);
        }
    }

    /// Number of listeners attached for a named event.
    pub fn listener_count(&self, event: &str) -> usize {
        match &*self.0.borrow() {
            Payload::Element { listeners, .. } => {
                listeners.get(event).map(|l| l.len()).unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Synchronously dispatch an event to this element's listeners.
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &str) -> usize {
        // Clone the listener handles out so a listener may mutate the
        // tree without holding the borrow.
        let to_call: Vec<Listener> = match &*self.0.borrow() {
            Payload::Element { listeners, .. } => {
                listeners.get(event).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        };
        let ev = Event::new(event, self.clone());
        for listener in &to_call {
            listener(&ev);
        }
        to_call.len()
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match &*self.0.borrow() {
            Payload::Text(t) => t.clone(),
            Payload::Comment(_) => String::new(),
            Payload::Element { children, .. } => {
                children.iter().map(|c| c.text_content()).collect()
            }
        }
    }

    /// Serialize this node back to markup. Diagnostics only; no effort
    /// is made to round-trip the exact source.
    pub fn outer_html(&self) -> String {
        match &*self.0.borrow() {
            Payload::Text(t) => t.clone(),
            Payload::Comment(c) => format!("<!--{}-->", c),
            Payload::Element {
                tag,
                attrs,
                children,
                ..
            } => {
                let mut out = String::new();
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    out.push_str(&child.outer_html());
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
                out
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.borrow() {
            Payload::Text(t) => write!(f, "Text({:?})", t),
            Payload::Comment(c) => write!(f, "Comment({:?})", c),
            Payload::Element { tag, children, .. } => {
                write!(f, "Element(<{}>, {} children)", tag, children.len())
            }
        }
    }
}

fn collect_descendants(node: &Node, out: &mut Vec<Node>) {
    for child in node.children() {
        out.push(child.clone());
        collect_descendants(&child, out);
    }
}

/// An ordered list of top-level nodes, as produced by fragment parsing.
#[derive(Clone, Debug, Default)]
pub struct NodeList(pub Vec<Node>);

impl NodeList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, node: Node) {
        self.0.push(node);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }
}

impl IntoIterator for NodeList {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
