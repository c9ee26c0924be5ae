//! Synchronous events and listeners.

use std::rc::Rc;

use crate::node::Node;

/// An event delivered to listeners during [`Node::dispatch`].
#[derive(Clone)]
pub struct Event {
    /// Event name without any `on` prefix, e.g. `click`.
    pub name: String,
    /// The element the event was dispatched on.
    pub target: Node,
}

impl Event {
    pub fn new(name: impl Into<String>, target: Node) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

/// A listener attached to an element for a named event.
pub type Listener = Rc<dyn Fn(&Event)>;
