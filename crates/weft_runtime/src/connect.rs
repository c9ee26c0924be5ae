//! Node list connector: deferred mounting for bound fragments.

use tracing::trace;
use weft_dom::{Node, NodeList};

/// A node list decorated with mount capability.
///
/// Produced by [`connect`]; stateless beyond the list it decorates and
/// the optional host element captured at connect time.
#[derive(Clone, Debug)]
pub struct ConnectedNodes {
    nodes: NodeList,
    host: Option<Node>,
}

/// Attach deferred-mount capability to a node list. `host` is the
/// element the list belongs to, used as the default mount root.
pub fn connect(nodes: NodeList, host: Option<Node>) -> ConnectedNodes {
    ConnectedNodes { nodes, host }
}

impl ConnectedNodes {
    pub fn nodes(&self) -> &NodeList {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Mount the list into `root`, the connect-time host, or a fresh
    /// detached container, in that order of preference. If the chosen
    /// element exposes an open shadow root, nodes land inside it. The
    /// target's existing content is cleared first; nodes are appended in
    /// list order; the mount target is returned.
    pub fn mount(&self, root: Option<&Node>) -> Node {
        let chosen = root.cloned().or_else(|| self.host.clone());
        let target = match chosen {
            Some(el) if el.is_element() => el.shadow_root().unwrap_or(el),
            _ => Node::element("div"),
        };
        target.clear_children();
        for node in &self.nodes {
            target.append(node.clone());
        }
        trace!(count = self.nodes.len(), "mounted node list");
        target
    }
}
