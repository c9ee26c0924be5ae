//! # weft_dom
//!
//! A lightweight, reference-counted node tree used by the weft template
//! runtime. It models just enough of a document fragment for templates:
//! elements with ordered attributes, text and comment nodes, open shadow
//! roots, and event listeners with synchronous dispatch.
//!
//! The tree is produced by [`parse_fragment`], a tolerant parser that
//! never fails: malformed regions degrade to text or implicitly closed
//! elements rather than errors.

pub mod event;
pub mod node;
pub mod parse;

pub use event::{Event, Listener};
pub use node::{Node, NodeList};
pub use parse::parse_fragment;
