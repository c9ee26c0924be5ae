//! # weft_runtime
//!
//! Runtime half of the weft template system: resolves `${...}`
//! interpolation expressions against a render scope, wires `on*` event
//! attributes to scope handlers, and decorates node lists with mount
//! capability.
//!
//! The evaluator and binder are invoked by compiled template artifacts
//! but are equally callable by external collaborators (for example a
//! locale message formatter reusing [`interpolate::lookup`]).

pub mod bind;
pub mod connect;
pub mod interpolate;
pub mod scope;

pub use bind::bind_events;
pub use connect::{connect, ConnectedNodes};
pub use interpolate::{lookup, resolve};
pub use scope::{Handler, Props, Scope};
