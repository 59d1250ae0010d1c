//! The graph store.
//!
//! [`Graph<K>`] is the store for one node key type `K`, with attribute
//! layouts fixed by a compiled schema. [`GraphStore`] erases `K` so that a
//! graph chosen by a runtime spec can be used through a single interface.

mod attrs;
mod config;
mod dynamic;
mod key;
mod store;

pub use config::GraphConfig;
pub use dynamic::{EdgeIter, GraphStore, NodeIter};
pub use key::NodeKey;
pub use store::Graph;

/// Edge direction relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges leaving the node.
    Outgoing,
    /// Edges entering the node.
    Incoming,
}
