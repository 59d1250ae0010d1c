//! Turning runtime specs into concrete graph stores.
//!
//! The registry compiles each distinct [`GraphSpec`] once and shares the
//! compiled schema with every graph created from it. Instantiation picks the
//! [`Graph<K>`] matching the spec's key type and returns it behind the
//! [`GraphStore`] interface.
//!
//! [`GraphSpec`]: crate::GraphSpec
//! [`Graph<K>`]: crate::Graph
//! [`GraphStore`]: crate::GraphStore

mod registry;

pub use registry::{CacheStats, SchemaRegistry, specialize};
