//! # typedgraph-core
//!
//! Core layer for Typedgraph: schemas, attribute storage, adjacency, and the
//! graph store itself.
//!
//! This crate provides the data structures for storing graphs whose node and
//! edge attributes follow a schema chosen at runtime. It depends only on
//! `typedgraph-common`.
//!
//! ## Modules
//!
//! - [`schema`] - Attribute schemas, graph specs, and compiled record layouts
//! - [`attr`] - Columnar attribute tables and borrowed record views
//! - [`index`] - Per-node neighbor sets
//! - [`graph`] - The typed graph store and the object-safe [`GraphStore`] trait
//! - [`specialize`] - The schema registry that turns a spec into a store
//!
//! ## Example
//!
//! ```
//! use typedgraph_core::{GraphSpec, SchemaRegistry};
//! use typedgraph_common::{Scalar, Value};
//!
//! let spec = GraphSpec::parse("uint64", &[("position", "float64[3]")], &[("weight", "float32")], false)?;
//! let mut graph = SchemaRegistry::global().instantiate(&spec)?;
//!
//! graph.add_node(Scalar::UInt64(0), &[Value::from([0.0f64, 0.0, 0.0])])?;
//! graph.add_node(Scalar::UInt64(1), &[Value::from([1.0f64, 1.0, 1.0])])?;
//! graph.add_edge(Scalar::UInt64(0), Scalar::UInt64(1), &[Value::from(1.5f32)])?;
//!
//! assert_eq!(graph.num_edges(), 1);
//! let positions = graph.get_nodes_attr("position", None)?;
//! assert_eq!(positions.shape(), &[2, 3]);
//! # Ok::<(), typedgraph_common::Error>(())
//! ```

pub mod attr;
pub mod graph;
pub mod index;
pub mod schema;
pub mod specialize;

// Re-export commonly used types
pub use attr::RecordRef;
pub use graph::{Direction, Graph, GraphConfig, GraphStore, NodeKey};
pub use index::NeighborSet;
pub use schema::{AttrSchema, CompiledSchema, GraphSpec, RecordLayout, SchemaSignature};
pub use specialize::{CacheStats, SchemaRegistry, specialize};
