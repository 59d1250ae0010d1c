//! # Typedgraph
//!
//! In-memory graphs whose node and edge attributes follow a schema chosen at
//! runtime.
//!
//! Describe a graph with a [`GraphSpec`]: the node key type, the node and
//! edge attribute fields (scalars or fixed-length arrays), and whether edges
//! are directed. [`specialize`] turns the spec into an empty graph. Equal
//! specs share one compiled layout, so creating many graphs of the same
//! shape is cheap.
//!
//! Attributes are stored column by column and exchanged in bulk as
//! row-major [`AttrArray`]s, one row per node or edge.
//!
//! ## Quick Start
//!
//! ```rust
//! use typedgraph::{AttrArray, GraphSpec, Scalar, specialize};
//!
//! let spec = GraphSpec::parse(
//!     "uint64",
//!     &[("position", "float64[3]")],
//!     &[("weight", "float32")],
//!     false,
//! )?;
//! let mut graph = specialize(&spec)?;
//!
//! let keys = AttrArray::from_vec(vec![0u64, 1, 2]);
//! let positions = AttrArray::from_rows(&[[0.0f64, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]);
//! graph.add_nodes(&keys, &[positions])?;
//!
//! let pairs = AttrArray::from_pairs(&[(0u64, 1u64), (1, 2)]);
//! let weights = AttrArray::from_vec(vec![1.5f32, 2.5]);
//! graph.add_edges(&pairs, &[weights])?;
//!
//! assert_eq!(graph.num_edges(), 2);
//! assert_eq!(graph.neighbors_count(&AttrArray::from_vec(vec![1u64]))?, [2]);
//! let edges = graph.edges_by_nodes(&AttrArray::from_vec(vec![0u64]))?;
//! assert_eq!(edges.to_rows::<u64, 2>(), Some(vec![[0, 1]]));
//!
//! let weight = graph.get_edge_attr("weight", Scalar::UInt64(1), Scalar::UInt64(0))?;
//! assert_eq!(weight.get::<f32>(), Some(1.5));
//! # Ok::<(), typedgraph::Error>(())
//! ```
//!
//! When the key type is known at compile time, [`Graph<K>`] offers the same
//! operations with native keys and no dynamic dispatch.

// Graph construction and the store API
pub use typedgraph_core::{
    CacheStats, CompiledSchema, Direction, Graph, GraphConfig, GraphStore, NodeKey, RecordRef,
    SchemaRegistry, specialize,
};

// Schema descriptions
pub use typedgraph_core::{AttrSchema, GraphSpec};

// Values and bulk buffers
pub use typedgraph_common::{
    ArrayData, AttrArray, DType, Element, Error, Result, Scalar, ScalarType, Value,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_json() {
        let json = r#"{
            "node_key": "int32",
            "node_attrs": {"position": "double[2]", "label": "uint8"},
            "edge_attrs": {"length": "float"},
            "directed": true
        }"#;
        let spec: GraphSpec = serde_json::from_str(json).unwrap();
        let mut graph = specialize(&spec).unwrap();
        assert!(graph.is_directed());

        graph
            .add_node(Scalar::Int32(-1), &[Value::from([0.5f64, 1.5]), Value::from(3u8)])
            .unwrap();
        graph.add_node(Scalar::Int32(2), &[]).unwrap();
        graph
            .add_edge(Scalar::Int32(-1), Scalar::Int32(2), &[Value::from(4.0f32)])
            .unwrap();

        let record = graph.node(Scalar::Int32(-1)).unwrap();
        assert_eq!(record.get_array::<f64, 2>("position"), Ok([0.5, 1.5]));
        assert_eq!(graph.in_neighbors_count(&AttrArray::from_vec(vec![2i32])).unwrap(), [1]);
    }

    #[test]
    fn test_typed_graph() {
        let spec = GraphSpec::new(ScalarType::UInt8).with_node_attr("flag", "bool").unwrap();
        let mut graph = Graph::<u8>::new(&spec).unwrap();
        graph.add_node(1, &[Value::from(true)]).unwrap();
        graph.add_node(2, &[]).unwrap();
        graph.add_edge(1, 2, &[]).unwrap();

        let flags = graph.get_nodes_attr("flag", None).unwrap();
        assert_eq!(flags.as_slice::<bool>(), Some(&[true, false][..]));
        assert_eq!(graph.neighbors(2).unwrap().collect::<Vec<_>>(), [1]);
    }
}
