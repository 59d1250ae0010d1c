//! Attribute access on [`Graph`].
//!
//! Bulk getters return one row per requested key in request order, or one
//! row per node (edge) in store order when no keys are given. Bulk setters
//! resolve every key before writing, so a failed call writes nothing.

use typedgraph_common::types::{AttrArray, Value};
use typedgraph_common::utils::error::Result;

use super::{Graph, NodeKey};
use crate::attr::Slot;

impl<K: NodeKey> Graph<K> {
    fn node_slots(&self, keys: Option<&[K]>) -> Result<Vec<Slot>> {
        match keys {
            None => Ok(self.nodes.values().map(|entry| entry.slot).collect()),
            Some(keys) => keys
                .iter()
                .map(|&key| self.entry(key).map(|entry| entry.slot))
                .collect(),
        }
    }

    fn edge_slots(&self, pairs: Option<&[(K, K)]>) -> Result<Vec<Slot>> {
        match pairs {
            None => Ok(self.edge_entries().map(|(_, _, slot)| slot).collect()),
            Some(pairs) => pairs
                .iter()
                .map(|&(u, v)| self.edge_slot(u, v))
                .collect(),
        }
    }

    /// Reads one node field.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNode` or `UnknownField`.
    pub fn get_node_attr(&self, field: &str, key: K) -> Result<Value> {
        let slot = self.entry(key)?.slot;
        self.node_attrs.get(slot, field)
    }

    /// Writes one node field.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNode`, `UnknownField`, or
    /// `SchemaMismatch`.
    pub fn set_node_attr(&mut self, field: &str, key: K, value: impl Into<Value>) -> Result<()> {
        let slot = self.entry(key)?.slot;
        self.node_attrs.set(slot, field, &value.into())
    }

    /// Reads one node field for many nodes.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField`, or `UnknownNode` if any
    /// key is absent.
    pub fn get_nodes_attr(&self, field: &str, keys: Option<&[K]>) -> Result<AttrArray> {
        self.node_attrs.layout().index_of(field)?;
        let slots = self.node_slots(keys)?;
        tracing::trace!(field, rows = slots.len(), "bulk node attribute read");
        self.node_attrs.gather(field, &slots)
    }

    /// Writes one node field for many nodes.
    ///
    /// `values` must hold one row per key, or one row per node in store
    /// order when `keys` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField`, `UnknownNode`,
    /// `SchemaMismatch`, or `LengthMismatch`. Nothing is
    /// written on error.
    pub fn set_nodes_attr(
        &mut self,
        field: &str,
        keys: Option<&[K]>,
        values: &AttrArray,
    ) -> Result<()> {
        self.node_attrs.layout().index_of(field)?;
        let slots = self.node_slots(keys)?;
        tracing::trace!(field, rows = slots.len(), "bulk node attribute write");
        self.node_attrs.scatter(field, &slots, values)
    }

    /// Reads one edge field.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNode`, `UnknownEdge`, or
    /// `UnknownField`.
    pub fn get_edge_attr(&self, field: &str, u: K, v: K) -> Result<Value> {
        let slot = self.edge_slot(u, v)?;
        self.edge_attrs.get(slot, field)
    }

    /// Writes one edge field. In undirected graphs `(u, v)` and `(v, u)`
    /// name the same record.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNode`, `UnknownEdge`,
    /// `UnknownField`, or `SchemaMismatch`.
    pub fn set_edge_attr(
        &mut self,
        field: &str,
        u: K,
        v: K,
        value: impl Into<Value>,
    ) -> Result<()> {
        let slot = self.edge_slot(u, v)?;
        self.edge_attrs.set(slot, field, &value.into())
    }

    /// Reads one edge field for many edges, or for all edges in the order
    /// of [`Graph::edges`] when `pairs` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField`, `UnknownNode`, or
    /// `UnknownEdge`.
    pub fn get_edges_attr(&self, field: &str, pairs: Option<&[(K, K)]>) -> Result<AttrArray> {
        self.edge_attrs.layout().index_of(field)?;
        let slots = self.edge_slots(pairs)?;
        tracing::trace!(field, rows = slots.len(), "bulk edge attribute read");
        self.edge_attrs.gather(field, &slots)
    }

    /// Writes one edge field for many edges.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField`, `UnknownNode`,
    /// `UnknownEdge`, `SchemaMismatch`, or
    /// `LengthMismatch`. Nothing is written on error.
    pub fn set_edges_attr(
        &mut self,
        field: &str,
        pairs: Option<&[(K, K)]>,
        values: &AttrArray,
    ) -> Result<()> {
        self.edge_attrs.layout().index_of(field)?;
        let slots = self.edge_slots(pairs)?;
        tracing::trace!(field, rows = slots.len(), "bulk edge attribute write");
        self.edge_attrs.scatter(field, &slots, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GraphSpec;
    use typedgraph_common::utils::error::Error;

    fn graph() -> Graph<u64> {
        let spec = GraphSpec::parse(
            "uint64",
            &[("position", "float64[3]"), ("label", "uint8")],
            &[("weight", "float32")],
            false,
        )
        .unwrap();
        let mut graph = Graph::new(&spec).unwrap();
        let positions = AttrArray::from_rows(&[[0.0f64, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]);
        let labels = AttrArray::from_vec(vec![10u8, 11, 12]);
        graph.add_nodes(&[0, 1, 2], &[positions, labels]).unwrap();
        let weights = AttrArray::from_vec(vec![1.5f32, 2.5]);
        graph.add_edges(&[(0, 1), (1, 2)], &[weights]).unwrap();
        graph
    }

    #[test]
    fn test_single_attrs() {
        let mut graph = graph();
        assert_eq!(graph.get_node_attr("label", 1), Ok(Value::from(11u8)));
        graph.set_node_attr("label", 1, 42u8).unwrap();
        assert_eq!(graph.node(1).unwrap().get_as::<u8>("label"), Ok(42));

        assert!(matches!(
            graph.set_node_attr("label", 1, 42u16),
            Err(Error::SchemaMismatch { .. })
        ));
        assert!(matches!(
            graph.get_node_attr("color", 1),
            Err(Error::UnknownField(_))
        ));
        assert!(matches!(
            graph.get_node_attr("label", 9),
            Err(Error::UnknownNode(_))
        ));
    }

    #[test]
    fn test_edge_attrs_are_symmetric() {
        let mut graph = graph();
        graph.set_edge_attr("weight", 2, 1, 9.0f32).unwrap();
        assert_eq!(graph.get_edge_attr("weight", 1, 2), Ok(Value::from(9.0f32)));
        assert!(matches!(
            graph.get_edge_attr("weight", 0, 2),
            Err(Error::UnknownEdge(..))
        ));
    }

    #[test]
    fn test_bulk_node_attrs() {
        let mut graph = graph();
        let all = graph.get_nodes_attr("position", None).unwrap();
        assert_eq!(all.shape(), &[3, 3]);

        let some = graph.get_nodes_attr("label", Some(&[2, 0])).unwrap();
        assert_eq!(some.as_slice::<u8>(), Some(&[12u8, 10][..]));

        let update = AttrArray::from_rows(&[[5.0f64, 5.0, 5.0]]);
        graph.set_nodes_attr("position", Some(&[1]), &update).unwrap();
        assert_eq!(
            graph.node(1).unwrap().get_array::<f64, 3>("position"),
            Ok([5.0, 5.0, 5.0])
        );

        // one row for three nodes
        assert!(matches!(
            graph.set_nodes_attr("position", None, &update),
            Err(Error::LengthMismatch { expected: 3, found: 1 })
        ));
        // unknown key anywhere means nothing is written
        let labels = AttrArray::from_vec(vec![1u8, 2]);
        assert!(graph.set_nodes_attr("label", Some(&[0, 7]), &labels).is_err());
        assert_eq!(graph.get_node_attr("label", 0), Ok(Value::from(10u8)));
    }

    #[test]
    fn test_bulk_node_attrs_follow_node_order_after_removal() {
        let mut graph = graph();
        graph
            .add_node(3, &[Value::from([3.0f64, 3.0, 3.0]), Value::from(13u8)])
            .unwrap();
        graph.remove_node(1).unwrap();
        // the last node fills the removed position
        assert_eq!(graph.nodes().collect::<Vec<_>>(), [0, 3, 2]);
        // takes the freed slot
        graph.add_node(4, &[]).unwrap();

        let labels = graph.get_nodes_attr("label", None).unwrap();
        let positions = graph.get_nodes_attr("position", None).unwrap();
        let expected_labels: Vec<u8> = graph
            .nodes()
            .map(|n| graph.node(n).unwrap().get_as::<u8>("label").unwrap())
            .collect();
        let expected_positions: Vec<[f64; 3]> = graph
            .nodes()
            .map(|n| graph.node(n).unwrap().get_array::<f64, 3>("position").unwrap())
            .collect();
        assert_eq!(labels.as_slice::<u8>(), Some(&[10u8, 13, 12, 0][..]));
        assert_eq!(labels.as_slice::<u8>(), Some(expected_labels.as_slice()));
        assert_eq!(positions.to_rows::<f64, 3>(), Some(expected_positions));

        let update = AttrArray::from_vec(vec![20u8, 21, 22, 23]);
        graph.set_nodes_attr("label", None, &update).unwrap();
        let written: Vec<(u64, u8)> = graph
            .nodes()
            .map(|n| (n, graph.node(n).unwrap().get_as::<u8>("label").unwrap()))
            .collect();
        assert_eq!(written, [(0, 20), (3, 21), (2, 22), (4, 23)]);
    }

    #[test]
    fn test_bulk_edge_attrs_follow_edge_order() {
        let graph = graph();
        let weights = graph.get_edges_attr("weight", None).unwrap();
        let expected: Vec<f32> = graph
            .edges()
            .map(|(u, v)| graph.edge(u, v).unwrap().get_as::<f32>("weight").unwrap())
            .collect();
        assert_eq!(weights.as_slice::<f32>(), Some(expected.as_slice()));

        let picked = graph.get_edges_attr("weight", Some(&[(2, 1)])).unwrap();
        assert_eq!(picked.as_slice::<f32>(), Some(&[2.5f32][..]));
    }

    #[test]
    fn test_empty_graph_bulk_read() {
        let spec = GraphSpec::parse("uint64", &[("position", "float64[3]")], &[], false).unwrap();
        let graph = Graph::<u64>::new(&spec).unwrap();
        let positions = graph.get_nodes_attr("position", None).unwrap();
        assert_eq!(positions.shape(), &[0, 3]);
    }
}
