//! Type-erased access to a graph.
//!
//! [`GraphStore`] is what [`SchemaRegistry::instantiate`] hands out: the node
//! key type is only known at runtime, so keys travel as [`Scalar`]s and key
//! buffers as [`AttrArray`]s. Any integer scalar is accepted as a key as long
//! as its value fits the graph's key type.
//!
//! [`SchemaRegistry::instantiate`]: crate::SchemaRegistry::instantiate

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use typedgraph_common::types::{AttrArray, Scalar, Value};
use typedgraph_common::utils::error::Result;

use super::{Graph, NodeKey};
use crate::attr::RecordRef;
use crate::schema::{CompiledSchema, GraphSpec};

/// Boxed iterator over nodes and their records.
pub type NodeIter<'a> = Box<dyn Iterator<Item = (Scalar, RecordRef<'a>)> + 'a>;

/// Boxed iterator over edges and their records.
pub type EdgeIter<'a> = Box<dyn Iterator<Item = (Scalar, Scalar, RecordRef<'a>)> + 'a>;

/// Object-safe interface over [`Graph<K>`] for every key type `K`.
///
/// Every method mirrors the method of the same name on [`Graph`].
pub trait GraphStore: Send + Sync + fmt::Debug {
    /// Returns the compiled schema.
    fn schema(&self) -> &Arc<CompiledSchema>;

    /// Returns the spec the graph was created from.
    fn spec(&self) -> &GraphSpec {
        self.schema().spec()
    }

    /// Returns true for directed graphs.
    fn is_directed(&self) -> bool {
        self.schema().is_directed()
    }

    /// Number of nodes.
    fn size(&self) -> usize;

    /// Number of edges, undirected edges counted once.
    fn num_edges(&self) -> usize;

    /// Returns true if the node exists. Keys that cannot be converted to the
    /// key type do not exist.
    fn has_node(&self, key: Scalar) -> bool;

    /// Returns true if the edge exists.
    fn has_edge(&self, u: Scalar, v: Scalar) -> bool;

    /// Adds a node.
    fn add_node(&mut self, key: Scalar, attrs: &[Value]) -> Result<()>;

    /// Adds nodes from a one-dimensional key buffer and attribute columns.
    fn add_nodes(&mut self, keys: &AttrArray, columns: &[AttrArray]) -> Result<()>;

    /// Adds an edge.
    fn add_edge(&mut self, u: Scalar, v: Scalar, attrs: &[Value]) -> Result<()>;

    /// Adds edges from an `(n, 2)` pair buffer and attribute columns.
    fn add_edges(&mut self, pairs: &AttrArray, columns: &[AttrArray]) -> Result<()>;

    /// Removes a node and its incident edges.
    fn remove_node(&mut self, key: Scalar) -> Result<()>;

    /// Removes an edge.
    fn remove_edge(&mut self, u: Scalar, v: Scalar) -> Result<()>;

    /// Iterates over nodes with their records, in store order.
    fn nodes(&self) -> NodeIter<'_>;

    /// Iterates over the edges of `node`, or over every edge once when
    /// `node` is `None`.
    fn edges(&self, node: Option<Scalar>) -> Result<EdgeIter<'_>>;

    /// Iterates over in-edges of `node`, or every edge when `None`.
    /// Directed graphs only.
    fn in_edges(&self, node: Option<Scalar>) -> Result<EdgeIter<'_>>;

    /// Iterates over out-edges of `node`, or every edge when `None`.
    /// Directed graphs only.
    fn out_edges(&self, node: Option<Scalar>) -> Result<EdgeIter<'_>>;

    /// Returns the neighbors of a node (out-neighbors when directed).
    fn neighbors(&self, key: Scalar) -> Result<AttrArray>;

    /// Returns all node keys in store order.
    fn node_keys(&self) -> AttrArray;

    /// Returns all edges as an `(n, 2)` buffer in the order of `edges(None)`.
    fn edge_pairs(&self) -> AttrArray;

    /// Returns the edges whose lower endpoint is in `keys`.
    fn edges_by_nodes(&self, keys: &AttrArray) -> Result<AttrArray>;

    /// Returns the edges entering `keys`. Directed graphs only.
    fn in_edges_by_nodes(&self, keys: &AttrArray) -> Result<AttrArray>;

    /// Returns the edges leaving `keys`. Directed graphs only.
    fn out_edges_by_nodes(&self, keys: &AttrArray) -> Result<AttrArray>;

    /// Returns the neighbor count of each key.
    fn neighbors_count(&self, keys: &AttrArray) -> Result<Vec<usize>>;

    /// Returns the in-degree of each key. Directed graphs only.
    fn in_neighbors_count(&self, keys: &AttrArray) -> Result<Vec<usize>>;

    /// Returns the out-degree of each key. Directed graphs only.
    fn out_neighbors_count(&self, keys: &AttrArray) -> Result<Vec<usize>>;

    /// Returns the record of a node.
    fn node(&self, key: Scalar) -> Result<RecordRef<'_>>;

    /// Returns the record of an edge.
    fn edge(&self, u: Scalar, v: Scalar) -> Result<RecordRef<'_>>;

    /// Reads one node field.
    fn get_node_attr(&self, field: &str, key: Scalar) -> Result<Value>;

    /// Reads one node field for `keys`, or all nodes when `None`.
    fn get_nodes_attr(&self, field: &str, keys: Option<&AttrArray>) -> Result<AttrArray>;

    /// Writes one node field.
    fn set_node_attr(&mut self, field: &str, key: Scalar, value: &Value) -> Result<()>;

    /// Writes one node field for `keys`, or all nodes when `None`.
    fn set_nodes_attr(
        &mut self,
        field: &str,
        keys: Option<&AttrArray>,
        values: &AttrArray,
    ) -> Result<()>;

    /// Reads one edge field.
    fn get_edge_attr(&self, field: &str, u: Scalar, v: Scalar) -> Result<Value>;

    /// Reads one edge field for `pairs`, or all edges when `None`.
    fn get_edges_attr(&self, field: &str, pairs: Option<&AttrArray>) -> Result<AttrArray>;

    /// Writes one edge field.
    fn set_edge_attr(&mut self, field: &str, u: Scalar, v: Scalar, value: &Value) -> Result<()>;

    /// Writes one edge field for `pairs`, or all edges when `None`.
    fn set_edges_attr(
        &mut self,
        field: &str,
        pairs: Option<&AttrArray>,
        values: &AttrArray,
    ) -> Result<()>;

    /// Upcasts for downcasting to a concrete [`Graph`].
    fn as_any(&self) -> &dyn Any;

    /// Mutable variant of [`GraphStore::as_any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn GraphStore {
    /// Returns the concrete graph if its key type is `K`.
    #[must_use]
    pub fn downcast_ref<K: NodeKey>(&self) -> Option<&Graph<K>> {
        self.as_any().downcast_ref()
    }

    /// Returns the concrete graph mutably if its key type is `K`.
    pub fn downcast_mut<K: NodeKey>(&mut self) -> Option<&mut Graph<K>> {
        self.as_any_mut().downcast_mut()
    }
}

fn key_array<K: NodeKey>(keys: impl Iterator<Item = K>) -> AttrArray {
    AttrArray::from_vec(keys.collect())
}

fn pair_array<K: NodeKey>(pairs: &[(K, K)]) -> AttrArray {
    AttrArray::from_pairs(pairs)
}

fn erase<'a, K: NodeKey>(
    edges: impl Iterator<Item = (K, K, RecordRef<'a>)> + 'a,
) -> EdgeIter<'a> {
    Box::new(edges.map(|(u, v, record)| (u.into_scalar(), v.into_scalar(), record)))
}

impl<K: NodeKey> Graph<K> {
    fn erased_edges(&self, node: Option<Scalar>) -> Result<EdgeIter<'_>> {
        match node {
            None => Ok(erase(self.edges_with_data())),
            Some(key) => Ok(erase(self.edges_of_with_data(K::from_scalar_key(key)?)?)),
        }
    }
}

impl<K: NodeKey> GraphStore for Graph<K> {
    fn schema(&self) -> &Arc<CompiledSchema> {
        Graph::schema(self)
    }

    fn size(&self) -> usize {
        Graph::size(self)
    }

    fn num_edges(&self) -> usize {
        Graph::num_edges(self)
    }

    fn has_node(&self, key: Scalar) -> bool {
        K::from_scalar_key(key).is_ok_and(|key| Graph::has_node(self, key))
    }

    fn has_edge(&self, u: Scalar, v: Scalar) -> bool {
        match (K::from_scalar_key(u), K::from_scalar_key(v)) {
            (Ok(u), Ok(v)) => Graph::has_edge(self, u, v),
            _ => false,
        }
    }

    fn add_node(&mut self, key: Scalar, attrs: &[Value]) -> Result<()> {
        Graph::add_node(self, K::from_scalar_key(key)?, attrs)
    }

    fn add_nodes(&mut self, keys: &AttrArray, columns: &[AttrArray]) -> Result<()> {
        let keys = K::keys_from(keys)?;
        Graph::add_nodes(self, &keys, columns)
    }

    fn add_edge(&mut self, u: Scalar, v: Scalar, attrs: &[Value]) -> Result<()> {
        Graph::add_edge(self, K::from_scalar_key(u)?, K::from_scalar_key(v)?, attrs)
    }

    fn add_edges(&mut self, pairs: &AttrArray, columns: &[AttrArray]) -> Result<()> {
        let pairs = K::pairs_from(pairs)?;
        Graph::add_edges(self, &pairs, columns)
    }

    fn remove_node(&mut self, key: Scalar) -> Result<()> {
        Graph::remove_node(self, K::from_scalar_key(key)?)
    }

    fn remove_edge(&mut self, u: Scalar, v: Scalar) -> Result<()> {
        Graph::remove_edge(self, K::from_scalar_key(u)?, K::from_scalar_key(v)?)
    }

    fn nodes(&self) -> NodeIter<'_> {
        Box::new(
            self.nodes_with_data()
                .map(|(key, record)| (key.into_scalar(), record)),
        )
    }

    fn edges(&self, node: Option<Scalar>) -> Result<EdgeIter<'_>> {
        self.erased_edges(node)
    }

    fn in_edges(&self, node: Option<Scalar>) -> Result<EdgeIter<'_>> {
        self.require_directed("in_edges")?;
        match node {
            None => self.erased_edges(None),
            Some(key) => {
                let key = K::from_scalar_key(key)?;
                let table = &self.edge_attrs;
                let entry = self.entry(key)?;
                Ok(erase(
                    entry
                        .inc
                        .iter()
                        .map(move |(w, slot)| (w, key, table.record(slot))),
                ))
            }
        }
    }

    fn out_edges(&self, node: Option<Scalar>) -> Result<EdgeIter<'_>> {
        self.require_directed("out_edges")?;
        self.erased_edges(node)
    }

    fn neighbors(&self, key: Scalar) -> Result<AttrArray> {
        Ok(key_array(Graph::neighbors(self, K::from_scalar_key(key)?)?))
    }

    fn node_keys(&self) -> AttrArray {
        key_array(Graph::nodes(self))
    }

    fn edge_pairs(&self) -> AttrArray {
        pair_array(&Graph::edge_pairs(self))
    }

    fn edges_by_nodes(&self, keys: &AttrArray) -> Result<AttrArray> {
        Ok(pair_array(&Graph::edges_by_nodes(self, &K::keys_from(keys)?)?))
    }

    fn in_edges_by_nodes(&self, keys: &AttrArray) -> Result<AttrArray> {
        self.require_directed("in_edges_by_nodes")?;
        Ok(pair_array(&Graph::in_edges_by_nodes(self, &K::keys_from(keys)?)?))
    }

    fn out_edges_by_nodes(&self, keys: &AttrArray) -> Result<AttrArray> {
        self.require_directed("out_edges_by_nodes")?;
        Ok(pair_array(&Graph::out_edges_by_nodes(self, &K::keys_from(keys)?)?))
    }

    fn neighbors_count(&self, keys: &AttrArray) -> Result<Vec<usize>> {
        Graph::neighbors_count(self, &K::keys_from(keys)?)
    }

    fn in_neighbors_count(&self, keys: &AttrArray) -> Result<Vec<usize>> {
        self.require_directed("in_neighbors_count")?;
        Graph::in_neighbors_count(self, &K::keys_from(keys)?)
    }

    fn out_neighbors_count(&self, keys: &AttrArray) -> Result<Vec<usize>> {
        self.require_directed("out_neighbors_count")?;
        Graph::out_neighbors_count(self, &K::keys_from(keys)?)
    }

    fn node(&self, key: Scalar) -> Result<RecordRef<'_>> {
        Graph::node(self, K::from_scalar_key(key)?)
    }

    fn edge(&self, u: Scalar, v: Scalar) -> Result<RecordRef<'_>> {
        Graph::edge(self, K::from_scalar_key(u)?, K::from_scalar_key(v)?)
    }

    fn get_node_attr(&self, field: &str, key: Scalar) -> Result<Value> {
        Graph::get_node_attr(self, field, K::from_scalar_key(key)?)
    }

    fn get_nodes_attr(&self, field: &str, keys: Option<&AttrArray>) -> Result<AttrArray> {
        match keys {
            None => Graph::get_nodes_attr(self, field, None),
            Some(keys) => Graph::get_nodes_attr(self, field, Some(&K::keys_from(keys)?)),
        }
    }

    fn set_node_attr(&mut self, field: &str, key: Scalar, value: &Value) -> Result<()> {
        Graph::set_node_attr(self, field, K::from_scalar_key(key)?, value.clone())
    }

    fn set_nodes_attr(
        &mut self,
        field: &str,
        keys: Option<&AttrArray>,
        values: &AttrArray,
    ) -> Result<()> {
        match keys {
            None => Graph::set_nodes_attr(self, field, None, values),
            Some(keys) => {
                let keys = K::keys_from(keys)?;
                Graph::set_nodes_attr(self, field, Some(&keys), values)
            }
        }
    }

    fn get_edge_attr(&self, field: &str, u: Scalar, v: Scalar) -> Result<Value> {
        Graph::get_edge_attr(self, field, K::from_scalar_key(u)?, K::from_scalar_key(v)?)
    }

    fn get_edges_attr(&self, field: &str, pairs: Option<&AttrArray>) -> Result<AttrArray> {
        match pairs {
            None => Graph::get_edges_attr(self, field, None),
            Some(pairs) => Graph::get_edges_attr(self, field, Some(&K::pairs_from(pairs)?)),
        }
    }

    fn set_edge_attr(&mut self, field: &str, u: Scalar, v: Scalar, value: &Value) -> Result<()> {
        let (u, v) = (K::from_scalar_key(u)?, K::from_scalar_key(v)?);
        Graph::set_edge_attr(self, field, u, v, value.clone())
    }

    fn set_edges_attr(
        &mut self,
        field: &str,
        pairs: Option<&AttrArray>,
        values: &AttrArray,
    ) -> Result<()> {
        match pairs {
            None => Graph::set_edges_attr(self, field, None, values),
            Some(pairs) => {
                let pairs = K::pairs_from(pairs)?;
                Graph::set_edges_attr(self, field, Some(&pairs), values)
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
