//! The typed graph store.
//!
//! Nodes live in an insertion-ordered hash map from key to [`NodeEntry`]; each
//! entry holds the node's attribute slot and its neighbor sets. An undirected
//! edge is recorded in both endpoints' sets, pointing at one shared edge
//! record, so its attributes read the same from either side.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use typedgraph_common::types::{AttrArray, Value};
use typedgraph_common::utils::error::{Error, Result};
use typedgraph_common::utils::hash::FastHashSet;

use super::{Direction, GraphConfig, NodeKey};
use crate::attr::{AttrTable, RecordRef, Slot};
use crate::index::NeighborSet;
use crate::schema::{CompiledSchema, GraphSpec};
use crate::specialize::SchemaRegistry;

/// Keys in first-occurrence order with repeats dropped.
fn distinct<K: NodeKey>(keys: &[K]) -> impl Iterator<Item = K> + '_ {
    let mut seen = FastHashSet::with_capacity_and_hasher(keys.len(), ahash::RandomState::new());
    keys.iter().copied().filter(move |&key| seen.insert(key))
}

/// Adjacency and attribute slot of one node.
#[derive(Debug, Clone)]
pub(super) struct NodeEntry<K> {
    pub(super) slot: Slot,
    /// Out-neighbors, or all neighbors in an undirected graph.
    pub(super) out: NeighborSet<K>,
    /// In-neighbors. Always empty in an undirected graph.
    pub(super) inc: NeighborSet<K>,
}

impl<K: NodeKey> NodeEntry<K> {
    fn new(slot: Slot) -> Self {
        Self {
            slot,
            out: NeighborSet::new(),
            inc: NeighborSet::new(),
        }
    }
}

/// A graph with node keys of type `K` and schema-defined attributes.
///
/// # Example
///
/// ```
/// use typedgraph_core::{Graph, GraphSpec};
/// use typedgraph_common::{ScalarType, Value};
///
/// let spec = GraphSpec::new(ScalarType::UInt32).with_edge_attr("weight", "float32")?;
/// let mut graph = Graph::<u32>::new(&spec)?;
/// graph.add_node(1, &[])?;
/// graph.add_node(2, &[])?;
/// graph.add_edge(2, 1, &[Value::from(0.5f32)])?;
///
/// assert_eq!(graph.edges().collect::<Vec<_>>(), [(1, 2)]);
/// assert_eq!(graph.edge(1, 2)?.get_as::<f32>("weight")?, 0.5);
/// # Ok::<(), typedgraph_common::Error>(())
/// ```
pub struct Graph<K: NodeKey> {
    schema: Arc<CompiledSchema>,
    config: GraphConfig,
    pub(super) nodes: IndexMap<K, NodeEntry<K>, ahash::RandomState>,
    pub(super) node_attrs: AttrTable,
    pub(super) edge_attrs: AttrTable,
}

impl<K: NodeKey> Graph<K> {
    /// Creates an empty graph for a spec, compiling it through the global
    /// [`SchemaRegistry`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the spec's key type is not `K`,
    /// or any error from compiling the spec.
    pub fn new(spec: &GraphSpec) -> Result<Self> {
        Self::with_config(spec, GraphConfig::default())
    }

    /// Creates an empty graph with custom configuration.
    ///
    /// # Errors
    ///
    /// See [`Graph::new`].
    pub fn with_config(spec: &GraphSpec, config: GraphConfig) -> Result<Self> {
        let schema = SchemaRegistry::global().compile(spec)?;
        Self::from_schema(schema, config)
    }

    /// Creates an empty graph from an already compiled schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the schema's key type is not `K`.
    pub fn from_schema(schema: Arc<CompiledSchema>, config: GraphConfig) -> Result<Self> {
        let key_type = schema.spec().node_key();
        if key_type != K::SCALAR_TYPE {
            return Err(Error::schema_mismatch("node key", key_type, K::SCALAR_TYPE));
        }
        Ok(Self {
            nodes: IndexMap::with_capacity_and_hasher(
                config.initial_node_capacity,
                ahash::RandomState::new(),
            ),
            node_attrs: AttrTable::with_capacity(
                Arc::clone(schema.node_layout()),
                config.initial_node_capacity,
            ),
            edge_attrs: AttrTable::with_capacity(
                Arc::clone(schema.edge_layout()),
                config.initial_edge_capacity,
            ),
            schema,
            config,
        })
    }

    /// Returns the compiled schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<CompiledSchema> {
        &self.schema
    }

    /// Returns the spec the graph was created from.
    #[must_use]
    pub fn spec(&self) -> &GraphSpec {
        self.schema.spec()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Returns true for directed graphs.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.schema.is_directed()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges. Undirected edges count once.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        // one slot per edge, shared by both endpoints when undirected
        self.edge_attrs.len()
    }

    /// Returns true if the node exists.
    #[must_use]
    pub fn has_node(&self, key: K) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Returns true if the edge exists. In undirected graphs the endpoint
    /// order does not matter.
    #[must_use]
    pub fn has_edge(&self, u: K, v: K) -> bool {
        self.find_edge(u, v).is_some()
    }

    pub(super) fn entry(&self, key: K) -> Result<&NodeEntry<K>> {
        self.nodes
            .get(&key)
            .ok_or_else(|| Error::UnknownNode(key.to_string()))
    }

    pub(super) fn find_edge(&self, u: K, v: K) -> Option<Slot> {
        self.nodes.get(&u).and_then(|entry| entry.out.get(&v))
    }

    /// Resolves an edge to its record slot.
    pub(super) fn edge_slot(&self, u: K, v: K) -> Result<Slot> {
        self.entry(u)?;
        self.entry(v)?;
        self.find_edge(u, v)
            .ok_or_else(|| Error::UnknownEdge(u.to_string(), v.to_string()))
    }

    pub(super) fn require_directed(&self, operation: &'static str) -> Result<()> {
        if self.is_directed() {
            Ok(())
        } else {
            Err(Error::DirectionUnsupported(operation))
        }
    }

    // === Mutation ===

    /// Adds a node with positional attribute values.
    ///
    /// An empty `attrs` list zero-initializes every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateNode`] if the key exists, or
    /// [`Error::SchemaMismatch`] if `attrs` does not match the node schema.
    /// The graph is unchanged on error.
    pub fn add_node(&mut self, key: K, attrs: &[Value]) -> Result<()> {
        if self.nodes.contains_key(&key) {
            return Err(Error::DuplicateNode(key.to_string()));
        }
        let slot = self.node_attrs.allocate(attrs)?;
        self.nodes.insert(key, NodeEntry::new(slot));
        Ok(())
    }

    /// Adds many nodes from key and attribute columns.
    ///
    /// `columns` holds one bulk buffer per node field in schema order, each
    /// with one row per key, or is empty to zero-initialize.
    ///
    /// # Errors
    ///
    /// Column shape errors ([`Error::SchemaMismatch`],
    /// [`Error::LengthMismatch`]) are detected before anything is inserted.
    /// A duplicate key stops the batch with [`Error::BatchFailed`]; rows
    /// before it stay inserted.
    pub fn add_nodes(&mut self, keys: &[K], columns: &[AttrArray]) -> Result<()> {
        self.node_attrs.check_columns(columns, keys.len())?;
        tracing::trace!(rows = keys.len(), "bulk node insert");

        self.nodes.reserve(keys.len());
        self.node_attrs.reserve(keys.len());
        for (row, &key) in keys.iter().enumerate() {
            if self.nodes.contains_key(&key) {
                tracing::warn!(row, %key, "bulk node insert stopped at duplicate key");
                return Err(Error::batch(row, row, Error::DuplicateNode(key.to_string())));
            }
            let slot = self
                .node_attrs
                .allocate_row(columns, row)
                .map_err(|e| Error::batch(row, row, e))?;
            self.nodes.insert(key, NodeEntry::new(slot));
        }
        Ok(())
    }

    fn check_new_edge(&self, u: K, v: K) -> Result<()> {
        if u == v {
            return Err(Error::SelfLoop(u.to_string()));
        }
        let entry = self.entry(u)?;
        self.entry(v)?;
        if entry.out.contains(&v) {
            return Err(Error::DuplicateEdge(u.to_string(), v.to_string()));
        }
        Ok(())
    }

    fn link(&mut self, u: K, v: K, slot: Slot) {
        let directed = self.is_directed();
        if let Some(entry) = self.nodes.get_mut(&u) {
            entry.out.insert(v, slot);
        }
        if let Some(entry) = self.nodes.get_mut(&v) {
            if directed {
                entry.inc.insert(u, slot);
            } else {
                entry.out.insert(u, slot);
            }
        }
    }

    /// Adds an edge with positional attribute values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelfLoop`] if `u == v`, [`Error::UnknownNode`] if an
    /// endpoint is absent, [`Error::DuplicateEdge`] if the edge exists, or
    /// [`Error::SchemaMismatch`] if `attrs` does not match the edge schema.
    /// The graph is unchanged on error.
    pub fn add_edge(&mut self, u: K, v: K, attrs: &[Value]) -> Result<()> {
        self.check_new_edge(u, v)?;
        let slot = self.edge_attrs.allocate(attrs)?;
        self.link(u, v, slot);
        Ok(())
    }

    /// Adds many edges from endpoint pairs and attribute columns.
    ///
    /// # Errors
    ///
    /// Same contract as [`Graph::add_nodes`], with the per-row errors of
    /// [`Graph::add_edge`].
    pub fn add_edges(&mut self, pairs: &[(K, K)], columns: &[AttrArray]) -> Result<()> {
        self.edge_attrs.check_columns(columns, pairs.len())?;
        tracing::trace!(rows = pairs.len(), "bulk edge insert");

        self.edge_attrs.reserve(pairs.len());
        for (row, &(u, v)) in pairs.iter().enumerate() {
            if let Err(e) = self.check_new_edge(u, v) {
                tracing::warn!(row, %u, %v, error = %e, "bulk edge insert stopped");
                return Err(Error::batch(row, row, e));
            }
            let slot = self
                .edge_attrs
                .allocate_row(columns, row)
                .map_err(|e| Error::batch(row, row, e))?;
            self.link(u, v, slot);
        }
        Ok(())
    }

    /// Removes a node and every edge incident to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the node is absent.
    pub fn remove_node(&mut self, key: K) -> Result<()> {
        let entry = self
            .nodes
            .swap_remove(&key)
            .ok_or_else(|| Error::UnknownNode(key.to_string()))?;
        let directed = self.is_directed();

        for (v, slot) in entry.out.iter() {
            if let Some(other) = self.nodes.get_mut(&v) {
                if directed {
                    other.inc.remove(&key);
                } else {
                    other.out.remove(&key);
                }
            }
            self.edge_attrs.release(slot);
        }
        for (w, slot) in entry.inc.iter() {
            if let Some(other) = self.nodes.get_mut(&w) {
                other.out.remove(&key);
            }
            self.edge_attrs.release(slot);
        }
        self.node_attrs.release(entry.slot);
        Ok(())
    }

    /// Removes one edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if an endpoint is absent, or
    /// [`Error::UnknownEdge`] if the edge is.
    pub fn remove_edge(&mut self, u: K, v: K) -> Result<()> {
        let slot = self.edge_slot(u, v)?;
        let directed = self.is_directed();
        if let Some(entry) = self.nodes.get_mut(&u) {
            entry.out.remove(&v);
        }
        if let Some(entry) = self.nodes.get_mut(&v) {
            if directed {
                entry.inc.remove(&u);
            } else {
                entry.out.remove(&u);
            }
        }
        self.edge_attrs.release(slot);
        Ok(())
    }

    // === Node queries ===

    /// Iterates over node keys in store order.
    ///
    /// Store order is insertion order until a node is removed; removal moves
    /// the last node into the freed position.
    pub fn nodes(&self) -> impl Iterator<Item = K> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterates over nodes with their attribute records.
    pub fn nodes_with_data(&self) -> impl Iterator<Item = (K, RecordRef<'_>)> + '_ {
        let table = &self.node_attrs;
        self.nodes
            .iter()
            .map(move |(&key, entry)| (key, table.record(entry.slot)))
    }

    /// Returns all node keys in store order.
    #[must_use]
    pub fn node_keys(&self) -> Vec<K> {
        self.nodes().collect()
    }

    /// Returns the attribute record of a node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the node is absent.
    pub fn node(&self, key: K) -> Result<RecordRef<'_>> {
        let entry = self.entry(key)?;
        Ok(self.node_attrs.record(entry.slot))
    }

    /// Iterates over the neighbors of a node (out-neighbors when directed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the node is absent.
    pub fn neighbors(&self, key: K) -> Result<impl Iterator<Item = K> + '_> {
        Ok(self.entry(key)?.out.keys())
    }

    /// Iterates over the neighbors of a node in one direction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionUnsupported`] on undirected graphs, or
    /// [`Error::UnknownNode`] if the node is absent.
    pub fn neighbors_directed(
        &self,
        key: K,
        direction: Direction,
    ) -> Result<impl Iterator<Item = K> + '_> {
        self.require_directed("neighbors_directed")?;
        Ok(self.neighbor_set(key, direction)?.keys())
    }

    fn neighbor_set(&self, key: K, direction: Direction) -> Result<&NeighborSet<K>> {
        let entry = self.entry(key)?;
        Ok(match direction {
            Direction::Outgoing => &entry.out,
            Direction::Incoming => &entry.inc,
        })
    }

    /// Returns the number of neighbors of each key (out-degree when directed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if any key is absent.
    pub fn neighbors_count(&self, keys: &[K]) -> Result<Vec<usize>> {
        self.degrees(keys, Direction::Outgoing)
    }

    /// Returns the in-degree of each key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionUnsupported`] on undirected graphs, or
    /// [`Error::UnknownNode`] if any key is absent.
    pub fn in_neighbors_count(&self, keys: &[K]) -> Result<Vec<usize>> {
        self.require_directed("in_neighbors_count")?;
        self.degrees(keys, Direction::Incoming)
    }

    /// Returns the out-degree of each key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionUnsupported`] on undirected graphs, or
    /// [`Error::UnknownNode`] if any key is absent.
    pub fn out_neighbors_count(&self, keys: &[K]) -> Result<Vec<usize>> {
        self.require_directed("out_neighbors_count")?;
        self.degrees(keys, Direction::Outgoing)
    }

    fn degrees(&self, keys: &[K], direction: Direction) -> Result<Vec<usize>> {
        keys.iter()
            .map(|&key| self.neighbor_set(key, direction).map(NeighborSet::len))
            .collect()
    }

    // === Edge queries ===

    /// Iterates over every edge exactly once.
    ///
    /// Directed graphs yield each `(source, target)` pair. Undirected graphs
    /// yield `(u, v)` with `u < v`, visiting `u` in store order.
    pub fn edges(&self) -> impl Iterator<Item = (K, K)> + '_ {
        self.edge_entries().map(|(u, v, _)| (u, v))
    }

    /// Iterates over every edge with its attribute record, in the order of
    /// [`Graph::edges`].
    pub fn edges_with_data(&self) -> impl Iterator<Item = (K, K, RecordRef<'_>)> + '_ {
        let table = &self.edge_attrs;
        self.edge_entries()
            .map(move |(u, v, slot)| (u, v, table.record(slot)))
    }

    pub(super) fn edge_entries(&self) -> impl Iterator<Item = (K, K, Slot)> + '_ {
        let directed = self.is_directed();
        self.nodes.iter().flat_map(move |(&u, entry)| {
            entry
                .out
                .iter()
                .filter(move |&(v, _)| directed || u < v)
                .map(move |(v, slot)| (u, v, slot))
        })
    }

    /// Returns all edges in the order of [`Graph::edges`].
    #[must_use]
    pub fn edge_pairs(&self) -> Vec<(K, K)> {
        self.edges().collect()
    }

    /// Iterates over the edges of one node as `(node, neighbor)` pairs
    /// (out-edges when directed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the node is absent.
    pub fn edges_of(&self, key: K) -> Result<impl Iterator<Item = (K, K)> + '_> {
        Ok(self.entry(key)?.out.keys().map(move |v| (key, v)))
    }

    /// Iterates over the edges of one node with their attribute records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the node is absent.
    pub fn edges_of_with_data(
        &self,
        key: K,
    ) -> Result<impl Iterator<Item = (K, K, RecordRef<'_>)> + '_> {
        let table = &self.edge_attrs;
        Ok(self
            .entry(key)?
            .out
            .iter()
            .map(move |(v, slot)| (key, v, table.record(slot))))
    }

    /// Iterates over the edges entering a node as `(source, node)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionUnsupported`] on undirected graphs, or
    /// [`Error::UnknownNode`] if the node is absent.
    pub fn in_edges_of(&self, key: K) -> Result<impl Iterator<Item = (K, K)> + '_> {
        self.require_directed("in_edges")?;
        Ok(self.entry(key)?.inc.keys().map(move |w| (w, key)))
    }

    /// Iterates over the edges leaving a node as `(node, target)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionUnsupported`] on undirected graphs, or
    /// [`Error::UnknownNode`] if the node is absent.
    pub fn out_edges_of(&self, key: K) -> Result<impl Iterator<Item = (K, K)> + '_> {
        self.require_directed("out_edges")?;
        self.edges_of(key)
    }

    /// Returns the edges whose lower endpoint is one of `keys` (out-edges of
    /// `keys` when directed). A repeated key contributes its edges once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if any key is absent.
    pub fn edges_by_nodes(&self, keys: &[K]) -> Result<Vec<(K, K)>> {
        let directed = self.is_directed();
        let mut pairs = Vec::new();
        for u in distinct(keys) {
            let entry = self.entry(u)?;
            pairs.extend(entry.out.keys().filter(|&v| directed || u < v).map(|v| (u, v)));
        }
        Ok(pairs)
    }

    /// Returns the edges entering any of `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionUnsupported`] on undirected graphs, or
    /// [`Error::UnknownNode`] if any key is absent.
    pub fn in_edges_by_nodes(&self, keys: &[K]) -> Result<Vec<(K, K)>> {
        self.require_directed("in_edges_by_nodes")?;
        let mut pairs = Vec::new();
        for v in distinct(keys) {
            pairs.extend(self.entry(v)?.inc.keys().map(|w| (w, v)));
        }
        Ok(pairs)
    }

    /// Returns the edges leaving any of `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionUnsupported`] on undirected graphs, or
    /// [`Error::UnknownNode`] if any key is absent.
    pub fn out_edges_by_nodes(&self, keys: &[K]) -> Result<Vec<(K, K)>> {
        self.require_directed("out_edges_by_nodes")?;
        self.edges_by_nodes(keys)
    }

    /// Returns the attribute record of an edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] or [`Error::UnknownEdge`].
    pub fn edge(&self, u: K, v: K) -> Result<RecordRef<'_>> {
        let slot = self.edge_slot(u, v)?;
        Ok(self.edge_attrs.record(slot))
    }
}

impl<K: NodeKey> fmt::Debug for Graph<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("signature", self.schema.signature())
            .field("nodes", &self.size())
            .field("edges", &self.num_edges())
            .finish()
    }
}
