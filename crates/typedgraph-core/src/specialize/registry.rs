//! The schema registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use typedgraph_common::types::ScalarType;
use typedgraph_common::utils::error::{Error, Result};
use typedgraph_common::utils::hash::FastHashMap;

use crate::graph::{Graph, GraphConfig, GraphStore, NodeKey};
use crate::schema::{CompiledSchema, GraphSpec, SchemaSignature};

/// Counters describing registry usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of compiled schemas held.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that compiled a new schema.
    pub misses: u64,
}

/// Cache of compiled schemas, keyed by [`SchemaSignature`].
///
/// Compiling is idempotent: equal specs always yield the same
/// `Arc<CompiledSchema>`. The registry is safe to share between threads;
/// lookups take a read lock and only a miss takes the write lock.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    compiled: RwLock<FastHashMap<SchemaSignature, Arc<CompiledSchema>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// Returns the compiled schema for a spec, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFieldType`] if the key type is not an
    /// integer type.
    pub fn compile(&self, spec: &GraphSpec) -> Result<Arc<CompiledSchema>> {
        let signature = SchemaSignature::of(spec);
        {
            let compiled = self.compiled.read();
            if let Some(schema) = compiled.get(&signature) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%signature, "schema cache hit");
                return Ok(Arc::clone(schema));
            }
        }

        let mut compiled = self.compiled.write();

        // Double-check after acquiring write lock
        if let Some(schema) = compiled.get(&signature) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(CompiledSchema::compile(spec)?);
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            %signature,
            node_record_bytes = schema.node_layout().record_size(),
            edge_record_bytes = schema.edge_layout().record_size(),
            "compiled graph schema"
        );
        compiled.insert(signature, Arc::clone(&schema));
        Ok(schema)
    }

    /// Creates an empty graph for a spec with default configuration.
    ///
    /// # Errors
    ///
    /// See [`SchemaRegistry::compile`].
    pub fn instantiate(&self, spec: &GraphSpec) -> Result<Box<dyn GraphStore>> {
        self.instantiate_with_config(spec, GraphConfig::default())
    }

    /// Creates an empty graph for a spec.
    ///
    /// # Errors
    ///
    /// See [`SchemaRegistry::compile`].
    pub fn instantiate_with_config(
        &self,
        spec: &GraphSpec,
        config: GraphConfig,
    ) -> Result<Box<dyn GraphStore>> {
        let schema = self.compile(spec)?;
        match spec.node_key() {
            ScalarType::Int8 => boxed::<i8>(schema, config),
            ScalarType::Int16 => boxed::<i16>(schema, config),
            ScalarType::Int32 => boxed::<i32>(schema, config),
            ScalarType::Int64 => boxed::<i64>(schema, config),
            ScalarType::UInt8 => boxed::<u8>(schema, config),
            ScalarType::UInt16 => boxed::<u16>(schema, config),
            ScalarType::UInt32 => boxed::<u32>(schema, config),
            ScalarType::UInt64 => boxed::<u64>(schema, config),
            other @ (ScalarType::Float32 | ScalarType::Float64 | ScalarType::Bool) => Err(
                Error::UnsupportedFieldType(format!("{other} as node key")),
            ),
        }
    }

    /// Creates an empty graph with a statically known key type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the spec's key type is not `K`,
    /// or any error of [`SchemaRegistry::compile`].
    pub fn typed<K: NodeKey>(&self, spec: &GraphSpec, config: GraphConfig) -> Result<Graph<K>> {
        Graph::from_schema(self.compile(spec)?, config)
    }

    /// Returns the number of compiled schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    /// Returns true if nothing has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.read().is_empty()
    }

    /// Returns usage counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drops all cached schemas. Graphs already created keep theirs.
    pub fn clear(&self) {
        self.compiled.write().clear();
    }
}

fn boxed<K: NodeKey>(schema: Arc<CompiledSchema>, config: GraphConfig) -> Result<Box<dyn GraphStore>> {
    Ok(Box::new(Graph::<K>::from_schema(schema, config)?))
}

/// Creates an empty graph for a spec through the global registry.
///
/// # Errors
///
/// See [`SchemaRegistry::compile`].
pub fn specialize(spec: &GraphSpec) -> Result<Box<dyn GraphStore>> {
    SchemaRegistry::global().instantiate(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typedgraph_common::types::{Scalar, Value};

    fn spec() -> GraphSpec {
        GraphSpec::parse("uint64", &[("position", "float64[3]")], &[("weight", "float32")], false)
            .unwrap()
    }

    #[test]
    fn test_compile_is_idempotent() {
        let registry = SchemaRegistry::new();
        let a = registry.compile(&spec()).unwrap();
        let b = registry.compile(&spec()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(
            registry.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
    }

    #[test]
    fn test_distinct_specs_compile_separately() {
        let registry = SchemaRegistry::new();
        let a = registry.compile(&spec()).unwrap();
        let b = registry.compile(&spec().directed(true)).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        // graphs keep their schema after a clear
        assert_eq!(a.node_layout().len(), 1);
    }

    #[test]
    fn test_instantiated_graphs_are_independent() {
        let registry = SchemaRegistry::new();
        let mut g1 = registry.instantiate(&spec()).unwrap();
        let g2 = registry.instantiate(&spec()).unwrap();
        g1.add_node(Scalar::UInt64(0), &[]).unwrap();
        assert_eq!(g1.size(), 1);
        assert_eq!(g2.size(), 0);
        assert!(Arc::ptr_eq(g1.schema(), g2.schema()));
    }

    #[test]
    fn test_instantiate_every_key_type() {
        let registry = SchemaRegistry::new();
        for ty in ScalarType::ALL {
            let result = registry.instantiate(&GraphSpec::new(ty));
            if ty.is_integer() {
                let mut graph = result.unwrap();
                graph.add_node(Scalar::UInt8(7), &[]).unwrap();
                assert_eq!(graph.spec().node_key(), ty);
            } else {
                assert!(matches!(result, Err(Error::UnsupportedFieldType(_))));
            }
        }
    }

    #[test]
    fn test_typed_instantiation() {
        let registry = SchemaRegistry::new();
        let mut graph = registry.typed::<u64>(&spec(), GraphConfig::default()).unwrap();
        graph.add_node(3, &[Value::from([1.0f64, 2.0, 3.0])]).unwrap();
        assert!(registry.typed::<i64>(&spec(), GraphConfig::default()).is_err());
    }

    #[test]
    fn test_concurrent_compile() {
        let registry = SchemaRegistry::new();
        let schemas: Vec<Arc<CompiledSchema>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| registry.compile(&spec()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(schemas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.stats().misses, 1);
    }
}
