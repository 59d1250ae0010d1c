//! Compiled record layouts.

use std::fmt;
use std::sync::Arc;

use typedgraph_common::types::{DType, Value};
use typedgraph_common::utils::error::{Error, Result};
use typedgraph_common::utils::hash::{FastHashMap, map_with_capacity};

use super::spec::{AttrSchema, GraphSpec};

/// One field of a compiled record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    name: Arc<str>,
    dtype: DType,
}

impl FieldSlot {
    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared dtype.
    #[must_use]
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }
}

/// The fixed layout of one record kind (node or edge).
///
/// Fields are addressed by position; the name index resolves a field name to
/// its position in O(1).
#[derive(Debug, Clone)]
pub struct RecordLayout {
    fields: Vec<FieldSlot>,
    by_name: FastHashMap<Arc<str>, usize>,
    record_size: usize,
}

impl RecordLayout {
    /// Compiles a layout from an attribute schema.
    #[must_use]
    pub fn compile(schema: &AttrSchema) -> Self {
        let mut fields = Vec::with_capacity(schema.len());
        let mut by_name = map_with_capacity(schema.len());
        let mut record_size = 0;
        for (position, (name, dtype)) in schema.iter().enumerate() {
            let name: Arc<str> = Arc::from(name);
            by_name.insert(Arc::clone(&name), position);
            fields.push(FieldSlot {
                name,
                dtype: *dtype,
            });
            record_size += dtype.size_of();
        }
        Self {
            fields,
            by_name,
            record_size,
        }
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the layout has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Size of one packed record in bytes.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Resolves a field name to its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the name is not declared.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Checks a positional attribute list against the layout.
    ///
    /// An empty list is always accepted and means "zero-initialize".
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] on wrong arity or a value whose
    /// dtype disagrees with its field.
    pub fn check_values(&self, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        if values.len() != self.fields.len() {
            return Err(Error::schema_mismatch(
                "record",
                format!("{} fields", self.fields.len()),
                format!("{} values", values.len()),
            ));
        }
        for (slot, value) in self.fields.iter().zip(values) {
            if !value.matches(&slot.dtype) {
                return Err(Error::schema_mismatch(
                    slot.name(),
                    slot.dtype,
                    value.dtype(),
                ));
            }
        }
        Ok(())
    }
}

/// Canonical text form of a [`GraphSpec`], used as the registry key.
///
/// Two specs have the same signature exactly when they agree on key type,
/// directedness, and every field name, dtype, and position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaSignature(String);

impl SchemaSignature {
    /// Computes the signature of a spec.
    #[must_use]
    pub fn of(spec: &GraphSpec) -> Self {
        fn fields(schema: &AttrSchema) -> String {
            schema
                .iter()
                .map(|(name, dtype)| format!("{name}:{dtype}"))
                .collect::<Vec<_>>()
                .join(",")
        }
        let direction = if spec.is_directed() { "directed" } else { "undirected" };
        Self(format!(
            "{}|{direction}|nodes({})|edges({})",
            spec.node_key(),
            fields(spec.node_attrs()),
            fields(spec.edge_attrs()),
        ))
    }

    /// Returns the signature text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A spec together with its compiled node and edge layouts.
///
/// Compiled schemas are shared through `Arc` by every graph created from the
/// same spec.
#[derive(Debug)]
pub struct CompiledSchema {
    spec: GraphSpec,
    signature: SchemaSignature,
    node_layout: Arc<RecordLayout>,
    edge_layout: Arc<RecordLayout>,
}

impl CompiledSchema {
    /// Validates and compiles a spec.
    ///
    /// Most callers go through [`SchemaRegistry`](crate::SchemaRegistry),
    /// which caches the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFieldType`] if the node key type is not
    /// an integer type.
    pub fn compile(spec: &GraphSpec) -> Result<Self> {
        if !spec.node_key().is_integer() {
            return Err(Error::UnsupportedFieldType(format!(
                "{} as node key",
                spec.node_key()
            )));
        }
        Ok(Self {
            spec: spec.clone(),
            signature: SchemaSignature::of(spec),
            node_layout: Arc::new(RecordLayout::compile(spec.node_attrs())),
            edge_layout: Arc::new(RecordLayout::compile(spec.edge_attrs())),
        })
    }

    /// Returns the spec this schema was compiled from.
    #[must_use]
    pub fn spec(&self) -> &GraphSpec {
        &self.spec
    }

    /// Returns the cache signature.
    #[must_use]
    pub fn signature(&self) -> &SchemaSignature {
        &self.signature
    }

    /// Returns the node record layout.
    #[must_use]
    pub fn node_layout(&self) -> &Arc<RecordLayout> {
        &self.node_layout
    }

    /// Returns the edge record layout.
    #[must_use]
    pub fn edge_layout(&self) -> &Arc<RecordLayout> {
        &self.edge_layout
    }

    /// Returns true for directed graphs.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.spec.is_directed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typedgraph_common::types::ScalarType;

    fn spec() -> GraphSpec {
        GraphSpec::parse(
            "uint64",
            &[("position", "float64[3]"), ("label", "uint8")],
            &[("weight", "float32")],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_layout_fields() {
        let schema = CompiledSchema::compile(&spec()).unwrap();
        let layout = schema.node_layout();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.fields()[1].dtype(), &DType::scalar(ScalarType::UInt8));
        assert_eq!(layout.record_size(), 25);
        assert_eq!(layout.index_of("label"), Ok(1));
        assert_eq!(
            layout.index_of("color"),
            Err(Error::UnknownField("color".into()))
        );
    }

    #[test]
    fn test_check_values() {
        let schema = CompiledSchema::compile(&spec()).unwrap();
        let layout = schema.node_layout();
        assert!(layout.check_values(&[]).is_ok());
        assert!(
            layout
                .check_values(&[Value::from([1.0f64, 2.0, 3.0]), Value::from(4u8)])
                .is_ok()
        );
        // wrong arity
        assert!(matches!(
            layout.check_values(&[Value::from(4u8)]),
            Err(Error::SchemaMismatch { .. })
        ));
        // wrong array length
        assert!(matches!(
            layout.check_values(&[Value::from([1.0f64, 2.0]), Value::from(4u8)]),
            Err(Error::SchemaMismatch { field, .. }) if field == "position"
        ));
    }

    #[test]
    fn test_signature_distinguishes_specs() {
        let base = spec();
        let reordered = GraphSpec::parse(
            "uint64",
            &[("label", "uint8"), ("position", "float64[3]")],
            &[("weight", "float32")],
            false,
        )
        .unwrap();
        assert_ne!(SchemaSignature::of(&base), SchemaSignature::of(&reordered));
        assert_ne!(
            SchemaSignature::of(&base),
            SchemaSignature::of(&base.clone().directed(true))
        );
        assert_eq!(SchemaSignature::of(&base), SchemaSignature::of(&spec()));
    }

    #[test]
    fn test_float_key_rejected() {
        let spec = GraphSpec::new(ScalarType::Float64);
        assert!(matches!(
            CompiledSchema::compile(&spec),
            Err(Error::UnsupportedFieldType(_))
        ));
    }
}
