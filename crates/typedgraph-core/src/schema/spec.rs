//! User-facing schema descriptions.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use typedgraph_common::types::{DType, ScalarType};
use typedgraph_common::utils::error::{Error, Result};

/// An ordered list of named attribute fields.
///
/// Field order is significant: two schemas with the same fields in a
/// different order describe different record layouts.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AttrSchema {
    fields: IndexMap<String, DType>,
}

impl AttrSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from `(name, dtype)` pairs given as strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateField`] if a name repeats, or a dtype
    /// parsing error for a malformed type string.
    pub fn from_pairs<N, D, I>(pairs: I) -> Result<Self>
    where
        N: Into<String>,
        D: AsRef<str>,
        I: IntoIterator<Item = (N, D)>,
    {
        let mut schema = Self::new();
        for (name, dtype) in pairs {
            schema.push(name, dtype.as_ref().parse()?)?;
        }
        Ok(schema)
    }

    /// Appends a field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateField`] if the name is already declared.
    pub fn push(&mut self, name: impl Into<String>, dtype: DType) -> Result<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(Error::DuplicateField(name));
        }
        self.fields.insert(name, dtype);
        Ok(())
    }

    /// Appends a field, builder style.
    ///
    /// # Errors
    ///
    /// See [`AttrSchema::push`].
    pub fn with_field(mut self, name: impl Into<String>, dtype: impl Into<DType>) -> Result<Self> {
        self.push(name, dtype.into())?;
        Ok(self)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the dtype of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DType> {
        self.fields.get(name)
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DType)> {
        self.fields.iter().map(|(name, dtype)| (name.as_str(), dtype))
    }
}

// IndexMap equality ignores order, but field order is part of the layout.
impl PartialEq for AttrSchema {
    fn eq(&self, other: &Self) -> bool {
        self.fields.iter().eq(other.fields.iter())
    }
}

impl Eq for AttrSchema {}

impl Hash for AttrSchema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.len().hash(state);
        for (name, dtype) in &self.fields {
            name.hash(state);
            dtype.hash(state);
        }
    }
}

// Deserialized entry by entry so that a repeated name is rejected rather than
// overwriting the earlier field.
impl<'de> Deserialize<'de> for AttrSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = AttrSchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to dtypes")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<AttrSchema, A::Error> {
                let mut schema = AttrSchema::new();
                while let Some((name, dtype)) = map.next_entry::<String, DType>()? {
                    schema.push(name, dtype).map_err(serde::de::Error::custom)?;
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

/// Complete description of a graph type.
///
/// # Example
///
/// ```
/// use typedgraph_core::GraphSpec;
/// use typedgraph_common::ScalarType;
///
/// let spec = GraphSpec::new(ScalarType::UInt32)
///     .with_node_attr("label", "uint8")?
///     .with_edge_attr("length", "float32")?
///     .directed(true);
/// assert!(spec.is_directed());
/// assert_eq!(spec.node_attrs().len(), 1);
/// # Ok::<(), typedgraph_common::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphSpec {
    node_key: ScalarType,
    #[serde(default)]
    node_attrs: AttrSchema,
    #[serde(default)]
    edge_attrs: AttrSchema,
    #[serde(default)]
    directed: bool,
}

impl GraphSpec {
    /// Creates an undirected spec with no attributes.
    #[must_use]
    pub fn new(node_key: ScalarType) -> Self {
        Self {
            node_key,
            node_attrs: AttrSchema::new(),
            edge_attrs: AttrSchema::new(),
            directed: false,
        }
    }

    /// Parses a spec from type strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the key type or any dtype is malformed, or a
    /// field name repeats within one record kind.
    pub fn parse(
        node_key: &str,
        node_attrs: &[(&str, &str)],
        edge_attrs: &[(&str, &str)],
        directed: bool,
    ) -> Result<Self> {
        Ok(Self {
            node_key: node_key.parse()?,
            node_attrs: AttrSchema::from_pairs(node_attrs.iter().copied())?,
            edge_attrs: AttrSchema::from_pairs(edge_attrs.iter().copied())?,
            directed,
        })
    }

    /// Adds a node attribute field.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is malformed or the name repeats.
    pub fn with_node_attr(mut self, name: impl Into<String>, dtype: &str) -> Result<Self> {
        self.node_attrs.push(name, dtype.parse()?)?;
        Ok(self)
    }

    /// Adds an edge attribute field.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is malformed or the name repeats.
    pub fn with_edge_attr(mut self, name: impl Into<String>, dtype: &str) -> Result<Self> {
        self.edge_attrs.push(name, dtype.parse()?)?;
        Ok(self)
    }

    /// Replaces the node attribute schema.
    #[must_use]
    pub fn with_node_schema(mut self, schema: AttrSchema) -> Self {
        self.node_attrs = schema;
        self
    }

    /// Replaces the edge attribute schema.
    #[must_use]
    pub fn with_edge_schema(mut self, schema: AttrSchema) -> Self {
        self.edge_attrs = schema;
        self
    }

    /// Sets directedness.
    #[must_use]
    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Returns the node key type.
    #[must_use]
    pub fn node_key(&self) -> ScalarType {
        self.node_key
    }

    /// Returns the node attribute schema.
    #[must_use]
    pub fn node_attrs(&self) -> &AttrSchema {
        &self.node_attrs
    }

    /// Returns the edge attribute schema.
    #[must_use]
    pub fn edge_attrs(&self) -> &AttrSchema {
        &self.edge_attrs
    }

    /// Returns true for directed graphs.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }
}
