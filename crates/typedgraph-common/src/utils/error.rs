//! Error type shared by every Typedgraph crate.
//!
//! All conditions are local and recoverable: they are reported at the point
//! of the offending call and never retried. Keys and fields are rendered as
//! text so the error type stays independent of the node key type.

use thiserror::Error;

/// Result alias using the Typedgraph [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by schema parsing, specialization, and graph operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A node with this key is already present.
    #[error("node {0} already exists")]
    DuplicateNode(String),

    /// The node is not present in the graph.
    #[error("node {0} does not exist")]
    UnknownNode(String),

    /// Source and target of an edge are the same node.
    #[error("self-loop on node {0} is not allowed")]
    SelfLoop(String),

    /// The edge is already present.
    #[error("edge ({0}, {1}) already exists")]
    DuplicateEdge(String, String),

    /// The edge is not present in the graph.
    #[error("edge ({0}, {1}) does not exist")]
    UnknownEdge(String, String),

    /// The attribute field is not part of the schema.
    #[error("unknown attribute field: {0}")]
    UnknownField(String),

    /// A schema declares the same field name twice.
    #[error("duplicate attribute field: {0}")]
    DuplicateField(String),

    /// A value or buffer does not match the declared field type or shape.
    #[error("schema mismatch for {field}: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Field (or key) being accessed.
        field: String,
        /// Declared type or shape.
        expected: String,
        /// Type or shape that was supplied.
        found: String,
    },

    /// A bulk buffer has the wrong number of rows.
    #[error("length mismatch: expected {expected} rows, found {found}")]
    LengthMismatch {
        /// Expected number of rows.
        expected: usize,
        /// Number of rows supplied.
        found: usize,
    },

    /// The requested element type has no backing representation.
    #[error("unsupported field type: {0}")]
    UnsupportedFieldType(String),

    /// A dtype string is malformed.
    #[error("invalid dtype {0:?}: {1}")]
    InvalidDType(String, String),

    /// The operation distinguishes edge direction but the graph is undirected.
    #[error("{0} is only available on directed graphs")]
    DirectionUnsupported(&'static str),

    /// A bulk operation stopped partway through.
    ///
    /// Rows before `index` were applied and stay applied.
    #[error("batch stopped at row {index} after applying {applied} rows: {source}")]
    BatchFailed {
        /// Row that failed.
        index: usize,
        /// Number of rows applied before the failure.
        applied: usize,
        /// The per-row error.
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a [`Error::SchemaMismatch`] from displayable parts.
    pub fn schema_mismatch(
        field: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::SchemaMismatch {
            field: field.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a [`Error::LengthMismatch`], or `Ok` when the lengths agree.
    pub fn check_length(expected: usize, found: usize) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::LengthMismatch { expected, found })
        }
    }

    /// Wraps a per-row error into [`Error::BatchFailed`].
    #[must_use]
    pub fn batch(index: usize, applied: usize, source: Error) -> Self {
        Self::BatchFailed {
            index,
            applied,
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, unwrapping any [`Error::BatchFailed`].
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::BatchFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
