//! Node key types.

use std::borrow::Cow;
use std::hash::Hash;

use typedgraph_common::types::{AttrArray, Element, Scalar};
use typedgraph_common::utils::error::{Error, Result};

/// An integer type usable as a node key.
///
/// Keys arriving through the type-erased [`GraphStore`](super::GraphStore)
/// interface may be of any integer type; they are accepted when their value
/// fits `Self` and rejected with [`Error::SchemaMismatch`] otherwise.
pub trait NodeKey: Element + Eq + Ord + Hash + TryFrom<i128> + Into<i128> {
    /// Converts an erased key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] for non-integer scalars and values
    /// out of range for `Self`.
    fn from_scalar_key(key: Scalar) -> Result<Self> {
        key.as_i128()
            .and_then(|v| Self::try_from(v).ok())
            .ok_or_else(|| Error::schema_mismatch("node key", Self::SCALAR_TYPE, key))
    }

    /// Views a one-dimensional key buffer as keys of this type.
    ///
    /// Borrows when the buffer already has this element type and converts
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the buffer is not
    /// one-dimensional or holds a value that is not a valid key.
    fn keys_from(keys: &AttrArray) -> Result<Cow<'_, [Self]>> {
        if keys.shape().len() != 1 {
            return Err(Error::schema_mismatch(
                "node keys",
                format!("{}(n,)", Self::SCALAR_TYPE),
                keys.describe(),
            ));
        }
        if let Some(slice) = keys.as_slice::<Self>() {
            return Ok(Cow::Borrowed(slice));
        }
        keys.data()
            .iter()
            .map(Self::from_scalar_key)
            .collect::<Result<Vec<_>>>()
            .map(Cow::Owned)
    }

    /// Reads an `(n, 2)` buffer as endpoint pairs of this type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the buffer is not `(n, 2)` or
    /// holds a value that is not a valid key.
    fn pairs_from(pairs: &AttrArray) -> Result<Vec<(Self, Self)>> {
        if pairs.shape().len() != 2 || pairs.row_width() != 2 {
            return Err(Error::schema_mismatch(
                "edge pairs",
                format!("{}(n, 2)", Self::SCALAR_TYPE),
                pairs.describe(),
            ));
        }
        let flat: Cow<'_, [Self]> = match pairs.as_slice::<Self>() {
            Some(slice) => Cow::Borrowed(slice),
            None => Cow::Owned(
                pairs
                    .data()
                    .iter()
                    .map(Self::from_scalar_key)
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(flat.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
    }
}

macro_rules! impl_node_key {
    ($($t:ty),*) => {
        $(impl NodeKey for $t {})*
    };
}

impl_node_key!(i8, i16, i32, i64, u8, u16, u32, u64);
