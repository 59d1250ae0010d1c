//! Borrowed record views.

use std::fmt;

use typedgraph_common::types::{Element, Value};
use typedgraph_common::utils::error::{Error, Result};

use super::table::{AttrTable, Slot};
use crate::schema::RecordLayout;

/// A read-only view of one node or edge record.
///
/// Views borrow the graph, so they cannot outlive it or observe a
/// concurrent mutation.
#[derive(Clone, Copy)]
pub struct RecordRef<'a> {
    table: &'a AttrTable,
    slot: Slot,
}

impl<'a> RecordRef<'a> {
    pub(crate) fn new(table: &'a AttrTable, slot: Slot) -> Self {
        Self { table, slot }
    }

    /// Returns the layout of the record.
    #[must_use]
    pub fn layout(&self) -> &'a RecordLayout {
        self.table.layout()
    }

    /// Reads a field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the field is not declared.
    pub fn get(&self, field: &str) -> Result<Value> {
        self.table.get(self.slot, field)
    }

    /// Reads a scalar field as exactly type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`], or [`Error::SchemaMismatch`] if the
    /// field is not a scalar of type `T`.
    pub fn get_as<T: Element>(&self, field: &str) -> Result<T> {
        let column = self.column(field)?;
        column
            .get_as::<T>(self.slot)
            .ok_or_else(|| Error::schema_mismatch(field, T::SCALAR_TYPE, column.dtype()))
    }

    /// Borrows an array field as a slice of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`], or [`Error::SchemaMismatch`] if the
    /// field is a scalar or its element type is not `T`.
    pub fn get_slice<T: Element>(&self, field: &str) -> Result<&'a [T]> {
        let column = self.column(field)?;
        if !column.dtype().is_array() {
            return Err(Error::schema_mismatch(
                field,
                format!("{}[..]", T::SCALAR_TYPE),
                column.dtype(),
            ));
        }
        column
            .row_slice::<T>(self.slot)
            .ok_or_else(|| Error::schema_mismatch(field, T::SCALAR_TYPE, column.dtype()))
    }

    /// Copies an array field into a fixed-size array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`], or [`Error::SchemaMismatch`] if the
    /// field is not an array of `N` elements of type `T`.
    pub fn get_array<T: Element, const N: usize>(&self, field: &str) -> Result<[T; N]> {
        let slice = self.get_slice::<T>(field)?;
        <[T; N]>::try_from(slice).map_err(|_| {
            Error::schema_mismatch(
                field,
                format!("{}[{N}]", T::SCALAR_TYPE),
                format!("{}[{}]", T::SCALAR_TYPE, slice.len()),
            )
        })
    }

    /// Returns all field values in declaration order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        (0..self.layout().len())
            .filter_map(|index| self.table.column(index))
            .map(|column| column.get(self.slot))
            .collect()
    }

    /// Iterates over `(field name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Value)> + 'a {
        let table = self.table;
        let slot = self.slot;
        table
            .layout()
            .fields()
            .iter()
            .enumerate()
            .filter_map(move |(index, field)| {
                table
                    .column(index)
                    .map(|column| (field.name(), column.get(slot)))
            })
    }

    fn column(&self, field: &str) -> Result<&'a super::AttrColumn> {
        let index = self.layout().index_of(field)?;
        self.table
            .column(index)
            .ok_or_else(|| Error::UnknownField(field.to_string()))
    }
}

impl fmt::Debug for RecordRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.iter() {
            map.entry(&name, &value.to_string());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::AttrSchema;

    #[test]
    fn test_typed_access() {
        let schema =
            AttrSchema::from_pairs([("position", "float64[3]"), ("label", "int32")]).unwrap();
        let mut table = AttrTable::with_capacity(Arc::new(RecordLayout::compile(&schema)), 1);
        let slot = table
            .allocate(&[Value::from([1.0f64, 2.0, 3.0]), Value::from(-4i32)])
            .unwrap();
        let record = table.record(slot);

        assert_eq!(record.get_as::<i32>("label"), Ok(-4));
        assert!(record.get_as::<i64>("label").is_err());
        assert_eq!(record.get_array::<f64, 3>("position"), Ok([1.0, 2.0, 3.0]));
        assert!(record.get_array::<f64, 2>("position").is_err());
        assert_eq!(record.get_slice::<f64>("position").map(<[f64]>::len), Ok(3));
        assert!(matches!(
            record.get_slice::<i32>("label"),
            Err(Error::SchemaMismatch { .. })
        ));
        assert!(matches!(record.get("nope"), Err(Error::UnknownField(_))));

        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["position", "label"]);
        assert_eq!(record.values().len(), 2);
        assert_eq!(format!("{record:?}"), r#"{"position": "[1, 2, 3]", "label": "-4"}"#);
    }
}
