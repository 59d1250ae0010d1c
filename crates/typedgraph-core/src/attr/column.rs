//! A single attribute column.

use typedgraph_common::types::{ArrayData, AttrArray, DType, Element, Scalar, Value};
use typedgraph_common::utils::error::{Error, Result};

use super::table::Slot;

/// Values of one field across all record slots.
///
/// Stored densely: slot `s` occupies elements `s * width .. (s + 1) * width`
/// of the buffer, where `width` is 1 for scalars and the array length for
/// array fields.
#[derive(Debug, Clone)]
pub struct AttrColumn {
    dtype: DType,
    data: ArrayData,
}

impl AttrColumn {
    /// Creates a column with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(dtype: DType, capacity: usize) -> Self {
        Self {
            dtype,
            data: ArrayData::with_capacity(dtype.base(), capacity * dtype.width()),
        }
    }

    /// Returns the field dtype.
    #[must_use]
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    /// Grows or shrinks the buffer to cover `slots` slots, zero-filling.
    pub fn resize(&mut self, slots: usize) {
        self.data.resize(slots * self.dtype.width());
    }

    /// Reserves room for `additional` more slots.
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional * self.dtype.width());
    }

    /// Reads the value at `slot`.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Value {
        match self.dtype.array_len() {
            None => match self.data.get(slot) {
                Some(scalar) => Value::Scalar(scalar),
                None => Value::Scalar(Scalar::zero(self.dtype.base())),
            },
            Some(len) => Value::Array(self.data.slice(slot * len, len)),
        }
    }

    /// Reads a scalar at `slot` without going through [`Value`].
    #[must_use]
    pub fn get_as<T: Element>(&self, slot: Slot) -> Option<T> {
        if self.dtype.is_array() {
            return None;
        }
        self.data.as_slice::<T>().and_then(|v| v.get(slot).copied())
    }

    /// Borrows the elements of an array value at `slot`.
    #[must_use]
    pub fn row_slice<T: Element>(&self, slot: Slot) -> Option<&[T]> {
        let width = self.dtype.width();
        self.data
            .as_slice::<T>()
            .and_then(|v| v.get(slot * width..(slot + 1) * width))
    }

    /// Writes a value at `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the value's dtype differs from
    /// the column's.
    pub fn set(&mut self, field: &str, slot: Slot, value: &Value) -> Result<()> {
        if !value.matches(&self.dtype) {
            return Err(Error::schema_mismatch(field, self.dtype, value.dtype()));
        }
        match value {
            Value::Scalar(scalar) => self.data.set(slot, *scalar),
            Value::Array(array) => {
                let width = self.dtype.width();
                self.data.write_at(slot * width, array, 0, width)
            }
        }
    }

    /// Zero-fills the value at `slot`.
    pub fn clear(&mut self, slot: Slot) -> Result<()> {
        let width = self.dtype.width();
        let zeros = ArrayData::zeros(self.dtype.base(), width);
        self.data.write_at(slot * width, &zeros, 0, width)
    }

    /// Copies row `row` of a bulk buffer into `slot`.
    ///
    /// The buffer must already have been checked against the column dtype.
    pub fn copy_row(&mut self, slot: Slot, src: &AttrArray, row: usize) -> Result<()> {
        let width = self.dtype.width();
        self.data.write_at(slot * width, src.data(), row * width, width)
    }

    /// Gathers the values at `slots` into a bulk buffer.
    #[must_use]
    pub fn gather(&self, slots: &[Slot]) -> AttrArray {
        let data = self.data.gather(slots, self.dtype.width());
        // The gathered buffer has exactly slots.len() * width elements.
        match AttrArray::for_dtype(data, &self.dtype, slots.len()) {
            Ok(array) => array,
            Err(_) => AttrArray::empty(&self.dtype),
        }
    }

    /// Scatters the rows of a bulk buffer to `slots`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the buffer does not hold values
    /// of this column's dtype, or [`Error::LengthMismatch`] if its row count
    /// differs from `slots.len()`.
    pub fn scatter(&mut self, field: &str, slots: &[Slot], values: &AttrArray) -> Result<()> {
        values.check_dtype(field, &self.dtype)?;
        Error::check_length(slots.len(), values.rows())?;
        self.data.scatter(slots, self.dtype.width(), values.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typedgraph_common::types::ScalarType;

    #[test]
    fn test_scalar_column() {
        let mut col = AttrColumn::with_capacity(DType::scalar(ScalarType::Float32), 4);
        col.resize(3);
        assert_eq!(col.get(2), Value::from(0.0f32));
        col.set("w", 1, &Value::from(2.5f32)).unwrap();
        assert_eq!(col.get(1), Value::from(2.5f32));
        assert_eq!(col.get_as::<f32>(1), Some(2.5));
        assert_eq!(col.get(0), Value::Scalar(Scalar::Float32(0.0)));
        assert!(col.set("w", 1, &Value::from(2.5f64)).is_err());
    }

    #[test]
    fn test_array_column() {
        let dtype = DType::array(ScalarType::Int16, 2).unwrap();
        let mut col = AttrColumn::with_capacity(dtype, 0);
        col.resize(3);
        col.set("p", 2, &Value::from([7i16, 8])).unwrap();
        assert_eq!(col.row_slice::<i16>(2), Some(&[7i16, 8][..]));
        assert_eq!(col.get_as::<i16>(2), None);

        let gathered = col.gather(&[2, 0]);
        assert_eq!(gathered.shape(), &[2, 2]);
        assert_eq!(gathered.as_slice::<i16>(), Some(&[7i16, 8, 0, 0][..]));

        col.clear(2).unwrap();
        assert_eq!(col.get(2), Value::from([0i16, 0]));
    }

    #[test]
    fn test_scatter_checks() {
        let dtype = DType::array(ScalarType::Float64, 3).unwrap();
        let mut col = AttrColumn::with_capacity(dtype, 2);
        col.resize(2);

        let rows = AttrArray::from_rows(&[[1.0f64, 2.0, 3.0]]);
        col.scatter("p", &[1], &rows).unwrap();
        assert_eq!(col.get(1), Value::from([1.0f64, 2.0, 3.0]));

        assert!(matches!(
            col.scatter("p", &[0, 1], &rows),
            Err(Error::LengthMismatch { expected: 2, found: 1 })
        ));
        let wrong = AttrArray::from_rows(&[[1.0f64, 2.0]]);
        assert!(matches!(
            col.scatter("p", &[0], &wrong),
            Err(Error::SchemaMismatch { .. })
        ));
    }
}
