//! Flat typed buffers for bulk attribute exchange.
//!
//! [`ArrayData`] is a contiguous vector of one element type. [`AttrArray`]
//! adds a row-major shape on top: `(rows,)` for scalar fields and
//! `(rows, len)` for array fields, with no padding between rows. This is the
//! layout a numeric array library expects, so buffers can be handed over
//! without copying.

use smallvec::SmallVec;

use super::{DType, Element, Scalar, ScalarType};
use crate::utils::error::{Error, Result};

/// Dimensions of an [`AttrArray`].
pub type Shape = SmallVec<[usize; 2]>;

/// A contiguous vector of a single element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// `int8` elements.
    Int8(Vec<i8>),
    /// `int16` elements.
    Int16(Vec<i16>),
    /// `int32` elements.
    Int32(Vec<i32>),
    /// `int64` elements.
    Int64(Vec<i64>),
    /// `uint8` elements.
    UInt8(Vec<u8>),
    /// `uint16` elements.
    UInt16(Vec<u16>),
    /// `uint32` elements.
    UInt32(Vec<u32>),
    /// `uint64` elements.
    UInt64(Vec<u64>),
    /// `float32` elements.
    Float32(Vec<f32>),
    /// `float64` elements.
    Float64(Vec<f64>),
    /// `bool` elements.
    Bool(Vec<bool>),
}

#[inline]
fn type_of<T: Element>(_: &[T]) -> ScalarType {
    T::SCALAR_TYPE
}

/// Borrows `src` with the same element type as `dst`.
#[inline]
fn same_type<'a, T: Element>(_: &Vec<T>, src: &'a ArrayData) -> Option<&'a [T]> {
    T::slice(src)
}

impl ArrayData {
    /// Creates an empty buffer of the given type.
    #[must_use]
    pub fn with_capacity(ty: ScalarType, capacity: usize) -> Self {
        match_type!(ty, T => T::into_data(Vec::with_capacity(capacity)))
    }

    /// Creates a zero-filled buffer (`false` for booleans).
    #[must_use]
    pub fn zeros(ty: ScalarType, len: usize) -> Self {
        match_type!(ty, T => T::into_data(vec![T::default(); len]))
    }

    /// Returns the element type.
    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        match_data!(self, v => type_of(v))
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match_data!(self, v => v.len())
    }

    /// Returns true if the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserves room for `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        match_data!(self, v => v.reserve(additional));
    }

    /// Returns the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match_data!(self, v => v.get(index).map(|x| x.into_scalar()))
    }

    /// Iterates over the elements as [`Scalar`]s.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Resizes the buffer, zero-filling new elements.
    pub fn resize(&mut self, len: usize) {
        match_data!(self, v => v.resize(len, Default::default()));
    }

    /// Copies `count` elements starting at `start` into a new buffer.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    #[must_use]
    pub fn slice(&self, start: usize, count: usize) -> ArrayData {
        match_data!(self, v => Element::into_data(v[start..start + count].to_vec()))
    }

    /// Overwrites `count` elements at `dst_start` with elements of `src`
    /// starting at `src_start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the element types differ.
    pub fn write_at(
        &mut self,
        dst_start: usize,
        src: &ArrayData,
        src_start: usize,
        count: usize,
    ) -> Result<()> {
        let expected = self.scalar_type();
        match_data!(self, dst => {
            let src = same_type(dst, src)
                .ok_or_else(|| Error::schema_mismatch("buffer", expected, src.scalar_type()))?;
            dst[dst_start..dst_start + count].copy_from_slice(&src[src_start..src_start + count]);
        });
        Ok(())
    }

    /// Overwrites the element at `index` with a scalar of the same type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the scalar has another type.
    pub fn set(&mut self, index: usize, scalar: Scalar) -> Result<()> {
        let expected = self.scalar_type();
        match_data!(self, dst => {
            let value = same_scalar(dst, scalar)
                .ok_or_else(|| Error::schema_mismatch("buffer", expected, scalar.scalar_type()))?;
            dst[index] = value;
        });
        Ok(())
    }

    /// Gathers `width` consecutive elements from each start row into a new buffer.
    ///
    /// Row `r` covers elements `r * width .. (r + 1) * width`.
    ///
    /// # Panics
    ///
    /// Panics if a row is out of bounds.
    #[must_use]
    pub fn gather(&self, rows: &[usize], width: usize) -> ArrayData {
        match_data!(self, v => {
            let mut out = Vec::with_capacity(rows.len() * width);
            for &row in rows {
                let start = row * width;
                out.extend_from_slice(&v[start..start + width]);
            }
            Element::into_data(out)
        })
    }

    /// Scatters consecutive `width`-element rows of `src` to the given rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the element types differ.
    ///
    /// # Panics
    ///
    /// Panics if `src` is shorter than `rows.len() * width` or a row is out
    /// of bounds.
    pub fn scatter(&mut self, rows: &[usize], width: usize, src: &ArrayData) -> Result<()> {
        let expected = self.scalar_type();
        match_data!(self, dst => {
            let src = same_type(dst, src)
                .ok_or_else(|| Error::schema_mismatch("buffer", expected, src.scalar_type()))?;
            for (i, &row) in rows.iter().enumerate() {
                let start = row * width;
                dst[start..start + width].copy_from_slice(&src[i * width..(i + 1) * width]);
            }
        });
        Ok(())
    }

    /// Borrows the buffer as a slice of `T`.
    #[must_use]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(self)
    }
}

#[inline]
fn same_scalar<T: Element>(_: &Vec<T>, scalar: Scalar) -> Option<T> {
    T::from_scalar(scalar)
}

/// A typed row-major buffer with a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrArray {
    data: ArrayData,
    shape: Shape,
}

impl AttrArray {
    /// Creates an array from a buffer and a shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the shape does not cover the
    /// buffer exactly, or [`Error::SchemaMismatch`] for shapes that are not
    /// one- or two-dimensional.
    pub fn new(data: ArrayData, shape: &[usize]) -> Result<Self> {
        if shape.is_empty() || shape.len() > 2 {
            return Err(Error::schema_mismatch(
                "array",
                "1 or 2 dimensions",
                format!("{} dimensions", shape.len()),
            ));
        }
        let expected: usize = shape.iter().product();
        Error::check_length(expected, data.len())?;
        Ok(Self {
            data,
            shape: Shape::from_slice(shape),
        })
    }

    /// Creates a one-dimensional array, one element per row.
    #[must_use]
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        let rows = values.len();
        Self {
            data: T::into_data(values),
            shape: Shape::from_slice(&[rows]),
        }
    }

    /// Creates a `(rows, width)` array from a flat row-major vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `values` is not a whole number
    /// of rows.
    pub fn from_flat<T: Element>(values: Vec<T>, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::schema_mismatch("array", "non-zero row width", 0));
        }
        let rows = values.len() / width;
        Self::new(T::into_data(values), &[rows, width])
    }

    /// Creates a `(rows, N)` array from fixed-size rows.
    #[must_use]
    pub fn from_rows<T: Element, const N: usize>(rows: &[[T; N]]) -> Self {
        let mut flat = Vec::with_capacity(rows.len() * N);
        for row in rows {
            flat.extend_from_slice(row);
        }
        Self {
            data: T::into_data(flat),
            shape: Shape::from_slice(&[rows.len(), N]),
        }
    }

    /// Creates a `(rows, 2)` array from pairs, e.g. edge endpoints.
    #[must_use]
    pub fn from_pairs<T: Element>(pairs: &[(T, T)]) -> Self {
        let mut flat = Vec::with_capacity(pairs.len() * 2);
        for &(u, v) in pairs {
            flat.push(u);
            flat.push(v);
        }
        Self {
            data: T::into_data(flat),
            shape: Shape::from_slice(&[pairs.len(), 2]),
        }
    }

    /// Creates an empty array shaped for the given dtype.
    #[must_use]
    pub fn empty(dtype: &DType) -> Self {
        Self {
            data: ArrayData::with_capacity(dtype.base(), 0),
            shape: dtype.bulk_shape(0),
        }
    }

    /// Wraps a buffer holding `rows` values of `dtype`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the buffer length disagrees.
    pub fn for_dtype(data: ArrayData, dtype: &DType, rows: usize) -> Result<Self> {
        Self::new(data, &dtype.bulk_shape(rows))
    }

    /// Returns the underlying buffer.
    #[must_use]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Consumes the array, returning the buffer.
    #[must_use]
    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the element type.
    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        self.data.scalar_type()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    /// Returns the number of elements per row.
    #[must_use]
    pub fn row_width(&self) -> usize {
        self.shape.get(1).copied().unwrap_or(1)
    }

    /// Borrows the flat buffer as a slice of `T`.
    #[must_use]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Consumes the array into a flat vector of `T`.
    #[must_use]
    pub fn into_vec<T: Element>(self) -> Option<Vec<T>> {
        T::from_data(self.data)
    }

    /// Copies a `(rows, N)` array into fixed-size rows.
    #[must_use]
    pub fn to_rows<T: Element, const N: usize>(&self) -> Option<Vec<[T; N]>> {
        if self.shape.len() != 2 || self.shape[1] != N || N == 0 {
            return None;
        }
        let flat = self.as_slice::<T>()?;
        flat.chunks_exact(N)
            .map(|chunk| <[T; N]>::try_from(chunk).ok())
            .collect()
    }

    /// Checks that this array holds values of `dtype` for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the element type or trailing
    /// dimension disagrees with the dtype.
    pub fn check_dtype(&self, field: &str, dtype: &DType) -> Result<()> {
        let shape_ok = match dtype.array_len() {
            None => self.shape.len() == 1,
            Some(len) => self.shape.len() == 2 && self.shape[1] == len,
        };
        if !shape_ok || self.scalar_type() != dtype.base() {
            return Err(Error::schema_mismatch(field, dtype, self.describe()));
        }
        Ok(())
    }

    /// Renders element type and shape, e.g. `float64(4, 3)`.
    #[must_use]
    pub fn describe(&self) -> String {
        let dims: Vec<String> = self.shape.iter().map(ToString::to_string).collect();
        if self.shape.len() == 1 {
            format!("{}({},)", self.scalar_type(), dims[0])
        } else {
            format!("{}({})", self.scalar_type(), dims.join(", "))
        }
    }
}

impl<T: Element> From<Vec<T>> for AttrArray {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_and_resize() {
        let mut data = ArrayData::zeros(ScalarType::UInt16, 3);
        assert_eq!(data.as_slice::<u16>(), Some(&[0u16, 0, 0][..]));
        data.resize(5);
        assert_eq!(data.len(), 5);
        assert_eq!(data.scalar_type(), ScalarType::UInt16);
    }

    #[test]
    fn test_gather_scatter() {
        let data = ArrayData::Float64(vec![0.0, 0.1, 1.0, 1.1, 2.0, 2.1]);
        let gathered = data.gather(&[2, 0], 2);
        assert_eq!(gathered, ArrayData::Float64(vec![2.0, 2.1, 0.0, 0.1]));

        let mut target = ArrayData::zeros(ScalarType::Float64, 6);
        target.scatter(&[1], 2, &ArrayData::Float64(vec![9.0, 9.5])).unwrap();
        assert_eq!(target.as_slice::<f64>().unwrap()[2..4], [9.0, 9.5]);

        let wrong = ArrayData::Float32(vec![1.0, 2.0]);
        assert!(matches!(
            target.scatter(&[0], 2, &wrong),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_set() {
        let mut data = ArrayData::zeros(ScalarType::Int32, 2);
        data.set(1, Scalar::Int32(7)).unwrap();
        assert_eq!(data.get(1), Some(Scalar::Int32(7)));
        assert!(data.set(0, Scalar::Int64(7)).is_err());
        assert_eq!(data.as_slice::<i32>(), Some(&[0, 7][..]));
    }

    #[test]
    fn test_attr_array_shapes() {
        let positions = AttrArray::from_rows(&[[0.0f64, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert_eq!(positions.shape(), &[2, 3]);
        assert_eq!(positions.rows(), 2);
        assert_eq!(positions.row_width(), 3);
        assert_eq!(positions.to_rows::<f64, 3>().unwrap()[1], [1.0, 1.0, 1.0]);
        assert_eq!(positions.describe(), "float64(2, 3)");

        let dtype: DType = "float64[3]".parse().unwrap();
        assert!(positions.check_dtype("position", &dtype).is_ok());
        let scalar: DType = "float64".parse().unwrap();
        assert!(positions.check_dtype("position", &scalar).is_err());
    }

    #[test]
    fn test_attr_array_new_checks_length() {
        let err = AttrArray::new(ArrayData::Int8(vec![1, 2, 3]), &[2, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                expected: 4,
                found: 3
            }
        );
        assert!(AttrArray::from_flat(vec![1u8, 2, 3], 2).is_err());
    }

    #[test]
    fn test_pairs_and_rows() {
        let pairs = AttrArray::from_pairs(&[(0u64, 1u64), (1, 2)]);
        assert_eq!(pairs.to_rows::<u64, 2>(), Some(vec![[0, 1], [1, 2]]));
        assert_eq!(pairs.to_rows::<u32, 2>(), None);

        let weights: AttrArray = vec![1.5f32, 2.5].into();
        assert_eq!(weights.shape(), &[2]);
        assert_eq!(weights.into_vec::<f32>(), Some(vec![1.5, 2.5]));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_scatter_then_gather(
                width in 1usize..4,
                rows in 1usize..32,
                picks in prop::collection::btree_set(0usize..32, 0..16),
            ) {
                let picks: Vec<usize> = picks.into_iter().filter(|&r| r < rows).collect();
                let mut dst = ArrayData::zeros(ScalarType::Int32, rows * width);
                let src: Vec<i32> = (1..=(picks.len() * width) as i32).collect();
                dst.scatter(&picks, width, &ArrayData::Int32(src.clone())).unwrap();

                prop_assert_eq!(dst.gather(&picks, width), ArrayData::Int32(src));
                let untouched: Vec<usize> = (0..rows).filter(|r| !picks.contains(r)).collect();
                let rest = dst.gather(&untouched, width);
                prop_assert!(rest.as_slice::<i32>().unwrap().iter().all(|&x| x == 0));
            }
        }
    }
}
