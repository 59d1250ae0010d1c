//! The [`Element`] trait linking Rust primitives to [`ScalarType`]s.

use std::fmt;

use super::{ArrayData, Scalar, ScalarType};

/// A Rust primitive that can be stored in an attribute column.
///
/// Implemented for `i8`..`i64`, `u8`..`u64`, `f32`, `f64` and `bool`. The
/// conversions are exact: an `f32` never reads back from an `Float64` buffer.
pub trait Element:
    Copy + PartialEq + PartialOrd + Default + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The element type this primitive is stored as.
    const SCALAR_TYPE: ScalarType;

    /// Wraps the value into a [`Scalar`].
    fn into_scalar(self) -> Scalar;

    /// Extracts a value of exactly this type from a [`Scalar`].
    fn from_scalar(scalar: Scalar) -> Option<Self>;

    /// Borrows the buffer as a slice of this type.
    fn slice(data: &ArrayData) -> Option<&[Self]>;

    /// Mutably borrows the buffer as a vector of this type.
    fn vec_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>>;

    /// Wraps a vector into a typed buffer.
    fn into_data(values: Vec<Self>) -> ArrayData;

    /// Unwraps a typed buffer into a vector of this type.
    fn from_data(data: ArrayData) -> Option<Vec<Self>>;
}

macro_rules! impl_element {
    ($variant:ident, $t:ty) => {
        impl Element for $t {
            const SCALAR_TYPE: ScalarType = ScalarType::$variant;

            #[inline]
            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            #[inline]
            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            #[inline]
            fn vec_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn into_data(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }

            #[inline]
            fn from_data(data: ArrayData) -> Option<Vec<Self>> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

for_each_element!(impl_element);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_types() {
        assert_eq!(<i8 as Element>::SCALAR_TYPE, ScalarType::Int8);
        assert_eq!(<u64 as Element>::SCALAR_TYPE, ScalarType::UInt64);
        assert_eq!(<f32 as Element>::SCALAR_TYPE, ScalarType::Float32);
        assert_eq!(<bool as Element>::SCALAR_TYPE, ScalarType::Bool);
    }

    #[test]
    fn test_exact_conversion() {
        assert_eq!(f64::from_scalar(Scalar::Float64(1.5)), Some(1.5));
        assert_eq!(f32::from_scalar(Scalar::Float64(1.5)), None);
        assert_eq!(3u16.into_scalar(), Scalar::UInt16(3));
    }

    #[test]
    fn test_buffer_access() {
        let mut data = f32::into_data(vec![1.0, 2.0]);
        assert_eq!(f32::slice(&data), Some(&[1.0f32, 2.0][..]));
        assert!(f64::slice(&data).is_none());

        f32::vec_mut(&mut data).unwrap().push(3.0);
        assert_eq!(f32::from_data(data), Some(vec![1.0, 2.0, 3.0]));
    }
}
