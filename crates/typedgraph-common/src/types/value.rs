//! Attribute values.
//!
//! A [`Value`] is what a single record holds for one field: either a
//! [`Scalar`] or a fixed-length array stored as [`ArrayData`].

use std::fmt;

use super::{ArrayData, DType, Element, ScalarType};

/// A single typed primitive value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Scalar {
    /// Signed 8-bit integer.
    Int8(i8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
}

impl Scalar {
    /// Returns the zero value of a type (`false` for booleans).
    #[must_use]
    pub fn zero(ty: ScalarType) -> Self {
        match_type!(ty, T => T::default().into_scalar())
    }

    /// Returns the element type of this scalar.
    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Int8(_) => ScalarType::Int8,
            Self::Int16(_) => ScalarType::Int16,
            Self::Int32(_) => ScalarType::Int32,
            Self::Int64(_) => ScalarType::Int64,
            Self::UInt8(_) => ScalarType::UInt8,
            Self::UInt16(_) => ScalarType::UInt16,
            Self::UInt32(_) => ScalarType::UInt32,
            Self::UInt64(_) => ScalarType::UInt64,
            Self::Float32(_) => ScalarType::Float32,
            Self::Float64(_) => ScalarType::Float64,
            Self::Bool(_) => ScalarType::Bool,
        }
    }

    /// Returns the value as an `i128` if this is an integer scalar.
    ///
    /// Every supported integer type fits into `i128` losslessly.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Int8(v) => Some(v.into()),
            Self::Int16(v) => Some(v.into()),
            Self::Int32(v) => Some(v.into()),
            Self::Int64(v) => Some(v.into()),
            Self::UInt8(v) => Some(v.into()),
            Self::UInt16(v) => Some(v.into()),
            Self::UInt32(v) => Some(v.into()),
            Self::UInt64(v) => Some(v.into()),
            Self::Float32(_) | Self::Float64(_) | Self::Bool(_) => None,
        }
    }

    /// Extracts a value of exactly type `T`.
    #[must_use]
    pub fn get<T: Element>(self) -> Option<T> {
        T::from_scalar(self)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// The value of one attribute field on one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A scalar field value.
    Scalar(Scalar),
    /// A fixed-length array field value.
    Array(ArrayData),
}

impl Value {
    /// Returns the dtype this value would satisfy.
    #[must_use]
    pub fn dtype(&self) -> DType {
        match self {
            Self::Scalar(s) => DType::scalar(s.scalar_type()),
            // A zero-length array has no valid dtype; report it as a scalar
            // of the element type so the mismatch still names the base.
            Self::Array(data) => DType::array(data.scalar_type(), data.len())
                .unwrap_or_else(|_| DType::scalar(data.scalar_type())),
        }
    }

    /// Returns true if this value has exactly the given dtype.
    #[must_use]
    pub fn matches(&self, dtype: &DType) -> bool {
        match (self, dtype.array_len()) {
            (Self::Scalar(s), None) => s.scalar_type() == dtype.base(),
            (Self::Array(data), Some(len)) => {
                data.scalar_type() == dtype.base() && data.len() == len
            }
            _ => false,
        }
    }

    /// Returns the scalar, if this is a scalar value.
    #[must_use]
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            Self::Array(_) => None,
        }
    }

    /// Returns the array buffer, if this is an array value.
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayData> {
        match self {
            Self::Array(data) => Some(data),
            Self::Scalar(_) => None,
        }
    }

    /// Extracts a scalar of exactly type `T`.
    #[must_use]
    pub fn get<T: Element>(&self) -> Option<T> {
        self.as_scalar().and_then(T::from_scalar)
    }

    /// Borrows an array value as a slice of `T`.
    #[must_use]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        self.as_array().and_then(T::slice)
    }

    /// Copies an array value of length `N` into a fixed-size array.
    #[must_use]
    pub fn to_array<T: Element, const N: usize>(&self) -> Option<[T; N]> {
        self.as_slice::<T>()
            .and_then(|slice| <[T; N]>::try_from(slice).ok())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Array(data) => {
                f.write_str("[")?;
                for (i, s) in data.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{s}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<ArrayData> for Value {
    fn from(value: ArrayData) -> Self {
        Self::Array(value)
    }
}

macro_rules! impl_value_from {
    ($variant:ident, $t:ty) => {
        impl From<$t> for Scalar {
            fn from(value: $t) -> Self {
                Scalar::$variant(value)
            }
        }

        impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Scalar(Scalar::$variant(value))
            }
        }

        impl From<Vec<$t>> for Value {
            fn from(values: Vec<$t>) -> Self {
                Value::Array(ArrayData::$variant(values))
            }
        }

        impl From<&[$t]> for Value {
            fn from(values: &[$t]) -> Self {
                Value::Array(ArrayData::$variant(values.to_vec()))
            }
        }

        impl<const N: usize> From<[$t; N]> for Value {
            fn from(values: [$t; N]) -> Self {
                Value::Array(ArrayData::$variant(values.to_vec()))
            }
        }
    };
}

for_each_element!(impl_value_from);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_value() {
        let v = Value::from(2.5f32);
        assert_eq!(v.get::<f32>(), Some(2.5));
        assert_eq!(v.get::<f64>(), None);
        assert!(v.matches(&DType::scalar(ScalarType::Float32)));
        assert!(!v.matches(&DType::scalar(ScalarType::Float64)));
        assert_eq!(v.dtype().to_string(), "float32");
    }

    #[test]
    fn test_array_value() {
        let v = Value::from([1.0f64, 2.0, 3.0]);
        let dtype = DType::array(ScalarType::Float64, 3).unwrap();
        assert!(v.matches(&dtype));
        assert!(!v.matches(&DType::array(ScalarType::Float64, 2).unwrap()));
        assert_eq!(v.to_array::<f64, 3>(), Some([1.0, 2.0, 3.0]));
        assert_eq!(v.to_array::<f64, 2>(), None);
        assert_eq!(v.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(Scalar::UInt64(u64::MAX).as_i128(), Some(u64::MAX as i128));
        assert_eq!(Scalar::Int8(-3).as_i128(), Some(-3));
        assert_eq!(Scalar::Float32(1.0).as_i128(), None);
        assert_eq!(Scalar::zero(ScalarType::Int16), Scalar::Int16(0));
    }
}
