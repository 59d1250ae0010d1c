//! Element types and field dtypes.
//!
//! A dtype is written as `base` or `base[len]`, e.g. `"uint64"` or
//! `"float64[3]"`. Besides the canonical names, the aliases `float`
//! (`float32`), `double` (`float64`), `int` (`int64`) and `uint` (`uint64`)
//! are accepted.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Shape;
use crate::utils::error::{Error, Result};

static DTYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\[\s*(\d+)\s*\])?\s*$")
        .expect("dtype pattern is a valid regex")
});

/// A primitive element type with a fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScalarType {
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// IEEE 754 single precision float.
    Float32,
    /// IEEE 754 double precision float.
    Float64,
    /// Boolean, one byte per value.
    Bool,
}

impl ScalarType {
    /// Every supported element type.
    pub const ALL: [ScalarType; 11] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Bool,
    ];

    /// Returns the canonical name of the type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
        }
    }

    /// Looks up a type by canonical name or alias.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" | "int" => Self::Int64,
            "uint8" => Self::UInt8,
            "uint16" => Self::UInt16,
            "uint32" => Self::UInt32,
            "uint64" | "uint" => Self::UInt64,
            "float32" | "float" => Self::Float32,
            "float64" | "double" => Self::Float64,
            "bool" => Self::Bool,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns the width of one element in bytes.
    #[must_use]
    pub fn size_of(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 | Self::Bool => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Returns true for the signed and unsigned integer types.
    #[must_use]
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::Float32 | Self::Float64 | Self::Bool)
    }

    /// Returns true for the floating point types.
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let dtype: DType = s.parse()?;
        if dtype.is_array() {
            return Err(Error::InvalidDType(
                s.to_string(),
                "expected a scalar type".to_string(),
            ));
        }
        Ok(dtype.base())
    }
}

impl TryFrom<String> for ScalarType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ScalarType> for String {
    fn from(value: ScalarType) -> Self {
        value.name().to_string()
    }
}

/// The declared type of an attribute field: a scalar or a fixed-length array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DType {
    base: ScalarType,
    len: Option<usize>,
}

impl DType {
    /// Creates a scalar dtype.
    #[must_use]
    pub const fn scalar(base: ScalarType) -> Self {
        Self { base, len: None }
    }

    /// Creates a fixed-length array dtype.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDType`] if `len` is zero.
    pub fn array(base: ScalarType, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::InvalidDType(
                format!("{base}[0]"),
                "array length must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            base,
            len: Some(len),
        })
    }

    /// Returns the element type.
    #[must_use]
    pub const fn base(&self) -> ScalarType {
        self.base
    }

    /// Returns the array length, or `None` for scalars.
    #[must_use]
    pub const fn array_len(&self) -> Option<usize> {
        self.len
    }

    /// Returns true if this is an array dtype.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.len.is_some()
    }

    /// Number of elements stored per record: the array length, or 1.
    #[must_use]
    pub const fn width(&self) -> usize {
        match self.len {
            Some(len) => len,
            None => 1,
        }
    }

    /// Size of one record's value in bytes.
    #[must_use]
    pub fn size_of(&self) -> usize {
        self.base.size_of() * self.width()
    }

    /// Shape of a bulk buffer holding `rows` values of this dtype.
    ///
    /// `(rows,)` for scalars, `(rows, len)` for arrays.
    #[must_use]
    pub fn bulk_shape(&self, rows: usize) -> Shape {
        match self.len {
            Some(len) => Shape::from_slice(&[rows, len]),
            None => Shape::from_slice(&[rows]),
        }
    }
}

impl From<ScalarType> for DType {
    fn from(base: ScalarType) -> Self {
        Self::scalar(base)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.len {
            Some(len) => write!(f, "{}[{}]", self.base, len),
            None => write!(f, "{}", self.base),
        }
    }
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = DTYPE_REGEX.captures(s).ok_or_else(|| {
            Error::InvalidDType(
                s.to_string(),
                "expected `base` or `base[len]`".to_string(),
            )
        })?;

        let name = &caps[1];
        let base =
            ScalarType::from_name(name).ok_or_else(|| Error::UnsupportedFieldType(name.to_string()))?;

        match caps.get(2) {
            None => Ok(Self::scalar(base)),
            Some(len) => {
                let len: usize = len.as_str().parse().map_err(|_| {
                    Error::InvalidDType(s.to_string(), "array length out of range".to_string())
                })?;
                Self::array(base, len)
            }
        }
    }
}

impl TryFrom<String> for DType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<&str> for DType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl From<DType> for String {
    fn from(value: DType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        let dtype: DType = "uint64".parse().unwrap();
        assert_eq!(dtype.base(), ScalarType::UInt64);
        assert!(!dtype.is_array());
        assert_eq!(dtype.width(), 1);
        assert_eq!(dtype.to_string(), "uint64");
    }

    #[test]
    fn test_parse_array() {
        let dtype: DType = "double[3]".parse().unwrap();
        assert_eq!(dtype.base(), ScalarType::Float64);
        assert_eq!(dtype.array_len(), Some(3));
        assert_eq!(dtype.size_of(), 24);
        assert_eq!(dtype.to_string(), "float64[3]");
        assert_eq!(dtype.bulk_shape(5).as_slice(), &[5, 3]);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(ScalarType::from_name("float"), Some(ScalarType::Float32));
        assert_eq!(ScalarType::from_name("double"), Some(ScalarType::Float64));
        assert_eq!(ScalarType::from_name("int"), Some(ScalarType::Int64));
        assert_eq!(ScalarType::from_name("uint"), Some(ScalarType::UInt64));
        assert_eq!(ScalarType::from_name("complex"), None);
    }

    #[test]
    fn test_unsupported_base() {
        assert_eq!(
            "float16[2]".parse::<DType>(),
            Err(Error::UnsupportedFieldType("float16".into()))
        );
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            "double[".parse::<DType>(),
            Err(Error::InvalidDType(..))
        ));
        assert!(matches!(
            "double[0]".parse::<DType>(),
            Err(Error::InvalidDType(..))
        ));
        assert!(matches!(
            "int32[3]".parse::<ScalarType>(),
            Err(Error::InvalidDType(..))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let dtype: DType = serde_json::from_str("\"float32[2]\"").unwrap();
        assert_eq!(dtype, DType::array(ScalarType::Float32, 2).unwrap());
        assert_eq!(serde_json::to_string(&dtype).unwrap(), "\"float32[2]\"");

        let bad = serde_json::from_str::<DType>("\"quaternion\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_sizes() {
        for ty in ScalarType::ALL {
            assert!(ty.size_of() >= 1);
            assert_eq!(ScalarType::from_name(ty.name()), Some(ty));
        }
        assert!(ScalarType::Int16.is_integer());
        assert!(!ScalarType::Bool.is_integer());
        assert!(ScalarType::Float32.is_float());
    }
}
