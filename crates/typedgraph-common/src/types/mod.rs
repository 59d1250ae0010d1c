//! Core type definitions for Typedgraph.
//!
//! This module contains all fundamental types used throughout the graph engine:
//! - Element types ([`ScalarType`], [`DType`], [`Element`])
//! - Attribute values ([`Scalar`], [`Value`])
//! - Flat typed buffers for bulk exchange ([`ArrayData`], [`AttrArray`])

/// Invokes `$m!(Variant, rust_type)` once per supported element type.
macro_rules! for_each_element {
    ($m:ident) => {
        $m!(Int8, i8);
        $m!(Int16, i16);
        $m!(Int32, i32);
        $m!(Int64, i64);
        $m!(UInt8, u8);
        $m!(UInt16, u16);
        $m!(UInt32, u32);
        $m!(UInt64, u64);
        $m!(Float32, f32);
        $m!(Float64, f64);
        $m!(Bool, bool);
    };
}

/// Matches every [`ArrayData`] variant, binding the inner `Vec` to `$v`.
macro_rules! match_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($v) => $body,
            ArrayData::Int16($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::UInt8($v) => $body,
            ArrayData::UInt16($v) => $body,
            ArrayData::UInt32($v) => $body,
            ArrayData::UInt64($v) => $body,
            ArrayData::Float32($v) => $body,
            ArrayData::Float64($v) => $body,
            ArrayData::Bool($v) => $body,
        }
    };
}

/// Matches a [`ScalarType`], aliasing the matching Rust type as `$t`.
macro_rules! match_type {
    ($ty:expr, $t:ident => $body:expr) => {
        match $ty {
            ScalarType::Int8 => {
                type $t = i8;
                $body
            }
            ScalarType::Int16 => {
                type $t = i16;
                $body
            }
            ScalarType::Int32 => {
                type $t = i32;
                $body
            }
            ScalarType::Int64 => {
                type $t = i64;
                $body
            }
            ScalarType::UInt8 => {
                type $t = u8;
                $body
            }
            ScalarType::UInt16 => {
                type $t = u16;
                $body
            }
            ScalarType::UInt32 => {
                type $t = u32;
                $body
            }
            ScalarType::UInt64 => {
                type $t = u64;
                $body
            }
            ScalarType::Float32 => {
                type $t = f32;
                $body
            }
            ScalarType::Float64 => {
                type $t = f64;
                $body
            }
            ScalarType::Bool => {
                type $t = bool;
                $body
            }
        }
    };
}

mod array;
mod dtype;
mod element;
mod value;

pub use array::{ArrayData, AttrArray, Shape};
pub use dtype::{DType, ScalarType};
pub use element::Element;
pub use value::{Scalar, Value};
