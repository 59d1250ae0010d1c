//! # typedgraph-common
//!
//! Foundation layer for Typedgraph: element types, values, typed arrays, and errors.
//!
//! This crate provides the fundamental building blocks used by all other
//! Typedgraph crates. It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions (ScalarType, DType, Scalar, Value, AttrArray)
//! - [`utils`] - Utility functions and helpers (hashing, errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::{ArrayData, AttrArray, DType, Element, Scalar, ScalarType, Shape, Value};
pub use utils::error::{Error, Result};
