//! Utility functions and helpers.
//!
//! - [`error`] - The workspace error type
//! - [`hash`] - Hash map aliases backed by `ahash`

pub mod error;
pub mod hash;
