//! Schemas for node and edge attributes.
//!
//! A [`GraphSpec`] is the user-facing description of a graph: the node key
//! type, the ordered node and edge attribute fields, and directedness.
//! Compiling it produces a [`CompiledSchema`] holding one [`RecordLayout`]
//! per record kind, which the attribute tables use to place values.

mod layout;
mod spec;

pub use layout::{CompiledSchema, FieldSlot, RecordLayout, SchemaSignature};
pub use spec::{AttrSchema, GraphSpec};
