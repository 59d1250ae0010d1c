//! Columnar attribute storage.
//!
//! Every record kind (nodes, edges) owns one attribute table: a column per
//! schema field, each a flat typed buffer with `width` elements per record
//! slot. Slots are handed out by the table and recycled on removal, so a
//! record's attributes never move while it is alive.
//!
//! [`RecordRef`] is a borrowed view of one slot. It cannot outlive the graph
//! it was read from.

mod column;
mod record;
mod table;

pub use record::RecordRef;
pub use table::Slot;
pub(crate) use column::AttrColumn;
pub(crate) use table::AttrTable;
