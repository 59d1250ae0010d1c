//! Slot-allocated attribute tables.

use std::sync::Arc;

use typedgraph_common::types::{AttrArray, Value};
use typedgraph_common::utils::error::{Error, Result};

use super::column::AttrColumn;
use super::record::RecordRef;
use crate::schema::RecordLayout;

/// Position of a record in an [`AttrTable`].
pub type Slot = usize;

/// Attribute records of one kind, stored column by column.
///
/// Each record lives in a slot. Freed slots are reused by later
/// allocations and are zero-filled before reuse.
#[derive(Debug, Clone)]
pub struct AttrTable {
    layout: Arc<RecordLayout>,
    columns: Vec<AttrColumn>,
    /// Slots released by removed records.
    free: Vec<Slot>,
    /// Liveness of every slot below `high_water`.
    occupied: Vec<bool>,
    /// Number of slots the columns currently cover.
    high_water: usize,
    live: usize,
}

impl AttrTable {
    /// Creates an empty table with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(layout: Arc<RecordLayout>, capacity: usize) -> Self {
        let columns = layout
            .fields()
            .iter()
            .map(|field| AttrColumn::with_capacity(*field.dtype(), capacity))
            .collect();
        Self {
            layout,
            columns,
            free: Vec::new(),
            occupied: Vec::with_capacity(capacity),
            high_water: 0,
            live: 0,
        }
    }

    /// Returns the record layout.
    #[must_use]
    pub fn layout(&self) -> &Arc<RecordLayout> {
        &self.layout
    }

    /// Returns the number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns the column at a field position.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&AttrColumn> {
        self.columns.get(index)
    }

    /// Reserves room for `additional` more records.
    pub fn reserve(&mut self, additional: usize) {
        let needed = additional.saturating_sub(self.free.len());
        for column in &mut self.columns {
            column.reserve(needed);
        }
    }

    fn acquire(&mut self) -> Result<Slot> {
        let slot = match self.free.pop() {
            Some(slot) => {
                for column in &mut self.columns {
                    column.clear(slot)?;
                }
                slot
            }
            None => {
                let slot = self.high_water;
                self.high_water += 1;
                for column in &mut self.columns {
                    column.resize(self.high_water);
                }
                self.occupied.push(false);
                slot
            }
        };
        self.occupied[slot] = true;
        self.live += 1;
        Ok(slot)
    }

    /// Allocates a record from positional values.
    ///
    /// An empty `values` list zero-initializes every field. Nothing is
    /// allocated when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] on wrong arity or dtype.
    pub fn allocate(&mut self, values: &[Value]) -> Result<Slot> {
        self.layout.check_values(values)?;
        let slot = self.acquire()?;
        for ((column, field), value) in self.columns.iter_mut().zip(self.layout.fields()).zip(values)
        {
            column.set(field.name(), slot, value)?;
        }
        Ok(slot)
    }

    /// Checks bulk columns against the layout before a batch insert.
    ///
    /// An empty column list is accepted and means "zero-initialize".
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] on wrong column count, element type,
    /// or trailing dimension, and [`Error::LengthMismatch`] if a column does
    /// not have exactly `rows` rows.
    pub fn check_columns(&self, columns: &[AttrArray], rows: usize) -> Result<()> {
        if columns.is_empty() {
            return Ok(());
        }
        if columns.len() != self.layout.len() {
            return Err(Error::schema_mismatch(
                "record",
                format!("{} columns", self.layout.len()),
                format!("{} columns", columns.len()),
            ));
        }
        for (field, column) in self.layout.fields().iter().zip(columns) {
            column.check_dtype(field.name(), field.dtype())?;
            Error::check_length(rows, column.rows())?;
        }
        Ok(())
    }

    /// Allocates a record from row `row` of bulk columns.
    ///
    /// The columns must have passed [`AttrTable::check_columns`].
    pub(crate) fn allocate_row(&mut self, columns: &[AttrArray], row: usize) -> Result<Slot> {
        let slot = self.acquire()?;
        for (column, src) in self.columns.iter_mut().zip(columns) {
            column.copy_row(slot, src, row)?;
        }
        Ok(slot)
    }

    /// Releases a slot for reuse.
    ///
    /// Returns false, and changes nothing, if the slot is not live.
    pub fn release(&mut self, slot: Slot) -> bool {
        match self.occupied.get_mut(slot) {
            Some(live) if *live => {
                *live = false;
                self.free.push(slot);
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns a borrowed view of the record at `slot`.
    ///
    /// The slot must be live.
    #[must_use]
    pub(crate) fn record(&self, slot: Slot) -> RecordRef<'_> {
        RecordRef::new(self, slot)
    }

    /// Reads a field of the record at `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the field is not declared.
    pub fn get(&self, slot: Slot, field: &str) -> Result<Value> {
        let index = self.layout.index_of(field)?;
        Ok(self.columns[index].get(slot))
    }

    /// Writes a field of the record at `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] or [`Error::SchemaMismatch`].
    pub fn set(&mut self, slot: Slot, field: &str, value: &Value) -> Result<()> {
        let index = self.layout.index_of(field)?;
        self.columns[index].set(field, slot, value)
    }

    /// Reads one field across `slots` into a bulk buffer, in slot order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the field is not declared.
    pub fn gather(&self, field: &str, slots: &[Slot]) -> Result<AttrArray> {
        let index = self.layout.index_of(field)?;
        Ok(self.columns[index].gather(slots))
    }

    /// Writes one field for `slots` from a bulk buffer.
    ///
    /// All checks run before the first write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`], [`Error::SchemaMismatch`], or
    /// [`Error::LengthMismatch`].
    pub fn scatter(&mut self, field: &str, slots: &[Slot], values: &AttrArray) -> Result<()> {
        let index = self.layout.index_of(field)?;
        self.columns[index].scatter(field, slots, values)
    }
}
