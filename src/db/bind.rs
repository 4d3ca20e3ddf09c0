//! Bind / Fill / Fetch Session
//!
//! A [`BindSession`] is the marshalling unit of work for one statement: it
//! owns one native scratch cell per column the table defines, and performs
//! the three dispatcher passes:
//!
//! - **bind**: attach cells to sequential statement parameter (or output)
//!   positions. Entries with no value, or whose declared type does not match
//!   the table definition, are silently skipped — they simply do not
//!   participate in this statement.
//! - **fill**: copy caller-supplied values into the cells, zeroing each cell
//!   first and copying exactly the logical length, never overrunning the
//!   cell's fixed capacity.
//! - **fetch**: the inverse — allocate a fresh value for every column the
//!   table defines (whether or not the caller asked for it), copy the cell's
//!   current bytes into it, and hand ownership to the caller's row.
//!
//! Sessions are created per call and never shared, so concurrent calls
//! against the same table kind each work on their own buffers.

use tracing::trace;

use crate::db::error::{DbError, DbResult};
use crate::db::statement::{NativeCell, NativeType, StatementHandle};
use crate::schema::{ColumnAttr, Row, TableDef, TableKind};
use crate::value::AttrValue;

/// Marshalling state for one statement against one table.
#[derive(Debug)]
pub struct BindSession {
    def: &'static TableDef,
    cells: Vec<NativeCell>,
}

impl BindSession {
    /// Fresh zero-filled scratch cells for every column of the table.
    pub fn new(table: TableKind) -> Self {
        let def = table.def();
        let cells = def
            .columns
            .iter()
            .map(|(_, ty)| NativeCell::zeroed(NativeType::for_attr(*ty)))
            .collect();
        BindSession { def, cells }
    }

    pub fn def(&self) -> &'static TableDef {
        self.def
    }

    /// The scratch cells, in table column order. The statement's fetch path
    /// writes result rows into these.
    pub fn cells_mut(&mut self) -> &mut [NativeCell] {
        &mut self.cells
    }

    /// Whether a row entry participates in statements on this table.
    fn participates(&self, attr: &ColumnAttr) -> bool {
        attr.has_value() && self.def.column_type(attr.name) == Some(attr.attr_type)
    }

    /// Copy every present entry of `attrs` into its scratch cell and bind
    /// the cell to the next sequential input parameter position.
    ///
    /// Fails with [`DbError::BindFailed`] the moment the driver reports an
    /// unrecoverable bind error.
    pub fn bind_inputs<'a, I, S>(&mut self, attrs: I, stmt: &mut S) -> DbResult<u16>
    where
        I: IntoIterator<Item = &'a ColumnAttr>,
        S: StatementHandle + ?Sized,
    {
        let mut position: u16 = 0;
        for attr in attrs {
            if !self.participates(attr) {
                trace!(table = self.def.name, column = %attr.name, "skipping unbound column");
                continue;
            }
            let idx = self
                .def
                .column_index(attr.name)
                .ok_or_else(|| DbError::General(format!("{} lost column {}", self.def.name, attr.name)))?;
            let value = attr.value.as_ref().ok_or_else(|| {
                DbError::General(format!("{}.{} participates without a value", self.def.name, attr.name))
            })?;
            self.cells[idx].write(&value.wire_bytes(), attr.length);
            position += 1;
            stmt.bind_input(position, &self.cells[idx]).map_err(|e| {
                DbError::BindFailed(format!("{}.{} at position {}: {}", self.def.name, attr.name, position, e))
            })?;
        }
        Ok(position)
    }

    /// Bind an output buffer for every column the table defines, in table
    /// column order.
    pub fn bind_outputs<S>(&mut self, stmt: &mut S) -> DbResult<()>
    where
        S: StatementHandle + ?Sized,
    {
        for (i, (name, ty)) in self.def.columns.iter().enumerate() {
            let position = (i + 1) as u16;
            stmt.bind_output(position, NativeType::for_attr(*ty)).map_err(|e| {
                DbError::BindFailed(format!("{}.{} output at position {}: {}", self.def.name, name, position, e))
            })?;
        }
        Ok(())
    }

    /// Copy every present entry of `row` into its scratch cell without
    /// touching the statement. Columns without a value keep their cell's
    /// prior (zeroed) state.
    pub fn fill_row(&mut self, row: &[ColumnAttr]) -> DbResult<()> {
        for attr in row {
            if !self.participates(attr) {
                continue;
            }
            if let (Some(idx), Some(value)) = (self.def.column_index(attr.name), attr.value.as_ref()) {
                self.cells[idx].write(&value.wire_bytes(), attr.length);
            }
        }
        Ok(())
    }

    /// Build one result row from the cells' current bytes.
    ///
    /// Every column the table defines gets a freshly allocated value,
    /// regardless of whether the caller supplied one on input; ownership of
    /// the allocations passes to the returned row.
    pub fn fetch_row(&self) -> DbResult<Row> {
        let mut row = Row::with_capacity(self.def.columns.len());
        for (i, (name, ty)) in self.def.columns.iter().enumerate() {
            let value = AttrValue::from_wire(*ty, self.cells[i].bytes())?;
            let length = value.logical_len();
            row.push(ColumnAttr { name: *name, attr_type: *ty, length, value: Some(value) });
        }
        Ok(row)
    }
}
