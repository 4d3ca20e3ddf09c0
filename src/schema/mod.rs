//! # Generic Table-Schema Containers
//!
//! This module provides the generic containers a caller fills to describe one
//! table's worth of work for one database call:
//!
//! - [`ColumnAttr`] — one column occurrence in one row: its name, declared
//!   type, logical length, and an optional owned value.
//! - [`TableSchema`] — the table identifier, the ordered primary-key column
//!   list, and one or more rows of `ColumnAttr`.
//!
//! Ownership is plain Rust ownership: values live inside their `ColumnAttr`,
//! rows inside their schema, and everything is released exactly once when the
//! schema drops.
//!
//! Primary-key order is meaningful. It determines the order in which the
//! query layer emits predicates and binds parameters, and the pagination
//! layer pops keys from the back of the list to progressively loosen a
//! partial-key bulk read.

pub mod fill;
pub mod tables;

use serde::{Deserialize, Serialize};

pub use fill::{
    effective_flag, fill_attr, fill_attr_decided, fill_attr_text, fill_decision, FillOutcome,
    Operation, ValidFlag,
};
pub use tables::{ColumnName, TableDef, TableKind, ALL_TABLES};

use crate::value::{AttrType, AttrValue, ValueError};

/// One row: the table's column entries in statement order.
pub type Row = Vec<ColumnAttr>;

/// Row-existence result of the caller-visible existence-check path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowExistence {
    /// No existence check has run for this schema
    #[default]
    Unknown,
    Exists,
    NotExists,
}

/// One column occurrence in one row.
///
/// Invariant: when `value` is present, its variant matches `attr_type`.
/// `None` means no value was supplied or fetched for this column in this
/// call, and the bind path skips the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAttr {
    pub name: ColumnName,
    pub attr_type: AttrType,
    /// Logical length of the value actually present (<= declared capacity)
    pub length: usize,
    pub value: Option<AttrValue>,
}

impl ColumnAttr {
    /// An entry with no value; the bind path treats it as not participating.
    pub fn absent(name: ColumnName, attr_type: AttrType) -> Self {
        ColumnAttr { name, attr_type, length: 0, value: None }
    }

    /// An entry carrying a value. Fails if the value's variant does not
    /// match the declared type.
    pub fn with_value(name: ColumnName, attr_type: AttrType, value: AttrValue) -> Result<Self, ValueError> {
        if !attr_type.matches(&value) {
            return Err(ValueError::TypeMismatch { declared: attr_type, actual: value.attr_type() });
        }
        let length = value.logical_len();
        Ok(ColumnAttr { name, attr_type, length, value: Some(value) })
    }

    /// An entry carrying the type's empty placeholder value.
    pub fn empty(name: ColumnName, attr_type: AttrType) -> Result<Self, ValueError> {
        let value = AttrValue::empty(attr_type)?;
        Ok(ColumnAttr { name, attr_type, length: 0, value: Some(value) })
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// One table's worth of work for one database call.
#[derive(Debug, Clone, Default)]
pub struct TableSchema {
    table: Option<TableKind>,
    primary_keys: Vec<ColumnName>,
    rows: Vec<Row>,
    row_status: RowExistence,
}

impl TableSchema {
    /// An empty schema; the caller populates it field by field.
    pub fn new(table: TableKind) -> Self {
        TableSchema {
            table: Some(table),
            primary_keys: Vec::new(),
            rows: Vec::new(),
            row_status: RowExistence::Unknown,
        }
    }

    pub fn table(&self) -> Option<TableKind> {
        self.table
    }

    /// The table's static definition, if the schema was given a table.
    pub fn def(&self) -> Option<&'static TableDef> {
        self.table.map(TableKind::def)
    }

    pub fn primary_keys(&self) -> &[ColumnName] {
        &self.primary_keys
    }

    pub fn push_primary_key(&mut self, name: ColumnName) {
        self.primary_keys.push(name);
    }

    pub fn set_primary_keys(&mut self, keys: Vec<ColumnName>) {
        self.primary_keys = keys;
    }

    /// Drop the least-significant primary key. Returns the popped column.
    pub fn pop_primary_key(&mut self) -> Option<ColumnName> {
        self.primary_keys.pop()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Replace all rows, e.g. with the results of a fetch.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    pub fn row_status(&self) -> RowExistence {
        self.row_status
    }

    pub fn set_row_status(&mut self, status: RowExistence) {
        self.row_status = status;
    }

    /// Count of allocated (present) values across all rows.
    pub fn allocated_values(&self) -> usize {
        self.rows.iter().flatten().filter(|a| a.has_value()).count()
    }

    /// Reorder every row so primary-key columns come first (see
    /// [`reorder_col_attrs`]).
    pub fn reorder_rows(&mut self) {
        for row in &mut self.rows {
            reorder_col_attrs(&self.primary_keys, row);
        }
    }
}

/// Stably move each primary-key column, in reverse key-list order, to the
/// front of the row.
///
/// The result places all primary keys first, in exactly the caller's key
/// order, with the remaining columns keeping their original relative order.
/// The statement's parameter order must match the key predicate order the
/// query layer generates, which is why the keys migrate to the front.
pub fn reorder_col_attrs(primary_keys: &[ColumnName], row: &mut Row) {
    for key in primary_keys.iter().rev() {
        if let Some(pos) = row.iter().position(|attr| attr.name == *key) {
            let attr = row.remove(pos);
            row.insert(0, attr);
        }
    }
}
