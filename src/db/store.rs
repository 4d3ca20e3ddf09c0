//! Store Operations
//!
//! The store is the sole consumer of the statement traits: every CRUD, bulk
//! and existence operation takes a populated [`TableSchema`], marshals it
//! through a fresh [`BindSession`], and executes one statement. The schema
//! is also the result carrier — fetch paths replace or append rows, and the
//! caller reads them back out of the same schema.
//!
//! Failure policy: the first unrecoverable error returns immediately; the
//! store never retries. The pagination module layers the one sanctioned
//! retry loop on top of [`Store::get_bulk_rows`].

use tracing::debug;

use crate::db::bind::BindSession;
use crate::db::error::{DbError, DbResult};
use crate::db::query;
use crate::db::statement::{Connection, NativeCell, NativeType, StatementHandle};
use crate::schema::{ColumnAttr, ColumnName, RowExistence, TableSchema};

/// Database store over a single connection.
///
/// One store serves one worker. Embedders needing shared access wrap the
/// store in their own lock; nothing here is internally synchronized.
#[derive(Debug)]
pub struct Store<C: Connection> {
    conn: C,
}

impl<C: Connection> Store<C> {
    pub fn new(conn: C) -> Self {
        Store { conn }
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Insert the schema's single row.
    pub fn create_row(&mut self, schema: &mut TableSchema) -> DbResult<()> {
        let table = schema.table().ok_or_else(no_table)?;
        schema.reorder_rows();
        let row = first_row(schema)?.clone();
        let mut session = BindSession::new(table);

        let cols: Vec<ColumnName> = row
            .iter()
            .filter(|a| a.has_value() && session.def().column_type(a.name) == Some(a.attr_type))
            .map(|a| a.name)
            .collect();
        let sql = query::insert(session.def(), &cols);
        debug!(table = session.def().name, %sql, "create_row");

        let mut stmt = self.conn.prepare(&sql)?;
        session.bind_inputs(row.iter(), &mut stmt)?;
        stmt.execute()?;
        Ok(())
    }

    /// Update the schema's single row: non-key participating columns are
    /// set, key columns form the predicate. Zero affected rows maps to
    /// [`DbError::RecordNotFound`].
    pub fn update_row(&mut self, schema: &mut TableSchema) -> DbResult<()> {
        let table = schema.table().ok_or_else(no_table)?;
        let keys = schema.primary_keys().to_vec();
        let row = first_row(schema)?.clone();
        let mut session = BindSession::new(table);

        let set_cols: Vec<ColumnName> = row
            .iter()
            .filter(|a| {
                a.has_value()
                    && !keys.contains(&a.name)
                    && session.def().column_type(a.name) == Some(a.attr_type)
            })
            .map(|a| a.name)
            .collect();
        if set_cols.is_empty() {
            return Err(DbError::General("update with no settable columns".into()));
        }
        let sql = query::update(session.def(), &set_cols, &keys);
        debug!(table = session.def().name, %sql, "update_row");

        let mut stmt = self.conn.prepare(&sql)?;
        // Set parameters bind before key parameters, matching the SQL shape.
        let set_attrs = row.iter().filter(|a| set_cols.contains(&a.name));
        let key_attrs = key_attrs_in_order(&row, &keys)?;
        session.bind_inputs(set_attrs.chain(key_attrs), &mut stmt)?;
        if stmt.execute()? == 0 {
            return Err(DbError::RecordNotFound);
        }
        Ok(())
    }

    /// Delete by the schema's key predicate. Zero affected rows maps to
    /// [`DbError::RecordNotFound`].
    pub fn delete_row(&mut self, schema: &mut TableSchema) -> DbResult<()> {
        let affected = self.delete_internal(schema)?;
        if affected == 0 {
            return Err(DbError::RecordNotFound);
        }
        Ok(())
    }

    /// Delete by key predicate without reporting a missing row.
    pub fn clear_rows(&mut self, schema: &mut TableSchema) -> DbResult<u64> {
        self.delete_internal(schema)
    }

    fn delete_internal(&mut self, schema: &mut TableSchema) -> DbResult<u64> {
        let table = schema.table().ok_or_else(no_table)?;
        let keys = schema.primary_keys().to_vec();
        let row = first_row(schema)?.clone();
        let mut session = BindSession::new(table);
        let sql = query::delete(session.def(), &keys);
        debug!(table = session.def().name, %sql, "delete");

        let mut stmt = self.conn.prepare(&sql)?;
        session.bind_inputs(key_attrs_in_order(&row, &keys)?, &mut stmt)?;
        stmt.execute()
    }

    /// Read one row by full key. On success the schema's rows are replaced
    /// with the single fetched row, every column freshly allocated.
    pub fn get_one_row(&mut self, schema: &mut TableSchema) -> DbResult<()> {
        let table = schema.table().ok_or_else(no_table)?;
        schema.reorder_rows();
        let keys = schema.primary_keys().to_vec();
        let row = first_row(schema)?.clone();
        let mut session = BindSession::new(table);
        let sql = query::select_one(session.def(), &keys);
        debug!(table = session.def().name, %sql, "get_one_row");

        let mut stmt = self.conn.prepare(&sql)?;
        session.bind_inputs(key_attrs_in_order(&row, &keys)?, &mut stmt)?;
        session.bind_outputs(&mut stmt)?;
        stmt.execute()?;
        if !stmt.fetch(session.cells_mut())? {
            return Err(DbError::RecordNotFound);
        }
        let fetched = session.fetch_row()?;
        schema.set_rows(vec![fetched]);
        Ok(())
    }

    /// Read up to `max_rows` sibling rows after the schema's key prefix,
    /// appending each fetched row to the schema. Returns the number of rows
    /// fetched; zero maps to [`DbError::RecordNotFound`].
    pub fn get_bulk_rows(&mut self, schema: &mut TableSchema, max_rows: u32) -> DbResult<u32> {
        let table = schema.table().ok_or_else(no_table)?;
        let keys = schema.primary_keys().to_vec();
        let row = first_row(schema)?.clone();
        let mut session = BindSession::new(table);
        let sql = query::select_bulk(session.def(), &keys, max_rows);
        debug!(table = session.def().name, %sql, max_rows, "get_bulk_rows");

        let mut stmt = self.conn.prepare(&sql)?;
        session.bind_inputs(key_attrs_in_order(&row, &keys)?, &mut stmt)?;
        session.bind_outputs(&mut stmt)?;
        stmt.execute()?;

        let mut fetched = 0u32;
        while fetched < max_rows && stmt.fetch(session.cells_mut())? {
            schema.push_row(session.fetch_row()?);
            fetched += 1;
        }
        if fetched == 0 {
            return Err(DbError::RecordNotFound);
        }
        Ok(fetched)
    }

    /// Existence check; records the tri-state result on the schema.
    pub fn is_row_exists(&mut self, schema: &mut TableSchema) -> DbResult<bool> {
        schema.set_row_status(RowExistence::Unknown);
        let count = self.get_row_count(schema)?;
        let exists = count > 0;
        schema.set_row_status(if exists { RowExistence::Exists } else { RowExistence::NotExists });
        Ok(exists)
    }

    /// Count rows matching the schema's key predicate.
    pub fn get_row_count(&mut self, schema: &mut TableSchema) -> DbResult<u64> {
        let table = schema.table().ok_or_else(no_table)?;
        let keys = schema.primary_keys().to_vec();
        let row = first_row(schema)?.clone();
        let mut session = BindSession::new(table);
        let sql = query::count(session.def(), &keys);
        debug!(table = session.def().name, %sql, "get_row_count");

        let mut stmt = self.conn.prepare(&sql)?;
        session.bind_inputs(key_attrs_in_order(&row, &keys)?, &mut stmt)?;
        stmt.bind_output(1, NativeType::U64)?;
        stmt.execute()?;
        let mut cell = [NativeCell::zeroed(NativeType::U64)];
        if !stmt.fetch(&mut cell)? {
            return Ok(0);
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&cell[0].bytes()[..8]);
        Ok(u64::from_le_bytes(raw))
    }
}

fn no_table() -> DbError {
    DbError::General("schema has no table".into())
}

fn first_row(schema: &TableSchema) -> DbResult<&Vec<ColumnAttr>> {
    schema
        .rows()
        .first()
        .ok_or_else(|| DbError::General("schema has no rows".into()))
}

/// The key attributes of `row`, in exactly the predicate order `keys` gives.
fn key_attrs_in_order<'a>(
    row: &'a [ColumnAttr],
    keys: &[ColumnName],
) -> DbResult<Vec<&'a ColumnAttr>> {
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let attr = row
            .iter()
            .find(|a| a.name == *key && a.has_value())
            .ok_or_else(|| DbError::General(format!("missing value for key column {key}")))?;
        out.push(attr);
    }
    Ok(out)
}
