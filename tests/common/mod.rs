//! Shared in-memory statement backend for the integration suites.
//!
//! Implements the store's `Connection` / `StatementHandle` traits over plain
//! vectors of wire rows, interpreting the small fixed set of SQL shapes the
//! store emits. Rows are stored full-width in table column order, exactly as
//! they cross the bind boundary, so predicate evaluation is byte comparison
//! on zero-padded buffers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use topostore::db::{Connection, DbError, DbResult, NativeCell, NativeType, StatementHandle};
use topostore::schema::tables::{TableDef, ALL_TABLES};
use topostore::TableKind;

type WireRow = Vec<Vec<u8>>;

struct Shared {
    tables: HashMap<&'static str, Vec<WireRow>>,
    prepared: Vec<String>,
}

/// Cloneable handle to one in-memory database.
#[derive(Clone)]
pub struct MemoryDb {
    shared: Rc<RefCell<Shared>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        let tables = ALL_TABLES.iter().map(|k| (k.def().name, Vec::new())).collect();
        MemoryDb { shared: Rc::new(RefCell::new(Shared { tables, prepared: Vec::new() })) }
    }

    /// Every SQL text prepared so far, in order.
    pub fn prepared(&self) -> Vec<String> {
        self.shared.borrow().prepared.clone()
    }

    pub fn prepared_count(&self) -> usize {
        self.shared.borrow().prepared.len()
    }

    pub fn row_count(&self, table: TableKind) -> usize {
        self.shared.borrow().tables[table.def().name].len()
    }

    /// Insert one full-width wire row directly, bypassing the store.
    pub fn insert_raw(&self, table: TableKind, row: WireRow) {
        let def = table.def();
        assert_eq!(row.len(), def.columns.len(), "{} row width", def.name);
        let mut shared = self.shared.borrow_mut();
        shared.tables.get_mut(def.name).expect("known table").push(row);
    }

    pub fn rows(&self, table: TableKind) -> Vec<WireRow> {
        self.shared.borrow().tables[table.def().name].clone()
    }
}

impl Connection for MemoryDb {
    type Stmt = MemoryStmt;

    fn prepare(&mut self, sql: &str) -> DbResult<Self::Stmt> {
        self.shared.borrow_mut().prepared.push(sql.to_string());
        Ok(MemoryStmt {
            shared: Rc::clone(&self.shared),
            sql: sql.to_string(),
            inputs: Vec::new(),
            results: VecDeque::new(),
        })
    }
}

/// Backend whose connection drops after a fixed number of statements.
///
/// Delegates to an inner [`MemoryDb`] until the budget is spent, then every
/// further `prepare` fails with [`DbError::Connection`]. Failed prepares are
/// not recorded, so `prepared_count` on the inner handle reflects only the
/// statements that actually ran.
pub struct DroppingDb {
    inner: MemoryDb,
    statements_left: usize,
}

impl DroppingDb {
    pub fn new(inner: MemoryDb, statements_before_drop: usize) -> Self {
        DroppingDb { inner, statements_left: statements_before_drop }
    }
}

impl Connection for DroppingDb {
    type Stmt = MemoryStmt;

    fn prepare(&mut self, sql: &str) -> DbResult<Self::Stmt> {
        if self.statements_left == 0 {
            return Err(DbError::Connection("connection lost".into()));
        }
        self.statements_left -= 1;
        self.inner.prepare(sql)
    }
}

pub struct MemoryStmt {
    shared: Rc<RefCell<Shared>>,
    sql: String,
    inputs: Vec<Vec<u8>>,
    results: VecDeque<WireRow>,
}

impl StatementHandle for MemoryStmt {
    fn bind_input(&mut self, position: u16, cell: &NativeCell) -> DbResult<()> {
        // Positions arrive sequentially; capture the cell's bytes now, the
        // session reuses the buffer for later columns of the same type.
        assert_eq!(position as usize, self.inputs.len() + 1, "non-sequential bind");
        self.inputs.push(cell.bytes().to_vec());
        Ok(())
    }

    fn bind_output(&mut self, _position: u16, _ty: NativeType) -> DbResult<()> {
        Ok(())
    }

    fn execute(&mut self) -> DbResult<u64> {
        let sql = self.sql.clone();
        if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
            self.run_insert(rest)
        } else if let Some(rest) = sql.strip_prefix("UPDATE ") {
            self.run_update(rest)
        } else if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
            self.run_delete(rest)
        } else if let Some(rest) = sql.strip_prefix("SELECT COUNT(*) FROM ") {
            self.run_count(rest)
        } else if sql.starts_with("SELECT ") {
            self.run_select(&sql)
        } else {
            Err(DbError::General(format!("unsupported statement: {sql}")))
        }
    }

    fn fetch(&mut self, out: &mut [NativeCell]) -> DbResult<bool> {
        match self.results.pop_front() {
            Some(row) => {
                for (cell, bytes) in out.iter_mut().zip(row) {
                    cell.load(&bytes);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// One parsed predicate clause: column index, and whether the operator is
/// `>` (sibling paging) instead of `=`.
struct Clause {
    col: usize,
    greater: bool,
}

fn def_by_name(name: &str) -> &'static TableDef {
    ALL_TABLES
        .iter()
        .map(|k| k.def())
        .find(|d| d.name == name)
        .unwrap_or_else(|| panic!("unknown table {name}"))
}

fn column_index(def: &TableDef, name: &str) -> usize {
    def.columns
        .iter()
        .position(|(c, _)| c.as_str() == name)
        .unwrap_or_else(|| panic!("{} has no column {name}", def.name))
}

fn parse_clauses(def: &TableDef, predicate: &str) -> Vec<Clause> {
    if predicate.is_empty() {
        return Vec::new();
    }
    predicate
        .split(" AND ")
        .map(|clause| {
            let (name, greater) = if let Some(n) = clause.strip_suffix(" > ?") {
                (n, true)
            } else if let Some(n) = clause.strip_suffix(" = ?") {
                (n, false)
            } else {
                panic!("bad clause {clause}");
            };
            Clause { col: column_index(def, name), greater }
        })
        .collect()
}

fn matches(row: &WireRow, clauses: &[Clause], inputs: &[Vec<u8>], first_input: usize) -> bool {
    clauses.iter().enumerate().all(|(i, clause)| {
        let bound = &inputs[first_input + i];
        if clause.greater {
            row[clause.col] > *bound
        } else {
            row[clause.col] == *bound
        }
    })
}

impl MemoryStmt {
    fn run_insert(&mut self, rest: &str) -> DbResult<u64> {
        // INSERT INTO t (c1, c2) VALUES (?, ?)
        let open = rest.find(" (").ok_or_else(|| bad(rest))?;
        let table = &rest[..open];
        let close = rest.find(')').ok_or_else(|| bad(rest))?;
        let def = def_by_name(table);
        let cols: Vec<usize> = rest[open + 2..close]
            .split(", ")
            .map(|c| column_index(def, c))
            .collect();
        assert_eq!(cols.len(), self.inputs.len(), "insert arity");

        let mut row: WireRow = def
            .columns
            .iter()
            .map(|(_, ty)| vec![0u8; NativeType::for_attr(*ty).capacity()])
            .collect();
        for (slot, value) in cols.iter().zip(&self.inputs) {
            row[*slot] = value.clone();
        }

        let key_cols: Vec<usize> = def.primary_keys.iter().map(|k| column_index(def, k.as_str())).collect();
        let mut shared = self.shared.borrow_mut();
        let rows = shared.tables.get_mut(def.name).expect("known table");
        if rows.iter().any(|r| key_cols.iter().all(|&k| r[k] == row[k])) {
            return Err(DbError::RecordExists);
        }
        rows.push(row);
        Ok(1)
    }

    fn run_update(&mut self, rest: &str) -> DbResult<u64> {
        // UPDATE t SET c = ?, ... WHERE k = ? ...
        let set_pos = rest.find(" SET ").ok_or_else(|| bad(rest))?;
        let table = &rest[..set_pos];
        let def = def_by_name(table);
        let after_set = &rest[set_pos + 5..];
        let (sets_text, predicate) = match after_set.find(" WHERE ") {
            Some(p) => (&after_set[..p], &after_set[p + 7..]),
            None => (after_set, ""),
        };
        let set_cols: Vec<usize> = sets_text
            .split(", ")
            .map(|s| column_index(def, s.strip_suffix(" = ?").unwrap_or(s)))
            .collect();
        let clauses = parse_clauses(def, predicate);
        assert_eq!(set_cols.len() + clauses.len(), self.inputs.len(), "update arity");

        let mut shared = self.shared.borrow_mut();
        let rows = shared.tables.get_mut(def.name).expect("known table");
        let mut affected = 0u64;
        for row in rows.iter_mut() {
            if matches(row, &clauses, &self.inputs, set_cols.len()) {
                for (i, slot) in set_cols.iter().enumerate() {
                    row[*slot] = self.inputs[i].clone();
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    fn run_delete(&mut self, rest: &str) -> DbResult<u64> {
        let (table, predicate) = match rest.find(" WHERE ") {
            Some(p) => (&rest[..p], &rest[p + 7..]),
            None => (rest, ""),
        };
        let def = def_by_name(table);
        let clauses = parse_clauses(def, predicate);

        let mut shared = self.shared.borrow_mut();
        let rows = shared.tables.get_mut(def.name).expect("known table");
        let before = rows.len();
        rows.retain(|row| !matches(row, &clauses, &self.inputs, 0));
        Ok((before - rows.len()) as u64)
    }

    fn run_count(&mut self, rest: &str) -> DbResult<u64> {
        let (table, predicate) = match rest.find(" WHERE ") {
            Some(p) => (&rest[..p], &rest[p + 7..]),
            None => (rest, ""),
        };
        let def = def_by_name(table);
        let clauses = parse_clauses(def, predicate);
        let shared = self.shared.borrow();
        let count = shared.tables[def.name]
            .iter()
            .filter(|row| matches(row, &clauses, &self.inputs, 0))
            .count() as u64;
        self.results = VecDeque::from(vec![vec![count.to_le_bytes().to_vec()]]);
        Ok(0)
    }

    fn run_select(&mut self, sql: &str) -> DbResult<u64> {
        // SELECT cols FROM t [WHERE ...] [ORDER BY ...] [LIMIT n]
        let from = sql.find(" FROM ").ok_or_else(|| bad(sql))?;
        let mut rest = &sql[from + 6..];
        let mut limit = u32::MAX;
        if let Some(p) = rest.find(" LIMIT ") {
            limit = rest[p + 7..].parse().map_err(|_| bad(sql))?;
            rest = &rest[..p];
        }
        let ordered = if let Some(p) = rest.find(" ORDER BY ") {
            let r = &rest[..p];
            rest = r;
            true
        } else {
            false
        };
        let (table, predicate) = match rest.find(" WHERE ") {
            Some(p) => (&rest[..p], &rest[p + 7..]),
            None => (rest, ""),
        };
        let def = def_by_name(table);
        let clauses = parse_clauses(def, predicate);

        let shared = self.shared.borrow();
        let mut hits: Vec<WireRow> = shared.tables[def.name]
            .iter()
            .filter(|row| matches(row, &clauses, &self.inputs, 0))
            .cloned()
            .collect();
        if ordered {
            let key_cols: Vec<usize> =
                def.primary_keys.iter().map(|k| column_index(def, k.as_str())).collect();
            hits.sort_by(|a, b| {
                key_cols
                    .iter()
                    .map(|&k| (&a[k], &b[k]))
                    .find_map(|(x, y)| (x != y).then(|| x.cmp(y)))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        hits.truncate(limit as usize);
        self.results = hits.into();
        Ok(0)
    }
}

fn bad(sql: &str) -> DbError {
    DbError::General(format!("cannot parse statement: {sql}"))
}

/// Zero-padded fixed-capacity text buffer, as the wire carries it.
pub fn padded(text: &str, capacity: usize) -> Vec<u8> {
    let mut buf = vec![0u8; capacity];
    let n = text.len().min(capacity);
    buf[..n].copy_from_slice(&text.as_bytes()[..n]);
    buf
}

pub fn u16le(v: u16) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

/// Full-width controller row with everything but name and oper status zeroed.
pub fn controller_row(name: &str, oper_status: u16) -> WireRow {
    let def = TableKind::Controller.def();
    def.columns
        .iter()
        .map(|&(col, ty)| match col.as_str() {
            "controller_name" => padded(name, ty.capacity()),
            "oper_status" => u16le(oper_status),
            _ => vec![0u8; NativeType::for_attr(ty).capacity()],
        })
        .collect()
}

/// Full-width link row keyed by the five identifiers.
pub fn link_row(
    controller: &str,
    switch1: &str,
    port1: &str,
    switch2: &str,
    port2: &str,
    description: &str,
    oper_status: u16,
    valid: &str,
) -> WireRow {
    let def = TableKind::Link.def();
    def.columns
        .iter()
        .map(|&(col, ty)| match col.as_str() {
            "controller_name" => padded(controller, ty.capacity()),
            "switch_id1" => padded(switch1, ty.capacity()),
            "port_id1" => padded(port1, ty.capacity()),
            "switch_id2" => padded(switch2, ty.capacity()),
            "port_id2" => padded(port2, ty.capacity()),
            "description" => padded(description, ty.capacity()),
            "oper_status" => u16le(oper_status),
            "valid" => padded(valid, ty.capacity()),
            _ => vec![0u8; NativeType::for_attr(ty).capacity()],
        })
        .collect()
}
