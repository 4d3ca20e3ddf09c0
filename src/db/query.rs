//! SQL Text Construction
//!
//! Builds the parameterized statements the store executes. Predicate order
//! follows the schema's primary-key list insertion order, which is also the
//! order the bind session binds parameters in — the two must never diverge.
//!
//! Point operations use equality on every key; sibling paging replaces the
//! final key's operator with `>` so each page resumes after the previous
//! page's last row.

use std::fmt::Write as _;

use crate::schema::{ColumnName, TableDef};

fn predicate(sql: &mut String, keys: &[ColumnName], page: bool) {
    if keys.is_empty() {
        return;
    }
    sql.push_str(" WHERE ");
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        let op = if page && i == keys.len() - 1 { ">" } else { "=" };
        let _ = write!(sql, "{} {} ?", key.as_str(), op);
    }
}

fn column_list(def: &TableDef) -> String {
    def.columns
        .iter()
        .map(|(c, _)| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn order_by(sql: &mut String, def: &TableDef) {
    sql.push_str(" ORDER BY ");
    let keys = def.primary_keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ");
    sql.push_str(&keys);
}

/// `SELECT <all columns> ... WHERE k1 = ? AND k2 = ?`
pub fn select_one(def: &TableDef, keys: &[ColumnName]) -> String {
    let mut sql = format!("SELECT {} FROM {}", column_list(def), def.name);
    predicate(&mut sql, keys, false);
    sql
}

/// Sibling page: equality on all keys but the last, `>` on the last, ordered
/// by the full primary key, capped at `limit` rows.
pub fn select_bulk(def: &TableDef, keys: &[ColumnName], limit: u32) -> String {
    let mut sql = format!("SELECT {} FROM {}", column_list(def), def.name);
    predicate(&mut sql, keys, true);
    order_by(&mut sql, def);
    let _ = write!(sql, " LIMIT {limit}");
    sql
}

/// `INSERT INTO t (c1, c2, ...) VALUES (?, ?, ...)` over the participating
/// columns only.
pub fn insert(def: &TableDef, cols: &[ColumnName]) -> String {
    let names = cols.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ");
    let marks = vec!["?"; cols.len()].join(", ");
    format!("INSERT INTO {} ({}) VALUES ({})", def.name, names, marks)
}

/// `UPDATE t SET c = ?, ... WHERE k = ? ...`; set parameters bind before key
/// parameters.
pub fn update(def: &TableDef, set_cols: &[ColumnName], keys: &[ColumnName]) -> String {
    let sets = set_cols
        .iter()
        .map(|c| format!("{} = ?", c.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("UPDATE {} SET {}", def.name, sets);
    predicate(&mut sql, keys, false);
    sql
}

/// `DELETE FROM t WHERE ...`
pub fn delete(def: &TableDef, keys: &[ColumnName]) -> String {
    let mut sql = format!("DELETE FROM {}", def.name);
    predicate(&mut sql, keys, false);
    sql
}

/// `SELECT COUNT(*) FROM t WHERE ...`
pub fn count(def: &TableDef, keys: &[ColumnName]) -> String {
    let mut sql = format!("SELECT COUNT(*) FROM {}", def.name);
    predicate(&mut sql, keys, false);
    sql
}
