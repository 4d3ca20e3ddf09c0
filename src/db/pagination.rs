//! Bounded Loosen-and-Retry Bulk Reads
//!
//! The backing store cannot express "any combination of these optional
//! equality filters" in one parameterized statement, so a sibling read with
//! a partial composite key issues up to N sequential queries, each time
//! popping the least-significant still-present key to loosen the predicate.
//! N is fixed by the key type's declared hierarchy, never by wall clock:
//! the loop is bounded by key count, and connection errors abort it
//! immediately.
//!
//! Successive pages are disjoint by construction: each page resumes strictly
//! after the seed row on the page's final key, and popping that key moves
//! the `>` comparison one column left.

use tracing::{debug, warn};

use crate::db::error::{DbError, DbResult};
use crate::db::statement::Connection;
use crate::db::store::Store;
use crate::schema::{ColumnName, TableSchema};

/// Declared composite-key hierarchy for one key type.
///
/// `columns` is the full key in predicate-significance order; keys are
/// popped from the back. `min_required` keys always remain — the retry
/// order is an explicit property of the key type, not an accident of array
/// position.
#[derive(Debug, Clone, Copy)]
pub struct KeyHierarchy {
    pub columns: &'static [ColumnName],
    pub min_required: usize,
}

impl KeyHierarchy {
    /// Upper bound on queries issued for a read starting with `present`
    /// keys.
    pub fn max_attempts(&self, present: usize) -> usize {
        present.saturating_sub(self.min_required) + 1
    }

    /// Whether a key list is a usable prefix of this hierarchy.
    pub fn accepts(&self, keys: &[ColumnName]) -> bool {
        keys.len() >= self.min_required
            && keys.len() <= self.columns.len()
            && keys.iter().zip(self.columns).all(|(a, b)| a == b)
    }
}

/// Read sibling rows with a partial composite key, loosening the predicate
/// between attempts.
///
/// Terminal states: `Ok(n)` with `n >= 1` accumulated rows appended to the
/// schema, [`DbError::RecordNotFound`] when every granularity came up empty,
/// or the first propagated access error. Connection errors are never
/// retried, and a zero `max_rows` quota is rejected before any query runs.
pub fn read_siblings<C: Connection>(
    store: &mut Store<C>,
    schema: &mut TableSchema,
    hierarchy: &KeyHierarchy,
    max_rows: u32,
) -> DbResult<u32> {
    if max_rows == 0 {
        // A zero quota is a caller bug, not an empty result set.
        return Err(DbError::General("sibling read with a zero row quota".into()));
    }
    if !hierarchy.accepts(schema.primary_keys()) {
        return Err(DbError::General(format!(
            "key list {:?} is not a prefix of the declared hierarchy",
            schema.primary_keys()
        )));
    }

    let mut total = 0u32;
    loop {
        let remaining = max_rows - total;
        if remaining == 0 {
            break;
        }
        match store.get_bulk_rows(schema, remaining) {
            Ok(fetched) => {
                total += fetched;
                debug!(fetched, total, keys = schema.primary_keys().len(), "sibling page");
                if total >= max_rows || !pop_key(schema, hierarchy) {
                    break;
                }
            }
            Err(DbError::RecordNotFound) => {
                if !pop_key(schema, hierarchy) {
                    break;
                }
            }
            Err(err @ DbError::Connection(_)) => {
                warn!(error = %err, "sibling read aborted");
                return Err(err);
            }
            Err(err) => return Err(err),
        }
    }

    if total == 0 {
        return Err(DbError::RecordNotFound);
    }
    Ok(total)
}

fn pop_key(schema: &mut TableSchema, hierarchy: &KeyHierarchy) -> bool {
    if schema.primary_keys().len() > hierarchy.min_required {
        let popped = schema.pop_primary_key();
        debug!(?popped, "loosening sibling predicate");
        true
    } else {
        false
    }
}
