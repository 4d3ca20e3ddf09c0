//! Database-Layer Error Types
//!
//! The taxonomy is deliberately flat: every dispatcher returns the first
//! unrecoverable failure immediately. The only retry site in the crate is
//! the bulk-pagination reader, and it retries only `RecordNotFound`.
//! Connection errors are never retried at this layer.

use thiserror::Error;

use crate::value::ValueError;

/// Database-layer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// A native parameter or output bind call failed
    #[error("parameter bind failed: {0}")]
    BindFailed(String),

    /// The connection to the database is unusable
    #[error("database connection error: {0}")]
    Connection(String),

    /// No row matched the key predicate
    #[error("record not found")]
    RecordNotFound,

    /// A row with the same key already exists
    #[error("record already exists")]
    RecordExists,

    /// Driver/SQL failure with its SQLSTATE
    #[error("SQL failure [{state}]: {message}")]
    Sql { state: String, message: String },

    /// Value conversion failed while marshalling
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Residual bucket
    #[error("{0}")]
    General(String),
}

/// Result type for database-layer operations
pub type DbResult<T> = Result<T, DbError>;

/// Map a driver SQLSTATE into the error taxonomy.
///
/// The table is fixed configuration data; states not listed fall into the
/// residual `Sql` bucket so the original state is preserved for logs.
pub fn from_sqlstate(state: &str, message: &str) -> DbError {
    match state {
        // Connection-class states
        "08000" | "08001" | "08003" | "08004" | "08007" | "08S01" | "HYT00" | "HYT01" => {
            DbError::Connection(format!("[{state}] {message}"))
        }
        // Integrity violations: duplicate key
        "23000" | "23505" => DbError::RecordExists,
        // No data
        "02000" => DbError::RecordNotFound,
        _ => DbError::Sql { state: state.to_string(), message: message.to_string() },
    }
}
