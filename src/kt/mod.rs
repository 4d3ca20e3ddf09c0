//! Key-Type Managers
//!
//! A key type is an enumerated kind of managed network entity (link,
//! controller, domain, ...) mapped onto one or more physical tables. Each
//! manager owns the syntax/semantic validation and the CRUD/bulk flows for
//! its key type, and maps every database-layer failure onto the small set of
//! caller-facing result codes. Validation failures are distinguished from
//! storage failures: the former never reach the store.

pub mod link;

use thiserror::Error;

use crate::db::DbError;
use crate::value::ValueError;

pub use link::{LinkKey, LinkManager, LinkOperStatus, LinkRecord, LinkSiblingFilter, LinkSpec};

/// Syntax/semantic validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required key field: {0}")]
    MissingKey(&'static str),

    #[error("field {field} exceeds {max} bytes")]
    TooLong { field: &'static str, max: usize },

    #[error("field {field} contains characters outside the identifier set")]
    BadIdentifier { field: &'static str },

    #[error("field {field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: u64 },
}

/// Caller-facing result codes for key-type operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    #[error("bad request: {0}")]
    BadRequest(#[from] ValidationError),

    #[error("no such instance")]
    NoSuchInstance,

    #[error("instance already exists")]
    InstanceExists,

    #[error("database access error: {0}")]
    DbAccess(String),

    #[error("{0}")]
    General(String),
}

impl From<DbError> for OpError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Connection(msg) => OpError::DbAccess(msg),
            DbError::RecordNotFound => OpError::NoSuchInstance,
            DbError::RecordExists => OpError::InstanceExists,
            other => OpError::General(other.to_string()),
        }
    }
}

impl From<ValueError> for OpError {
    fn from(err: ValueError) -> Self {
        OpError::General(err.to_string())
    }
}

/// Result type for key-type operations.
pub type OpResult<T> = Result<T, OpError>;
