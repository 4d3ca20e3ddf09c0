//! Database Layer
//!
//! Marshalling and statement execution for the physical tables:
//! - Statement abstraction over the external SQL execution layer
//! - Per-call bind/fill/fetch sessions
//! - SQL text construction with key-ordered predicates
//! - CRUD/bulk store operations
//! - Bounded loosen-and-retry pagination
//! - The flat error taxonomy and the SQLSTATE mapping table

pub mod bind;
pub mod error;
pub mod pagination;
pub mod query;
pub mod statement;
pub mod store;

pub use bind::BindSession;
pub use error::{from_sqlstate, DbError, DbResult};
pub use pagination::{read_siblings, KeyHierarchy};
pub use statement::{Connection, NativeCell, NativeType, StatementHandle};
pub use store::Store;
