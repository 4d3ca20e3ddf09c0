//! # TopoStore
//!
//! Persistence layer for a physical-topology controller: generic
//! row-attribute marshalling between typed in-memory values and a prepared-
//! statement SQL backend, plus the key-type managers built on top of it.
//!
//! ## Architecture
//!
//! ```text
//! Key-Type Managers (kt)        validation, CRUD flows, result codes
//!     ↓
//! Schema Containers (schema)    ColumnAttr / TableSchema, fill policy
//!     ↓
//! Marshalling + Store (db)      bind/fetch dispatch, SQL text, pagination
//!     ↓
//! StatementHandle / Connection  black-box prepared-statement backend
//! ```
//!
//! ## Design Decisions
//!
//! - **Tagged values, not erasure**: every column value is an [`value::AttrValue`]
//!   variant; type confusion is unrepresentable.
//! - **Per-call scratch**: native bind buffers live in a [`db::BindSession`]
//!   owned by the operation, never in shared state.
//! - **Declared retry order**: sibling pagination loosens keys per an explicit
//!   [`db::KeyHierarchy`], not by blind popping.
//! - **Flat error taxonomy**: the store speaks [`db::DbError`], managers map it
//!   onto the caller-facing [`kt::OpError`] codes.

pub mod config;
pub mod db;
pub mod kt;
pub mod logging;
pub mod schema;
pub mod value;

pub use config::Config;
pub use db::{BindSession, Connection, DbError, DbResult, KeyHierarchy, StatementHandle, Store};
pub use kt::{LinkKey, LinkManager, LinkRecord, LinkSpec, OpError, OpResult};
pub use schema::{ColumnAttr, ColumnName, TableKind, TableSchema, ValidFlag};
pub use value::{AttrType, AttrValue};
