//! Statement Execution Abstraction
//!
//! The SQL execution layer is a collaborator, not part of this crate: the
//! store only needs prepare, bind-parameter, bind-output-column, execute and
//! fetch-next-row, expressed over a small set of native wire types. Concrete
//! drivers (and the in-memory backend the test suites use) implement
//! [`Connection`] and [`StatementHandle`].

use crate::db::error::DbResult;
use crate::value::AttrType;

/// Native wire type of one bound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    U16,
    U32,
    U64,
    /// Fixed-capacity character/binary buffer
    Binary(usize),
}

impl NativeType {
    /// Wire representation chosen for a declared semantic type.
    pub fn for_attr(ty: AttrType) -> NativeType {
        match ty {
            AttrType::Uint16 => NativeType::U16,
            AttrType::Uint32 | AttrType::Ipv4 => NativeType::U32,
            AttrType::Uint64 => NativeType::U64,
            AttrType::Bytes(n) => NativeType::Binary(n),
            AttrType::Ipv6 => NativeType::Binary(16),
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            NativeType::U16 => 2,
            NativeType::U32 => 4,
            NativeType::U64 => 8,
            NativeType::Binary(n) => *n,
        }
    }
}

/// One native scratch buffer: the wire bytes for a single column.
///
/// Cells are owned by a [`BindSession`](crate::db::bind::BindSession), one
/// session per logical bind/fill/fetch unit of work. They are never shared
/// across calls, so two concurrent sessions on the same table kind cannot
/// corrupt each other.
#[derive(Debug, Clone)]
pub struct NativeCell {
    ty: NativeType,
    bytes: Vec<u8>,
    /// Logical length indicator (<= capacity)
    len: usize,
}

impl NativeCell {
    /// A zero-filled cell of the type's full capacity.
    pub fn zeroed(ty: NativeType) -> Self {
        NativeCell { ty, bytes: vec![0u8; ty.capacity()], len: 0 }
    }

    pub fn native_type(&self) -> NativeType {
        self.ty
    }

    /// Zero the buffer, then copy in at most `capacity` bytes.
    pub fn write(&mut self, data: &[u8], logical_len: usize) {
        self.bytes.fill(0);
        let n = data.len().min(self.bytes.len());
        self.bytes[..n].copy_from_slice(&data[..n]);
        self.len = logical_len.min(self.bytes.len());
    }

    /// Full zero-padded buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Overwrite from a fetched row buffer (driver side).
    pub fn load(&mut self, data: &[u8]) {
        self.write(data, data.len());
    }
}

/// A prepared statement.
///
/// Parameter and output positions are 1-based and sequential, matching the
/// order the bind session traverses the row.
pub trait StatementHandle {
    /// Bind the cell's current contents to the next input parameter slot.
    fn bind_input(&mut self, position: u16, cell: &NativeCell) -> DbResult<()>;

    /// Bind an output buffer of the given type at the position.
    fn bind_output(&mut self, position: u16, ty: NativeType) -> DbResult<()>;

    /// Execute the statement; returns the affected-row count for DML.
    fn execute(&mut self) -> DbResult<u64>;

    /// Fetch the next result row into the bound output cells.
    /// Returns `false` when the result set is exhausted.
    fn fetch(&mut self, out: &mut [NativeCell]) -> DbResult<bool>;
}

/// A database connection able to prepare statements.
///
/// One connection serves one worker; connections are not shared between
/// threads. Embedders wanting shared access wrap the connection in their own
/// lock.
pub trait Connection {
    type Stmt: StatementHandle;

    fn prepare(&mut self, sql: &str) -> DbResult<Self::Stmt>;
}
