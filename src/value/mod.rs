//! # Column Value Type System
//!
//! This module provides the closed value type system for physical-table
//! columns. Every column a table can declare is one of a small, fixed set of
//! semantic types, and every value is carried in a tagged union so that
//! marshalling code can be exhaustively matched instead of casting through
//! erased pointers.
//!
//! ## Design Decisions
//!
//! - **Closed type set**: unsigned 16/32/64-bit integers, fixed-length byte
//!   arrays drawn from a fixed set of capacities, IPv4 and IPv6 addresses.
//! - **Capacity-bounded byte arrays**: a byte-array value always owns a
//!   buffer of exactly its declared capacity, zero-filled beyond its logical
//!   length. Copy-in never overruns the capacity.
//! - **Text conversion**: integers parse per Rust integer parsing, IPv4 as a
//!   dotted quad (empty string maps to `0.0.0.0`), IPv6 as RFC presentation
//!   format.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Byte-array capacities a table column may declare.
///
/// The set is closed: table definitions must not invent new sizes, and the
/// native buffer layer sizes its scratch cells from this same set.
pub const BYTE_CAPACITIES: &[usize] = &[1, 2, 3, 6, 8, 10, 11, 16, 32, 128, 256, 257, 320];

/// Declared semantic type of one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrType {
    /// Unsigned 16-bit integer
    Uint16,
    /// Unsigned 32-bit integer
    Uint32,
    /// Unsigned 64-bit integer
    Uint64,
    /// Fixed-length byte array; capacity must come from [`BYTE_CAPACITIES`]
    Bytes(usize),
    /// IPv4 address (32-bit, dotted-quad text form)
    Ipv4,
    /// IPv6 address (16 bytes, RFC presentation text form)
    Ipv6,
}

impl AttrType {
    /// Wire capacity of the type in bytes.
    pub fn capacity(&self) -> usize {
        match self {
            AttrType::Uint16 => 2,
            AttrType::Uint32 | AttrType::Ipv4 => 4,
            AttrType::Uint64 => 8,
            AttrType::Bytes(n) => *n,
            AttrType::Ipv6 => 16,
        }
    }

    /// Whether a byte-array capacity is one of the declared sizes.
    pub fn is_valid_capacity(n: usize) -> bool {
        BYTE_CAPACITIES.contains(&n)
    }

    /// Check that a value's variant matches this declared type.
    pub fn matches(&self, value: &AttrValue) -> bool {
        match (self, value) {
            (AttrType::Uint16, AttrValue::Uint16(_)) => true,
            (AttrType::Uint32, AttrValue::Uint32(_)) => true,
            (AttrType::Uint64, AttrValue::Uint64(_)) => true,
            (AttrType::Bytes(n), AttrValue::Bytes(b)) => b.capacity() == *n,
            (AttrType::Ipv4, AttrValue::Ipv4(_)) => true,
            (AttrType::Ipv6, AttrValue::Ipv6(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::Uint16 => write!(f, "uint16"),
            AttrType::Uint32 => write!(f, "uint32"),
            AttrType::Uint64 => write!(f, "uint64"),
            AttrType::Bytes(n) => write!(f, "bytes[{}]", n),
            AttrType::Ipv4 => write!(f, "ipv4"),
            AttrType::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// Error converting text or raw bytes into an [`AttrValue`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Numeric text did not parse for the declared integer width
    #[error("invalid {ty} literal: {text:?}")]
    BadInteger { ty: AttrType, text: String },

    /// IPv4/IPv6 text did not parse
    #[error("invalid {ty} address: {text:?}")]
    BadAddress { ty: AttrType, text: String },

    /// Byte-array capacity is not one of the declared sizes
    #[error("undeclared byte-array capacity: {0}")]
    BadCapacity(usize),

    /// Value variant does not match the column's declared type
    #[error("type mismatch: declared {declared}, value is {actual}")]
    TypeMismatch { declared: AttrType, actual: AttrType },
}

/// A fixed-capacity byte array with a logical length.
///
/// The backing buffer is always exactly `capacity` bytes; bytes past the
/// logical length are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteArray {
    buf: Vec<u8>,
    len: usize,
}

impl ByteArray {
    /// Create a zero-filled array of the given capacity with logical length 0.
    pub fn zeroed(capacity: usize) -> Result<Self, ValueError> {
        if !AttrType::is_valid_capacity(capacity) {
            return Err(ValueError::BadCapacity(capacity));
        }
        Ok(ByteArray { buf: vec![0u8; capacity], len: 0 })
    }

    /// Create an array by copying `data` into a zero-filled buffer.
    ///
    /// At most `capacity` bytes are copied; excess input is truncated.
    pub fn copy_from(capacity: usize, data: &[u8]) -> Result<Self, ValueError> {
        let mut arr = ByteArray::zeroed(capacity)?;
        let n = data.len().min(capacity);
        arr.buf[..n].copy_from_slice(&data[..n]);
        arr.len = n;
        Ok(arr)
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Logical length of the value actually present.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Full zero-padded buffer, `capacity` bytes long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The logical prefix of the buffer.
    pub fn as_value(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Interpret the logical prefix as UTF-8 text, lossily. Trailing NUL
    /// padding (present on fetched fixed-width columns) is stripped.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(self.as_value())
            .trim_end_matches('\0')
            .to_string()
    }
}

/// A single column's value: a tagged union over the closed semantic types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Bytes(ByteArray),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
}

impl AttrValue {
    /// An empty placeholder value for the declared type: zero for integers
    /// and addresses, a zero-filled buffer for byte arrays.
    pub fn empty(ty: AttrType) -> Result<Self, ValueError> {
        Ok(match ty {
            AttrType::Uint16 => AttrValue::Uint16(0),
            AttrType::Uint32 => AttrValue::Uint32(0),
            AttrType::Uint64 => AttrValue::Uint64(0),
            AttrType::Bytes(n) => AttrValue::Bytes(ByteArray::zeroed(n)?),
            AttrType::Ipv4 => AttrValue::Ipv4(Ipv4Addr::UNSPECIFIED),
            AttrType::Ipv6 => AttrValue::Ipv6(Ipv6Addr::UNSPECIFIED),
        })
    }

    /// Parse a value of the declared type from text.
    ///
    /// An empty string is a valid IPv4 literal and maps to `0.0.0.0`; every
    /// other type requires well-formed input.
    pub fn parse(ty: AttrType, text: &str) -> Result<Self, ValueError> {
        match ty {
            AttrType::Uint16 => text
                .parse::<u16>()
                .map(AttrValue::Uint16)
                .map_err(|_| ValueError::BadInteger { ty, text: text.to_string() }),
            AttrType::Uint32 => text
                .parse::<u32>()
                .map(AttrValue::Uint32)
                .map_err(|_| ValueError::BadInteger { ty, text: text.to_string() }),
            AttrType::Uint64 => text
                .parse::<u64>()
                .map(AttrValue::Uint64)
                .map_err(|_| ValueError::BadInteger { ty, text: text.to_string() }),
            AttrType::Bytes(n) => Ok(AttrValue::Bytes(ByteArray::copy_from(n, text.as_bytes())?)),
            AttrType::Ipv4 => {
                if text.is_empty() {
                    return Ok(AttrValue::Ipv4(Ipv4Addr::UNSPECIFIED));
                }
                text.parse::<Ipv4Addr>()
                    .map(AttrValue::Ipv4)
                    .map_err(|_| ValueError::BadAddress { ty, text: text.to_string() })
            }
            AttrType::Ipv6 => text
                .parse::<Ipv6Addr>()
                .map(AttrValue::Ipv6)
                .map_err(|_| ValueError::BadAddress { ty, text: text.to_string() }),
        }
    }

    /// Build a value of the declared type from raw wire bytes.
    ///
    /// Integer types read their fixed-width little-endian prefix; short
    /// input is zero-extended.
    pub fn from_wire(ty: AttrType, bytes: &[u8]) -> Result<Self, ValueError> {
        fn widen(bytes: &[u8], width: usize) -> u64 {
            let mut buf = [0u8; 8];
            let n = bytes.len().min(width);
            buf[..n].copy_from_slice(&bytes[..n]);
            u64::from_le_bytes(buf)
        }
        Ok(match ty {
            AttrType::Uint16 => AttrValue::Uint16(widen(bytes, 2) as u16),
            AttrType::Uint32 => AttrValue::Uint32(widen(bytes, 4) as u32),
            AttrType::Uint64 => AttrValue::Uint64(widen(bytes, 8)),
            AttrType::Bytes(n) => AttrValue::Bytes(ByteArray::copy_from(n, bytes)?),
            AttrType::Ipv4 => {
                let mut quad = [0u8; 4];
                let n = bytes.len().min(4);
                quad[..n].copy_from_slice(&bytes[..n]);
                AttrValue::Ipv4(Ipv4Addr::from(quad))
            }
            AttrType::Ipv6 => {
                let mut raw = [0u8; 16];
                let n = bytes.len().min(16);
                raw[..n].copy_from_slice(&bytes[..n]);
                AttrValue::Ipv6(Ipv6Addr::from(raw))
            }
        })
    }

    /// Wire representation: fixed-width little-endian for integers, network
    /// octet order for addresses, the full zero-padded buffer for arrays.
    pub fn wire_bytes(&self) -> Vec<u8> {
        match self {
            AttrValue::Uint16(v) => v.to_le_bytes().to_vec(),
            AttrValue::Uint32(v) => v.to_le_bytes().to_vec(),
            AttrValue::Uint64(v) => v.to_le_bytes().to_vec(),
            AttrValue::Bytes(b) => b.as_bytes().to_vec(),
            AttrValue::Ipv4(a) => a.octets().to_vec(),
            AttrValue::Ipv6(a) => a.octets().to_vec(),
        }
    }

    /// Logical length of the value: the byte-array logical length, or the
    /// fixed wire width for every other variant.
    pub fn logical_len(&self) -> usize {
        match self {
            AttrValue::Uint16(_) => 2,
            AttrValue::Uint32(_) | AttrValue::Ipv4(_) => 4,
            AttrValue::Uint64(_) => 8,
            AttrValue::Bytes(b) => b.len(),
            AttrValue::Ipv6(_) => 16,
        }
    }

    /// The declared type this value carries.
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::Uint16(_) => AttrType::Uint16,
            AttrValue::Uint32(_) => AttrType::Uint32,
            AttrValue::Uint64(_) => AttrType::Uint64,
            AttrValue::Bytes(b) => AttrType::Bytes(b.capacity()),
            AttrValue::Ipv4(_) => AttrType::Ipv4,
            AttrValue::Ipv6(_) => AttrType::Ipv6,
        }
    }

    /// Text form, matching what [`AttrValue::parse`] accepts.
    pub fn to_text(&self) -> String {
        match self {
            AttrValue::Uint16(v) => v.to_string(),
            AttrValue::Uint32(v) => v.to_string(),
            AttrValue::Uint64(v) => v.to_string(),
            AttrValue::Bytes(b) => b.as_text(),
            AttrValue::Ipv4(a) => a.to_string(),
            AttrValue::Ipv6(a) => a.to_string(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
