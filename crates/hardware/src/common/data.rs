//! Memory Access Types.
//!
//! This module defines the requests that flow through the cache hierarchy.
//! These types are used for the following:
//! 1. **Trace Replay:** Each trace line decodes into one [`Access`].
//! 2. **Request Propagation:** Misses forward a read, evictions forward a write-back.
//! 3. **Statistics Tracking:** Reads and writes are counted separately per level.

use std::fmt;

use serde::Serialize;

use super::constants::{OP_READ, OP_WRITE};

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Data read access.
    ///
    /// Issued by the trace, and by a level forwarding a demand miss to the level below.
    Read,

    /// Data write access.
    ///
    /// Issued by the trace, and by a level writing back a dirty victim to the level below.
    Write,
}

impl AccessType {
    /// Decodes a trace operation character (`r` or `w`).
    ///
    /// # Returns
    ///
    /// `None` for any other character.
    pub const fn from_char(op: char) -> Option<Self> {
        match op {
            OP_READ => Some(Self::Read),
            OP_WRITE => Some(Self::Write),
            _ => None,
        }
    }

    /// Returns the trace operation character for this access type.
    pub const fn as_char(self) -> char {
        match self {
            Self::Read => OP_READ,
            Self::Write => OP_WRITE,
        }
    }

    /// Returns `true` for [`AccessType::Write`].
    #[inline]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

/// A single memory request: an operation and a 32-bit byte address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Access {
    /// Read or write.
    pub op: AccessType,
    /// Byte address of the request.
    pub addr: u32,
}

impl Access {
    /// Creates a read request for `addr`.
    #[inline]
    pub const fn read(addr: u32) -> Self {
        Self {
            op: AccessType::Read,
            addr,
        }
    }

    /// Creates a write request for `addr`.
    #[inline]
    pub const fn write(addr: u32) -> Self {
        Self {
            op: AccessType::Write,
            addr,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x}", self.op.as_char(), self.addr)
    }
}
