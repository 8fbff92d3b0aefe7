//! Global System Constants.
//!
//! The simulated machine has a single, fixed address width shared by every cache
//! level and by main memory.

/// Width of a simulated address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Trace operation character for a read request.
pub const OP_READ: char = 'r';

/// Trace operation character for a write request.
pub const OP_WRITE: char = 'w';
