//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides the building blocks shared by every cache level. It includes:
//! 1. **Address Decoding:** Splitting a flat address into tag, index and block offset.
//! 2. **Constants:** The fixed address width of the simulated machine.
//! 3. **Memory Access:** The read/write request type replayed from a trace.
//! 4. **Error Handling:** Configuration, trace and internal-invariant errors.

/// Address decoding (tag/index/offset) and block identifiers.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types for configuration, trace input and simulation.
pub mod error;

pub use addr::{AddressDecoder, BlockId};
pub use constants::ADDRESS_BITS;
pub use data::{Access, AccessType};
pub use error::{ConfigError, SimError, TraceError};
