//! Error definitions for the cache simulator.
//!
//! Every anomaly is fatal: the simulator reproduces a deterministic state machine, so
//! nothing is retried or skipped. This module defines:
//! 1. **Configuration Errors:** Geometry that cannot be decoded into address fields,
//!    reported before any access is processed.
//! 2. **Trace Errors:** Malformed trace lines, reported with their line number.
//! 3. **Simulation Errors:** Internal invariant violations, reported with the access
//!    that exposed them.

use std::io;

use thiserror::Error;

use super::data::Access;

/// Invalid simulator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field that must be positive was zero.
    #[error("{field} must be greater than zero")]
    ZeroField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A geometry value used as a shift or divisor is not a power of two.
    #[error("{field} must be a power of two (got {value})")]
    NotPowerOfTwo {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied.
        value: u64,
    },

    /// A configured cache level has zero associativity.
    #[error("L{level} associativity must be greater than zero")]
    ZeroAssociativity {
        /// Level number (1 for L1).
        level: usize,
    },

    /// Cache size is not a whole number of sets.
    #[error("L{level} size {size} is not a multiple of assoc ({assoc}) * block size ({block_size})")]
    Indivisible {
        /// Level number (1 for L1).
        level: usize,
        /// Configured size in bytes.
        size: u64,
        /// Configured associativity.
        assoc: u32,
        /// Configured block size in bytes.
        block_size: u32,
    },

    /// The derived number of sets is not a power of two.
    #[error("L{level} set count {sets} is not a power of two")]
    SetCountNotPowerOfTwo {
        /// Level number (1 for L1).
        level: usize,
        /// Derived number of sets.
        sets: u64,
    },

    /// Index and offset fields do not fit in a simulated address.
    #[error("L{level} needs {bits} index+offset bits, wider than the address")]
    AddressTooNarrow {
        /// Level number (1 for L1).
        level: usize,
        /// Required index + offset bits.
        bits: u32,
    },

    /// A JSON configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// One configuration of a sweep failed validation.
    #[error("sweep entry {index}: {source}")]
    SweepEntry {
        /// Position of the configuration in the expanded sweep.
        index: usize,
        /// Validation failure of that configuration.
        #[source]
        source: Box<ConfigError>,
    },
}

/// Malformed trace input.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The operation character is neither `r` nor `w`.
    #[error("line {line}: unknown request type '{op}'")]
    UnknownOp {
        /// 1-based line number.
        line: usize,
        /// Operation token as read.
        op: String,
    },

    /// The address is not a 32-bit hexadecimal value.
    #[error("line {line}: invalid address '{text}'")]
    BadAddress {
        /// 1-based line number.
        line: usize,
        /// Address token as read.
        text: String,
    },

    /// The line does not consist of exactly an operation and an address.
    #[error("line {line}: expected '<op> <hex-address>', got '{text}'")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Full line as read.
        text: String,
    },

    /// The trace could not be read.
    #[error("trace read failed: {0}")]
    Io(#[from] io::Error),
}

/// Fatal simulation error.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration rejected before simulation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed trace entry.
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    /// The decoded index does not name a set of the level.
    #[error("L{level}: could not find calculated set {index} for request {access}")]
    MissingSet {
        /// Level number (1 for L1).
        level: usize,
        /// Decoded set index.
        index: u32,
        /// Request being serviced.
        access: Access,
    },

    /// Eviction was required but the set holds no valid block.
    #[error("L{level}: set {index} has no eviction victim for request {access}")]
    NoVictim {
        /// Level number (1 for L1).
        level: usize,
        /// Set index.
        index: u32,
        /// Request being serviced.
        access: Access,
    },

    /// The missed block could not be allocated because every slot was still valid.
    #[error("L{level}: set {index} has no free slot for request {access}")]
    NoFreeSlot {
        /// Level number (1 for L1).
        level: usize,
        /// Set index.
        index: u32,
        /// Request being serviced.
        access: Access,
    },
}
