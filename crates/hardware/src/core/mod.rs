//! Cache hierarchy core.
//!
//! This module contains the per-level cache state machine, the stream-buffer prefetch
//! unit, the main-memory boundary, and the hierarchy that composes them.

/// Cache hierarchy: L1, optional L2, prefetch attachment and request entry point.
pub mod hierarchy;

/// Main-memory traffic accounting.
pub mod memory;

/// Cache levels, sets and the stream-buffer prefetch unit.
pub mod units;

pub use self::hierarchy::CacheHierarchy;
pub use self::memory::MainMemory;
