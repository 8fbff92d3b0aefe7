//! Trace-driven cache hierarchy simulator library.
//!
//! This crate replays a sequence of memory reads and writes through a model of a
//! multi-level cache hierarchy and reports what happened:
//! 1. **Caches:** Set-associative levels with LRU replacement and a write-back,
//!    write-allocate policy (L1, optional L2).
//! 2. **Prefetching:** Stream buffers prefetching next-sequential blocks at the last level.
//! 3. **Memory:** Block-granularity traffic accounting at the main-memory boundary.
//! 4. **Simulation:** Configuration, trace reading, replay, and statistics reporting.
//!
//! The model tracks state transitions only; it does not simulate timing.

/// Common types and constants (address decoding, access types, errors).
pub mod common;
/// Simulator configuration (defaults, geometry, prefetch unit, validation).
pub mod config;
/// Cache hierarchy (levels, sets, stream buffers, main memory).
pub mod core;
/// Trace reader and simulation driver.
pub mod sim;
/// Per-level statistics and reporting.
pub mod stats;

/// Root configuration type; use `SimConfig::default()` or `SimConfig::from_json`.
pub use crate::config::SimConfig;
/// Cache hierarchy; construct with `CacheHierarchy::new`.
pub use crate::core::CacheHierarchy;
/// Simulation driver; owns the configuration and the hierarchy.
pub use crate::sim::Simulator;
