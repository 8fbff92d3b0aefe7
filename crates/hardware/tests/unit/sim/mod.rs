//! Unit tests for trace reading and the simulation driver.

/// Whole-trace runs, reports and error propagation.
pub mod simulator;
