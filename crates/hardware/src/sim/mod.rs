//! Simulation driving and trace input.
//!
//! Provides the reader that turns a memory-access trace into requests, the driver
//! that replays them through a cache hierarchy, and the sweep that replays one trace
//! through many configurations.

/// Memory-access trace reader.
pub mod trace;

/// Simulation driver.
pub mod simulator;

/// Design-space sweep over many configurations.
pub mod sweep;

pub use self::simulator::Simulator;
pub use self::sweep::Sweep;
pub use self::trace::TraceReader;
