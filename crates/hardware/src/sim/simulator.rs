//! Simulator: owns the configuration and the cache hierarchy side-by-side.
//!
//! The driver replays requests strictly in order. Each request, including every
//! level it propagates through, is complete before the next one is read.

use std::io::BufRead;

use tracing::info;

use crate::common::data::Access;
use crate::common::error::SimError;
use crate::config::SimConfig;
use crate::core::hierarchy::CacheHierarchy;
use crate::sim::trace::TraceReader;
use crate::stats::SimReport;

/// Top-level simulator: configuration + cache hierarchy.
#[derive(Debug)]
pub struct Simulator {
    config: SimConfig,
    hierarchy: CacheHierarchy,
    accesses: u64,
}

impl Simulator {
    /// Validates `config` and builds a fresh hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] before any request is processed.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let hierarchy = CacheHierarchy::new(&config)?;
        Ok(Self {
            config,
            hierarchy,
            accesses: 0,
        })
    }

    /// Executes one request.
    ///
    /// # Errors
    ///
    /// Propagates internal invariant violations from the hierarchy.
    pub fn step(&mut self, access: Access) -> Result<(), SimError> {
        self.accesses += 1;
        self.hierarchy.execute(access)
    }

    /// Replays a whole trace, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Trace`] for malformed input and any error from
    /// [`Simulator::step`]. Statistics gathered before the error are not meaningful.
    pub fn run<R: BufRead>(&mut self, trace: TraceReader<R>) -> Result<(), SimError> {
        for access in trace {
            self.step(access?)?;
        }
        info!(
            accesses = self.accesses,
            memory_traffic = self.hierarchy.memory_traffic(),
            "trace complete"
        );
        Ok(())
    }

    /// Configuration of the run.
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The simulated hierarchy.
    pub const fn hierarchy(&self) -> &CacheHierarchy {
        &self.hierarchy
    }

    /// Requests executed so far.
    pub const fn accesses(&self) -> u64 {
        self.accesses
    }

    /// Serializable snapshot of the current counters.
    pub fn report(&self) -> SimReport {
        SimReport::new(&self.config, &self.hierarchy, self.accesses)
    }
}
