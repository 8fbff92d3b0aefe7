//! Design-Space Sweep.
//!
//! Replays one trace through many cache configurations. The trace is read once and
//! every configuration runs on a fresh hierarchy, so results depend only on the
//! configuration and are directly comparable.

use std::io::BufRead;

use tracing::info;

use crate::common::data::Access;
use crate::common::error::{ConfigError, SimError};
use crate::config::{SimConfig, SweepPlan};
use crate::sim::simulator::Simulator;
use crate::sim::trace::TraceReader;
use crate::stats::SimReport;

/// A validated list of configurations.
#[derive(Debug, Clone)]
pub struct Sweep {
    configs: Vec<SimConfig>,
}

impl Sweep {
    /// Validates every configuration before any of them runs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SweepEntry`] naming the first invalid configuration.
    pub fn new(configs: Vec<SimConfig>) -> Result<Self, ConfigError> {
        for (index, config) in configs.iter().enumerate() {
            config
                .validate()
                .map_err(|source| ConfigError::SweepEntry {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(Self { configs })
    }

    /// Parses, expands and validates a sweep document (see [`SweepPlan`]).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for a malformed document and
    /// [`ConfigError::SweepEntry`] for an invalid configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::new(SweepPlan::from_json(json)?.expand())
    }

    /// Configurations in run order.
    pub fn configs(&self) -> &[SimConfig] {
        &self.configs
    }

    /// Runs `accesses` through every configuration.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SimError`] of any run.
    pub fn run(&self, accesses: &[Access]) -> Result<Vec<SimReport>, SimError> {
        self.configs
            .iter()
            .enumerate()
            .map(|(index, config)| {
                let mut sim = Simulator::new(config.clone())?;
                for &access in accesses {
                    sim.step(access)?;
                }
                info!(
                    index,
                    memory_traffic = sim.hierarchy().memory_traffic(),
                    "sweep entry complete"
                );
                Ok(sim.report())
            })
            .collect()
    }

    /// Reads the whole trace, then runs it through every configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Trace`] for malformed input, before any configuration
    /// runs, and any error from [`Sweep::run`].
    pub fn run_trace<R: BufRead>(&self, trace: TraceReader<R>) -> Result<Vec<SimReport>, SimError> {
        let accesses = trace.collect::<Result<Vec<_>, _>>()?;
        info!(
            configs = self.configs.len(),
            accesses = accesses.len(),
            "sweep starting"
        );
        self.run(&accesses)
    }
}
