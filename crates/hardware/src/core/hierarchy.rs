//! Cache hierarchy composition.
//!
//! The hierarchy owns its levels in order (L1 first) together with the main-memory
//! counters. A request enters at L1; a level forwards to the one below by splitting the
//! level vector, so each level sees exactly the levels beneath it and nothing above.
//! The stream-buffer prefetch unit is attached to whichever level is last.

use tracing::info;

use crate::common::data::Access;
use crate::common::error::{ConfigError, SimError};
use crate::config::SimConfig;
use crate::core::memory::MainMemory;
use crate::core::units::cache::CacheLevel;
use crate::core::units::prefetch::StreamBufferArray;

/// L1, optional L2, and main memory.
#[derive(Clone, Debug)]
pub struct CacheHierarchy {
    levels: Vec<CacheLevel>,
    memory: MainMemory,
}

impl CacheHierarchy {
    /// Builds the hierarchy described by `config`.
    ///
    /// L1 is built when its size is non-zero, and L2 below it when the L2 size is
    /// non-zero. With `prefetch.buffers > 0` the stream buffers go to the last level.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`SimConfig::validate`].
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut levels = Vec::with_capacity(config.level_count());
        if config.l1.is_present() {
            levels.push(CacheLevel::new(
                1,
                config.l1.size,
                config.l1.assoc,
                config.block_size,
            )?);
            if config.l2.is_present() {
                levels.push(CacheLevel::new(
                    2,
                    config.l2.size,
                    config.l2.assoc,
                    config.block_size,
                )?);
            }
        }

        if config.prefetch.is_enabled() {
            if let Some(last) = levels.last_mut() {
                last.attach_stream_buffers(
                    config.prefetch.buffers as usize,
                    config.prefetch.depth as usize,
                );
                info!(
                    level = last.level(),
                    buffers = config.prefetch.buffers,
                    depth = config.prefetch.depth,
                    "stream buffers attached"
                );
            }
        }

        for level in &levels {
            info!(
                level = level.level(),
                size = level.size(),
                assoc = level.assoc(),
                sets = level.sets().len(),
                tag_bits = level.decoder().tag_bits(),
                index_bits = level.decoder().index_bits(),
                offset_bits = level.decoder().offset_bits(),
                "cache level built"
            );
        }

        Ok(Self {
            levels,
            memory: MainMemory::new(),
        })
    }

    /// Issues one request to L1.
    ///
    /// A hierarchy without levels ignores the request.
    ///
    /// # Errors
    ///
    /// Propagates any [`SimError`] raised while servicing the request at any level.
    pub fn execute(&mut self, access: Access) -> Result<(), SimError> {
        match self.levels.split_first_mut() {
            Some((l1, lower)) => l1.execute(access, lower, &mut self.memory),
            None => Ok(()),
        }
    }

    /// All levels, L1 first.
    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    /// Level `n` (1 for L1), if configured.
    pub fn level(&self, n: usize) -> Option<&CacheLevel> {
        n.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    /// The first-level cache, if configured.
    pub fn l1(&self) -> Option<&CacheLevel> {
        self.level(1)
    }

    /// The second-level cache, if configured.
    pub fn l2(&self) -> Option<&CacheLevel> {
        self.level(2)
    }

    /// The level carrying the prefetch unit, if any.
    pub fn prefetch_level(&self) -> Option<&CacheLevel> {
        self.levels.last().filter(|l| l.stream_buffers().is_some())
    }

    /// The prefetch unit, if any.
    pub fn stream_buffers(&self) -> Option<&StreamBufferArray> {
        self.prefetch_level().and_then(CacheLevel::stream_buffers)
    }

    /// Main-memory counters.
    pub const fn memory(&self) -> &MainMemory {
        &self.memory
    }

    /// Blocks moved across the main-memory boundary so far.
    pub const fn memory_traffic(&self) -> u64 {
        self.memory.traffic()
    }
}
