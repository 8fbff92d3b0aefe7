//! Main memory boundary.
//!
//! Main memory holds no simulated state; it only counts the blocks that cross into
//! it. The counters live here, owned by the hierarchy and threaded through every
//! request as `&mut MainMemory`, instead of as process-wide state.

use serde::Serialize;

/// Block transfers across the main-memory boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MainMemory {
    demand_fetches: u64,
    writebacks: u64,
    prefetch_fetches: u64,
}

impl MainMemory {
    /// Creates a memory with all counters at zero.
    pub const fn new() -> Self {
        Self {
            demand_fetches: 0,
            writebacks: 0,
            prefetch_fetches: 0,
        }
    }

    /// Records a demand fetch of one block.
    #[inline]
    pub const fn fetch_block(&mut self) {
        self.demand_fetches += 1;
    }

    /// Records a dirty block written back by the last cache level.
    #[inline]
    pub const fn write_back_block(&mut self) {
        self.writebacks += 1;
    }

    /// Records `count` blocks fetched into stream buffers.
    #[inline]
    pub const fn prefetch_blocks(&mut self, count: u64) {
        self.prefetch_fetches += count;
    }

    /// Demand fetches that were not served by a stream buffer.
    pub const fn demand_fetches(&self) -> u64 {
        self.demand_fetches
    }

    /// Write-backs that reached main memory.
    pub const fn writebacks(&self) -> u64 {
        self.writebacks
    }

    /// Blocks written into stream buffers.
    pub const fn prefetch_fetches(&self) -> u64 {
        self.prefetch_fetches
    }

    /// Total memory traffic in blocks.
    pub const fn traffic(&self) -> u64 {
        self.demand_fetches + self.writebacks + self.prefetch_fetches
    }
}
