//! Simulation statistics collection and reporting.
//!
//! This module tracks the per-level measurements of a run and formats them. It provides:
//! 1. **Level counters:** Reads, writes, their misses, write-backs, prefetches, miss rate.
//! 2. **Text report:** Configuration banner, cache and stream-buffer contents, and the
//!    lettered measurement table.
//! 3. **JSON report:** A serializable snapshot of the same measurements.
//! 4. **Sweep table:** One row of headline measurements per configuration of a sweep.

use std::io::{self, Write};

use serde::Serialize;

use crate::config::SimConfig;
use crate::core::hierarchy::CacheHierarchy;
use crate::core::memory::MainMemory;
use crate::core::units::cache::CacheLevel;

/// Counters of one cache level.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelStats {
    /// Read requests serviced.
    pub reads: u64,
    /// Read requests that missed in the cache and in the stream buffers.
    pub read_misses: u64,
    /// Write requests serviced.
    pub writes: u64,
    /// Write requests that missed in the cache and in the stream buffers.
    pub write_misses: u64,
    /// Dirty blocks written back to the level below.
    pub writebacks: u64,
    /// Blocks written into this level's stream buffers.
    pub prefetches: u64,
    /// Miss rate as of the last request.
    pub miss_rate: f64,
}

impl LevelStats {
    /// Recomputes `miss_rate` for a level.
    ///
    /// L1 counts every miss over every request. Lower levels count read misses over
    /// reads: their reads are the demand misses of the level above, while their writes
    /// are write-backs that say nothing about the demand stream.
    pub fn update_miss_rate(&mut self, level: usize) {
        let (misses, requests) = if level <= 1 {
            (self.read_misses + self.write_misses, self.reads + self.writes)
        } else {
            (self.read_misses, self.reads)
        };
        self.miss_rate = if requests == 0 {
            0.0
        } else {
            misses as f64 / requests as f64
        };
    }
}

/// Measurements of one level in a [`SimReport`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelReport {
    /// Level number (1 for L1).
    pub level: usize,
    /// Whether the level holds the prefetch unit.
    pub prefetch_unit: bool,
    /// Final counters.
    pub stats: LevelStats,
}

/// Serializable summary of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimReport {
    /// Configuration of the run.
    pub config: SimConfig,
    /// Requests replayed from the trace.
    pub accesses: u64,
    /// Configured levels, L1 first.
    pub levels: Vec<LevelReport>,
    /// Main-memory traffic breakdown.
    pub memory: MainMemory,
    /// Total main-memory traffic in blocks.
    pub memory_traffic: u64,
}

impl SimReport {
    /// Captures the counters of `hierarchy`.
    pub fn new(config: &SimConfig, hierarchy: &CacheHierarchy, accesses: u64) -> Self {
        Self {
            config: config.clone(),
            accesses,
            levels: hierarchy
                .levels()
                .iter()
                .map(|l| LevelReport {
                    level: l.level(),
                    prefetch_unit: l.stream_buffers().is_some(),
                    stats: l.stats().clone(),
                })
                .collect(),
            memory: *hierarchy.memory(),
            memory_traffic: hierarchy.memory_traffic(),
        }
    }

    /// Final counters of level `n` (1 for L1), if it was configured.
    pub fn level(&self, n: usize) -> Option<&LevelStats> {
        self.levels.iter().find(|l| l.level == n).map(|l| &l.stats)
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only occurs for non-finite miss rates.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Text report of a run in the layout of the classic course simulator output.
#[derive(Debug)]
pub struct Report<'a> {
    config: &'a SimConfig,
    hierarchy: &'a CacheHierarchy,
    trace_name: &'a str,
}

impl<'a> Report<'a> {
    /// Creates a report over a finished (or in-progress) hierarchy.
    pub const fn new(config: &'a SimConfig, hierarchy: &'a CacheHierarchy, trace_name: &'a str) -> Self {
        Self {
            config,
            hierarchy,
            trace_name,
        }
    }

    /// Writes the configuration banner.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_config(&self, out: &mut impl Write) -> io::Result<()> {
        let c = self.config;
        writeln!(out, "===== Simulator configuration =====")?;
        writeln!(out, "BLOCKSIZE:  {}", c.block_size)?;
        writeln!(out, "L1_SIZE:    {}", c.l1.size)?;
        writeln!(out, "L1_ASSOC:   {}", c.l1.assoc)?;
        writeln!(out, "L2_SIZE:    {}", c.l2.size)?;
        writeln!(out, "L2_ASSOC:   {}", c.l2.assoc)?;
        writeln!(out, "PREF_N:     {}", c.prefetch.buffers)?;
        writeln!(out, "PREF_M:     {}", c.prefetch.depth)?;
        writeln!(out, "trace_file: {}", self.trace_name)?;
        writeln!(out)
    }

    /// Writes the contents of one level, one line per set, blocks in MRU order.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_level_contents(level: &CacheLevel, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "===== L{} contents =====", level.level())?;
        for set in level.sets() {
            write!(out, "set {:6}: ", set.index())?;
            for block in set.mru_blocks() {
                if block.dirty {
                    write!(out, "{:8x} D", block.tag)?;
                } else {
                    write!(out, "{:8x}  ", block.tag)?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Writes every valid stream buffer in MRU order, entries nearest first.
    ///
    /// Writes nothing when no prefetch unit is attached.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_stream_buffers(&self, out: &mut impl Write) -> io::Result<()> {
        let Some(unit) = self.hierarchy.stream_buffers() else {
            return Ok(());
        };
        writeln!(out, "===== Stream Buffer(s) contents =====")?;
        for buffer in unit.mru_buffers() {
            for entry in buffer.entries() {
                write!(out, "{entry:8x} ")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Writes the contents of every level followed by the stream buffers.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_contents(&self, out: &mut impl Write) -> io::Result<()> {
        for level in self.hierarchy.levels() {
            Self::write_level_contents(level, out)?;
            writeln!(out)?;
        }
        if self.hierarchy.stream_buffers().is_some() {
            self.write_stream_buffers(out)?;
            writeln!(out)?;
        }
        Ok(())
    }

    /// Writes the lettered measurement table; absent levels report zeros.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_measurements(&self, out: &mut impl Write) -> io::Result<()> {
        let zero = LevelStats::default();
        let l1 = self.hierarchy.l1().map_or(&zero, CacheLevel::stats);
        let l2 = self.hierarchy.l2().map_or(&zero, CacheLevel::stats);

        writeln!(out, "===== Measurements =====")?;
        writeln!(out, "a. L1 reads:                   {}", l1.reads)?;
        writeln!(out, "b. L1 read misses:             {}", l1.read_misses)?;
        writeln!(out, "c. L1 writes:                  {}", l1.writes)?;
        writeln!(out, "d. L1 write misses:            {}", l1.write_misses)?;
        writeln!(out, "e. L1 miss rate:               {:.4}", l1.miss_rate)?;
        writeln!(out, "f. L1 writebacks:              {}", l1.writebacks)?;
        writeln!(out, "g. L1 prefetches:              {}", l1.prefetches)?;
        writeln!(out, "h. L2 reads (demand):          {}", l2.reads)?;
        writeln!(out, "i. L2 read misses (demand):    {}", l2.read_misses)?;
        // Only the last level prefetches, so no L2 read originates from an L1 prefetch.
        writeln!(out, "j. L2 reads (prefetch):        0")?;
        writeln!(out, "k. L2 read misses (prefetch):  0")?;
        writeln!(out, "l. L2 writes:                  {}", l2.writes)?;
        writeln!(out, "m. L2 write misses:            {}", l2.write_misses)?;
        writeln!(out, "n. L2 miss rate:               {:.4}", l2.miss_rate)?;
        writeln!(out, "o. L2 writebacks:              {}", l2.writebacks)?;
        writeln!(out, "p. L2 prefetches:              {}", l2.prefetches)?;
        writeln!(
            out,
            "q. memory traffic:             {}",
            self.hierarchy.memory_traffic()
        )
    }

    /// Writes the full report: banner, optional contents, measurements.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_all(&self, out: &mut impl Write, contents: bool) -> io::Result<()> {
        self.write_config(out)?;
        if contents {
            self.write_contents(out)?;
        }
        self.write_measurements(out)
    }
}

/// Writes one row per sweep run: the geometry, both miss rates and memory traffic.
///
/// Absent levels report a miss rate of zero.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_sweep_table(reports: &[SimReport], out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{:>6} {:>9} {:>8} {:>9} {:>8} {:>6} {:>6} {:>8} {:>8} {:>10}",
        "BLOCK", "L1_SIZE", "L1_ASSOC", "L2_SIZE", "L2_ASSOC", "PREF_N", "PREF_M", "L1_MISS",
        "L2_MISS", "TRAFFIC"
    )?;
    for report in reports {
        let c = &report.config;
        let miss_rate = |n| report.level(n).map_or(0.0, |s| s.miss_rate);
        writeln!(
            out,
            "{:>6} {:>9} {:>8} {:>9} {:>8} {:>6} {:>6} {:>8.4} {:>8.4} {:>10}",
            c.block_size,
            c.l1.size,
            c.l1.assoc,
            c.l2.size,
            c.l2.assoc,
            c.prefetch.buffers,
            c.prefetch.depth,
            miss_rate(1),
            miss_rate(2),
            report.memory_traffic
        )?;
    }
    Ok(())
}
