//! Test context for driving a cache hierarchy from trace text.

use cachesim_core::CacheHierarchy;
use cachesim_core::config::{CacheConfig, PrefetchConfig, SimConfig};
use cachesim_core::core::units::cache::CacheLevel;
use cachesim_core::sim::trace::parse_line;
use tracing_subscriber::EnvFilter;

/// Builds a configuration from the classic positional parameters.
pub fn config(
    block_size: u32,
    (l1_size, l1_assoc): (u32, u32),
    (l2_size, l2_assoc): (u32, u32),
    (buffers, depth): (u32, u32),
) -> SimConfig {
    SimConfig {
        block_size,
        l1: CacheConfig {
            size: l1_size,
            assoc: l1_assoc,
        },
        l2: CacheConfig {
            size: l2_size,
            assoc: l2_assoc,
        },
        prefetch: PrefetchConfig { buffers, depth },
    }
}

/// 4-byte blocks, 16-byte direct-mapped L1 (4 sets, 2 offset bits, 2 index bits).
pub fn tiny_l1(prefetch: (u32, u32)) -> SimConfig {
    config(4, (16, 1), (0, 0), prefetch)
}

/// `tiny_l1` with a 32-byte 2-way L2 below it (4 sets).
pub fn tiny_l1_l2(prefetch: (u32, u32)) -> SimConfig {
    config(4, (16, 1), (32, 2), prefetch)
}

/// Hierarchy under test plus trace helpers.
pub struct TestContext {
    /// Hierarchy driven by [`TestContext::run`].
    pub hierarchy: CacheHierarchy,
}

impl TestContext {
    /// Builds the hierarchy for `config` and routes its logs to the test output.
    pub fn new(config: &SimConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
        Self {
            hierarchy: CacheHierarchy::new(config).expect("valid test geometry"),
        }
    }

    /// Executes every line of `trace` (`r|w <hex>` per line).
    pub fn run(&mut self, trace: &str) {
        for (i, line) in trace.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let access = parse_line(i + 1, line).expect("valid trace line");
            self.hierarchy.execute(access).expect("access executes");
        }
    }

    /// The first-level cache.
    pub fn l1(&self) -> &CacheLevel {
        self.hierarchy.l1().expect("L1 configured")
    }

    /// The second-level cache.
    pub fn l2(&self) -> &CacheLevel {
        self.hierarchy.l2().expect("L2 configured")
    }

    /// Blocks moved to or from main memory.
    pub fn traffic(&self) -> u64 {
        self.hierarchy.memory_traffic()
    }

    /// Valid `(tag, dirty)` pairs of one set, most recently used first.
    pub fn set_contents(level: &CacheLevel, index: usize) -> Vec<(u32, bool)> {
        level
            .set(index)
            .expect("set exists")
            .mru_blocks()
            .iter()
            .map(|b| (b.tag, b.dirty))
            .collect()
    }

    /// Stream buffer entries, most recently used buffer first.
    pub fn stream_buffers(&self) -> Vec<Vec<u32>> {
        self.hierarchy
            .stream_buffers()
            .expect("prefetch unit attached")
            .mru_buffers()
            .iter()
            .map(|b| b.entries().iter().map(|e| e.val()).collect())
            .collect()
    }
}
