//! Configuration system for the cache simulator.
//!
//! This module defines the configuration structures used to build a cache hierarchy.
//! It provides:
//! 1. **Defaults:** Baseline geometry constants (block size, L1/L2 size and associativity).
//! 2. **Structures:** Per-level cache geometry and the stream-buffer prefetch unit.
//! 3. **Validation:** Every geometry check runs before any access is simulated.
//!
//! Configuration is supplied as JSON (`SimConfig::from_json`) or assembled by the CLI
//! from its positional arguments.

use serde::{Deserialize, Serialize};

use crate::common::addr::AddressDecoder;
use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Block size in bytes shared by every level.
    pub const BLOCK_SIZE: u32 = 32;

    /// L1 capacity in bytes (8 KiB).
    pub const L1_SIZE: u32 = 8192;

    /// L1 associativity.
    pub const L1_ASSOC: u32 = 4;

    /// L2 capacity in bytes; zero means no L2.
    pub const L2_SIZE: u32 = 0;

    /// L2 associativity (used only when L2 is present).
    pub const L2_ASSOC: u32 = 8;

    /// Number of stream buffers; zero disables prefetching.
    pub const PREFETCH_BUFFERS: u32 = 0;

    /// Blocks held by each stream buffer.
    pub const PREFETCH_DEPTH: u32 = 4;
}

/// Root configuration of one simulation run.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::SimConfig;
///
/// let json = r#"{ "block_size": 16, "l1": { "size": 1024, "assoc": 2 } }"#;
/// let config = SimConfig::from_json(json).unwrap();
/// assert_eq!(config.l1.size, 1024);
/// assert!(!config.l2.is_present());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Block size in bytes, identical at every level.
    #[serde(default = "SimConfig::default_block_size")]
    pub block_size: u32,

    /// First-level cache geometry.
    #[serde(default = "CacheConfig::default_l1")]
    pub l1: CacheConfig,

    /// Second-level cache geometry (`size == 0` means absent).
    #[serde(default = "CacheConfig::default_l2")]
    pub l2: CacheConfig,

    /// Stream-buffer prefetch unit attached to the last level.
    #[serde(default)]
    pub prefetch: PrefetchConfig,
}

impl SimConfig {
    /// Returns the default block size in bytes.
    fn default_block_size() -> u32 {
        defaults::BLOCK_SIZE
    }

    /// Parses a JSON configuration document and validates it.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any geometry error
    /// reported by [`SimConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of configured cache levels (0, 1 or 2).
    ///
    /// L2 is only instantiated below an existing L1.
    pub const fn level_count(&self) -> usize {
        match (self.l1.is_present(), self.l2.is_present()) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => 2,
        }
    }

    /// Checks every geometry constraint.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: a block size that is zero or not a
    /// power of two, a level whose size is not a whole power-of-two number of sets,
    /// or an enabled prefetch unit with zero-length buffers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroField {
                field: "block_size",
            });
        }
        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_size",
                value: u64::from(self.block_size),
            });
        }
        if self.l1.is_present() {
            let _ = AddressDecoder::new(1, self.l1.size, self.l1.assoc, self.block_size)?;
            if self.l2.is_present() {
                let _ = AddressDecoder::new(2, self.l2.size, self.l2.assoc, self.block_size)?;
            }
        }
        if self.prefetch.is_enabled() && self.prefetch.depth == 0 {
            return Err(ConfigError::ZeroField {
                field: "prefetch.depth",
            });
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            block_size: defaults::BLOCK_SIZE,
            l1: CacheConfig::default_l1(),
            l2: CacheConfig::default_l2(),
            prefetch: PrefetchConfig::default(),
        }
    }
}

/// Geometry of a single cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Total capacity in bytes; zero means the level is absent.
    pub size: u32,

    /// Associativity (blocks per set).
    pub assoc: u32,
}

impl CacheConfig {
    /// Returns the default L1 geometry.
    const fn default_l1() -> Self {
        Self {
            size: defaults::L1_SIZE,
            assoc: defaults::L1_ASSOC,
        }
    }

    /// Returns the default L2 geometry (absent).
    const fn default_l2() -> Self {
        Self {
            size: defaults::L2_SIZE,
            assoc: defaults::L2_ASSOC,
        }
    }

    /// Whether this level is instantiated.
    #[inline]
    pub const fn is_present(&self) -> bool {
        self.size != 0
    }
}

/// Stream-buffer prefetch unit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrefetchConfig {
    /// Number of stream buffers (N); zero disables prefetching.
    #[serde(default = "PrefetchConfig::default_buffers")]
    pub buffers: u32,

    /// Blocks held by each stream buffer (M).
    #[serde(default = "PrefetchConfig::default_depth")]
    pub depth: u32,
}

impl PrefetchConfig {
    /// Returns the default number of stream buffers.
    fn default_buffers() -> u32 {
        defaults::PREFETCH_BUFFERS
    }

    /// Returns the default stream-buffer depth.
    fn default_depth() -> u32 {
        defaults::PREFETCH_DEPTH
    }

    /// Whether a prefetch unit is attached to the last level.
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.buffers != 0
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            buffers: defaults::PREFETCH_BUFFERS,
            depth: defaults::PREFETCH_DEPTH,
        }
    }
}

/// Design-space sweep: explicit configurations, or a grid expanded into them.
///
/// A JSON array is read as a list of [`SimConfig`] documents; a JSON object as a
/// [`SweepGrid`].
///
/// # Examples
///
/// ```
/// use cachesim_core::config::SweepPlan;
///
/// let json = r#"{ "l1_sizes": [1024, 2048], "l1_assocs": [1, "fully"] }"#;
/// let configs = SweepPlan::from_json(json).unwrap().expand();
/// assert_eq!(configs.len(), 4);
/// assert_eq!(configs[3].l1.assoc, 2048 / 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SweepPlan {
    /// Configurations run in the order given.
    List(Vec<SimConfig>),
    /// Cartesian product of per-parameter value lists.
    Grid(SweepGrid),
}

impl SweepPlan {
    /// Parses a sweep document. Configurations are validated when the sweep is built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every configuration of the plan, in run order.
    pub fn expand(&self) -> Vec<SimConfig> {
        match self {
            Self::List(configs) => configs.clone(),
            Self::Grid(grid) => grid.expand(),
        }
    }
}

/// Per-parameter value lists of a grid sweep.
///
/// Expansion nests block size, then L1 associativity, then L1 size, then L2, then
/// prefetch, the last varying fastest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepGrid {
    /// Block sizes in bytes.
    #[serde(default = "SweepGrid::default_block_sizes")]
    pub block_sizes: Vec<u32>,

    /// L1 capacities in bytes.
    pub l1_sizes: Vec<u32>,

    /// L1 associativities; `"fully"` means one set.
    pub l1_assocs: Vec<Associativity>,

    /// L2 geometries (`size == 0` means absent).
    #[serde(default = "SweepGrid::default_l2")]
    pub l2: Vec<CacheConfig>,

    /// Prefetch unit settings.
    #[serde(default = "SweepGrid::default_prefetch")]
    pub prefetch: Vec<PrefetchConfig>,
}

impl SweepGrid {
    fn default_block_sizes() -> Vec<u32> {
        vec![defaults::BLOCK_SIZE]
    }

    fn default_l2() -> Vec<CacheConfig> {
        vec![CacheConfig::default_l2()]
    }

    fn default_prefetch() -> Vec<PrefetchConfig> {
        vec![PrefetchConfig::default()]
    }

    /// Cartesian product of the value lists.
    pub fn expand(&self) -> Vec<SimConfig> {
        let mut configs = Vec::new();
        for &block_size in &self.block_sizes {
            for &assoc in &self.l1_assocs {
                for &size in &self.l1_sizes {
                    for &l2 in &self.l2 {
                        for &prefetch in &self.prefetch {
                            configs.push(SimConfig {
                                block_size,
                                l1: CacheConfig {
                                    size,
                                    assoc: assoc.ways(size, block_size),
                                },
                                l2,
                                prefetch,
                            });
                        }
                    }
                }
            }
        }
        configs
    }
}

/// Associativity entry of a grid sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Associativity {
    /// Fixed number of blocks per set.
    Ways(u32),
    /// A single set holding every block.
    Fully(FullyAssociative),
}

/// The `"fully"` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FullyAssociative {
    /// Fully associative.
    #[serde(rename = "fully")]
    Fully,
}

impl Associativity {
    /// Blocks per set for a cache of `size` bytes with `block_size`-byte blocks.
    ///
    /// A fully associative cache smaller than one block resolves to 0 ways, which
    /// validation rejects.
    pub const fn ways(self, size: u32, block_size: u32) -> u32 {
        match self {
            Self::Ways(ways) => ways,
            Self::Fully(_) => match size.checked_div(block_size) {
                Some(ways) => ways,
                None => 0,
            },
        }
    }
}
