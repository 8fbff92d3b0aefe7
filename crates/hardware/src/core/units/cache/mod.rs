//! Set-Associative Cache Level.
//!
//! This module implements one level of the hierarchy: an array of LRU sets under a
//! write-back/write-allocate policy, an optional stream-buffer prefetch unit, and the
//! per-level statistics. Requests that miss are forwarded to the next level, or counted
//! as main-memory traffic at the last level.
//!
//! # Request state machine
//!
//! Every request is classified by two lookups made before any state changes: the
//! cache tag match and the stream-buffer match.
//!
//! | cache | stream buffer | action                                                 |
//! |-------|---------------|--------------------------------------------------------|
//! | miss  | miss          | demand fetch, then prefetch the next `M` blocks        |
//! | miss  | hit           | take the block from the buffer, refill the buffer tail |
//! | hit   | miss          | update LRU only                                        |
//! | hit   | hit           | refill the buffer tail to follow the demand stream     |
//!
//! On a miss the victim is evicted first (writing it back when dirty) and the block is
//! allocated last, so a write-back is always complete before its slot is reused.

/// Cache sets and block slots.
pub mod set;

use tracing::{debug, trace};

pub use self::set::{CacheSet, MemoryBlock};
use crate::common::addr::{AddressDecoder, BlockId};
use crate::common::data::{Access, AccessType};
use crate::common::error::{ConfigError, SimError};
use crate::core::memory::MainMemory;
use crate::core::units::prefetch::StreamBufferArray;
use crate::stats::LevelStats;

/// One level of the cache hierarchy.
#[derive(Clone, Debug)]
pub struct CacheLevel {
    level: usize,
    size: u32,
    assoc: u32,
    block_size: u32,
    decoder: AddressDecoder,
    sets: Vec<CacheSet>,
    stream_buffers: Option<StreamBufferArray>,
    stats: LevelStats,
}

impl CacheLevel {
    /// Creates an empty cache level.
    ///
    /// # Arguments
    ///
    /// * `level` - Level number, 1 for L1. Selects the miss-rate formula.
    /// * `size` - Capacity in bytes.
    /// * `assoc` - Blocks per set.
    /// * `block_size` - Block size in bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry cannot be decoded into address fields.
    pub fn new(level: usize, size: u32, assoc: u32, block_size: u32) -> Result<Self, ConfigError> {
        let decoder = AddressDecoder::new(level, size, assoc, block_size)?;
        let sets = (0..decoder.num_sets())
            .map(|index| CacheSet::new(index as u32, assoc as usize))
            .collect();
        Ok(Self {
            level,
            size,
            assoc,
            block_size,
            decoder,
            sets,
            stream_buffers: None,
            stats: LevelStats::default(),
        })
    }

    /// Attaches a prefetch unit of `count` stream buffers holding `depth` blocks each.
    ///
    /// A `count` of zero leaves the level without a prefetch unit.
    pub fn attach_stream_buffers(&mut self, count: usize, depth: usize) {
        self.stream_buffers = (count > 0).then(|| StreamBufferArray::new(count, depth));
    }

    /// Level number (1 for L1).
    #[inline]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Capacity in bytes.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Associativity.
    pub const fn assoc(&self) -> u32 {
        self.assoc
    }

    /// Block size in bytes.
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Address layout of this level.
    pub const fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    /// All sets, in index order.
    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    /// Set `index`, if it exists.
    pub fn set(&self, index: usize) -> Option<&CacheSet> {
        self.sets.get(index)
    }

    /// The prefetch unit, if attached to this level.
    pub const fn stream_buffers(&self) -> Option<&StreamBufferArray> {
        self.stream_buffers.as_ref()
    }

    /// Counters accumulated so far.
    pub const fn stats(&self) -> &LevelStats {
        &self.stats
    }

    /// Whether a valid block holds `addr`.
    pub fn contains(&self, addr: u32) -> bool {
        let index = self.decoder.index(addr) as usize;
        self.sets
            .get(index)
            .is_some_and(|set| set.has_block(self.decoder.tag(addr)))
    }

    /// Services one request.
    ///
    /// # Arguments
    ///
    /// * `access` - Operation and address.
    /// * `lower` - The levels below this one, nearest first; empty at the last level.
    /// * `memory` - Main-memory traffic counters.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingSet`], [`SimError::NoVictim`] or
    /// [`SimError::NoFreeSlot`] when the set state contradicts the geometry, from this
    /// level or any level below.
    pub fn execute(
        &mut self,
        access: Access,
        lower: &mut [Self],
        memory: &mut MainMemory,
    ) -> Result<(), SimError> {
        let tag = self.decoder.tag(access.addr);
        let index = self.decoder.index(access.addr);
        let block = self.decoder.block_id(access.addr);
        let stream_buffer_hit = self
            .stream_buffers
            .as_ref()
            .is_some_and(|sb| sb.contains(block));

        let set_idx = index as usize;
        if set_idx >= self.sets.len() {
            return Err(SimError::MissingSet {
                level: self.level,
                index,
                access,
            });
        }
        let way = self.sets[set_idx].find(tag);
        trace!(
            level = self.level,
            op = ?access.op,
            addr = format_args!("{:#x}", access.addr),
            tag = format_args!("{tag:#x}"),
            index,
            cache_hit = way.is_some(),
            stream_buffer_hit,
            "access"
        );

        match way {
            Some(way) => self.process_hit(access.op, set_idx, way, block, stream_buffer_hit, memory),
            None => self.process_miss(access, tag, index, block, stream_buffer_hit, lower, memory)?,
        }

        self.stats.update_miss_rate(self.level);
        Ok(())
    }

    fn process_hit(
        &mut self,
        op: AccessType,
        set_idx: usize,
        way: usize,
        block: BlockId,
        stream_buffer_hit: bool,
        memory: &mut MainMemory,
    ) {
        let set = &mut self.sets[set_idx];
        match op {
            AccessType::Read => self.stats.reads += 1,
            AccessType::Write => {
                set.block_mut(way).dirty = true;
                self.stats.writes += 1;
            }
        }
        if stream_buffer_hit {
            // Keep the prefetch window in step with the demand stream.
            self.transfer(block, memory);
        }
        self.sets[set_idx].touch(way);
    }

    #[allow(clippy::too_many_arguments)]
    fn process_miss(
        &mut self,
        access: Access,
        tag: u32,
        index: u32,
        block: BlockId,
        stream_buffer_hit: bool,
        lower: &mut [Self],
        memory: &mut MainMemory,
    ) -> Result<(), SimError> {
        let set_idx = index as usize;
        // A block already held by a stream buffer is on chip and not a true miss.
        if !stream_buffer_hit {
            match access.op {
                AccessType::Read => self.stats.read_misses += 1,
                AccessType::Write => self.stats.write_misses += 1,
            }
        }

        if !self.sets[set_idx].has_free_slot() {
            self.evict(access, index, lower, memory)?;
        }
        self.service_miss(tag, index, block, stream_buffer_hit, lower, memory)?;

        let set = &mut self.sets[set_idx];
        let way = set.allocate(tag, access.addr).ok_or(SimError::NoFreeSlot {
            level: self.level,
            index,
            access,
        })?;
        if access.op.is_write() {
            set.block_mut(way).dirty = true;
        }
        set.touch(way);
        match access.op {
            AccessType::Read => self.stats.reads += 1,
            AccessType::Write => self.stats.writes += 1,
        }
        Ok(())
    }

    /// Frees a slot in a full set, writing the LRU block back first when dirty.
    fn evict(
        &mut self,
        access: Access,
        index: u32,
        lower: &mut [Self],
        memory: &mut MainMemory,
    ) -> Result<(), SimError> {
        let set_idx = index as usize;
        let victim = self.sets[set_idx].victim().ok_or(SimError::NoVictim {
            level: self.level,
            index,
            access,
        })?;
        let evicted = self.sets[set_idx].block(victim).clone();
        if evicted.dirty {
            let victim_addr = self.decoder.tag_concat_index(evicted.tag, index);
            debug!(
                level = self.level,
                set = index,
                victim = format_args!("{victim_addr:#x}"),
                "write back"
            );
            match lower.split_first_mut() {
                Some((next, rest)) => next.execute(Access::write(victim_addr), rest, memory)?,
                None => memory.write_back_block(),
            }
            self.stats.writebacks += 1;
        } else {
            debug!(level = self.level, set = index, tag = evicted.tag, "evict clean");
        }
        self.sets[set_idx].invalidate(victim);
        Ok(())
    }

    /// Obtains the missed block from below: the next level, the stream buffers, or main
    /// memory followed by a prefetch of the blocks after it.
    fn service_miss(
        &mut self,
        tag: u32,
        index: u32,
        block: BlockId,
        stream_buffer_hit: bool,
        lower: &mut [Self],
        memory: &mut MainMemory,
    ) -> Result<(), SimError> {
        if let Some((next, rest)) = lower.split_first_mut() {
            let addr = self.decoder.tag_concat_index(tag, index);
            return next.execute(Access::read(addr), rest, memory);
        }
        if stream_buffer_hit {
            self.transfer(block, memory);
        } else {
            memory.fetch_block();
            self.prefetch(block, memory);
        }
        Ok(())
    }

    /// Starts a new stream after `block` in the least recently used buffer.
    fn prefetch(&mut self, block: BlockId, memory: &mut MainMemory) {
        if let Some(sb) = self.stream_buffers.as_mut() {
            let victim = sb.victim();
            let depth = sb.depth();
            let fetched = sb.fill(victim, block, depth);
            self.stats.prefetches += fetched;
            memory.prefetch_blocks(fetched);
        }
    }

    /// Consumes `block` from the stream buffers and refills the buffer it came from.
    fn transfer(&mut self, block: BlockId, memory: &mut MainMemory) {
        if let Some(sb) = self.stream_buffers.as_mut() {
            let fetched = sb.transfer(block);
            self.stats.prefetches += fetched;
            memory.prefetch_blocks(fetched);
        }
    }
}
