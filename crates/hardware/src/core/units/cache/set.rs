//! Cache sets and the blocks they hold.
//!
//! A set owns exactly `assoc` block slots. Slots are never created or destroyed after
//! construction: eviction resets a slot to the invalid state and allocation refills the
//! first invalid slot, so a way index stays a stable handle for the whole run.
//!
//! # LRU ranking
//!
//! Each valid block carries an `lru_rank`; 0 is most recently used. [`CacheSet::touch`]
//! is the only rank update: the touched block becomes 0 and every other valid block
//! ages by one. Starting from an empty set and touching every allocation, the ranks of
//! the valid blocks always form the permutation `0..valid_count`.

/// One block slot of a cache set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryBlock {
    /// Tag of the cached block; meaningful only while `valid`.
    pub tag: u32,
    /// Whether the slot holds a block.
    pub valid: bool,
    /// Whether the cached copy differs from the next level.
    pub dirty: bool,
    /// Recency rank, 0 = most recently used.
    pub lru_rank: u32,
    /// Address of the request that allocated the block.
    pub addr: u32,
}

/// A fixed-capacity associative set.
#[derive(Clone, Debug)]
pub struct CacheSet {
    index: u32,
    blocks: Vec<MemoryBlock>,
}

impl CacheSet {
    /// Creates a set of `assoc` invalid slots.
    pub fn new(index: u32, assoc: usize) -> Self {
        Self {
            index,
            blocks: vec![MemoryBlock::default(); assoc],
        }
    }

    /// Set number within its level.
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Number of slots (associativity).
    #[inline]
    pub fn ways(&self) -> usize {
        self.blocks.len()
    }

    /// All slots, valid or not, in way order.
    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    /// Block in slot `way`.
    ///
    /// # Panics
    ///
    /// Panics if `way >= self.ways()`.
    #[inline]
    pub fn block(&self, way: usize) -> &MemoryBlock {
        &self.blocks[way]
    }

    /// Mutable block in slot `way`.
    ///
    /// # Panics
    ///
    /// Panics if `way >= self.ways()`.
    #[inline]
    pub fn block_mut(&mut self, way: usize) -> &mut MemoryBlock {
        &mut self.blocks[way]
    }

    /// Way holding a valid block with `tag`, if any.
    pub fn find(&self, tag: u32) -> Option<usize> {
        self.blocks.iter().position(|b| b.valid && b.tag == tag)
    }

    /// Whether a valid block with `tag` is present.
    #[inline]
    pub fn has_block(&self, tag: u32) -> bool {
        self.find(tag).is_some()
    }

    /// Whether any slot is invalid.
    pub fn has_free_slot(&self) -> bool {
        self.blocks.iter().any(|b| !b.valid)
    }

    /// Number of valid blocks.
    pub fn valid_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.valid).count()
    }

    /// Fills the first invalid slot with a clean block.
    ///
    /// The new block is not ranked; callers `touch` it right after.
    ///
    /// # Returns
    ///
    /// The way written, or `None` when the set is full.
    pub fn allocate(&mut self, tag: u32, addr: u32) -> Option<usize> {
        let way = self.blocks.iter().position(|b| !b.valid)?;
        let block = &mut self.blocks[way];
        block.tag = tag;
        block.valid = true;
        block.dirty = false;
        block.addr = addr;
        Some(way)
    }

    /// Least recently used valid block (largest rank).
    ///
    /// Ties go to the lowest way.
    pub fn victim(&self) -> Option<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.valid)
            .fold(None, |best: Option<(usize, u32)>, (way, b)| match best {
                Some((_, rank)) if rank >= b.lru_rank => best,
                _ => Some((way, b.lru_rank)),
            })
            .map(|(way, _)| way)
    }

    /// Marks `way` most recently used and ages every other valid block by one.
    ///
    /// Ranks saturate at `u32::MAX`; a saturated block still compares oldest.
    pub fn touch(&mut self, way: usize) {
        for (i, block) in self.blocks.iter_mut().enumerate() {
            if i == way {
                block.lru_rank = 0;
            } else if block.valid {
                block.lru_rank = block.lru_rank.saturating_add(1);
            }
        }
    }

    /// Resets slot `way` to the invalid state.
    pub fn invalidate(&mut self, way: usize) {
        self.blocks[way] = MemoryBlock::default();
    }

    /// Valid blocks ordered from most to least recently used.
    pub fn mru_blocks(&self) -> Vec<&MemoryBlock> {
        let mut valid: Vec<&MemoryBlock> = self.blocks.iter().filter(|b| b.valid).collect();
        valid.sort_by_key(|b| b.lru_rank);
        valid
    }
}
