//! Stream-Buffer Prefetch Unit.
//!
//! A set of `N` stream buffers, each a FIFO of `M` predicted block identifiers. A demand
//! miss that no buffer predicted claims the least recently used buffer and fills it with
//! the `M` blocks following the missed one. A demand access that hits a buffer consumes
//! the matched prediction: the entries behind it shift to the head and the vacated tail
//! is refilled, so the buffer keeps looking `M` blocks ahead of the demand stream.
//!
//! Buffers are ranked by recency like cache blocks (0 = most recently filled). Every
//! identifier written into a buffer is one block fetched from main memory; the unit
//! reports the count back to its cache level, which owns the accounting.

use tracing::debug;

use crate::common::addr::BlockId;

/// One stream buffer: `M` sequential block identifiers, head first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamBuffer {
    entries: Vec<BlockId>,
    valid: bool,
    lru_rank: u32,
}

impl StreamBuffer {
    /// Creates an invalid buffer with `depth` slots.
    pub fn new(depth: usize) -> Self {
        Self {
            entries: vec![BlockId::default(); depth],
            valid: false,
            lru_rank: 0,
        }
    }

    /// Whether the buffer holds a prefetched stream.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Recency rank among the buffers of the unit, 0 = most recent.
    #[inline]
    pub const fn lru_rank(&self) -> u32 {
        self.lru_rank
    }

    /// Predicted blocks, nearest first.
    pub fn entries(&self) -> &[BlockId] {
        &self.entries
    }

    /// Slot holding `block`, if the buffer is valid and predicts it.
    pub fn position(&self, block: BlockId) -> Option<usize> {
        if !self.valid {
            return None;
        }
        self.entries.iter().position(|&e| e == block)
    }

    /// Whether the buffer is valid and predicts `block`.
    #[inline]
    pub fn contains(&self, block: BlockId) -> bool {
        self.position(block).is_some()
    }
}

/// The `N` stream buffers attached to the last cache level.
#[derive(Clone, Debug)]
pub struct StreamBufferArray {
    buffers: Vec<StreamBuffer>,
    depth: usize,
}

impl StreamBufferArray {
    /// Creates `count` invalid buffers of `depth` blocks each.
    pub fn new(count: usize, depth: usize) -> Self {
        Self {
            buffers: vec![StreamBuffer::new(depth); count],
            depth,
        }
    }

    /// Number of buffers (N).
    #[inline]
    pub fn count(&self) -> usize {
        self.buffers.len()
    }

    /// Blocks per buffer (M).
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// All buffers in construction order.
    pub fn buffers(&self) -> &[StreamBuffer] {
        &self.buffers
    }

    /// Buffer at position `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.count()`.
    pub fn buffer(&self, idx: usize) -> &StreamBuffer {
        &self.buffers[idx]
    }

    /// Whether any valid buffer predicts `block`.
    pub fn contains(&self, block: BlockId) -> bool {
        self.buffers.iter().any(|b| b.contains(block))
    }

    /// Buffer to overwrite on a new stream: the first invalid buffer, otherwise the
    /// valid buffer with the largest rank (ties go to the lowest position).
    ///
    /// # Panics
    ///
    /// Panics if the unit has no buffers.
    pub fn victim(&self) -> usize {
        if let Some(idx) = self.buffers.iter().position(|b| !b.valid) {
            return idx;
        }
        let mut victim = 0;
        for (idx, buffer) in self.buffers.iter().enumerate() {
            if buffer.lru_rank > self.buffers[victim].lru_rank {
                victim = idx;
            }
        }
        victim
    }

    /// Most recently used valid buffer.
    pub fn mru(&self) -> Option<usize> {
        self.buffers
            .iter()
            .enumerate()
            .filter(|(_, b)| b.valid)
            .min_by_key(|(_, b)| b.lru_rank)
            .map(|(idx, _)| idx)
    }

    /// Most recently used valid buffer predicting `block`.
    fn mru_containing(&self, block: BlockId) -> Option<usize> {
        self.buffers
            .iter()
            .enumerate()
            .filter(|(_, b)| b.contains(block))
            .min_by_key(|(_, b)| b.lru_rank)
            .map(|(idx, _)| idx)
    }

    /// Marks buffer `idx` most recently used and ages every other valid buffer by one.
    pub fn touch(&mut self, idx: usize) {
        for (i, buffer) in self.buffers.iter_mut().enumerate() {
            if i == idx {
                buffer.lru_rank = 0;
            } else if buffer.valid {
                buffer.lru_rank = buffer.lru_rank.saturating_add(1);
            }
        }
    }

    /// Prefetches `count` consecutive blocks following `start` into the last `count`
    /// slots of buffer `idx`, then validates and touches it.
    ///
    /// Leading slots keep their content when `count < depth`; that is how a transfer
    /// refills only the vacated tail.
    ///
    /// # Returns
    ///
    /// Number of blocks written, each of which is one main-memory fetch.
    pub fn fill(&mut self, idx: usize, start: BlockId, count: usize) -> u64 {
        let count = count.min(self.depth);
        let first_slot = self.depth - count;
        let buffer = &mut self.buffers[idx];
        let mut next = start;
        for slot in &mut buffer.entries[first_slot..] {
            next = next.ahead(1);
            *slot = next;
        }
        buffer.valid = true;
        self.touch(idx);
        debug!(buffer = idx, start = %start, count, "stream buffer fill");
        count as u64
    }

    /// Consumes the prediction of `block` from the most recently used buffer that holds
    /// it and refills that buffer's tail.
    ///
    /// With `block` found at slot `k`, entries `k+1..M` move to `0..M-k-1` and the last
    /// `k+1` slots receive the blocks following the previous tail.
    ///
    /// # Returns
    ///
    /// Number of blocks prefetched by the refill; 0 when no buffer predicts `block`.
    pub fn transfer(&mut self, block: BlockId) -> u64 {
        let Some(idx) = self.mru_containing(block) else {
            return 0;
        };
        let Some(k) = self.buffers[idx].position(block) else {
            return 0;
        };
        debug!(buffer = idx, block = %block, slot = k, "stream buffer transfer");
        self.buffers[idx].entries.copy_within(k + 1.., 0);
        let tail = block.ahead((self.depth - k - 1) as u32);
        self.fill(idx, tail, k + 1)
    }

    /// Valid buffers ordered from most to least recently used.
    pub fn mru_buffers(&self) -> Vec<&StreamBuffer> {
        let mut valid: Vec<&StreamBuffer> = self.buffers.iter().filter(|b| b.valid).collect();
        valid.sort_by_key(|b| b.lru_rank);
        valid
    }
}
