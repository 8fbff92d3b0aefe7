//! Address decoding for set-associative caches.
//!
//! This module splits a flat 32-bit address into its cache fields. It provides:
//! 1. **Field Extraction:** Block offset, set index, tag, and the combined tag+index.
//! 2. **Block Identity:** [`BlockId`], the address with its offset bits stripped, shared
//!    by the cache-hit and stream-buffer-hit tests.
//! 3. **Reconstruction:** Rebuilding a representative (offset 0) address from a tag and
//!    index when a request is forwarded to the next level.
//!
//! Every level uses the same block size, so a reconstructed address decodes to the same
//! block at every level of the hierarchy.

use std::fmt;

use serde::Serialize;

use super::constants::ADDRESS_BITS;
use super::error::ConfigError;

/// Identifier of one memory block: the address with the block-offset bits removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Returns the raw identifier value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns the identifier `n` blocks further along in memory.
    ///
    /// Wraps at the top of the identifier space like the hardware counter it models.
    #[inline]
    pub const fn ahead(self, n: u32) -> Self {
        Self(self.0.wrapping_add(n))
    }
}

impl fmt::LowerHex for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Extracts `len` bits of `value` starting at bit `start`.
#[inline]
const fn extract_bits(value: u32, start: u32, len: u32) -> u32 {
    let mask = (1u64 << len) - 1;
    (((value as u64) >> start) & mask) as u32
}

/// Cache geometry translated into address bit fields.
///
/// ```text
///  31                                                  0
/// +----------------------+---------------+--------------+
/// |         tag          |     index     | block offset |
/// +----------------------+---------------+--------------+
///                        |<- index_bits->|<-offset_bits->|
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDecoder {
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
}

impl AddressDecoder {
    /// Derives the address layout of one cache level.
    ///
    /// # Arguments
    ///
    /// * `level` - Level number (1 for L1), used only in error reports.
    /// * `size` - Total capacity of the level in bytes.
    /// * `assoc` - Blocks per set.
    /// * `block_size` - Block size in bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the block size or the resulting set count is not
    /// a power of two, when `size` is not a multiple of `assoc * block_size`, or when
    /// the index and offset fields do not fit in the address.
    pub fn new(level: usize, size: u32, assoc: u32, block_size: u32) -> Result<Self, ConfigError> {
        if block_size == 0 {
            return Err(ConfigError::ZeroField {
                field: "block_size",
            });
        }
        if !block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_size",
                value: u64::from(block_size),
            });
        }
        if assoc == 0 {
            return Err(ConfigError::ZeroAssociativity { level });
        }

        let set_bytes = u64::from(assoc) * u64::from(block_size);
        let size = u64::from(size);
        if size == 0 || size % set_bytes != 0 {
            return Err(ConfigError::Indivisible {
                level,
                size,
                assoc,
                block_size,
            });
        }
        let sets = size / set_bytes;
        if !sets.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo { level, sets });
        }

        let offset_bits = block_size.trailing_zeros();
        let index_bits = sets.trailing_zeros();
        if offset_bits + index_bits > ADDRESS_BITS {
            return Err(ConfigError::AddressTooNarrow {
                level,
                bits: offset_bits + index_bits,
            });
        }

        Ok(Self {
            offset_bits,
            index_bits,
            tag_bits: ADDRESS_BITS - index_bits - offset_bits,
        })
    }

    /// Number of block-offset bits (`log2(block_size)`).
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of set-index bits (`log2(num_sets)`).
    #[inline]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Number of tag bits.
    #[inline]
    pub const fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Number of sets addressed by the index field.
    #[inline]
    pub const fn num_sets(&self) -> usize {
        1usize << self.index_bits
    }

    /// Byte offset of `addr` within its block.
    #[inline]
    pub const fn offset(&self, addr: u32) -> u32 {
        extract_bits(addr, 0, self.offset_bits)
    }

    /// Set index of `addr`.
    #[inline]
    pub const fn index(&self, addr: u32) -> u32 {
        extract_bits(addr, self.offset_bits, self.index_bits)
    }

    /// Tag of `addr`.
    #[inline]
    pub const fn tag(&self, addr: u32) -> u32 {
        extract_bits(addr, self.offset_bits + self.index_bits, self.tag_bits)
    }

    /// Block identifier of `addr` (tag and index, offset stripped).
    #[inline]
    pub const fn block_id(&self, addr: u32) -> BlockId {
        BlockId(extract_bits(addr, self.offset_bits, ADDRESS_BITS - self.offset_bits))
    }

    /// Rebuilds the offset-0 address of the block holding `tag` in set `index`.
    #[inline]
    pub const fn tag_concat_index(&self, tag: u32, index: u32) -> u32 {
        let shifted_tag = (tag as u64) << (self.index_bits + self.offset_bits);
        let shifted_index = (index as u64) << self.offset_bits;
        (shifted_tag | shifted_index) as u32
    }
}
