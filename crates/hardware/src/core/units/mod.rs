//! Cache hierarchy units.
//!
//! This module contains the set-associative cache level and the hardware prefetcher
//! that can be attached to the last level.

/// Set-associative cache level with LRU replacement and write-back/write-allocate.
pub mod cache;

/// Hardware prefetcher (stream buffers).
pub mod prefetch;
