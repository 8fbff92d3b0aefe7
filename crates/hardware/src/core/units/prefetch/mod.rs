//! Hardware Prefetcher implementations.
//!
//! The simulator models a single prefetcher: a stream-buffer unit attached to the
//! cache level adjacent to main memory.

/// Stream buffers (next-sequential-block prefetching).
pub mod stream;

pub use self::stream::{StreamBuffer, StreamBufferArray};
