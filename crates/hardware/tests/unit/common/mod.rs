//! Unit tests for the shared simulator types.

/// Address field extraction and reconstruction.
pub mod addr;
