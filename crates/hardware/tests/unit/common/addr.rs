//! Address Decoder Unit Tests.
//!
//! Verifies tag/index/offset extraction, block identifiers, address reconstruction
//! and the geometry checks performed when a decoder is built.

use cachesim_core::common::addr::{AddressDecoder, BlockId};
use cachesim_core::common::error::ConfigError;
use rstest::rstest;

// ──────────────────────────────────────────────────────────
// 1. Field layout
// ──────────────────────────────────────────────────────────

/// 8 KiB, 4-way, 32-byte blocks: 64 sets → 5 offset, 6 index, 21 tag bits.
#[test]
fn layout_of_typical_l1() {
    let d = AddressDecoder::new(1, 8192, 4, 32).unwrap();
    assert_eq!(d.offset_bits(), 5);
    assert_eq!(d.index_bits(), 6);
    assert_eq!(d.tag_bits(), 21);
    assert_eq!(d.num_sets(), 64);
}

#[test]
fn fields_of_typical_address() {
    let d = AddressDecoder::new(1, 8192, 4, 32).unwrap();
    let addr = 0x4000_7a0c;
    assert_eq!(d.offset(addr), 0x0c);
    assert_eq!(d.index(addr), 0x10);
    assert_eq!(d.tag(addr), 0x8000f);
    assert_eq!(d.block_id(addr), BlockId(0x0200_03d0));
}

/// Tag and index rebuild the block's offset-0 address.
#[test]
fn tag_concat_index_drops_offset() {
    let d = AddressDecoder::new(1, 8192, 4, 32).unwrap();
    let addr = 0x4000_7a0c;
    assert_eq!(d.tag_concat_index(d.tag(addr), d.index(addr)), 0x4000_7a00);
}

/// 4-byte blocks, 4 sets: the scenario geometry used across the suite.
#[rstest]
#[case(0x00, 0, 0, 0)]
#[case(0x04, 1, 0, 1)]
#[case(0x0c, 3, 0, 3)]
#[case(0x10, 0, 1, 4)]
#[case(0x13, 0, 1, 4)]
#[case(0x24, 1, 2, 9)]
fn tiny_geometry_fields(
    #[case] addr: u32,
    #[case] index: u32,
    #[case] tag: u32,
    #[case] block: u32,
) {
    let d = AddressDecoder::new(1, 16, 1, 4).unwrap();
    assert_eq!(d.index(addr), index);
    assert_eq!(d.tag(addr), tag);
    assert_eq!(d.block_id(addr), BlockId(block));
}

/// A single one-byte set leaves all 32 bits to the tag.
#[test]
fn full_width_tag() {
    let d = AddressDecoder::new(1, 1, 1, 1).unwrap();
    assert_eq!(d.tag_bits(), 32);
    assert_eq!(d.tag(u32::MAX), u32::MAX);
    assert_eq!(d.index(u32::MAX), 0);
    assert_eq!(d.offset(u32::MAX), 0);
    assert_eq!(d.tag_concat_index(u32::MAX, 0), u32::MAX);
}

/// A fully associative cache has a single set and no index bits.
#[test]
fn fully_associative_has_no_index() {
    let d = AddressDecoder::new(2, 1024, 32, 32).unwrap();
    assert_eq!(d.num_sets(), 1);
    assert_eq!(d.index(0xdead_beef), 0);
    assert_eq!(d.block_id(0xdead_beef), BlockId(0xdead_beef >> 5));
}

#[test]
fn block_id_ahead_wraps() {
    assert_eq!(BlockId(7).ahead(3), BlockId(10));
    assert_eq!(BlockId(u32::MAX).ahead(1), BlockId(0));
}

// ──────────────────────────────────────────────────────────
// 2. Geometry errors
// ──────────────────────────────────────────────────────────

#[test]
fn zero_block_size_rejected() {
    let err = AddressDecoder::new(1, 1024, 1, 0).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroField { field: "block_size" }));
}

#[test]
fn non_power_of_two_block_rejected() {
    let err = AddressDecoder::new(1, 1024, 1, 24).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::NotPowerOfTwo {
            field: "block_size",
            value: 24
        }
    ));
}

#[test]
fn zero_assoc_rejected() {
    let err = AddressDecoder::new(2, 1024, 0, 32).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroAssociativity { level: 2 }));
}

#[rstest]
#[case(100, 1, 32)]
#[case(1024, 3, 32)]
#[case(16, 1, 32)]
#[case(0, 1, 32)]
fn size_not_multiple_of_set_rejected(#[case] size: u32, #[case] assoc: u32, #[case] block: u32) {
    let err = AddressDecoder::new(1, size, assoc, block).unwrap_err();
    assert!(matches!(err, ConfigError::Indivisible { level: 1, .. }), "{err}");
}

/// 96 bytes of 32-byte direct-mapped blocks is 3 sets.
#[test]
fn non_power_of_two_set_count_rejected() {
    let err = AddressDecoder::new(1, 96, 1, 32).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::SetCountNotPowerOfTwo { level: 1, sets: 3 }
    ));
}

/// Three-way caches are fine as long as the set count is a power of two.
#[test]
fn odd_associativity_accepted() {
    let d = AddressDecoder::new(1, 3 * 32 * 8, 3, 32).unwrap();
    assert_eq!(d.num_sets(), 8);
}
