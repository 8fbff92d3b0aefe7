//! Statistics and Report Unit Tests.
//!
//! Verifies the per-level miss-rate formulas and the exact text layout of the
//! configuration banner, contents dump and measurement table.

use pretty_assertions::assert_eq;

use crate::common::{TestContext, tiny_l1, tiny_l1_l2};
use cachesim_core::stats::{LevelStats, Report};

fn render(ctx: &TestContext, f: impl Fn(&Report<'_>, &mut Vec<u8>) -> std::io::Result<()>) -> String {
    let config = tiny_l1((1, 2));
    let report = Report::new(&config, &ctx.hierarchy, "t.txt");
    let mut out = Vec::new();
    f(&report, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ──────────────────────────────────────────────────────────
// 1. Miss rate
// ──────────────────────────────────────────────────────────

#[test]
fn miss_rate_zero_without_requests() {
    let mut s = LevelStats::default();
    s.update_miss_rate(1);
    assert!(s.miss_rate.abs() < f64::EPSILON);
    s.update_miss_rate(2);
    assert!(s.miss_rate.abs() < f64::EPSILON);
}

#[test]
fn l1_miss_rate_counts_all_requests() {
    let mut s = LevelStats {
        reads: 6,
        read_misses: 1,
        writes: 2,
        write_misses: 1,
        ..LevelStats::default()
    };
    s.update_miss_rate(1);
    assert!((s.miss_rate - 0.25).abs() < f64::EPSILON);
}

#[test]
fn lower_level_miss_rate_counts_reads_only() {
    let mut s = LevelStats {
        reads: 4,
        read_misses: 1,
        writes: 10,
        write_misses: 10,
        ..LevelStats::default()
    };
    s.update_miss_rate(2);
    assert!((s.miss_rate - 0.25).abs() < f64::EPSILON);
}

// ──────────────────────────────────────────────────────────
// 2. Text report
// ──────────────────────────────────────────────────────────

#[test]
fn config_banner() {
    let ctx = TestContext::new(&tiny_l1((1, 2)));
    let text = render(&ctx, |r, out| r.write_config(out));
    assert_eq!(
        text,
        "===== Simulator configuration =====\n\
         BLOCKSIZE:  4\n\
         L1_SIZE:    16\n\
         L1_ASSOC:   1\n\
         L2_SIZE:    0\n\
         L2_ASSOC:   0\n\
         PREF_N:     1\n\
         PREF_M:     2\n\
         trace_file: t.txt\n\
         \n"
    );
}

#[test]
fn contents_dump() {
    let mut ctx = TestContext::new(&tiny_l1((1, 2)));
    ctx.run("r 0x00\nw 0x2c");
    let text = render(&ctx, |r, out| r.write_contents(out));
    assert_eq!(
        text,
        "===== L1 contents =====\n\
         set      0:        0  \n\
         set      1: \n\
         set      2: \n\
         set      3:        2 D\n\
         \n\
         ===== Stream Buffer(s) contents =====\n\
         \x20      c        d \n\
         \n"
    );
}

#[test]
fn level_contents_in_mru_order() {
    let mut ctx = TestContext::new(&tiny_l1_l2((0, 0)));
    ctx.run("w 0x00\nr 0x10");
    let mut out = Vec::new();
    Report::write_level_contents(ctx.l2(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text.lines().nth(1).unwrap(),
        "set      0:        1         0 D"
    );
}

#[test]
fn measurements_table() {
    let mut ctx = TestContext::new(&tiny_l1((1, 2)));
    ctx.run("r 0x00\nr 0x04\nw 0x10");
    let text = render(&ctx, |r, out| r.write_measurements(out));
    assert_eq!(
        text,
        "===== Measurements =====\n\
         a. L1 reads:                   2\n\
         b. L1 read misses:             1\n\
         c. L1 writes:                  1\n\
         d. L1 write misses:            1\n\
         e. L1 miss rate:               0.6667\n\
         f. L1 writebacks:              0\n\
         g. L1 prefetches:              5\n\
         h. L2 reads (demand):          0\n\
         i. L2 read misses (demand):    0\n\
         j. L2 reads (prefetch):        0\n\
         k. L2 read misses (prefetch):  0\n\
         l. L2 writes:                  0\n\
         m. L2 write misses:            0\n\
         n. L2 miss rate:               0.0000\n\
         o. L2 writebacks:              0\n\
         p. L2 prefetches:              0\n\
         q. memory traffic:             7\n"
    );
}

#[test]
fn full_report_without_contents() {
    let ctx = TestContext::new(&tiny_l1((1, 2)));
    let with = render(&ctx, |r, out| r.write_all(out, true));
    let without = render(&ctx, |r, out| r.write_all(out, false));
    assert!(with.contains("===== L1 contents ====="));
    assert!(!without.contains("contents ====="));
    assert!(without.starts_with("===== Simulator configuration ====="));
    assert!(without.ends_with("q. memory traffic:             0\n"));
}
