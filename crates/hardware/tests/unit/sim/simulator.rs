//! Simulator Driver Unit Tests.
//!
//! Verifies whole-trace replay, fail-fast error handling, determinism and the JSON
//! report.

use std::io::Cursor;

use crate::common::{config, tiny_l1, tiny_l1_l2};
use cachesim_core::Simulator;
use cachesim_core::common::error::{ConfigError, SimError, TraceError};
use cachesim_core::sim::TraceReader;

fn reader(text: &str) -> TraceReader<Cursor<String>> {
    TraceReader::new(Cursor::new(text.to_string()))
}

const TRACE: &str = "r 0x00\nw 0x10\nr 0x04\nr 0x24\nw 0x00\nr 0x14\nr 0x08\nw 0x3c\n";

#[test]
fn invalid_config_fails_before_running() {
    let err = Simulator::new(config(4, (24, 1), (0, 0), (0, 0))).unwrap_err();
    assert!(matches!(err, SimError::Config(ConfigError::SetCountNotPowerOfTwo { level: 1, sets: 6 })));
}

#[test]
fn run_counts_accesses() {
    let mut sim = Simulator::new(tiny_l1((0, 0))).unwrap();
    sim.run(reader(TRACE)).unwrap();
    assert_eq!(sim.accesses(), 8);
    let l1 = sim.hierarchy().l1().unwrap().stats();
    assert_eq!(l1.reads + l1.writes, 8);
}

#[test]
fn run_stops_at_first_bad_line() {
    let mut sim = Simulator::new(tiny_l1((0, 0))).unwrap();
    let err = sim.run(reader("r 0\nq 4\nr 8\n")).unwrap_err();
    assert!(matches!(
        err,
        SimError::Trace(TraceError::UnknownOp { line: 2, .. })
    ));
    assert_eq!(sim.accesses(), 1);
}

#[test]
fn replay_is_deterministic() {
    let run = || {
        let mut sim = Simulator::new(tiny_l1_l2((2, 3))).unwrap();
        sim.run(reader(TRACE)).unwrap();
        sim.report()
    };
    assert_eq!(run(), run());
}

#[test]
fn step_matches_run() {
    let mut stepped = Simulator::new(tiny_l1_l2((1, 2))).unwrap();
    for access in reader(TRACE) {
        stepped.step(access.unwrap()).unwrap();
    }
    let mut replayed = Simulator::new(tiny_l1_l2((1, 2))).unwrap();
    replayed.run(reader(TRACE)).unwrap();
    assert_eq!(stepped.report(), replayed.report());
}

#[test]
fn json_report_lists_levels() {
    let mut sim = Simulator::new(tiny_l1_l2((1, 2))).unwrap();
    sim.run(reader("r 0x00\nr 0x04\n")).unwrap();
    let report = sim.report();
    assert_eq!(report.accesses, 2);
    assert_eq!(report.levels.len(), 2);
    assert!(!report.levels[0].prefetch_unit);
    assert!(report.levels[1].prefetch_unit);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["memory_traffic"], 4);
    assert_eq!(json["levels"][1]["stats"]["prefetches"], 3);
    assert_eq!(json["levels"][0]["stats"]["read_misses"], 2);
    assert_eq!(json["config"]["prefetch"]["buffers"], 1);
    assert_eq!(json["memory"]["prefetch_fetches"], 3);
}
