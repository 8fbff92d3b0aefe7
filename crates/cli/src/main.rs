//! Cache hierarchy simulator CLI.
//!
//! This binary replays a memory-access trace through a simulated cache hierarchy. It performs:
//! 1. **Geometry run:** Build the hierarchy from the seven classic positional parameters.
//! 2. **Config run:** Build the hierarchy from a JSON configuration document.
//! 3. **Sweep:** Replay one trace through every configuration of a sweep document and
//!    print one row of measurements per configuration.
//! 4. **Reporting:** Print the configuration, final cache and stream-buffer contents, and
//!    the measurement table (or a JSON report).

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{fs, process};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cachesim_core::config::{CacheConfig, PrefetchConfig, SimConfig};
use cachesim_core::sim::{Simulator, Sweep, TraceReader};
use cachesim_core::stats::{Report, write_sweep_table};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Trace-driven cache hierarchy simulator",
    long_about = "Replay a memory-access trace ('r|w <hex-address>' per line) through L1, an optional L2, and an optional stream-buffer prefetch unit.\n\nExamples:\n  sim run 32 8192 4 262144 8 3 10 gcc_trace.txt\n  sim run 16 1024 2 0 0 0 0 trace.txt --json\n  sim config l1_l2.json gcc_trace.txt\n  sim sweep l1_study.json gcc_trace.txt\n\nSet RUST_LOG=trace to log every request at every level."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Skip the cache and stream-buffer contents dump.
    #[arg(long, global = true)]
    no_contents: bool,

    /// Print the measurements as JSON instead of the text report.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run with geometry given on the command line.
    Run(Geometry),

    /// Run with geometry read from a JSON configuration file.
    Config {
        /// JSON configuration (see `SimConfig`).
        config: PathBuf,

        /// Trace file.
        trace: PathBuf,
    },

    /// Run one trace through every configuration of a sweep document.
    Sweep {
        /// JSON list of configurations, or a grid of parameter lists (see `SweepPlan`).
        plan: PathBuf,

        /// Trace file.
        trace: PathBuf,
    },
}

#[derive(Args, Debug)]
struct Geometry {
    /// Block size in bytes (all levels).
    block_size: u32,
    /// L1 size in bytes.
    l1_size: u32,
    /// L1 associativity.
    l1_assoc: u32,
    /// L2 size in bytes (0 = no L2).
    l2_size: u32,
    /// L2 associativity.
    l2_assoc: u32,
    /// Number of stream buffers (0 = no prefetching).
    pref_n: u32,
    /// Blocks per stream buffer.
    pref_m: u32,
    /// Trace file.
    trace: PathBuf,
}

impl Geometry {
    /// Assembles a configuration from the positional parameters.
    const fn to_config(&self) -> SimConfig {
        SimConfig {
            block_size: self.block_size,
            l1: CacheConfig {
                size: self.l1_size,
                assoc: self.l1_assoc,
            },
            l2: CacheConfig {
                size: self.l2_size,
                assoc: self.l2_assoc,
            },
            prefetch: PrefetchConfig {
                buffers: self.pref_n,
                depth: self.pref_m,
            },
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(geometry) => {
            cmd_run(geometry.to_config(), &geometry.trace, !cli.no_contents, cli.json);
        }
        Commands::Config { config, trace } => {
            cmd_run(load_config(config), trace, !cli.no_contents, cli.json);
        }
        Commands::Sweep { plan, trace } => cmd_sweep(plan, trace, cli.json),
    }
}

/// Installs the stderr `tracing` subscriber; `RUST_LOG` overrides the `warn` default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reads and validates a JSON configuration, exiting on failure.
fn load_config(path: &Path) -> SimConfig {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        fatal(format_args!("could not read config '{}': {}", path.display(), e));
    });
    SimConfig::from_json(&text).unwrap_or_else(|e| {
        fatal(format_args!("{}: {}", path.display(), e));
    })
}

/// Runs the simulator over `trace` and prints the report.
///
/// Any configuration, trace or simulation error aborts with exit code 1; no partial
/// statistics are printed.
fn cmd_run(config: SimConfig, trace: &Path, contents: bool, json: bool) {
    let mut sim = Simulator::new(config).unwrap_or_else(|e| fatal(format_args!("{e}")));
    info!(trace = %trace.display(), levels = sim.hierarchy().levels().len(), "replaying trace");
    let reader = TraceReader::open(trace).unwrap_or_else(|e| {
        fatal(format_args!("could not open trace '{}': {}", trace.display(), e));
    });
    if let Err(e) = sim.run(reader) {
        fatal(format_args!("{e}"));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if json {
        match sim.report().to_json() {
            Ok(text) => writeln!(out, "{text}"),
            Err(e) => fatal(format_args!("could not encode report: {e}")),
        }
    } else {
        let trace_name = trace.display().to_string();
        Report::new(sim.config(), sim.hierarchy(), &trace_name).write_all(&mut out, contents)
    };
    if let Err(e) = result.and_then(|()| out.flush()) {
        fatal(format_args!("could not write report: {e}"));
    }
}

/// Runs every configuration of the sweep in `plan` over `trace` and prints one row each.
fn cmd_sweep(plan: &Path, trace: &Path, json: bool) {
    let text = fs::read_to_string(plan).unwrap_or_else(|e| {
        fatal(format_args!("could not read sweep '{}': {}", plan.display(), e));
    });
    let sweep = Sweep::from_json(&text).unwrap_or_else(|e| {
        fatal(format_args!("{}: {}", plan.display(), e));
    });
    info!(trace = %trace.display(), configs = sweep.configs().len(), "sweeping");
    let reader = TraceReader::open(trace).unwrap_or_else(|e| {
        fatal(format_args!("could not open trace '{}': {}", trace.display(), e));
    });
    let reports = sweep
        .run_trace(reader)
        .unwrap_or_else(|e| fatal(format_args!("{e}")));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(text) => writeln!(out, "{text}"),
            Err(e) => fatal(format_args!("could not encode report: {e}")),
        }
    } else {
        write_sweep_table(&reports, &mut out)
    };
    if let Err(e) = result.and_then(|()| out.flush()) {
        fatal(format_args!("could not write report: {e}"));
    }
}

/// Prints a fatal error and exits with status 1.
fn fatal(msg: std::fmt::Arguments<'_>) -> ! {
    eprintln!("[!] FATAL: {msg}");
    process::exit(1);
}
