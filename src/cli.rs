//! Command-line surface (§6).
//!
//! Grounded on `original_source/bgp_simulator/__main__.py`'s argparse flags
//! (`--as-rel`, `--announcements`, `--rov-asns`, `--output`) and its
//! file-existence pre-validation, ported to the `clap`-derive idiom used by
//! `vx0net-daemon` and `zebra-rs` elsewhere in this corpus — the teacher's own
//! `main.rs` never implements a real CLI at all.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "interdomain-bgp-sim",
    about = "Simulates BGP route propagation over an AS-level topology."
)]
pub struct Cli {
    /// Path to the AS-relationships input (pipe-delimited, see §6).
    #[arg(long = "as-rel")]
    pub as_rel: PathBuf,

    /// Path to the seed-announcements CSV input.
    #[arg(long)]
    pub announcements: PathBuf,

    /// Path to a file listing one ROV-deploying ASN per line.
    #[arg(long = "rov-asns")]
    pub rov_asns: Option<PathBuf>,

    /// Where to write the resulting Local-RIB CSV.
    #[arg(long, default_value = "output.csv")]
    pub output: PathBuf,

    /// Path to a JSON file of `EngineConfig` overrides (see `config::EngineConfig`).
    /// Fields not present in the file keep their built-in default; any of
    /// `--workers`/`--round-cap-multiplier`/`--strict-topology` given on the
    /// command line override this file's values in turn.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Size of the round-execution worker pool; defaults to the available CPU count.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Multiplies the per-phase safety round cap.
    #[arg(long = "round-cap-multiplier")]
    pub round_cap_multiplier: Option<usize>,

    /// Treat self-loops and contradictory relationship codes as a fatal error
    /// instead of silently skipping the offending line.
    #[arg(long = "strict-topology")]
    pub strict_topology: bool,

    /// Increase log verbosity; repeatable (warn -> info -> debug -> trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
