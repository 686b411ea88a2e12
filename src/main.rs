//! CLI entry point (§6): wires the `io` loaders and `engine::SimulationEngine`
//! together into the external batch pipeline. Grounded on
//! `original_source/bgp_simulator/__main__.py`'s load -> seed -> propagate ->
//! write flow and its exit-code discipline.

use std::process::ExitCode;

use clap::Parser;

use interdomain_bgp_sim::cli::Cli;
use interdomain_bgp_sim::config::EngineConfig;
use interdomain_bgp_sim::engine::SimulationEngine;
use interdomain_bgp_sim::error::SimError;
use interdomain_bgp_sim::io::{load_announcements, load_as_relationships, load_rov_asns, write_ribs};
use interdomain_bgp_sim::policy::Policy;
use interdomain_bgp_sim::prefix::PrefixTable;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(log_level).init();

    match run(&cli) {
        Ok(row_count) => {
            log::info!("wrote {row_count} Local-RIB row(s) to {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<usize, SimError> {
    let config = build_config(cli)?;
    let as_graph = load_as_relationships(&cli.as_rel, config.strict_topology)?;
    let mut engine = SimulationEngine::new(as_graph, PrefixTable::new(), config);

    if let Some(rov_path) = &cli.rov_asns {
        for asn in load_rov_asns(rov_path)? {
            engine.as_graph_mut().ensure_as(asn);
            engine.as_graph_mut().set_policy(asn, Policy::Rov);
        }
        engine.as_graph_mut().finalize();
    }

    for record in load_announcements(&cli.announcements)? {
        engine.seed_announcement(record.seed_asn, &record.prefix, record.rov_invalid);
    }

    engine.propagate()?;
    let rows = engine.get_ribs()?;
    let row_count = rows.len();
    write_ribs(&cli.output, &rows)?;
    Ok(row_count)
}

/// Builds the effective `EngineConfig`: a `--config` JSON file (if given)
/// supplies the base, with any of `--workers`/`--round-cap-multiplier` given on
/// the command line overriding that base, and `--strict-topology` on either
/// side enabling strict mode. `--verbose` always decides `show_progress`, since
/// a progress spinner is orthogonal to the engine's own tuning knobs.
fn build_config(cli: &Cli) -> Result<EngineConfig, SimError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|e| SimError::InputFormat {
                path: path.display().to_string(),
                line: 0,
                reason: e.to_string(),
            })?
        }
        None => EngineConfig::default(),
    };

    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(multiplier) = cli.round_cap_multiplier {
        config.round_cap_multiplier = multiplier;
    }
    config.strict_topology = config.strict_topology || cli.strict_topology;
    config.show_progress = cli.verbose == 0;
    Ok(config)
}
