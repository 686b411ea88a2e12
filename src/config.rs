//! Engine configuration.
//!
//! Grounded on `engine_runner/engine_run_config.rs`'s builder-style config struct,
//! stripped of its attack-scenario fields (adoption settings, scenario name) and
//! its `lazy_static` global run-name registry, which have no counterpart here.
//! `Serialize`/`Deserialize` let `--config` (§6) load a JSON file of overrides
//! rather than requiring every knob to have its own CLI flag; any field absent
//! from the file falls back to `EngineConfig::default()`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the scoped-thread worker pool used to compute each round's
    /// outbound messages in parallel (§5). `1` disables the pool entirely and
    /// runs everything on the calling thread.
    pub workers: usize,
    /// Multiplies the `|ASes|`-per-phase safety round cap (§4.4).
    pub round_cap_multiplier: usize,
    /// Turn self-loops / contradictory relationship codes in the AS-relationships
    /// input into a fatal `InvalidTopology` error instead of a silently-skipped
    /// line.
    pub strict_topology: bool,
    /// Render an indicatif progress spinner while a phase is converging.
    pub show_progress: bool,
}

impl EngineConfig {
    /// `0` is honored rather than clamped up: a multiplier of `0` yields a cap
    /// of `0`, so a graph needing more than one round to converge surfaces
    /// `OscillationDetected` instead of silently truncating propagation (§8).
    pub fn round_cap(&self, as_count: usize) -> usize {
        as_count.max(1) * self.round_cap_multiplier
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            workers: num_cpus::get().max(1),
            round_cap_multiplier: 1,
            strict_topology: false,
            show_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_cap_is_at_least_the_as_count() {
        let cfg = EngineConfig {
            round_cap_multiplier: 1,
            ..Default::default()
        };
        assert_eq!(cfg.round_cap(50), 50);
    }

    #[test]
    fn multiplier_scales_the_cap() {
        let cfg = EngineConfig {
            round_cap_multiplier: 3,
            ..Default::default()
        };
        assert_eq!(cfg.round_cap(50), 150);
    }

    #[test]
    fn a_multiplier_of_zero_yields_a_zero_cap() {
        let cfg = EngineConfig {
            round_cap_multiplier: 0,
            ..Default::default()
        };
        assert_eq!(cfg.round_cap(50), 0);
    }

    #[test]
    fn partial_json_overrides_fall_back_to_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"round_cap_multiplier": 5}"#).unwrap();
        assert_eq!(cfg.round_cap_multiplier, 5);
        assert_eq!(cfg.strict_topology, EngineConfig::default().strict_topology);
    }
}
