//! The propagation engine: seeds announcements, drives the three Gao-Rexford
//! phases to a fixed point, and extracts the resulting Local-RIBs.
//!
//! Phase-ordering architecture is grounded on the teacher's flat `engine.rs`
//! (`propagate_round` = providers then peers then customers, scheduled via
//! `propagation_rank`), not the nested tree's `simulation_engine/engine.rs`,
//! whose manual as_path splice-and-restore workarounds around re-sends are a less
//! mature duplicate of the same idea.

use std::collections::{HashMap, HashSet};

use crate::announcement::Announcement;
use crate::as_graph::ASGraph;
use crate::config::EngineConfig;
use crate::error::SimError;
use crate::policy::{may_export, Policy};
use crate::prefix::PrefixTable;
use crate::rib::LocalRib;
use crate::shared::{Relationships, ASN};

pub struct SimulationEngine {
    as_graph: ASGraph,
    prefixes: PrefixTable,
    ribs: HashMap<ASN, LocalRib>,
    config: EngineConfig,
    has_run: bool,
}

impl SimulationEngine {
    pub fn new(as_graph: ASGraph, prefixes: PrefixTable, config: EngineConfig) -> Self {
        SimulationEngine {
            as_graph,
            prefixes,
            ribs: HashMap::new(),
            config,
            has_run: false,
        }
    }

    pub fn as_graph(&self) -> &ASGraph {
        &self.as_graph
    }

    pub fn as_graph_mut(&mut self) -> &mut ASGraph {
        &mut self.as_graph
    }

    pub fn prefixes_mut(&mut self) -> &mut PrefixTable {
        &mut self.prefixes
    }

    /// Installs a seed announcement directly into `origin_asn`'s Local-RIB
    /// (§4.4). Creates `origin_asn` if it is not already part of the topology.
    /// Seeding the same (prefix, origin) pair twice is last-write-wins, since
    /// this is a plain map insert (§9 open-question resolution).
    pub fn seed_announcement(&mut self, origin_asn: ASN, prefix: &str, rov_invalid: bool) {
        self.as_graph.ensure_as(origin_asn);
        let prefix_id = self.prefixes.intern(prefix);
        let ann = Announcement::seed(origin_asn, prefix_id, rov_invalid);
        log::debug!("seeding AS {origin_asn} with {prefix} (rov_invalid={rov_invalid})");
        self.ribs.entry(origin_asn).or_default().seed(ann);
    }

    /// Runs all three phases to a fixed point (§4.4).
    pub fn propagate(&mut self) -> Result<(), SimError> {
        let customer_to_provider_order = self.rank_order(true);
        self.run_phase(
            "customer-to-provider",
            customer_to_provider_order,
            Relationships::Provider,
        )?;

        let peer_order = self.ascending_asn_order();
        self.run_phase("peer-to-peer", peer_order, Relationships::Peer)?;

        let provider_to_customer_order = self.rank_order(false);
        self.run_phase(
            "provider-to-customer",
            provider_to_customer_order,
            Relationships::Customer,
        )?;

        self.has_run = true;
        Ok(())
    }

    /// Ascending-ASN then ascending-prefix snapshot of every Local-RIB entry
    /// across the topology (§4.5).
    pub fn get_ribs(&self) -> Result<Vec<(ASN, String, Vec<ASN>)>, SimError> {
        if !self.has_run {
            return Err(SimError::NotRun);
        }
        let mut rows = Vec::new();
        for asn in self.as_graph.asns() {
            if let Some(rib) = self.ribs.get(&asn) {
                for (prefix_id, ann) in rib.iter() {
                    rows.push((
                        asn,
                        self.prefixes.resolve(*prefix_id).to_string(),
                        ann.as_path.clone(),
                    ));
                }
            }
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(rows)
    }

    fn rank_order(&self, deepest_first: bool) -> Vec<ASN> {
        let mut order: Vec<&crate::as_graph::AS> = self.as_graph.iter_ases().collect();
        if deepest_first {
            order.sort_by_key(|a| std::cmp::Reverse(a.propagation_rank.unwrap_or(0)));
        } else {
            order.sort_by_key(|a| a.propagation_rank.unwrap_or(0));
        }
        order.into_iter().map(|a| a.asn).collect()
    }

    fn ascending_asn_order(&self) -> Vec<ASN> {
        self.as_graph.iter_ases().map(|a| a.asn).collect()
    }

    fn neighbors_for<'a>(&'a self, asn: ASN, export_to: Relationships) -> &'a [ASN] {
        let node = match self.as_graph.get(asn) {
            Some(n) => n,
            None => return &[],
        };
        match export_to {
            Relationships::Provider => &node.providers,
            Relationships::Peer => &node.peers,
            Relationships::Customer => &node.customers,
            Relationships::Origin => &[],
        }
    }

    /// Runs one phase to a fixed point: repeated rounds, each processing only
    /// the ASes whose Local-RIB changed in the previous round (or, for the
    /// phase's first round, every AS that currently holds any route at all),
    /// visited in `canonical_order`. A round producing no changes ends the
    /// phase (§4.4); exceeding the safety cap is `OscillationDetected` (§7).
    fn run_phase(
        &mut self,
        phase_name: &'static str,
        canonical_order: Vec<ASN>,
        export_to: Relationships,
    ) -> Result<(), SimError> {
        let cap = self
            .config
            .round_cap(self.as_graph.len().max(canonical_order.len()));
        let mut worklist: Vec<ASN> = canonical_order
            .iter()
            .copied()
            .filter(|asn| self.ribs.get(asn).map(|r| !r.is_empty()).unwrap_or(false))
            .collect();

        let progress = if self.config.show_progress {
            let bar = indicatif::ProgressBar::new_spinner();
            bar.set_message(format!("{phase_name} phase"));
            Some(bar)
        } else {
            None
        };

        let mut round = 0usize;
        while !worklist.is_empty() {
            if round >= cap {
                if let Some(bar) = &progress {
                    bar.finish_and_clear();
                }
                return Err(SimError::OscillationDetected {
                    phase: phase_name,
                    cap,
                });
            }
            round += 1;
            if let Some(bar) = &progress {
                bar.tick();
                bar.set_message(format!(
                    "{phase_name} phase: round {round}, {} active ASes",
                    worklist.len()
                ));
            }
            log::debug!(
                "{phase_name} phase round {round}: {} active ASes",
                worklist.len()
            );

            let messages = self.compute_outbound_messages(&worklist, export_to);
            let changed = self.merge_messages(messages, export_to);
            worklist = canonical_order
                .iter()
                .copied()
                .filter(|asn| changed.contains(asn))
                .collect();
        }
        if let Some(bar) = &progress {
            bar.finish_and_clear();
        }
        log::info!("{phase_name} phase converged after {round} round(s)");
        Ok(())
    }

    /// Computes, for every AS in `worklist`, the announcements it exports to its
    /// neighbors of kind `export_to` this round. Read-only over `self` (a
    /// sending AS never mutates its own state while exporting), so this step is
    /// split across a scoped thread pool sized by `config.workers` with no
    /// locking required; see `SPEC_FULL.md` §5.
    fn compute_outbound_messages(
        &self,
        worklist: &[ASN],
        export_to: Relationships,
    ) -> Vec<(ASN, ASN, Announcement)> {
        let workers = self.config.workers.max(1);
        if workers <= 1 || worklist.len() < workers {
            return self.compute_outbound_chunk(worklist, export_to);
        }

        let chunk_size = worklist.len().div_ceil(workers);
        let chunks: Vec<&[ASN]> = worklist.chunks(chunk_size.max(1)).collect();
        std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| scope.spawn(move || self.compute_outbound_chunk(chunk, export_to)))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().expect("propagation worker panicked"))
                .collect()
        })
    }

    /// Produces `(destination_asn, exporter_asn, wire_announcement)` triples.
    /// `wire_announcement` is the exporting AS's own stored announcement,
    /// untouched — its `as_path` already starts with the exporter's ASN, so no
    /// prepending happens on the sending side (§4.4).
    fn compute_outbound_chunk(
        &self,
        chunk: &[ASN],
        export_to: Relationships,
    ) -> Vec<(ASN, ASN, Announcement)> {
        let mut out = Vec::new();
        for &asn in chunk {
            let Some(rib) = self.ribs.get(&asn) else {
                continue;
            };
            let neighbors = self.neighbors_for(asn, export_to);
            if neighbors.is_empty() {
                continue;
            }
            for (_, ann) in rib.iter() {
                if !may_export(ann.received_from_relation, export_to) {
                    continue;
                }
                for &neighbor in neighbors {
                    out.push((neighbor, asn, ann.clone()));
                }
            }
        }
        out
    }

    /// Single-threaded merge step: applies every outbound message to its
    /// destination's Local-RIB, prepending the receiver's own ASN only now
    /// (§4.4: "on acceptance by Y, Y prepends itself"). Message application is a
    /// pure fold over route selection (§4.3), so the order messages are merged
    /// in never changes the outcome, regardless of how the parallel step above
    /// scheduled its workers.
    fn merge_messages(
        &mut self,
        messages: Vec<(ASN, ASN, Announcement)>,
        export_to: Relationships,
    ) -> HashSet<ASN> {
        let received_from_relation = export_to.invert();
        let mut changed = HashSet::new();
        for (dest, exporter, wire_ann) in messages {
            let policy = self
                .as_graph
                .get(dest)
                .map(|n| n.policy)
                .unwrap_or(Policy::DefaultBgp);
            if !policy.accept(dest, &wire_ann) {
                continue;
            }
            let imported = wire_ann.received_by(dest, exporter, received_from_relation);
            if self.ribs.entry(dest).or_default().offer(imported) {
                changed.insert(dest);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SimulationEngine {
        SimulationEngine::new(ASGraph::new(), PrefixTable::new(), EngineConfig::default())
    }

    /// S1: two-AS customer chain.
    #[test]
    fn two_as_customer_chain() {
        let mut e = engine();
        e.as_graph_mut().add_provider_customer(1, 2);
        e.as_graph_mut().finalize();
        e.seed_announcement(2, "10.0.0.0/8", false);
        e.propagate().unwrap();
        let ribs = e.get_ribs().unwrap();
        assert_eq!(
            ribs,
            vec![
                (1, "10.0.0.0/8".to_string(), vec![1, 2]),
                (2, "10.0.0.0/8".to_string(), vec![2]),
            ]
        );
    }

    /// S2: a peer does not re-export to another peer.
    #[test]
    fn peer_does_not_reexport_to_peer() {
        let mut e = engine();
        e.as_graph_mut().add_peer(1, 2);
        e.as_graph_mut().add_peer(2, 3);
        e.as_graph_mut().finalize();
        e.seed_announcement(1, "10.0.0.0/8", false);
        e.propagate().unwrap();
        let ribs = e.get_ribs().unwrap();
        let asns: Vec<ASN> = ribs.iter().map(|r| r.0).collect();
        assert_eq!(asns, vec![1, 2]);
    }

    /// S3: provider routes are not re-exported upward past the immediate provider.
    #[test]
    fn provider_chain_does_not_leak_upward() {
        let mut e = engine();
        e.as_graph_mut().add_provider_customer(1, 2);
        e.as_graph_mut().add_provider_customer(2, 3);
        e.as_graph_mut().add_peer(2, 4);
        e.as_graph_mut().finalize();
        e.seed_announcement(1, "10.0.0.0/8", false);
        e.propagate().unwrap();
        let ribs = e.get_ribs().unwrap();
        let asns: Vec<ASN> = ribs.iter().map(|r| r.0).collect();
        assert_eq!(asns, vec![1, 2, 3]);
    }

    /// S4: ROV drops an invalid origin at the first ROV-enabled hop and beyond.
    #[test]
    fn rov_drops_invalid_origin_at_rov_hop() {
        let mut e = engine();
        e.as_graph_mut().add_peer(1, 2);
        e.as_graph_mut().add_peer(2, 3);
        e.as_graph_mut().finalize();
        e.as_graph_mut().set_policy(2, Policy::Rov);
        e.seed_announcement(3, "10.0.0.0/8", true);
        e.propagate().unwrap();
        let ribs = e.get_ribs().unwrap();
        let asns: Vec<ASN> = ribs.iter().map(|r| r.0).collect();
        assert_eq!(asns, vec![3]);
    }

    /// S5: customer routes beat peer routes regardless of path length.
    #[test]
    fn customer_route_preferred_over_peer_route() {
        let mut e = engine();
        e.as_graph_mut().add_provider_customer(1, 10);
        e.as_graph_mut().add_peer(1, 20);
        e.as_graph_mut().finalize();
        e.seed_announcement(10, "10.0.0.0/8", false);
        e.seed_announcement(20, "10.0.0.0/8", false);
        e.propagate().unwrap();
        let ribs = e.get_ribs().unwrap();
        let at_1 = ribs.iter().find(|r| r.0 == 1).unwrap();
        assert_eq!(at_1.2.first(), Some(&1));
        assert_eq!(at_1.2.get(1), Some(&10));
    }

    /// S6: equal path length ties break on lowest next-hop ASN.
    #[test]
    fn tie_breaks_on_lowest_next_hop() {
        let mut e = engine();
        e.as_graph_mut().add_provider_customer(1, 5);
        e.as_graph_mut().add_provider_customer(1, 9);
        e.as_graph_mut().finalize();
        e.seed_announcement(5, "10.0.0.0/8", false);
        e.seed_announcement(9, "10.0.0.0/8", false);
        e.propagate().unwrap();
        let ribs = e.get_ribs().unwrap();
        let at_1 = ribs.iter().find(|r| r.0 == 1).unwrap();
        assert_eq!(at_1.2, vec![1, 5]);
    }

    #[test]
    fn get_ribs_before_propagate_is_not_run() {
        let mut e = engine();
        e.as_graph_mut().ensure_as(1);
        assert!(matches!(e.get_ribs(), Err(SimError::NotRun)));
    }

    #[test]
    fn no_as_path_contains_a_duplicate_asn() {
        let mut e = engine();
        e.as_graph_mut().add_provider_customer(1, 2);
        e.as_graph_mut().add_provider_customer(2, 3);
        e.as_graph_mut().finalize();
        e.seed_announcement(3, "10.0.0.0/8", false);
        e.propagate().unwrap();
        for (_, _, path) in e.get_ribs().unwrap() {
            let mut seen = HashSet::new();
            assert!(path.iter().all(|asn| seen.insert(*asn)));
        }
    }

    #[test]
    fn determinism_is_independent_of_worker_count() {
        let build = |workers: usize| {
            let mut e = SimulationEngine::new(
                ASGraph::new(),
                PrefixTable::new(),
                EngineConfig {
                    workers,
                    ..EngineConfig::default()
                },
            );
            e.as_graph_mut().add_provider_customer(1, 2);
            e.as_graph_mut().add_provider_customer(1, 3);
            e.as_graph_mut().add_peer(2, 3);
            e.as_graph_mut().finalize();
            e.seed_announcement(2, "10.0.0.0/8", false);
            e.seed_announcement(3, "10.0.0.0/8", false);
            e.propagate().unwrap();
            e.get_ribs().unwrap()
        };
        assert_eq!(build(1), build(4));
    }
}
