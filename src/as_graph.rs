//! The topology store: ASes, their customer/provider/peer relationships, and the
//! propagation ranks used to schedule propagation phases.
//!
//! Represented as a dense map keyed by ASN (see `SPEC_FULL.md` §9): no
//! self-referential or lifetime-carrying neighbor pointers, just `Vec<ASN>`
//! neighbor lists looked up through the map. This mirrors the teacher's flat
//! `as_graph.rs`, not the nested tree's `unsafe`, `Box::into_raw`-based duplicate.

use std::collections::BTreeMap;

use crate::error::SimError;
use crate::policy::Policy;
use crate::shared::ASN;

/// A relationship between two ASes, in the pair-order it was declared (i.e.
/// `ProviderCustomer { provider, customer }` records which side is which).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    Peer,
    ProviderCustomer { provider: ASN, customer: ASN },
}

#[derive(Debug, Clone)]
pub struct AS {
    pub asn: ASN,
    pub customers: Vec<ASN>,
    pub providers: Vec<ASN>,
    pub peers: Vec<ASN>,
    pub policy: Policy,
    pub propagation_rank: Option<u32>,
}

impl AS {
    fn new(asn: ASN) -> Self {
        AS {
            asn,
            customers: Vec::new(),
            providers: Vec::new(),
            peers: Vec::new(),
            policy: Policy::DefaultBgp,
            propagation_rank: None,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.customers.is_empty() && self.peers.is_empty() && self.providers.len() <= 1
    }
}

/// The AS-level topology. Built once by the loaders in `io/`, immutable during
/// propagation.
#[derive(Debug, Default)]
pub struct ASGraph {
    nodes: BTreeMap<ASN, AS>,
}

impl ASGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&mut self, asn: ASN) -> &mut AS {
        self.nodes.entry(asn).or_insert_with(|| AS::new(asn))
    }

    /// Registers an AS with no relationships yet, e.g. a stub created for an ASN
    /// that only appears in the ROV-ASNs input (§4.4 "Seed handling").
    pub fn ensure_as(&mut self, asn: ASN) {
        self.get_or_create(asn);
    }

    /// `provider` is provider of `customer`. Idempotent; rejects `provider ==
    /// customer` as a no-op (callers that want that to be a hard error check for
    /// it themselves before calling, per the `--strict-topology` flag). A thin
    /// non-strict wrapper over [`ASGraph::add_relationship`]; a contradictory
    /// prior peer edge between the two is silently overwritten.
    pub fn add_provider_customer(&mut self, provider: ASN, customer: ASN) {
        let _ = self.add_relationship(
            provider,
            customer,
            RelationshipKind::ProviderCustomer { provider, customer },
            false,
        );
    }

    /// `a` and `b` are peers. Idempotent; rejects `a == b` as a no-op. A thin
    /// non-strict wrapper over [`ASGraph::add_relationship`]; a contradictory
    /// prior provider/customer edge between the two is silently overwritten.
    pub fn add_peer(&mut self, a: ASN, b: ASN) {
        let _ = self.add_relationship(a, b, RelationshipKind::Peer, false);
    }

    /// The relationship kind currently recorded between `a` and `b`, if any.
    /// The three neighbor sets of a single AS are kept pairwise disjoint (§3),
    /// so at most one of `peers`/`customers`/`providers` can mention the other
    /// side at a time; this just reads off whichever one it is.
    fn existing_relationship(&self, a: ASN, b: ASN) -> Option<RelationshipKind> {
        let node = self.nodes.get(&a)?;
        if node.peers.contains(&b) {
            Some(RelationshipKind::Peer)
        } else if node.customers.contains(&b) {
            Some(RelationshipKind::ProviderCustomer { provider: a, customer: b })
        } else if node.providers.contains(&b) {
            Some(RelationshipKind::ProviderCustomer { provider: b, customer: a })
        } else {
            None
        }
    }

    /// Tears down the edge between `a` and `b` on both sides, whichever kind it
    /// is.
    fn remove_relationship(&mut self, a: ASN, b: ASN, kind: RelationshipKind) {
        match kind {
            RelationshipKind::Peer => {
                if let Some(node) = self.nodes.get_mut(&a) {
                    node.peers.retain(|&x| x != b);
                }
                if let Some(node) = self.nodes.get_mut(&b) {
                    node.peers.retain(|&x| x != a);
                }
            }
            RelationshipKind::ProviderCustomer { provider, customer } => {
                if let Some(node) = self.nodes.get_mut(&provider) {
                    node.customers.retain(|&x| x != customer);
                }
                if let Some(node) = self.nodes.get_mut(&customer) {
                    node.providers.retain(|&x| x != provider);
                }
            }
        }
    }

    /// Records a relationship between `a` and `b`, creating either AS if
    /// missing. Idempotent for a repeated identical relationship. Rejects
    /// `a == b` as a silent no-op, matching `add_provider_customer`/`add_peer`.
    ///
    /// If `a` and `b` already hold a *different* relationship kind, this is a
    /// contradiction (§3, §7): in non-strict mode the old edge is torn down and
    /// the new one wins ("last write wins"); in strict mode this returns
    /// [`SimError::invalid_contradiction`] and leaves the graph unchanged.
    pub fn add_relationship(
        &mut self,
        a: ASN,
        b: ASN,
        kind: RelationshipKind,
        strict: bool,
    ) -> Result<(), SimError> {
        if a == b {
            return Ok(());
        }

        if let Some(existing) = self.existing_relationship(a, b) {
            if existing == kind {
                return Ok(());
            }
            if strict {
                return Err(SimError::invalid_contradiction(a, b));
            }
            self.remove_relationship(a, b, existing);
        }

        self.get_or_create(a);
        self.get_or_create(b);
        match kind {
            RelationshipKind::Peer => {
                let a_node = self.nodes.get_mut(&a).unwrap();
                if !a_node.peers.contains(&b) {
                    a_node.peers.push(b);
                }
                let b_node = self.nodes.get_mut(&b).unwrap();
                if !b_node.peers.contains(&a) {
                    b_node.peers.push(a);
                }
            }
            RelationshipKind::ProviderCustomer { provider, customer } => {
                let provider_node = self.nodes.get_mut(&provider).unwrap();
                if !provider_node.customers.contains(&customer) {
                    provider_node.customers.push(customer);
                }
                let customer_node = self.nodes.get_mut(&customer).unwrap();
                if !customer_node.providers.contains(&provider) {
                    customer_node.providers.push(provider);
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, asn: ASN) -> Option<&AS> {
        self.nodes.get(&asn)
    }

    pub fn get_mut(&mut self, asn: ASN) -> Option<&mut AS> {
        self.nodes.get_mut(&asn)
    }

    pub fn contains(&self, asn: ASN) -> bool {
        self.nodes.contains_key(&asn)
    }

    pub fn set_policy(&mut self, asn: ASN, policy: Policy) {
        if let Some(node) = self.nodes.get_mut(&asn) {
            node.policy = policy;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ascending-ASN order, used for deterministic propagation and output (§4.1).
    pub fn iter_ases(&self) -> impl Iterator<Item = &AS> {
        self.nodes.values()
    }

    pub fn asns(&self) -> impl Iterator<Item = ASN> + '_ {
        self.nodes.keys().copied()
    }

    /// Sorts and dedups every AS's neighbor lists. Call once after all
    /// relationships have been loaded.
    pub fn finalize(&mut self) {
        for node in self.nodes.values_mut() {
            node.customers.sort_unstable();
            node.customers.dedup();
            node.providers.sort_unstable();
            node.providers.dedup();
            node.peers.sort_unstable();
            node.peers.dedup();
        }
        self.assign_propagation_ranks();
    }

    /// Rank 0: no providers. Rank k+1: every unranked AS whose providers are all
    /// ranked <= k. A provider cycle would otherwise starve this loop forever;
    /// the fallback folds any still-unranked remainder into one final rank so
    /// topology construction always terminates (the propagation engine's own
    /// round-cap is the real backstop against cyclic-dependency pathologies, not
    /// this scheduling hint).
    fn assign_propagation_ranks(&mut self) {
        for node in self.nodes.values_mut() {
            node.propagation_rank = None;
        }

        let mut rank: u32 = 0;
        let mut remaining: usize = self.nodes.len();
        while remaining > 0 {
            let newly_ranked: Vec<ASN> = self
                .nodes
                .values()
                .filter(|n| n.propagation_rank.is_none())
                .filter(|n| {
                    n.providers
                        .iter()
                        .all(|p| self.nodes.get(p).and_then(|pn| pn.propagation_rank).is_some())
                })
                .map(|n| n.asn)
                .collect();

            if newly_ranked.is_empty() {
                // Cycle among providers: break the stall by ranking everything
                // still unranked at once.
                let leftover: Vec<ASN> = self
                    .nodes
                    .values()
                    .filter(|n| n.propagation_rank.is_none())
                    .map(|n| n.asn)
                    .collect();
                for asn in &leftover {
                    self.nodes.get_mut(asn).unwrap().propagation_rank = Some(rank);
                }
                remaining -= leftover.len();
                break;
            }

            for asn in &newly_ranked {
                self.nodes.get_mut(asn).unwrap().propagation_rank = Some(rank);
            }
            remaining -= newly_ranked.len();
            rank += 1;
        }
    }

    pub fn max_propagation_rank(&self) -> u32 {
        self.nodes
            .values()
            .filter_map(|n| n.propagation_rank)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_customer_edge_is_bidirectional() {
        let mut g = ASGraph::new();
        g.add_provider_customer(1, 2);
        assert_eq!(g.get(1).unwrap().customers, vec![2]);
        assert_eq!(g.get(2).unwrap().providers, vec![1]);
    }

    #[test]
    fn peer_edge_is_symmetric() {
        let mut g = ASGraph::new();
        g.add_peer(1, 2);
        assert_eq!(g.get(1).unwrap().peers, vec![2]);
        assert_eq!(g.get(2).unwrap().peers, vec![1]);
    }

    #[test]
    fn self_loop_is_a_no_op() {
        let mut g = ASGraph::new();
        g.add_provider_customer(1, 1);
        assert!(g.get(1).unwrap().customers.is_empty());
        assert!(g.get(1).unwrap().providers.is_empty());
    }

    #[test]
    fn adding_the_same_edge_twice_does_not_duplicate() {
        let mut g = ASGraph::new();
        g.add_provider_customer(1, 2);
        g.add_provider_customer(1, 2);
        g.finalize();
        assert_eq!(g.get(1).unwrap().customers, vec![2]);
    }

    #[test]
    fn ranks_respect_provider_chain() {
        let mut g = ASGraph::new();
        g.add_provider_customer(1, 2);
        g.add_provider_customer(2, 3);
        g.finalize();
        assert_eq!(g.get(1).unwrap().propagation_rank, Some(0));
        assert_eq!(g.get(2).unwrap().propagation_rank, Some(1));
        assert_eq!(g.get(3).unwrap().propagation_rank, Some(2));
    }

    #[test]
    fn iter_ases_is_ascending() {
        let mut g = ASGraph::new();
        g.add_provider_customer(5, 6);
        g.ensure_as(1);
        let order: Vec<ASN> = g.iter_ases().map(|a| a.asn).collect();
        assert_eq!(order, vec![1, 5, 6]);
    }

    #[test]
    fn a_contradictory_relationship_is_rejected_under_strict_mode() {
        let mut g = ASGraph::new();
        g.add_provider_customer(1, 2);
        let err = g
            .add_relationship(1, 2, RelationshipKind::Peer, true)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidTopology(_)));
        // the graph is left untouched by the rejected write.
        assert_eq!(g.get(1).unwrap().customers, vec![2]);
        assert!(g.get(1).unwrap().peers.is_empty());
    }

    #[test]
    fn a_contradictory_relationship_overwrites_the_old_one_by_default() {
        let mut g = ASGraph::new();
        g.add_provider_customer(1, 2);
        g.add_peer(1, 2);

        assert!(g.get(1).unwrap().customers.is_empty());
        assert!(g.get(2).unwrap().providers.is_empty());
        assert_eq!(g.get(1).unwrap().peers, vec![2]);
        assert_eq!(g.get(2).unwrap().peers, vec![1]);
    }

    #[test]
    fn reversing_provider_and_customer_is_also_a_contradiction() {
        let mut g = ASGraph::new();
        g.add_provider_customer(1, 2);
        g.add_provider_customer(2, 1);

        assert!(g.get(1).unwrap().customers.is_empty());
        assert!(g.get(2).unwrap().providers.is_empty());
        assert_eq!(g.get(2).unwrap().customers, vec![1]);
        assert_eq!(g.get(1).unwrap().providers, vec![2]);
    }
}
