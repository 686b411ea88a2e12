//! The policy layer: per-AS accept filtering and the Gao-Rexford route-selection
//! ordering.
//!
//! Modeled as a tagged enum rather than a trait-object hierarchy (`SPEC_FULL.md`
//! §9) — there are exactly two policies, and their accept rules differ by one
//! check, so a `Box<dyn PolicyExtension>` per AS (the teacher's approach in
//! `policies.rs`) buys nothing but an extra allocation and a vtable indirection
//! per AS.

use std::cmp::Ordering;

use crate::announcement::Announcement;
use crate::shared::{Relationships, ASN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    DefaultBgp,
    Rov,
}

impl Policy {
    /// Whether `receiving_asn` accepts `ann` on import (§4.2).
    pub fn accept(self, receiving_asn: ASN, ann: &Announcement) -> bool {
        if ann.contains_asn(receiving_asn) {
            return false;
        }
        match self {
            Policy::DefaultBgp => true,
            Policy::Rov => !ann.rov_invalid,
        }
    }
}

/// Gao-Rexford local-preference rank: higher is more preferred. Origin routes are
/// treated as customer-class (§4.3: "Origin routes at the owning AS are treated
/// as customer-class").
fn relationship_rank(relation: Relationships) -> u8 {
    match relation {
        Relationships::Customer | Relationships::Origin => 3,
        Relationships::Peer => 2,
        Relationships::Provider => 1,
    }
}

/// Compares two candidate routes for the same prefix at the same AS using the
/// strict ordering of §4.3: relationship class, then path length, then lowest
/// next-hop ASN. `Ordering::Greater` means `a` is preferred over `b`.
pub fn compare_announcements(a: &Announcement, b: &Announcement) -> Ordering {
    relationship_rank(a.received_from_relation)
        .cmp(&relationship_rank(b.received_from_relation))
        .then_with(|| b.path_len().cmp(&a.path_len()))
        .then_with(|| b.next_hop_asn.cmp(&a.next_hop_asn))
}

/// Whether a route received over `received_from` may be exported to a neighbor
/// that is a `export_to` to the exporting AS (§4.4 export-eligibility table).
pub fn may_export(received_from: Relationships, export_to: Relationships) -> bool {
    match received_from {
        Relationships::Origin | Relationships::Customer => true,
        Relationships::Peer | Relationships::Provider => export_to == Relationships::Customer,
    }
}
