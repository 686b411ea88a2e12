//! The announcement model: the unit of routing information exchanged between ASes.

use crate::prefix::PrefixId;
use crate::shared::{Relationships, ASN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub prefix: PrefixId,
    /// Leftmost = most recent hop, rightmost = origin.
    pub as_path: Vec<ASN>,
    pub next_hop_asn: ASN,
    pub received_from_relation: Relationships,
    pub rov_invalid: bool,
}

impl Announcement {
    /// Builds the seed announcement installed directly into an origin AS's
    /// Local-RIB (§4.4 "Seed handling").
    pub fn seed(origin_asn: ASN, prefix: PrefixId, rov_invalid: bool) -> Self {
        Announcement {
            prefix,
            as_path: vec![origin_asn],
            next_hop_asn: origin_asn,
            received_from_relation: Relationships::Origin,
            rov_invalid,
        }
    }

    /// Builds the announcement `receiver_asn` stores in its own Local-RIB after
    /// accepting `self` as advertised by `exporter_asn`. `self` is the
    /// announcement exactly as held in the exporter's own Local-RIB — its
    /// `as_path` already starts with `exporter_asn` from when the exporter
    /// itself accepted the route, so transmission does not touch it; only
    /// acceptance prepends a hop, which is why this constructor takes the
    /// *receiver's* ASN to prepend, not the exporter's (§4.4 "Exporting a
    /// route").
    pub fn received_by(
        &self,
        receiver_asn: ASN,
        exporter_asn: ASN,
        received_from_relation: Relationships,
    ) -> Announcement {
        let mut as_path = Vec::with_capacity(self.as_path.len() + 1);
        as_path.push(receiver_asn);
        as_path.extend_from_slice(&self.as_path);
        Announcement {
            prefix: self.prefix,
            as_path,
            next_hop_asn: exporter_asn,
            received_from_relation,
            rov_invalid: self.rov_invalid,
        }
    }

    pub fn path_len(&self) -> usize {
        self.as_path.len()
    }

    pub fn contains_asn(&self, asn: ASN) -> bool {
        self.as_path.contains(&asn)
    }
}


#[cfg(test)]
impl PrefixId {
    /// Test-only helper; production code always obtains a `PrefixId` from a
    /// `PrefixTable`.
    pub(crate) fn default_for_test() -> Self {
        let mut table = crate::prefix::PrefixTable::new();
        table.intern("10.0.0.0/8")
    }
}
