//! The Local-RIB: per-AS, per-prefix best-selected announcement.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::announcement::Announcement;
use crate::policy::compare_announcements;
use crate::prefix::PrefixId;

#[derive(Debug, Default)]
pub struct LocalRib {
    best: HashMap<PrefixId, Announcement>,
}

impl LocalRib {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prefix: PrefixId) -> Option<&Announcement> {
        self.best.get(&prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PrefixId, &Announcement)> {
        self.best.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Installs `candidate` as the seed route for its prefix, unconditionally
    /// (§4.4 "Seed handling": last-write-wins on duplicate seeds — this is just a
    /// map insert).
    pub fn seed(&mut self, candidate: Announcement) {
        self.best.insert(candidate.prefix, candidate);
    }

    /// Offers `candidate` as a newly received route. Returns `true` if it became
    /// (or remained distinctly equal to) the new incumbent, meaning this AS now
    /// has something new to export next round. The incumbent wins ties (§4.3).
    pub fn offer(&mut self, candidate: Announcement) -> bool {
        match self.best.get(&candidate.prefix) {
            None => {
                self.best.insert(candidate.prefix, candidate);
                true
            }
            Some(incumbent) => {
                if compare_announcements(&candidate, incumbent) == Ordering::Greater {
                    self.best.insert(candidate.prefix, candidate);
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix::PrefixTable;
    use crate::shared::Relationships;

    fn ann(prefix: PrefixId, path: Vec<u32>, relation: Relationships) -> Announcement {
        let next_hop = *path.first().unwrap();
        Announcement {
            prefix,
            as_path: path,
            next_hop_asn: next_hop,
            received_from_relation: relation,
            rov_invalid: false,
        }
    }

    #[test]
    fn first_offer_is_always_accepted() {
        let mut table = PrefixTable::new();
        let p = table.intern("10.0.0.0/8");
        let mut rib = LocalRib::new();
        assert!(rib.offer(ann(p, vec![1], Relationships::Customer)));
        assert!(rib.get(p).is_some());
    }

    #[test]
    fn worse_offer_does_not_replace_incumbent() {
        let mut table = PrefixTable::new();
        let p = table.intern("10.0.0.0/8");
        let mut rib = LocalRib::new();
        rib.offer(ann(p, vec![1], Relationships::Customer));
        let replaced = rib.offer(ann(p, vec![2], Relationships::Peer));
        assert!(!replaced);
        assert_eq!(rib.get(p).unwrap().next_hop_asn, 1);
    }

    #[test]
    fn better_offer_replaces_incumbent() {
        let mut table = PrefixTable::new();
        let p = table.intern("10.0.0.0/8");
        let mut rib = LocalRib::new();
        rib.offer(ann(p, vec![2], Relationships::Peer));
        let replaced = rib.offer(ann(p, vec![1], Relationships::Customer));
        assert!(replaced);
        assert_eq!(rib.get(p).unwrap().next_hop_asn, 1);
    }
}
