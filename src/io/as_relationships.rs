//! Loader for the AS-relationships input (§6): pipe-delimited lines,
//! `asn1|asn2|rel|...`. `rel == 0` means asn1 is provider of asn2; `rel == -1`
//! means peers. Malformed lines are skipped and counted, never fatal, unless
//! `strict` is set, in which case a self-loop is a fatal `InvalidTopology`.
//!
//! Grounded on `simulator_wrapper.py`'s `build_as_graph` for the comment/skip
//! semantics and the teacher's `as_graph_generators/caida.rs` for the pipe-split
//! parsing idiom; this crate's rel-code convention follows its own textual
//! specification rather than either of those two files, which disagree with each
//! other on which code means what (see `DESIGN.md`).

use std::fs;
use std::path::Path;

use crate::as_graph::{ASGraph, RelationshipKind};
use crate::error::SimError;
use crate::shared::ASN;

pub fn load_as_relationships(path: &Path, strict: bool) -> Result<ASGraph, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut graph = ASGraph::new();
    let mut skipped = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < 3 {
            skipped += 1;
            continue;
        }

        let (Ok(asn1), Ok(asn2), Ok(rel)) = (
            fields[0].trim().parse::<ASN>(),
            fields[1].trim().parse::<ASN>(),
            fields[2].trim().parse::<i32>(),
        ) else {
            skipped += 1;
            continue;
        };

        if asn1 == asn2 {
            if strict {
                return Err(SimError::invalid_self_loop(asn1));
            }
            skipped += 1;
            continue;
        }

        let kind = match rel {
            0 => RelationshipKind::ProviderCustomer { provider: asn1, customer: asn2 },
            -1 => RelationshipKind::Peer,
            _ => {
                skipped += 1;
                continue;
            }
        };
        graph.add_relationship(asn1, asn2, kind, strict)?;
        let _ = line_no;
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} malformed line(s) in {}", path.display());
    }

    graph.finalize();
    Ok(graph)
}
