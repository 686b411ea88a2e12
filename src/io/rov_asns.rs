//! Loader for the ROV-ASNs input (§6): one ASN per line; blank lines and lines
//! starting with `#` are ignored. Malformed lines are skipped and counted.

use std::fs;
use std::path::Path;

use crate::error::SimError;
use crate::shared::ASN;

pub fn load_rov_asns(path: &Path) -> Result<Vec<ASN>, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut asns = Vec::new();
    let mut skipped = 0usize;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<ASN>() {
            Ok(asn) => asns.push(asn),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} malformed line(s) in {}", path.display());
    }

    Ok(asns)
}
