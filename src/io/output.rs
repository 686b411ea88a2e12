//! Output writer for Local-RIB snapshots (§6): CSV with header `asn,prefix,as_path`,
//! rows in ascending-ASN-then-ascending-prefix order, `as_path` formatted as
//! `"(a1, a2, …, ak)"`.
//!
//! Grounded on `simulator_wrapper.py`'s `output_ribs`, which writes the same
//! quoted-tuple format by hand rather than through a general CSV writer.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::SimError;
use crate::shared::ASN;

pub fn write_ribs(path: &Path, rows: &[(ASN, String, Vec<ASN>)]) -> Result<(), SimError> {
    let mut out = String::from("asn,prefix,as_path\n");
    for (asn, prefix, as_path) in rows {
        let path_str = as_path
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{asn},{prefix},\"({path_str})\"\n"));
    }

    let mut file = fs::File::create(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    file.write_all(out.as_bytes()).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}
