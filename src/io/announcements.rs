//! Loader for the seed-announcements input (§6): CSV with a header row and
//! required columns `seed_asn`, `prefix`, `rov_invalid`.
//!
//! Hand-parsed by splitting on commas, matching this codebase's existing
//! preference (see `io/mod.rs`) for small dependency-free parsers over a general
//! CSV crate — none of the three columns can legitimately contain a comma.
//! Grounded on `simulator_wrapper.py`'s `seed_announcements`, which reads the
//! same three columns via `csv.DictReader`.

use std::fs;
use std::path::Path;

use crate::error::SimError;
use crate::shared::ASN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRecord {
    pub seed_asn: ASN,
    pub prefix: String,
    pub rov_invalid: bool,
}

pub fn load_announcements(path: &Path) -> Result<Vec<SeedRecord>, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut lines = text.lines().enumerate();
    let (header_line_no, header) = lines.next().ok_or_else(|| SimError::InputFormat {
        path: path.display().to_string(),
        line: 0,
        reason: "file is empty, expected a header row".to_string(),
    })?;

    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();
    let find_column = |name: &str| columns.iter().position(|c| c == name);
    let (Some(asn_col), Some(prefix_col), Some(rov_col)) = (
        find_column("seed_asn"),
        find_column("prefix"),
        find_column("rov_invalid"),
    ) else {
        return Err(SimError::InputFormat {
            path: path.display().to_string(),
            line: header_line_no + 1,
            reason: "header must contain seed_asn, prefix, and rov_invalid columns".to_string(),
        });
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (idx, line) in lines {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let needed = asn_col.max(prefix_col).max(rov_col) + 1;
        if fields.len() < needed {
            log::warn!("skipping malformed line {line_no} in {}", path.display());
            skipped += 1;
            continue;
        }

        let seed_asn = match fields[asn_col].trim().parse::<ASN>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("skipping line {line_no}: unparseable seed_asn");
                skipped += 1;
                continue;
            }
        };
        let prefix = fields[prefix_col].trim().to_string();
        let rov_invalid = match fields[rov_col].trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => {
                log::warn!("skipping line {line_no}: unparseable rov_invalid");
                skipped += 1;
                continue;
            }
        };

        records.push(SeedRecord {
            seed_asn,
            prefix,
            rov_invalid,
        });
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} malformed row(s) in {}", path.display());
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "announcements-test-{}.csv",
            std::process::id() as u64 * 1000 + contents.len() as u64
        ));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_valid_rows() {
        let path = write_temp("seed_asn,prefix,rov_invalid\n1,10.0.0.0/8,false\n2,10.0.0.0/8,TRUE\n");
        let records = load_announcements(&path).unwrap();
        assert_eq!(
            records,
            vec![
                SeedRecord {
                    seed_asn: 1,
                    prefix: "10.0.0.0/8".to_string(),
                    rov_invalid: false
                },
                SeedRecord {
                    seed_asn: 2,
                    prefix: "10.0.0.0/8".to_string(),
                    rov_invalid: true
                },
            ]
        );
        fs::remove_file(&path).ok();
    }

    #[test]
    fn header_order_is_not_assumed() {
        let path = write_temp("rov_invalid,prefix,seed_asn\nfalse,10.0.0.0/8,1\n");
        let records = load_announcements(&path).unwrap();
        assert_eq!(records[0].seed_asn, 1);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_column_is_a_fatal_input_format_error() {
        let path = write_temp("seed_asn,prefix\n1,10.0.0.0/8\n");
        let err = load_announcements(&path).unwrap_err();
        assert!(matches!(err, SimError::InputFormat { .. }));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let path = write_temp(
            "seed_asn,prefix,rov_invalid\nnot-a-number,10.0.0.0/8,false\n1,10.0.0.0/8,false\n",
        );
        let records = load_announcements(&path).unwrap();
        assert_eq!(records.len(), 1);
        fs::remove_file(&path).ok();
    }
}
