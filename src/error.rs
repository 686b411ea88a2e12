//! Error hierarchy for topology construction, propagation, and I/O.

use thiserror::Error;

use crate::shared::ASN;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("propagation did not converge within {cap} rounds during the {phase} phase")]
    OscillationDetected { phase: &'static str, cap: usize },

    #[error("get_ribs() called before propagate()")]
    NotRun,

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input in {path} at line {line}: {reason}")]
    InputFormat {
        path: String,
        line: usize,
        reason: String,
    },
}

impl SimError {
    pub fn invalid_self_loop(asn: ASN) -> SimError {
        SimError::InvalidTopology(format!("AS {asn} cannot be its own neighbor"))
    }

    pub fn invalid_contradiction(a: ASN, b: ASN) -> SimError {
        SimError::InvalidTopology(format!(
            "AS {a} and AS {b} are linked by contradictory relationship codes"
        ))
    }
}
