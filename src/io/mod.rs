//! External interface adapters (§6): hand-rolled parsers for the AS-relationships,
//! announcements, and ROV-ASNs inputs, and the output CSV writer.
//!
//! No crate in this codebase's retrieval pack depends on the `csv` crate, so these
//! loaders are small line/field parsers in the same style as the pipe-delimited
//! topology format they all ultimately derive from — consistent with this
//! project's existing preference for dependency-free parsing of fully-controlled,
//! simple formats.

pub mod announcements;
pub mod as_relationships;
pub mod output;
pub mod rov_asns;

pub use announcements::{load_announcements, SeedRecord};
pub use as_relationships::load_as_relationships;
pub use output::write_ribs;
pub use rov_asns::load_rov_asns;
