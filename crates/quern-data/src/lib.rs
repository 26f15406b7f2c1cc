//! Script-file parsing pipeline: raw text → block extraction → line
//! classification → typed records.
//!
//! Data flows one direction. Each source file is read fully into
//! memory, parsed start-to-finish, and merged into the cumulative
//! tables in [`quern_core::registry::ScriptData`]; nothing downstream
//! mutates parser output. Malformed input degrades to recorded
//! anomalies, never a failed parse -- only a missing/unreadable file is
//! an error, and only for that file.

pub mod construction;
pub mod error;
pub mod loader;
pub mod module_parser;
pub mod options;
pub mod recipe_parser;

pub use error::ScriptError;
pub use loader::{BatchOutcome, parse_file, parse_files, parse_str};
pub use options::{Localizer, ParseOptions};

use quern_core::registry::{Anomaly, AnomalyKind};

/// Record an anomaly and mirror it to the log. Unrecognized lines are
/// routine leftovers of comment stripping and log at debug; everything
/// else warns.
pub(crate) fn note(anomalies: &mut Vec<Anomaly>, kind: AnomalyKind, context: String) {
    match kind {
        AnomalyKind::UnrecognizedLine => tracing::debug!(%kind, "{context}"),
        _ => tracing::warn!(%kind, "{context}"),
    }
    anomalies.push(Anomaly::new(kind, context));
}
