//! Result types returned by a vault conversion.
//!
//! Everything here is `Serialize + Deserialize` so the CLI can print a run
//! as JSON (`--json`) and callers can persist a report.

use crate::registry::NodeId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One converted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Document title (output file stem).
    pub name: String,
    /// Source path relative to the input root.
    pub source: PathBuf,
    /// Output path relative to the output root.
    pub output: PathBuf,
    /// ID written into the property drawer.
    pub id: NodeId,
    /// Wall-clock time of this job in milliseconds.
    pub duration_ms: u64,
}

/// Links rewritten in one output file during the relink pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelinkResult {
    /// Output path relative to the output root.
    pub path: PathBuf,
    /// Links replaced by `id:` links.
    pub resolved: usize,
    /// Link candidates left as they were.
    pub unresolved: usize,
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Markdown notes converted.
    pub documents: usize,
    /// Non-Markdown files copied.
    pub assets_copied: usize,
    /// Org files visited by the relink pass.
    pub files_relinked: usize,
    /// Total links resolved to IDs.
    pub links_resolved: usize,
    /// Total link candidates left unresolved.
    pub links_unresolved: usize,
    /// Wall-clock time of the whole run.
    pub total_duration_ms: u64,
    /// Time spent in the conversion phase (asset copy + worker pool).
    pub convert_duration_ms: u64,
    /// Time spent in the relink pass.
    pub relink_duration_ms: u64,
}

/// Complete report of a vault conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Converted notes in completion order.
    pub documents: Vec<DocumentResult>,
    /// Copied assets, relative to the output root.
    pub assets: Vec<PathBuf>,
    /// Relink results in output walk order.
    pub relinked: Vec<RelinkResult>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// The converted note whose source is `relative`, if any.
    pub fn document(&self, relative: impl Into<PathBuf>) -> Option<&DocumentResult> {
        let relative = relative.into();
        self.documents.iter().find(|d| d.source == relative)
    }
}
