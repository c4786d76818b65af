//! RePoE export error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RePoEError {
    /// The export directory does not exist.
    #[error("RePoE export not found in {path}; run `poe-kb sync --repoe` first")]
    ExportMissing { path: String },

    /// None of the candidate file names exist in the export directory.
    #[error("unable to find any of [{}] in {root}", candidates.join(", "))]
    FileMissing { root: String, candidates: Vec<String> },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("unknown base item '{name}'")]
    UnknownBase { name: String },

    #[error("base item name '{name}' is ambiguous: {}. Use the metadata id.", ids.join(", "))]
    AmbiguousBase { name: String, ids: Vec<String> },

    #[error("unknown mod '{name}'")]
    UnknownMod { name: String },

    /// `candidates` holds at most five ids, with a trailing `…` when more exist.
    #[error("mod name '{name}' is ambiguous (candidates: {}). Use the internal id.", candidates.join(", "))]
    AmbiguousMod { name: String, candidates: Vec<String> },

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("http client error: {reason}")]
    Client { reason: String },
}
