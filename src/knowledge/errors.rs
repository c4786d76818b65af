//! Knowledge base error types.

use thiserror::Error;

/// Errors raised while loading or querying curated datasets.
///
/// The planner never produces these itself; they come from dataset
/// collaborators and are propagated to the caller unchanged.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// The dataset file does not exist in the data directory.
    #[error("expected dataset '{name}' at {path} was not found; run `poe-kb sync` first")]
    DatasetMissing { name: String, path: String },

    /// The dataset file exists but could not be read.
    #[error("failed to read dataset '{name}': {reason}")]
    DatasetRead { name: String, reason: String },

    /// The dataset file is not valid JSON for the expected shape.
    #[error("failed to parse dataset '{name}': {reason}")]
    DatasetParse { name: String, reason: String },

    /// A domain name passed on the command line is not known.
    #[error("unknown knowledge domain: '{name}'")]
    UnknownDomain { name: String },

    /// Serialization of search results failed.
    #[error("serialization error: {reason}")]
    SerializationError { reason: String },
}

impl From<serde_json::Error> for KnowledgeError {
    fn from(e: serde_json::Error) -> Self {
        KnowledgeError::SerializationError {
            reason: e.to_string(),
        }
    }
}
