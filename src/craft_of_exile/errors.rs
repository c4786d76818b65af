//! Craft of Exile error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CraftOfExileError {
    /// Every candidate URL failed.
    #[error("unable to download craft of exile bundle ({})", attempts.join("; "))]
    DownloadFailed { attempts: Vec<String> },

    /// The downloaded bundle is not valid JSON.
    #[error("craft of exile payload is not valid JSON: {reason}")]
    InvalidPayload { reason: String },

    /// No cached bundle at the expected path.
    #[error("craft of exile dataset not found at {path}")]
    NotFound { path: String },

    /// The cached bundle exists but is not valid JSON.
    #[error("craft of exile cache at {path} is not valid JSON: {reason}")]
    InvalidCache { path: String, reason: String },

    #[error("i/o error at {path}: {reason}")]
    Io { path: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("http client error: {reason}")]
    Client { reason: String },
}
