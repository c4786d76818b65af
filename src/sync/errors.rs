//! Static data sync error types.

use thiserror::Error;

use crate::craft_of_exile::CraftOfExileError;
use crate::repoe::RePoEError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("craft of exile sync failed: {0}")]
    CraftOfExile(#[from] CraftOfExileError),

    #[error("RePoE sync failed: {0}")]
    RePoE(#[from] RePoEError),

    #[error("i/o error at {path}: {reason}")]
    Io { path: String, reason: String },

    /// The existing manifest could not be read back.
    #[error("invalid manifest at {path}: {reason}")]
    Manifest { path: String, reason: String },
}
