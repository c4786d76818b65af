//! `manifest.json`: checksum and size of every synced file.

use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use super::errors::SyncError;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the manifest's directory, `/`-separated.
    pub file: String,
    pub sha256: String,
    pub bytes: u64,
    pub fetched_at: DateTime<Utc>,
}

/// Entries kept sorted by `file`; one entry per file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    pub async fn load(dir: &Path) -> Result<Self, SyncError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| SyncError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| SyncError::Manifest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn save(&self, dir: &Path) -> Result<(), SyncError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let io_error = |e: std::io::Error| SyncError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        let mut rendered = serde_json::to_string_pretty(self).map_err(|e| SyncError::Manifest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        rendered.push('\n');
        tokio::fs::write(&path, rendered).await.map_err(io_error)
    }

    pub fn get(&self, file: &str) -> Option<&ManifestEntry> {
        self.files.iter().find(|entry| entry.file == file)
    }

    pub fn upsert(&mut self, entry: ManifestEntry) {
        match self.files.iter_mut().find(|known| known.file == entry.file) {
            Some(known) => *known = entry,
            None => {
                self.files.push(entry);
                self.files.sort_by(|a, b| a.file.cmp(&b.file));
            }
        }
    }

    /// Hash `path` and record it relative to `dir`.
    pub async fn record(&mut self, dir: &Path, path: &Path) -> Result<ManifestEntry, SyncError> {
        let (sha256, bytes) = compute_sha256(path).await?;
        let entry = ManifestEntry {
            file: relative_name(dir, path),
            sha256,
            bytes,
            fetched_at: Utc::now(),
        };
        tracing::debug!(file = %entry.file, sha256 = %entry.sha256, bytes, "recorded manifest entry");
        self.upsert(entry.clone());
        Ok(entry)
    }
}

fn relative_name(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// SHA-256 (lower-case hex) and size of a file, read in 8 KB chunks.
pub async fn compute_sha256(path: &Path) -> Result<(String, u64), SyncError> {
    let io_error = |e: std::io::Error| SyncError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];
    let mut total: u64 = 0;
    loop {
        let bytes_read = file.read(&mut buffer).await.map_err(io_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((format!("{:x}", hasher.finalize()), total))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
