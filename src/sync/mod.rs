//! Static data sync: download external datasets into the data directory and
//! record their checksums in a `manifest.json` beside them.

pub mod errors;
pub mod manifest;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{CraftOfExileSettings, RePoESettings};
use crate::craft_of_exile::{CraftOfExileClient, CraftingPlanBuilder};
use crate::repoe::download_repoe_data;

pub use errors::SyncError;
pub use manifest::{compute_sha256, Manifest, ManifestEntry, MANIFEST_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    /// Directory holding `manifest.json`.
    pub root: PathBuf,
    pub written: Vec<ManifestEntry>,
    /// Files left untouched because a cached copy existed.
    pub skipped: Vec<String>,
}

/// Fetch the Craft of Exile bundle into `<output>/<league?>/data.json`.
pub async fn sync_craft_of_exile(
    settings: &CraftOfExileSettings,
    data_dir: &Path,
) -> Result<SyncReport, SyncError> {
    let output_dir = settings.output_dir(data_dir);
    let client = CraftOfExileClient::new(settings.url.clone(), settings.timeout());
    let dataset = client.fetch().await?;

    let target = CraftingPlanBuilder::new(&output_dir, settings.league.clone()).bundle_path();
    CraftOfExileClient::dump_to_path(&dataset, &target, !settings.compact)?;

    let mut manifest = Manifest::load(&output_dir).await?;
    let entry = manifest.record(&output_dir, &target).await?;
    manifest.save(&output_dir).await?;

    tracing::info!(
        path = %target.display(),
        bytes = entry.bytes,
        sha256 = %entry.sha256,
        "craft of exile data written"
    );
    Ok(SyncReport {
        root: output_dir,
        written: vec![entry],
        skipped: Vec::new(),
    })
}

/// Mirror the RePoE export into `<base>/<branch>/<league?>/`.
pub async fn sync_repoe(
    settings: &RePoESettings,
    data_dir: &Path,
    force: bool,
) -> Result<SyncReport, SyncError> {
    let base_path = settings.base_path(data_dir);
    let download = download_repoe_data(
        &base_path,
        &settings.branch,
        settings.league.as_deref(),
        &[],
        force,
    )
    .await?;

    let mut manifest = Manifest::load(&base_path).await?;
    let mut written = Vec::with_capacity(download.written.len());
    for path in &download.written {
        written.push(manifest.record(&base_path, path).await?);
    }
    if !written.is_empty() {
        manifest.save(&base_path).await?;
    }

    Ok(SyncReport {
        root: base_path,
        written,
        skipped: download.skipped,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repoe::{repoe_data_root, DEFAULT_REMOTE_FILES};
    use tempfile::TempDir;

    #[tokio::test]
    async fn repoe_sync_with_cached_files_leaves_manifest_alone() {
        let dir = TempDir::new().unwrap();
        let settings = RePoESettings::default();
        let root = repoe_data_root(&settings.base_path(dir.path()), &settings.branch, None);
        std::fs::create_dir_all(&root).unwrap();
        for (logical, _) in DEFAULT_REMOTE_FILES {
            std::fs::write(root.join(format!("{logical}.json")), "{}").unwrap();
        }

        let report = sync_repoe(&settings, dir.path(), false).await.unwrap();
        assert_eq!(report.root, dir.path().join("repoe"));
        assert!(report.written.is_empty());
        assert_eq!(report.skipped.len(), DEFAULT_REMOTE_FILES.len());
        assert!(!report.root.join(MANIFEST_FILE_NAME).exists());
    }
}
