//! Mirror the RePoE export files we use from GitHub.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;

use crate::knowledge::loader::sorted_keys;

use super::data::repoe_data_root;
use super::errors::RePoEError;

pub const REPOE_REPOSITORY: &str = "https://raw.githubusercontent.com/brather1ng/RePoE";
const REPOE_DATA_DIR: &str = "RePoE/data";

/// Logical dataset name → file inside the upstream repository.
pub const DEFAULT_REMOTE_FILES: &[(&str, &str)] = &[
    ("mods", "mods.min.json"),
    ("master_mods", "crafting_bench_options.min.json"),
    ("item_bases", "base_items.min.json"),
    ("tags", "tags.min.json"),
    ("mod_types", "mod_types.min.json"),
];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);
const USER_AGENT: &str = concat!("poe-craft-kb/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RePoEDownload {
    pub root: PathBuf,
    /// Files written during this run.
    pub written: Vec<PathBuf>,
    /// Logical names left alone because a cached copy existed.
    pub skipped: Vec<String>,
}

pub fn remote_url(branch: &str, remote_name: &str) -> String {
    format!("{REPOE_REPOSITORY}/{branch}/{REPOE_DATA_DIR}/{remote_name}")
}

/// Default file table with `overrides` applied; new logical names are appended.
pub fn remote_files(overrides: &[(String, String)]) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = DEFAULT_REMOTE_FILES
        .iter()
        .map(|(logical, remote)| (logical.to_string(), remote.to_string()))
        .collect();
    for (logical, remote) in overrides {
        match files.iter_mut().find(|(known, _)| known == logical) {
            Some(entry) => entry.1 = remote.clone(),
            None => files.push((logical.clone(), remote.clone())),
        }
    }
    files
}

/// Download the export into `<base>/<branch>/<league?>/<logical>.json`.
///
/// Existing files are kept unless `force` is set. Each file is re-serialised
/// with sorted keys so diffs between syncs stay readable.
pub async fn download_repoe_data(
    base_path: &Path,
    branch: &str,
    league: Option<&str>,
    overrides: &[(String, String)],
    force: bool,
) -> Result<RePoEDownload, RePoEError> {
    let root = repoe_data_root(base_path, branch, league);
    tokio::fs::create_dir_all(&root)
        .await
        .map_err(|e| RePoEError::Write {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(DOWNLOAD_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| RePoEError::Client {
            reason: e.to_string(),
        })?;

    let mut report = RePoEDownload {
        root: root.clone(),
        ..Default::default()
    };

    for (logical, remote) in remote_files(overrides) {
        let local_path = root.join(format!("{logical}.json"));
        if local_path.exists() && !force {
            tracing::debug!(file = %logical, "skipping RePoE file (already cached)");
            report.skipped.push(logical);
            continue;
        }

        let url = remote_url(branch, &remote);
        tracing::info!(file = %logical, url = %url, "downloading RePoE file");
        let body = fetch_body(&http, &url).await?;
        let payload: Value = serde_json::from_slice(&body).map_err(|e| RePoEError::Parse {
            path: url.clone(),
            reason: e.to_string(),
        })?;

        let mut rendered =
            serde_json::to_string_pretty(&sorted_keys(&payload)).map_err(|e| RePoEError::Parse {
                path: url.clone(),
                reason: e.to_string(),
            })?;
        rendered.push('\n');
        tokio::fs::write(&local_path, rendered)
            .await
            .map_err(|e| RePoEError::Write {
                path: local_path.display().to_string(),
                reason: e.to_string(),
            })?;
        report.written.push(local_path);
    }

    tracing::info!(
        root = %report.root.display(),
        written = report.written.len(),
        skipped = report.skipped.len(),
        "RePoE sync finished"
    );
    Ok(report)
}

async fn fetch_body(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, RePoEError> {
    let download_error = |reason: String| RePoEError::Download {
        url: url.to_string(),
        reason,
    };

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| download_error(e.to_string()))?;
    if !response.status().is_success() {
        return Err(download_error(format!("HTTP {}", response.status())));
    }

    let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| download_error(e.to_string()))?;
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn remote_url_points_into_data_dir() {
        assert_eq!(
            remote_url("master", "mods.min.json"),
            "https://raw.githubusercontent.com/brather1ng/RePoE/master/RePoE/data/mods.min.json"
        );
    }

    #[test]
    fn overrides_replace_or_extend_defaults() {
        let files = remote_files(&[
            ("mods".into(), "mods.json".into()),
            ("stats".into(), "stat_translations.min.json".into()),
        ]);
        assert_eq!(files.len(), DEFAULT_REMOTE_FILES.len() + 1);
        assert_eq!(files[0], ("mods".to_string(), "mods.json".to_string()));
        assert_eq!(files.last().unwrap().0, "stats");
    }

    #[tokio::test]
    async fn cached_files_are_skipped_without_network() {
        let dir = TempDir::new().unwrap();
        let root = repoe_data_root(dir.path(), "master", Some("Settlers"));
        std::fs::create_dir_all(&root).unwrap();
        for (logical, _) in DEFAULT_REMOTE_FILES {
            std::fs::write(root.join(format!("{logical}.json")), "{}").unwrap();
        }

        let report = download_repoe_data(dir.path(), "master", Some("Settlers"), &[], false)
            .await
            .unwrap();
        assert_eq!(report.root, root);
        assert!(report.written.is_empty());
        assert_eq!(report.skipped.len(), DEFAULT_REMOTE_FILES.len());
    }
}
