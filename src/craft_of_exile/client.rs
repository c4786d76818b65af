//! Download and cache the Craft of Exile data bundle.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::knowledge::loader::sorted_keys;

use super::dataset::CraftOfExileDataset;
use super::errors::CraftOfExileError;

pub const DEFAULT_BUNDLE_URL: &str =
    "https://raw.githubusercontent.com/CraftOfExile/data/refs/heads/master/data.json";

/// Tried after [`DEFAULT_BUNDLE_URL`] when no custom URL was configured.
pub const FALLBACK_BUNDLE_URLS: &[&str] = &[
    "https://raw.githubusercontent.com/CraftOfExile/data/refs/heads/main/data.json",
    "https://raw.githubusercontent.com/CraftOfExile/data/master/data.json",
    "https://raw.githubusercontent.com/CraftOfExile/data/main/data.json",
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) const USER_AGENT: &str = concat!("poe-craft-kb/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct CraftOfExileClient {
    pub bundle_url: String,
    pub timeout: Duration,
}

impl Default for CraftOfExileClient {
    fn default() -> Self {
        Self::new(None, DEFAULT_TIMEOUT)
    }
}

impl CraftOfExileClient {
    pub fn new(bundle_url: Option<String>, timeout: Duration) -> Self {
        Self {
            bundle_url: bundle_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BUNDLE_URL.to_string()),
            timeout,
        }
    }

    /// The configured URL, followed by the fallbacks when it is the default.
    pub fn candidate_urls(&self) -> Vec<String> {
        let mut urls = vec![self.bundle_url.clone()];
        if self.bundle_url == DEFAULT_BUNDLE_URL {
            for url in FALLBACK_BUNDLE_URLS {
                if !urls.iter().any(|known| known == url) {
                    urls.push((*url).to_string());
                }
            }
        }
        urls
    }

    /// Download the bundle, trying each candidate URL once.
    pub async fn fetch(&self) -> Result<CraftOfExileDataset, CraftOfExileError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CraftOfExileError::Client {
                reason: e.to_string(),
            })?;

        let mut attempts = Vec::new();
        for url in self.candidate_urls() {
            match fetch_body(&http, &url).await {
                Ok(body) => {
                    tracing::info!(url = %url, bytes = body.len(), "downloaded craft of exile bundle");
                    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
                        CraftOfExileError::InvalidPayload {
                            reason: e.to_string(),
                        }
                    })?;
                    return Ok(CraftOfExileDataset::new(payload));
                }
                Err(reason) => {
                    tracing::warn!(url = %url, reason = %reason, "craft of exile download failed");
                    attempts.push(format!("{url}: {reason}"));
                }
            }
        }
        Err(CraftOfExileError::DownloadFailed { attempts })
    }

    /// Load a previously cached bundle.
    pub fn load_from_path(path: &Path) -> Result<CraftOfExileDataset, CraftOfExileError> {
        if !path.exists() {
            return Err(CraftOfExileError::NotFound {
                path: path.display().to_string(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|e| CraftOfExileError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let payload = serde_json::from_str(&raw).map_err(|e| CraftOfExileError::InvalidCache {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(CraftOfExileDataset::new(payload))
    }

    /// Persist a bundle, creating parent directories. Pretty output is
    /// indented with sorted keys; compact output keeps the bundle's order.
    pub fn dump_to_path(
        dataset: &CraftOfExileDataset,
        path: &Path,
        pretty: bool,
    ) -> Result<(), CraftOfExileError> {
        let io_error = |e: std::io::Error| CraftOfExileError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let rendered = if pretty {
            serde_json::to_string_pretty(&sorted_keys(&dataset.payload))
        } else {
            serde_json::to_string(&dataset.payload)
        }
        .map_err(|e| CraftOfExileError::InvalidPayload {
            reason: e.to_string(),
        })?;
        std::fs::write(path, rendered).map_err(io_error)
    }
}

async fn fetch_body(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, String> {
    let response = http.get(url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let body = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(body.to_vec())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn default_url_adds_fallbacks() {
        let client = CraftOfExileClient::default();
        let urls = client.candidate_urls();
        assert_eq!(urls.len(), 1 + FALLBACK_BUNDLE_URLS.len());
        assert_eq!(urls[0], DEFAULT_BUNDLE_URL);
    }

    #[test]
    fn custom_url_has_no_fallbacks() {
        let client = CraftOfExileClient::new(Some("http://localhost/data.json".into()), DEFAULT_TIMEOUT);
        assert_eq!(client.candidate_urls(), vec!["http://localhost/data.json"]);
        let blank = CraftOfExileClient::new(Some("  ".into()), DEFAULT_TIMEOUT);
        assert_eq!(blank.bundle_url, DEFAULT_BUNDLE_URL);
    }

    #[test]
    fn pretty_dump_sorts_keys_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("standard").join("data.json");
        let dataset = CraftOfExileDataset::new(json!({"zeta": 1, "alpha": {"b": 2, "a": "é"}}));

        CraftOfExileClient::dump_to_path(&dataset, &path, true).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.find("\"alpha\"").unwrap() < written.find("\"zeta\"").unwrap());
        assert!(written.find("\"a\"").unwrap() < written.find("\"b\"").unwrap());
        assert!(written.contains('é'));

        let reloaded = CraftOfExileClient::load_from_path(&path).unwrap();
        assert_eq!(reloaded, dataset);
    }

    #[test]
    fn compact_dump_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let dataset = CraftOfExileDataset::new(json!({"zeta": 1, "alpha": 2}));
        CraftOfExileClient::dump_to_path(&dataset, &path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn missing_and_corrupt_caches_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        assert!(matches!(
            CraftOfExileClient::load_from_path(&path),
            Err(CraftOfExileError::NotFound { .. })
        ));
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CraftOfExileClient::load_from_path(&path),
            Err(CraftOfExileError::InvalidCache { .. })
        ));
    }
}
