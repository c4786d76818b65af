//! `poe-kb.yaml` configuration.
//!
//! The file is optional; every field has a default. Values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`, and paths may
//! start with `~`.
//!
//! ```yaml
//! data_dir: ${POE_KB_DATA_DIR:-~/poe/data}
//! log_filter: poe_craft_kb=debug,warn
//! craft_of_exile:
//!   league: Settlers
//!   compact: true
//! repoe:
//!   branch: "3.25"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::repoe::REPOE_DEFAULT_BRANCH;

pub const CONFIG_FILE_NAME: &str = "poe-kb.yaml";
pub const CONFIG_ENV_VAR: &str = "POE_KB_CONFIG";
pub const DEFAULT_LOG_FILTER: &str = "poe_craft_kb=info,warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `POE_KB_CONFIG` names a file that does not exist.
    #[error("config file {path} (from POE_KB_CONFIG) does not exist")]
    NotFound { path: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

// ─── Public Types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KbConfig {
    /// Directory holding the curated datasets and sync output.
    pub data_dir: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    pub log_json: bool,
    /// Write logs to this file (rotated on startup) instead of stderr.
    pub log_file: Option<PathBuf>,
    pub craft_of_exile: CraftOfExileSettings,
    pub repoe: RePoESettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CraftOfExileSettings {
    /// Bundle URL; the built-in URL and its mirrors when unset.
    pub url: Option<String>,
    /// Defaults to `<data_dir>/craft_of_exile`.
    pub output_dir: Option<PathBuf>,
    pub league: Option<String>,
    /// Write the bundle without pretty-printing.
    pub compact: bool,
    pub timeout_secs: u64,
}

impl Default for CraftOfExileSettings {
    fn default() -> Self {
        Self {
            url: None,
            output_dir: None,
            league: None,
            compact: false,
            timeout_secs: 30,
        }
    }
}

impl CraftOfExileSettings {
    pub fn output_dir(&self, data_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("craft_of_exile"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RePoESettings {
    /// Defaults to `<data_dir>/repoe`.
    pub base_path: Option<PathBuf>,
    pub branch: String,
    pub league: Option<String>,
}

impl Default for RePoESettings {
    fn default() -> Self {
        Self {
            base_path: None,
            branch: REPOE_DEFAULT_BRANCH.to_string(),
            league: None,
        }
    }
}

impl RePoESettings {
    pub fn base_path(&self, data_dir: &Path) -> PathBuf {
        self.base_path.clone().unwrap_or_else(|| data_dir.join("repoe"))
    }
}

impl KbConfig {
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Find and load the config starting from `start`, or defaults when no
    /// file exists.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match find_config_path(start)? {
            Some(path) => Ok((load_config(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    fn expand_paths(&mut self) {
        for path in [
            &mut self.data_dir,
            &mut self.log_file,
            &mut self.craft_of_exile.output_dir,
            &mut self.repoe.base_path,
        ]
        .into_iter()
        .flatten()
        {
            *path = PathBuf::from(expand_tilde(&path.to_string_lossy()));
        }
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate `poe-kb.yaml`.
///
/// `POE_KB_CONFIG` wins when set; otherwise searches upward from `start`.
pub fn find_config_path(start: &Path) -> Result<Option<PathBuf>, ConfigError> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
        if !explicit.trim().is_empty() {
            let candidate = PathBuf::from(expand_tilde(&explicit));
            if candidate.exists() {
                return Ok(Some(candidate));
            }
            return Err(ConfigError::NotFound {
                path: candidate.display().to_string(),
            });
        }
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Ok(Some(candidate));
        }
        if !dir.pop() {
            return Ok(None);
        }
    }
}

/// Load and parse a config file after env-var interpolation.
pub fn load_config(path: &Path) -> Result<KbConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut config = parse_config(&raw).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    config.expand_paths();
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<KbConfig, serde_yaml::Error> {
    let interpolated = interpolate_env_vars(raw);
    if interpolated.trim().is_empty() {
        return Ok(KbConfig::default());
    }
    serde_yaml::from_str(&interpolated)
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

fn resolve_var_expr(expr: &str) -> String {
    match expr.split_once(":-") {
        Some((name, default)) => std::env::var(name).unwrap_or_else(|_| expand_tilde(default)),
        None => std::env::var(expr).unwrap_or_default(),
    }
}

/// Expand a leading `~` to the user's home directory.
pub(crate) fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn interpolation_uses_default_when_unset() {
        std::env::remove_var("__POE_KB_TEST_UNSET__");
        assert_eq!(
            interpolate_env_vars("dir: ${__POE_KB_TEST_UNSET__:-/fallback}"),
            "dir: /fallback"
        );
        assert_eq!(interpolate_env_vars("x${__POE_KB_TEST_UNSET__}y"), "xy");
    }

    #[test]
    fn interpolation_prefers_env_value() {
        std::env::set_var("__POE_KB_TEST_LEAGUE__", "Settlers");
        assert_eq!(
            interpolate_env_vars("league: ${__POE_KB_TEST_LEAGUE__:-Standard}"),
            "league: Settlers"
        );
        std::env::remove_var("__POE_KB_TEST_LEAGUE__");
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde("~/poe");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/poe"));
        assert_eq!(expand_tilde("/abs/~"), "/abs/~");
    }

    #[test]
    fn parses_nested_settings_with_defaults() {
        let config = parse_config(
            r#"
            data_dir: /srv/poe
            log_json: true
            craft_of_exile:
              league: Settlers
              compact: true
            repoe:
              league: hardcore
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/poe")));
        assert!(config.log_json);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.craft_of_exile.timeout(), Duration::from_secs(30));
        assert!(config.craft_of_exile.compact);
        assert_eq!(config.repoe.branch, "master");

        let data_dir = Path::new("/srv/poe");
        assert_eq!(config.craft_of_exile.output_dir(data_dir), data_dir.join("craft_of_exile"));
        assert_eq!(config.repoe.base_path(data_dir), data_dir.join("repoe"));
    }

    #[test]
    fn empty_file_is_default_config() {
        assert_eq!(parse_config("  \n").unwrap(), KbConfig::default());
    }

    #[test]
    fn unknown_shape_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "craft_of_exile:\n  timeout_secs: soon\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn config_is_found_in_parent_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "data_dir: ~/poe-data\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        // Only meaningful when POE_KB_CONFIG is not set in the test environment.
        if std::env::var(CONFIG_ENV_VAR).is_err() {
            let (config, path) = KbConfig::discover(&nested).unwrap();
            assert_eq!(path, Some(dir.path().join(CONFIG_FILE_NAME)));
            let data_dir = config.data_dir.unwrap();
            assert!(!data_dir.to_string_lossy().starts_with('~'));
        }
    }
}
