//! Essence dataset (`essences.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::KnowledgeError;
use super::loader::{lenient_string, load_json, scalar_text};
use super::text::{any_contains, normalise};

/// The `type` column is either a plain label or a small attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EssenceType {
    Label(String),
    Fields(serde_json::Map<String, Value>),
}

impl EssenceType {
    fn search_values(&self) -> Vec<String> {
        match self {
            EssenceType::Label(label) => vec![label.clone()],
            EssenceType::Fields(fields) => fields.values().map(scalar_text).collect(),
        }
    }
}

impl Default for EssenceType {
    fn default() -> Self {
        EssenceType::Label(String::new())
    }
}

/// A single essence and the modifiers it guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Essence {
    pub identifier: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tier: String,
    #[serde(default)]
    pub level: i64,
    #[serde(rename = "type", default)]
    pub kind: EssenceType,
    #[serde(default)]
    pub mods: Vec<String>,
    #[serde(default)]
    pub item_level_restriction: Option<i64>,
    #[serde(default)]
    pub spawn_level_min: Option<i64>,
    #[serde(default)]
    pub spawn_level_max: Option<i64>,
}

/// Keyword index over essences.
#[derive(Debug, Clone, Default)]
pub struct EssenceIndex {
    entries: Vec<Essence>,
}

impl EssenceIndex {
    pub const FILE_NAME: &'static str = "essences.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let entries: Vec<Essence> = load_json(data_dir, Self::FILE_NAME)?;
        tracing::info!(count = entries.len(), "essence index loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<Essence>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Essence] {
        &self.entries
    }

    /// Essences whose name, guaranteed mods or type values contain the query.
    pub fn search(&self, query: &str) -> Vec<Essence> {
        let needle = normalise(query);
        self.entries
            .iter()
            .filter(|essence| {
                let type_values = essence.kind.search_values();
                let candidates = std::iter::once(essence.name.as_str())
                    .chain(essence.mods.iter().map(String::as_str))
                    .chain(type_values.iter().map(String::as_str));
                any_contains(candidates, &needle)
            })
            .cloned()
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
