//! Temple of Atzoatl room crafts (`incursion_crafts.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::KnowledgeError;
use super::loader::{lenient_string, load_json};
use super::text::normalise;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncursionCraft {
    pub room: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub room_id: String,
    #[serde(default)]
    pub tier: i64,
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub item_classes: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IncursionIndex {
    entries: Vec<IncursionCraft>,
}

impl IncursionIndex {
    pub const FILE_NAME: &'static str = "incursion_crafts.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let entries: Vec<IncursionCraft> = load_json(data_dir, Self::FILE_NAME)?;
        tracing::info!(count = entries.len(), "incursion index loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<IncursionCraft>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[IncursionCraft] {
        &self.entries
    }

    /// A craft matches when the query contains one of its fields or one of
    /// its fields contains the query.
    pub fn search(&self, query: &str) -> Vec<IncursionCraft> {
        let needle = normalise(query);
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|craft| {
                [craft.room.as_str(), craft.room_id.as_str(), craft.effect.as_str()]
                    .into_iter()
                    .chain(craft.item_classes.iter().map(String::as_str))
                    .chain(craft.notes.iter().map(String::as_str))
                    .chain(craft.aliases.iter().map(String::as_str))
                    .any(|field| {
                        let haystack = normalise(field);
                        !haystack.is_empty()
                            && (haystack.contains(&needle) || needle.contains(&haystack))
                    })
            })
            .cloned()
            .collect()
    }
}
