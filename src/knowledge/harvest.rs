//! Harvest craft dataset (`harvest_crafts.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::KnowledgeError;
use super::loader::load_json;
use super::text::{any_contains, normalise};

/// One horticrafting station craft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestCraft {
    pub identifier: String,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub item_classes: Vec<String>,
}

impl HarvestCraft {
    /// First description line, or the identifier when the craft has none.
    pub fn headline(&self) -> &str {
        self.description
            .first()
            .map(String::as_str)
            .unwrap_or(&self.identifier)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HarvestIndex {
    entries: Vec<HarvestCraft>,
}

impl HarvestIndex {
    pub const FILE_NAME: &'static str = "harvest_crafts.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let entries: Vec<HarvestCraft> = load_json(data_dir, Self::FILE_NAME)?;
        tracing::info!(count = entries.len(), "harvest index loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<HarvestCraft>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[HarvestCraft] {
        &self.entries
    }

    pub fn search(&self, query: &str) -> Vec<HarvestCraft> {
        let needle = normalise(query);
        self.entries
            .iter()
            .filter(|craft| {
                let haystack = craft
                    .description
                    .iter()
                    .chain(&craft.groups)
                    .chain(&craft.tags)
                    .map(String::as_str);
                any_contains(haystack, &needle)
            })
            .cloned()
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn craft(id: &str, description: &str, group: &str) -> HarvestCraft {
        HarvestCraft {
            identifier: id.into(),
            description: vec![description.into()],
            groups: vec![group.into()],
            tags: vec![],
            item_classes: vec![],
        }
    }

    #[test]
    fn search_covers_description_and_groups() {
        let idx = HarvestIndex::from_entries(vec![
            craft("h1", "Change a modifier that grants Cold Resistance into Lightning Resistance", "Resistance Swap"),
            craft("h2", "Reforge a Rare item with new random modifiers, including a Life modifier", "Reforge"),
        ]);
        assert_eq!(idx.search("Lightning Resistance")[0].identifier, "h1");
        assert_eq!(idx.search("reforge")[0].identifier, "h2");
        assert!(idx.search("fossil").is_empty());
    }

    #[test]
    fn headline_falls_back_to_identifier() {
        let mut c = craft("h3", "x", "g");
        c.description.clear();
        assert_eq!(c.headline(), "h3");
    }
}
