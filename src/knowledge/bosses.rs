//! Atlas and map boss encounters (`bosses.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::KnowledgeError;
use super::loader::load_json;
use super::text::{any_contains, normalise};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossEncounter {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub encounter: String,
    #[serde(default)]
    pub unlock: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapBoss {
    pub map: String,
    #[serde(default)]
    pub tier: i64,
    #[serde(default)]
    pub bosses: Vec<String>,
    #[serde(default)]
    pub unlock: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BossDocument {
    #[serde(default)]
    atlas_bosses: Vec<BossEncounter>,
    #[serde(default)]
    map_bosses: Vec<MapBoss>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BossSearch {
    pub atlas_bosses: Vec<BossEncounter>,
    pub map_bosses: Vec<MapBoss>,
}

#[derive(Debug, Clone, Default)]
pub struct BossIndex {
    atlas_bosses: Vec<BossEncounter>,
    map_bosses: Vec<MapBoss>,
}

impl BossIndex {
    pub const FILE_NAME: &'static str = "bosses.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let doc: BossDocument = load_json(data_dir, Self::FILE_NAME)?;
        tracing::info!(
            atlas = doc.atlas_bosses.len(),
            maps = doc.map_bosses.len(),
            "boss index loaded"
        );
        Ok(Self::new(doc.atlas_bosses, doc.map_bosses))
    }

    pub fn new(atlas_bosses: Vec<BossEncounter>, map_bosses: Vec<MapBoss>) -> Self {
        Self {
            atlas_bosses,
            map_bosses,
        }
    }

    pub fn atlas_bosses(&self) -> &[BossEncounter] {
        &self.atlas_bosses
    }

    pub fn map_bosses(&self) -> &[MapBoss] {
        &self.map_bosses
    }

    pub fn search(&self, query: &str) -> BossSearch {
        let needle = normalise(query);
        BossSearch {
            atlas_bosses: self
                .atlas_bosses
                .iter()
                .filter(|boss| {
                    let names = std::iter::once(boss.name.as_str())
                        .chain(boss.aliases.iter().map(String::as_str));
                    any_contains(names, &needle)
                })
                .cloned()
                .collect(),
            map_bosses: self
                .map_bosses
                .iter()
                .filter(|boss| {
                    let names = std::iter::once(boss.map.as_str())
                        .chain(boss.bosses.iter().map(String::as_str));
                    any_contains(names, &needle)
                })
                .cloned()
                .collect(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_and_search_both_lists() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(BossIndex::FILE_NAME),
            r#"{
                "atlas_bosses": [
                    {"name": "Sirus, Awakener of Worlds", "aliases": ["Sirus"], "encounter": "Eye of the Storm", "unlock": ["Defeat four Conquerors"]}
                ],
                "map_bosses": [
                    {"map": "Strand Map", "tier": 1, "bosses": ["Merveil, the Returned"]}
                ]
            }"#,
        )
        .unwrap();

        let idx = BossIndex::load(dir.path()).unwrap();
        let sirus = idx.search("sirus");
        assert_eq!(sirus.atlas_bosses.len(), 1);
        assert!(sirus.map_bosses.is_empty());

        let merveil = idx.search("Merveil");
        assert_eq!(merveil.map_bosses[0].map, "Strand Map");
        assert!(merveil.atlas_bosses.is_empty());
    }
}
