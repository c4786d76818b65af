//! The search seam consumed by the planner.
//!
//! The planner only needs three domains (essences, harvest crafts and bench
//! recipes). It reaches them through [`SearchCatalog`], which callers pass in
//! explicitly, so tests can substitute in-memory or recording catalogs.

use serde_json::Value;

use super::bench::{BenchIndex, BenchRecipe};
use super::errors::KnowledgeError;
use super::essences::{Essence, EssenceIndex};
use super::harvest::{HarvestCraft, HarvestIndex};

/// Crafting domains the classifier can resolve a modifier against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CraftDomain {
    Essence,
    Harvest,
    Bench,
}

impl CraftDomain {
    /// Default search order when no hint reorders it.
    pub const DEFAULT_ORDER: [CraftDomain; 3] =
        [CraftDomain::Essence, CraftDomain::Harvest, CraftDomain::Bench];

    pub fn as_str(&self) -> &'static str {
        match self {
            CraftDomain::Essence => "essence",
            CraftDomain::Harvest => "harvest",
            CraftDomain::Bench => "bench",
        }
    }
}

/// A search hit from any planner domain.
///
/// `Influence` carries the name of a blueprint influence rather than a
/// dataset record; it is produced by classification, never by a search.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    Essence(Essence),
    Harvest(HarvestCraft),
    Bench(BenchRecipe),
    Influence(String),
}

impl Match {
    /// Stable identity used to merge modifiers that share one source.
    pub fn group_key(&self) -> Option<&str> {
        let key = match self {
            Match::Essence(e) => e.identifier.as_str(),
            Match::Harvest(h) => h.identifier.as_str(),
            Match::Bench(b) => b.identifier.as_str(),
            Match::Influence(name) => name.as_str(),
        };
        (!key.trim().is_empty()).then_some(key)
    }

    pub fn name(&self) -> &str {
        match self {
            Match::Essence(e) => &e.name,
            Match::Harvest(h) => h.headline(),
            Match::Bench(b) => &b.display,
            Match::Influence(name) => name,
        }
    }

    /// Human-readable effect lines.
    pub fn summary_lines(&self) -> Vec<String> {
        match self {
            Match::Essence(e) => e.mods.clone(),
            Match::Harvest(h) => h.description.clone(),
            Match::Bench(b) if b.description.trim().is_empty() => Vec::new(),
            Match::Bench(b) => vec![b.description.clone()],
            Match::Influence(_) => Vec::new(),
        }
    }

    /// The record as a JSON value for plan metadata.
    pub fn to_metadata(&self) -> Result<Value, KnowledgeError> {
        let value = match self {
            Match::Essence(e) => serde_json::to_value(e)?,
            Match::Harvest(h) => serde_json::to_value(h)?,
            Match::Bench(b) => serde_json::to_value(b)?,
            Match::Influence(name) => Value::String(name.clone()),
        };
        Ok(value)
    }
}

/// Per-domain keyword lookup used by the planner.
///
/// Implementations must return matches in a stable order for a given query;
/// the planner treats the first match as the best one.
pub trait SearchCatalog: Send + Sync {
    fn find_essences(&self, query: &str) -> Result<Vec<Essence>, KnowledgeError>;

    fn find_harvest_crafts(&self, query: &str) -> Result<Vec<HarvestCraft>, KnowledgeError>;

    fn find_bench_recipes(&self, query: &str) -> Result<Vec<BenchRecipe>, KnowledgeError>;

    fn find(&self, domain: CraftDomain, query: &str) -> Result<Vec<Match>, KnowledgeError> {
        let matches = match domain {
            CraftDomain::Essence => self
                .find_essences(query)?
                .into_iter()
                .map(Match::Essence)
                .collect(),
            CraftDomain::Harvest => self
                .find_harvest_crafts(query)?
                .into_iter()
                .map(Match::Harvest)
                .collect(),
            CraftDomain::Bench => self
                .find_bench_recipes(query)?
                .into_iter()
                .map(Match::Bench)
                .collect(),
        };
        Ok(matches)
    }
}

/// A catalog over already-loaded indices.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub essences: EssenceIndex,
    pub harvest: HarvestIndex,
    pub bench: BenchIndex,
}

impl StaticCatalog {
    pub fn new(essences: Vec<Essence>, harvest: Vec<HarvestCraft>, bench: Vec<BenchRecipe>) -> Self {
        Self {
            essences: EssenceIndex::from_entries(essences),
            harvest: HarvestIndex::from_entries(harvest),
            bench: BenchIndex::from_entries(bench),
        }
    }
}

impl SearchCatalog for StaticCatalog {
    fn find_essences(&self, query: &str) -> Result<Vec<Essence>, KnowledgeError> {
        Ok(self.essences.search(query))
    }

    fn find_harvest_crafts(&self, query: &str) -> Result<Vec<HarvestCraft>, KnowledgeError> {
        Ok(self.harvest.search(query))
    }

    fn find_bench_recipes(&self, query: &str) -> Result<Vec<BenchRecipe>, KnowledgeError> {
        Ok(self.bench.search(query))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn essence(identifier: &str) -> Essence {
        Essence {
            identifier: identifier.into(),
            name: "Screaming Essence of Greed".into(),
            tier: "5".into(),
            level: 58,
            kind: Default::default(),
            mods: vec!["+50 to maximum Life".into()],
            item_level_restriction: None,
            spawn_level_min: None,
            spawn_level_max: None,
        }
    }

    #[test]
    fn group_key_ignores_blank_identifiers() {
        assert_eq!(Match::Essence(essence("greed5")).group_key(), Some("greed5"));
        assert_eq!(Match::Essence(essence("  ")).group_key(), None);
    }

    #[test]
    fn metadata_serialises_record_fields() {
        let meta = Match::Essence(essence("greed5")).to_metadata().unwrap();
        assert_eq!(meta["name"], "Screaming Essence of Greed");
        assert_eq!(meta["type"], "");
        assert_eq!(Match::Influence("Hunter".into()).to_metadata().unwrap(), "Hunter");
    }

    #[test]
    fn static_catalog_dispatches_by_domain() {
        let catalog = StaticCatalog::new(vec![essence("greed5")], vec![], vec![]);
        let hits = catalog.find(CraftDomain::Essence, "maximum life").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Screaming Essence of Greed");
        assert!(catalog.find(CraftDomain::Bench, "maximum life").unwrap().is_empty());
    }
}
