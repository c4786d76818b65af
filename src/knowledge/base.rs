//! `KnowledgeBase`: on-disk datasets behind lazily initialised indices.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use serde_json::{json, Value};

use super::bench::{BenchIndex, BenchRecipe};
use super::bestiary::{BeastcraftRecipe, BestiaryIndex};
use super::bosses::{BossIndex, BossSearch};
use super::catalog::SearchCatalog;
use super::currency::{CurrencyIndex, CurrencyOption};
use super::errors::KnowledgeError;
use super::essences::{Essence, EssenceIndex};
use super::fossils::{FossilIndex, FossilSearch};
use super::fundamentals::{FundamentalsIndex, ItemFundamental};
use super::harvest::{HarvestCraft, HarvestIndex};
use super::incursion::{IncursionCraft, IncursionIndex};
use super::methods::{BetrayalBench, CraftingStrategy, MethodsIndex};
use super::vendor::{VendorIndex, VendorRecipe};

/// Every searchable dataset, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeDomain {
    Essences,
    Harvest,
    Bench,
    Fossils,
    Bosses,
    Vendor,
    Bestiary,
    Betrayal,
    Strategies,
    Currency,
    Incursion,
    Fundamentals,
}

impl KnowledgeDomain {
    pub const ALL: [KnowledgeDomain; 12] = [
        KnowledgeDomain::Essences,
        KnowledgeDomain::Harvest,
        KnowledgeDomain::Bench,
        KnowledgeDomain::Fossils,
        KnowledgeDomain::Bosses,
        KnowledgeDomain::Vendor,
        KnowledgeDomain::Bestiary,
        KnowledgeDomain::Betrayal,
        KnowledgeDomain::Strategies,
        KnowledgeDomain::Currency,
        KnowledgeDomain::Incursion,
        KnowledgeDomain::Fundamentals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeDomain::Essences => "essences",
            KnowledgeDomain::Harvest => "harvest",
            KnowledgeDomain::Bench => "bench",
            KnowledgeDomain::Fossils => "fossils",
            KnowledgeDomain::Bosses => "bosses",
            KnowledgeDomain::Vendor => "vendor",
            KnowledgeDomain::Bestiary => "bestiary",
            KnowledgeDomain::Betrayal => "betrayal",
            KnowledgeDomain::Strategies => "strategies",
            KnowledgeDomain::Currency => "currency",
            KnowledgeDomain::Incursion => "incursion",
            KnowledgeDomain::Fundamentals => "fundamentals",
        }
    }
}

impl FromStr for KnowledgeDomain {
    type Err = KnowledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let aliased = match lowered.as_str() {
            "essence" => "essences",
            "harvest_crafts" | "harvest-crafts" => "harvest",
            "bench_recipes" | "bench-recipes" | "crafting_bench" => "bench",
            "fossil" | "resonators" => "fossils",
            "boss" => "bosses",
            "vendor_recipes" | "vendor-recipes" => "vendor",
            "beastcraft" | "beasts" => "bestiary",
            "strategy" | "crafting_strategies" => "strategies",
            "incursion_crafts" | "temple" => "incursion",
            "item_fundamentals" | "fundamental" => "fundamentals",
            other => other,
        };
        KnowledgeDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == aliased)
            .ok_or_else(|| KnowledgeError::UnknownDomain {
                name: s.to_string(),
            })
    }
}

/// Curated datasets rooted at one data directory.
///
/// Each dataset is read from disk on first use and then shared; a failed
/// load is not cached, so the next call retries.
#[derive(Debug)]
pub struct KnowledgeBase {
    data_dir: PathBuf,
    essences: OnceLock<EssenceIndex>,
    harvest: OnceLock<HarvestIndex>,
    bench: OnceLock<BenchIndex>,
    fossils: OnceLock<FossilIndex>,
    bosses: OnceLock<BossIndex>,
    vendor: OnceLock<VendorIndex>,
    bestiary: OnceLock<BestiaryIndex>,
    methods: OnceLock<MethodsIndex>,
    currency: OnceLock<CurrencyIndex>,
    incursion: OnceLock<IncursionIndex>,
    fundamentals: OnceLock<FundamentalsIndex>,
}

fn cached<'a, T>(
    cell: &'a OnceLock<T>,
    data_dir: &Path,
    load: impl FnOnce(&Path) -> Result<T, KnowledgeError>,
) -> Result<&'a T, KnowledgeError> {
    if let Some(index) = cell.get() {
        return Ok(index);
    }
    let loaded = load(data_dir)?;
    Ok(cell.get_or_init(|| loaded))
}

impl KnowledgeBase {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            essences: OnceLock::new(),
            harvest: OnceLock::new(),
            bench: OnceLock::new(),
            fossils: OnceLock::new(),
            bosses: OnceLock::new(),
            vendor: OnceLock::new(),
            bestiary: OnceLock::new(),
            methods: OnceLock::new(),
            currency: OnceLock::new(),
            incursion: OnceLock::new(),
            fundamentals: OnceLock::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn essences(&self) -> Result<&EssenceIndex, KnowledgeError> {
        cached(&self.essences, &self.data_dir, EssenceIndex::load)
    }

    pub fn harvest(&self) -> Result<&HarvestIndex, KnowledgeError> {
        cached(&self.harvest, &self.data_dir, HarvestIndex::load)
    }

    pub fn bench(&self) -> Result<&BenchIndex, KnowledgeError> {
        cached(&self.bench, &self.data_dir, BenchIndex::load)
    }

    pub fn fossils(&self) -> Result<&FossilIndex, KnowledgeError> {
        cached(&self.fossils, &self.data_dir, FossilIndex::load)
    }

    pub fn bosses(&self) -> Result<&BossIndex, KnowledgeError> {
        cached(&self.bosses, &self.data_dir, BossIndex::load)
    }

    pub fn vendor(&self) -> Result<&VendorIndex, KnowledgeError> {
        cached(&self.vendor, &self.data_dir, VendorIndex::load)
    }

    pub fn bestiary(&self) -> Result<&BestiaryIndex, KnowledgeError> {
        cached(&self.bestiary, &self.data_dir, BestiaryIndex::load)
    }

    pub fn methods(&self) -> Result<&MethodsIndex, KnowledgeError> {
        cached(&self.methods, &self.data_dir, MethodsIndex::load)
    }

    pub fn currency(&self) -> Result<&CurrencyIndex, KnowledgeError> {
        cached(&self.currency, &self.data_dir, CurrencyIndex::load)
    }

    pub fn incursion(&self) -> Result<&IncursionIndex, KnowledgeError> {
        cached(&self.incursion, &self.data_dir, IncursionIndex::load)
    }

    pub fn fundamentals(&self) -> Result<&FundamentalsIndex, KnowledgeError> {
        cached(&self.fundamentals, &self.data_dir, FundamentalsIndex::load)
    }

    // ─── Typed searches ─────────────────────────────────────────────────────

    pub fn find_fossils(&self, query: &str) -> Result<FossilSearch, KnowledgeError> {
        Ok(self.fossils()?.search(query))
    }

    pub fn find_bosses(&self, query: &str) -> Result<BossSearch, KnowledgeError> {
        Ok(self.bosses()?.search(query))
    }

    pub fn find_vendor_recipes(&self, query: &str) -> Result<Vec<VendorRecipe>, KnowledgeError> {
        Ok(self.vendor()?.search(query))
    }

    pub fn find_beastcrafts(&self, query: &str) -> Result<Vec<BeastcraftRecipe>, KnowledgeError> {
        Ok(self.bestiary()?.search(query))
    }

    pub fn find_betrayal_benches(&self, query: &str) -> Result<Vec<BetrayalBench>, KnowledgeError> {
        Ok(self.methods()?.search_benches(query))
    }

    pub fn find_strategies(&self, query: &str) -> Result<Vec<CraftingStrategy>, KnowledgeError> {
        Ok(self.methods()?.search_strategies(query))
    }

    pub fn find_currency(&self, query: &str) -> Result<Vec<CurrencyOption>, KnowledgeError> {
        Ok(self.currency()?.search(query))
    }

    pub fn find_incursion_crafts(&self, query: &str) -> Result<Vec<IncursionCraft>, KnowledgeError> {
        Ok(self.incursion()?.search(query))
    }

    pub fn find_fundamentals(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ItemFundamental>, KnowledgeError> {
        Ok(self.fundamentals()?.search(query, limit))
    }

    /// Search one domain and render the hits as JSON.
    pub fn search_json(&self, domain: KnowledgeDomain, query: &str) -> Result<Value, KnowledgeError> {
        let value = match domain {
            KnowledgeDomain::Essences => serde_json::to_value(self.find_essences(query)?)?,
            KnowledgeDomain::Harvest => serde_json::to_value(self.find_harvest_crafts(query)?)?,
            KnowledgeDomain::Bench => serde_json::to_value(self.find_bench_recipes(query)?)?,
            KnowledgeDomain::Fossils => serde_json::to_value(self.find_fossils(query)?)?,
            KnowledgeDomain::Bosses => serde_json::to_value(self.find_bosses(query)?)?,
            KnowledgeDomain::Vendor => serde_json::to_value(self.find_vendor_recipes(query)?)?,
            KnowledgeDomain::Bestiary => serde_json::to_value(self.find_beastcrafts(query)?)?,
            KnowledgeDomain::Betrayal => serde_json::to_value(self.find_betrayal_benches(query)?)?,
            KnowledgeDomain::Strategies => serde_json::to_value(self.find_strategies(query)?)?,
            KnowledgeDomain::Currency => serde_json::to_value(self.find_currency(query)?)?,
            KnowledgeDomain::Incursion => serde_json::to_value(self.find_incursion_crafts(query)?)?,
            KnowledgeDomain::Fundamentals => serde_json::to_value(self.find_fundamentals(query, None)?)?,
        };
        tracing::debug!(domain = domain.as_str(), query, "knowledge search");
        Ok(json!({ "domain": domain.as_str(), "query": query, "results": value }))
    }
}

impl SearchCatalog for KnowledgeBase {
    fn find_essences(&self, query: &str) -> Result<Vec<Essence>, KnowledgeError> {
        Ok(self.essences()?.search(query))
    }

    fn find_harvest_crafts(&self, query: &str) -> Result<Vec<HarvestCraft>, KnowledgeError> {
        Ok(self.harvest()?.search(query))
    }

    fn find_bench_recipes(&self, query: &str) -> Result<Vec<BenchRecipe>, KnowledgeError> {
        Ok(self.bench()?.search(query))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
