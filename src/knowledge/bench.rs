//! Crafting bench recipes (`bench_recipes.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::KnowledgeError;
use super::loader::load_json;
use super::text::{any_contains, normalise};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchCost {
    pub currency: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRecipe {
    pub identifier: String,
    pub display: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bench_tier: i64,
    #[serde(default)]
    pub master: String,
    #[serde(default)]
    pub item_classes: Vec<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub costs: Vec<BenchCost>,
}

impl BenchRecipe {
    /// `"<amount> <currency>"` pairs joined by `, `, or `free`.
    pub fn cost_summary(&self) -> String {
        if self.costs.is_empty() {
            return "free".to_string();
        }
        self.costs
            .iter()
            .map(|cost| format!("{} {}", cost.amount, cost.currency))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `"<master>, tier <n>; cost <costs>"`
    pub fn bench_summary(&self) -> String {
        format!(
            "{}, tier {}; cost {}",
            self.master,
            self.bench_tier,
            self.cost_summary()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct BenchIndex {
    recipes: Vec<BenchRecipe>,
}

impl BenchIndex {
    pub const FILE_NAME: &'static str = "bench_recipes.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let recipes: Vec<BenchRecipe> = load_json(data_dir, Self::FILE_NAME)?;
        tracing::info!(count = recipes.len(), "bench index loaded");
        Ok(Self::from_entries(recipes))
    }

    pub fn from_entries(recipes: Vec<BenchRecipe>) -> Self {
        Self { recipes }
    }

    pub fn recipes(&self) -> &[BenchRecipe] {
        &self.recipes
    }

    pub fn search(&self, query: &str) -> Vec<BenchRecipe> {
        let needle = normalise(query);
        self.recipes
            .iter()
            .filter(|recipe| {
                let haystack = [recipe.display.as_str(), recipe.description.as_str()]
                    .into_iter()
                    .chain(recipe.keywords.iter().map(String::as_str));
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
    use serde_json::json;

    fn recipes() -> Vec<BenchRecipe> {
        serde_json::from_value(json!([
            {
                "identifier": "MovementVelocity1",
                "display": "10% increased Movement Speed",
                "description": "Boots, suffix",
                "bench_tier": 1,
                "master": "Alva",
                "action": "add_explicit_mod",
                "keywords": ["movement"],
                "costs": [{"currency": "Orb of Alteration", "amount": 4}]
            },
            {
                "identifier": "Links4",
                "display": "Four Linked Sockets",
                "description": "Link 4 sockets",
                "bench_tier": 1,
                "master": "Vorici",
                "action": "link_sockets",
                "keywords": ["4-link"]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn search_matches_display_and_keywords() {
        let idx = BenchIndex::from_entries(recipes());
        assert_eq!(idx.search("Movement Speed")[0].identifier, "MovementVelocity1");
        assert_eq!(idx.search("4-link")[0].identifier, "Links4");
        assert!(idx.search("6-link").is_empty());
    }

    #[test]
    fn cost_summary_renders_amounts_or_free() {
        let all = recipes();
        assert_eq!(all[0].cost_summary(), "4 Orb of Alteration");
        assert_eq!(all[1].cost_summary(), "free");
        assert_eq!(all[0].bench_summary(), "Alva, tier 1; cost 4 Orb of Alteration");
    }
}
