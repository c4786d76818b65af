//! Betrayal safehouse benches and general crafting strategies.
//!
//! Both live in `crafting_methods.json` under `betrayal_benches` and
//! `strategies`.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::KnowledgeError;
use super::loader::{array_section, integer_field, load_json, text_field, text_list};
use super::text::{any_contains, normalise};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetrayalBench {
    pub member: String,
    pub division: String,
    pub rank: i64,
    pub ability: String,
    pub summary: String,
    pub requirements: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftingStrategy {
    pub name: String,
    pub summary: String,
    pub best_for: Vec<String>,
    pub requirements: Vec<String>,
    pub steps: Vec<String>,
    pub keywords: Vec<String>,
}

impl BetrayalBench {
    fn from_value(entry: &Value) -> Self {
        Self {
            member: text_field(entry, "member"),
            division: text_field(entry, "division"),
            rank: integer_field(entry, "rank").unwrap_or(0),
            ability: text_field(entry, "ability"),
            summary: text_field(entry, "summary"),
            requirements: text_list(entry, "requirements"),
            keywords: text_list(entry, "keywords"),
        }
    }
}

impl CraftingStrategy {
    fn from_value(entry: &Value) -> Self {
        Self {
            name: text_field(entry, "name"),
            summary: text_field(entry, "summary"),
            best_for: text_list(entry, "best_for"),
            requirements: text_list(entry, "requirements"),
            steps: text_list(entry, "steps"),
            keywords: text_list(entry, "keywords"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MethodsIndex {
    benches: Vec<BetrayalBench>,
    strategies: Vec<CraftingStrategy>,
}

impl MethodsIndex {
    pub const FILE_NAME: &'static str = "crafting_methods.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let payload: Value = load_json(data_dir, Self::FILE_NAME)?;
        let index = Self::from_payload(&payload);
        tracing::info!(
            benches = index.benches.len(),
            strategies = index.strategies.len(),
            "crafting methods loaded"
        );
        Ok(index)
    }

    pub fn from_payload(payload: &Value) -> Self {
        Self {
            benches: array_section(payload, "betrayal_benches")
                .iter()
                .map(BetrayalBench::from_value)
                .collect(),
            strategies: array_section(payload, "strategies")
                .iter()
                .map(CraftingStrategy::from_value)
                .collect(),
        }
    }

    pub fn benches(&self) -> &[BetrayalBench] {
        &self.benches
    }

    pub fn strategies(&self) -> &[CraftingStrategy] {
        &self.strategies
    }

    pub fn search_benches(&self, query: &str) -> Vec<BetrayalBench> {
        let needle = normalise(query);
        self.benches
            .iter()
            .filter(|bench| {
                let rank = bench.rank.to_string();
                let fields = [
                    bench.member.as_str(),
                    bench.division.as_str(),
                    bench.ability.as_str(),
                    bench.summary.as_str(),
                ]
                .into_iter()
                .chain(bench.requirements.iter().map(String::as_str))
                .chain(bench.keywords.iter().map(String::as_str))
                .chain(std::iter::once(rank.as_str()));
                any_contains(fields, &needle)
            })
            .cloned()
            .collect()
    }

    pub fn search_strategies(&self, query: &str) -> Vec<CraftingStrategy> {
        let needle = normalise(query);
        self.strategies
            .iter()
            .filter(|strategy| {
                let fields = [strategy.name.as_str(), strategy.summary.as_str()]
                    .into_iter()
                    .chain(
                        [
                            &strategy.best_for,
                            &strategy.requirements,
                            &strategy.steps,
                            &strategy.keywords,
                        ]
                        .into_iter()
                        .flatten()
                        .map(String::as_str),
                    );
                any_contains(fields, &needle)
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

    fn index() -> MethodsIndex {
        MethodsIndex::from_payload(&json!({
            "betrayal_benches": [
                {"member": "Aisling Laffrey", "division": "Research", "rank": 3, "ability": "Veiled modifier", "summary": "Adds a veiled modifier"},
                {"member": "Vorici", "division": "Research", "rank": "2", "summary": "Adds white sockets"}
            ],
            "strategies": [
                {"name": "Fossil crafting", "summary": "Weighted reforges", "best_for": ["Jewels"], "steps": ["Buy resonators"]},
                {"name": "Essence spam", "summary": "Guaranteed modifier", "keywords": ["essence"]}
            ]
        }))
    }

    #[test]
    fn benches_match_rank_and_summary() {
        let idx = index();
        assert_eq!(idx.search_benches("veiled")[0].member, "Aisling Laffrey");
        assert_eq!(idx.search_benches("2")[0].member, "Vorici");
        assert_eq!(idx.search_benches("research").len(), 2);
    }

    #[test]
    fn strategies_match_list_fields() {
        let idx = index();
        assert_eq!(idx.search_strategies("resonators")[0].name, "Fossil crafting");
        assert_eq!(idx.search_strategies("ESSENCE")[0].name, "Essence spam");
        assert!(idx.search_strategies("harvest").is_empty());
    }

    #[test]
    fn missing_sections_are_empty() {
        let idx = MethodsIndex::from_payload(&json!({}));
        assert!(idx.benches().is_empty());
        assert!(idx.strategies().is_empty());
    }
}
