//! Item fundamentals glossary (`item_fundamentals.json`).
//!
//! Search is ranked rather than filtered: each entry scores the number of
//! query tokens it covers plus the best edit-distance similarity between the
//! whole query and one of its fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::KnowledgeError;
use super::loader::load_json;
use super::text::normalise;

const MIN_SIMILARITY: f64 = 0.45;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFundamental {
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, Default)]
pub struct FundamentalsIndex {
    entries: Vec<ItemFundamental>,
}

impl FundamentalsIndex {
    pub const FILE_NAME: &'static str = "item_fundamentals.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let entries: Vec<ItemFundamental> = load_json(data_dir, Self::FILE_NAME)?;
        tracing::info!(count = entries.len(), "item fundamentals loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<ItemFundamental>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ItemFundamental] {
        &self.entries
    }

    pub fn search(&self, query: &str, limit: Option<usize>) -> Vec<ItemFundamental> {
        let needle = normalise(query);
        if needle.is_empty() {
            return Vec::new();
        }
        let tokens: Vec<&str> = needle.split_whitespace().collect();

        let mut scored: Vec<(f64, &ItemFundamental)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let fields: Vec<String> = [&entry.category, &entry.name, &entry.summary]
                    .into_iter()
                    .filter(|f| !f.is_empty())
                    .map(|f| normalise(f))
                    .collect();
                if fields.is_empty() {
                    return None;
                }
                let coverage = tokens
                    .iter()
                    .filter(|token| fields.iter().any(|field| field.contains(**token)))
                    .count();
                let best_ratio = fields
                    .iter()
                    .map(|field| strsim::normalized_levenshtein(&needle, field))
                    .fold(0.0_f64, f64::max);
                if coverage == 0 && best_ratio < MIN_SIMILARITY {
                    return None;
                }
                Some((coverage as f64 + best_ratio, entry))
            })
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        let limit = limit.unwrap_or(scored.len());
        scored
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str, name: &str, summary: &str) -> ItemFundamental {
        ItemFundamental {
            category: category.into(),
            name: name.into(),
            summary: summary.into(),
            details: String::new(),
        }
    }

    fn index() -> FundamentalsIndex {
        FundamentalsIndex::from_entries(vec![
            entry("Affixes", "Prefix", "Explicit modifier slot before the base name"),
            entry("Affixes", "Suffix", "Explicit modifier slot after the base name"),
            entry("Sockets", "Links", "Connected sockets share support gems"),
        ])
    }

    #[test]
    fn coverage_ranks_best_match_first() {
        let hits = index().search("suffix slot", None);
        assert_eq!(hits[0].name, "Suffix");
        assert_eq!(hits[1].name, "Prefix");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn similarity_rescues_typos() {
        let hits = index().search("linkz", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Links");
    }

    #[test]
    fn limit_truncates_and_empty_query_is_empty() {
        assert_eq!(index().search("modifier slot", Some(1)).len(), 1);
        assert!(index().search("   ", None).is_empty());
    }
}
