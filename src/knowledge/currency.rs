//! Currency items (`currency.json`).

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::KnowledgeError;
use super::loader::{load_array, text_field, text_list};
use super::text::tokenise;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyOption {
    pub name: String,
    pub tags: Vec<String>,
    pub action: String,
    pub constraints: Vec<String>,
}

impl CurrencyOption {
    fn from_value(entry: &Value) -> Self {
        Self {
            name: text_field(entry, "name"),
            tags: text_list(entry, "tags"),
            action: text_field(entry, "action"),
            constraints: text_list(entry, "constraints"),
        }
    }

    /// A single field must contain every query token as part of one of its
    /// own tokens.
    fn matches(&self, needle_tokens: &[String]) -> bool {
        [self.name.as_str(), self.action.as_str()]
            .into_iter()
            .chain(self.tags.iter().map(String::as_str))
            .chain(self.constraints.iter().map(String::as_str))
            .any(|field| {
                let field_tokens = tokenise(field);
                !field_tokens.is_empty()
                    && needle_tokens.iter().all(|needle| {
                        field_tokens
                            .iter()
                            .any(|token| token.contains(needle.as_str()))
                    })
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurrencyIndex {
    options: Vec<CurrencyOption>,
}

impl CurrencyIndex {
    pub const FILE_NAME: &'static str = "currency.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let payload = load_array(data_dir, Self::FILE_NAME)?;
        let index = Self::from_values(&payload);
        tracing::info!(count = index.options.len(), "currency index loaded");
        Ok(index)
    }

    pub fn from_values(entries: &[Value]) -> Self {
        Self {
            options: entries.iter().map(CurrencyOption::from_value).collect(),
        }
    }

    pub fn options(&self) -> &[CurrencyOption] {
        &self.options
    }

    pub fn search(&self, query: &str) -> Vec<CurrencyOption> {
        let needle_tokens = tokenise(query);
        if needle_tokens.is_empty() {
            return Vec::new();
        }
        self.options
            .iter()
            .filter(|option| option.matches(&needle_tokens))
            .cloned()
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> CurrencyIndex {
        CurrencyIndex::from_values(&[
            json!({"name": "Chaos Orb", "tags": ["reforge"], "action": "Reforges a rare item with new random modifiers"}),
            json!({"name": "Orb of Annulment", "tags": ["removal"], "action": "Removes a random modifier", "constraints": ["Rare or magic items"]}),
        ])
    }

    #[test]
    fn tokens_match_as_prefixes_within_one_field() {
        let idx = index();
        assert_eq!(idx.search("chao")[0].name, "Chaos Orb");
        assert_eq!(idx.search("removes random")[0].name, "Orb of Annulment");
        assert_eq!(idx.search("orb").len(), 2);
    }

    #[test]
    fn tokens_split_across_fields_do_not_match() {
        // each token only appears in a different record
        assert!(index().search("annulment reforges").is_empty());
    }

    #[test]
    fn blank_query_returns_nothing() {
        assert!(index().search("").is_empty());
    }
}
