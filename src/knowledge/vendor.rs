//! Vendor recipes (`vendor_recipes.json`).

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::KnowledgeError;
use super::loader::{integer_field, load_array, optional_text, text_field};
use super::text::normalise;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorRecipePart {
    pub part_id: Option<i64>,
    pub item_name: String,
    pub item_page: Option<String>,
    pub item_id: Option<String>,
    pub amount: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorRecipe {
    pub page: String,
    pub recipe_id: i64,
    pub result_amount: Option<i64>,
    pub description: Option<String>,
    pub automatic: bool,
    pub parts: Vec<VendorRecipePart>,
}

impl VendorRecipePart {
    fn from_value(part: &Value) -> Option<Self> {
        let item_name = text_field(part, "item_name");
        let item_page = optional_text(part, "item_page");
        let item_id = optional_text(part, "item_id");
        if item_name.is_empty() && item_page.is_none() && item_id.is_none() {
            return None;
        }
        Some(Self {
            part_id: integer_field(part, "part_id"),
            item_name,
            item_page,
            item_id,
            amount: integer_field(part, "amount"),
            notes: optional_text(part, "notes"),
        })
    }

    /// Item name, falling back to the wiki page then the item id.
    pub fn label(&self) -> &str {
        if !self.item_name.is_empty() {
            return &self.item_name;
        }
        self.item_page
            .as_deref()
            .or(self.item_id.as_deref())
            .unwrap_or_default()
    }
}

impl VendorRecipe {
    /// Recipes without a page, an id or any usable part are skipped.
    fn from_value(entry: &Value) -> Option<Self> {
        let page = text_field(entry, "page");
        let recipe_id = integer_field(entry, "recipe_id")?;
        let parts: Vec<VendorRecipePart> = match entry.get("parts") {
            Some(Value::Array(items)) => items.iter().filter_map(VendorRecipePart::from_value).collect(),
            _ => Vec::new(),
        };
        if page.is_empty() || parts.is_empty() {
            return None;
        }
        Some(Self {
            page,
            recipe_id,
            result_amount: integer_field(entry, "result_amount"),
            description: optional_text(entry, "description"),
            automatic: entry.get("automatic").and_then(Value::as_bool).unwrap_or(false),
            parts,
        })
    }

    fn search_tokens(&self) -> Vec<String> {
        let mut tokens = vec![normalise(&self.page)];
        if let Some(description) = &self.description {
            tokens.push(normalise(description));
        }
        for part in &self.parts {
            if !part.item_name.is_empty() {
                tokens.push(normalise(&part.item_name));
            }
            if let Some(page) = &part.item_page {
                tokens.push(normalise(page));
            }
            if let Some(notes) = &part.notes {
                tokens.push(normalise(notes));
            }
        }
        tokens.retain(|t| !t.is_empty());
        tokens
    }
}

#[derive(Debug, Clone, Default)]
pub struct VendorIndex {
    recipes: Vec<VendorRecipe>,
}

impl VendorIndex {
    pub const FILE_NAME: &'static str = "vendor_recipes.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let payload = load_array(data_dir, Self::FILE_NAME)?;
        let index = Self::from_values(&payload);
        tracing::info!(count = index.recipes.len(), skipped = payload.len() - index.recipes.len(), "vendor index loaded");
        Ok(index)
    }

    /// Build from raw entries, sorted by (page case-folded, recipe id).
    pub fn from_values(entries: &[Value]) -> Self {
        let mut recipes: Vec<VendorRecipe> = entries.iter().filter_map(VendorRecipe::from_value).collect();
        recipes.sort_by(|a, b| {
            a.page
                .to_lowercase()
                .cmp(&b.page.to_lowercase())
                .then(a.recipe_id.cmp(&b.recipe_id))
        });
        Self { recipes }
    }

    pub fn recipes(&self) -> &[VendorRecipe] {
        &self.recipes
    }

    /// Every query word must be a substring of some recipe token.
    pub fn search(&self, query: &str) -> Vec<VendorRecipe> {
        let needle = normalise(query);
        let words: Vec<&str> = needle.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }
        self.recipes
            .iter()
            .filter(|recipe| {
                let tokens = recipe.search_tokens();
                !tokens.is_empty()
                    && words
                        .iter()
                        .all(|word| tokens.iter().any(|token| token.contains(word)))
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

    fn index() -> VendorIndex {
        VendorIndex::from_values(&[
            json!({
                "page": "Orb of Alchemy",
                "recipe_id": 2,
                "result_amount": 1,
                "description": "Full set of rare items",
                "parts": [{"item_name": "Rare helmet", "amount": 1}, {"notes": "ignored"}]
            }),
            json!({
                "page": "chromatic orb",
                "recipe_id": 1,
                "parts": [{"item_page": "Item with R-G-B linked sockets"}]
            }),
            json!({"page": "", "recipe_id": 3, "parts": [{"item_name": "x"}]}),
            json!({"page": "No parts", "recipe_id": 4, "parts": []}),
            json!({"page": "No id", "parts": [{"item_name": "y"}]})
        ])
    }

    #[test]
    fn invalid_entries_are_skipped_and_sorted() {
        let idx = index();
        let pages: Vec<&str> = idx.recipes().iter().map(|r| r.page.as_str()).collect();
        assert_eq!(pages, vec!["chromatic orb", "Orb of Alchemy"]);
        assert_eq!(idx.recipes()[1].parts.len(), 1);
    }

    #[test]
    fn every_word_must_hit_some_token() {
        let idx = index();
        assert_eq!(idx.search("rare helmet")[0].page, "Orb of Alchemy");
        assert_eq!(idx.search("linked chromatic")[0].recipe_id, 1);
        assert!(idx.search("rare chromatic").is_empty());
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(index().search("  !! ").is_empty());
    }

    #[test]
    fn part_label_falls_back_to_page() {
        let idx = index();
        assert_eq!(idx.recipes()[0].parts[0].label(), "Item with R-G-B linked sockets");
    }
}
