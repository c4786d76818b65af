//! Beastcrafting recipes (`bestiary_recipes.json`).

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::KnowledgeError;
use super::loader::{integer_field, load_array, optional_text, text_field, text_list};
use super::text::{any_contains, normalise};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeastRequirement {
    pub component_id: String,
    pub amount: i64,
    pub display: String,
    pub monster: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub beast_group: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeastcraftRecipe {
    pub identifier: String,
    pub header: String,
    pub subheader: Option<String>,
    pub notes: Option<String>,
    pub game_mode: String,
    pub display: String,
    pub keywords: Vec<String>,
    pub requirements: Vec<BeastRequirement>,
}

impl BeastRequirement {
    fn from_value(entry: &Value) -> Self {
        Self {
            component_id: text_field(entry, "component_id"),
            amount: integer_field(entry, "amount").unwrap_or(0).max(1),
            display: text_field(entry, "display"),
            monster: optional_text(entry, "monster"),
            family: optional_text(entry, "family"),
            genus: optional_text(entry, "genus"),
            beast_group: optional_text(entry, "beast_group"),
            rarity: optional_text(entry, "rarity"),
        }
    }
}

impl BeastcraftRecipe {
    fn from_value(entry: &Value) -> Option<Self> {
        let identifier = optional_text(entry, "identifier")?;
        let header = text_field(entry, "header");
        let display = optional_text(entry, "display").unwrap_or_else(|| header.clone());
        let requirements = match entry.get("requirements") {
            Some(Value::Array(items)) => items.iter().map(BeastRequirement::from_value).collect(),
            _ => Vec::new(),
        };
        Some(Self {
            identifier,
            header,
            subheader: optional_text(entry, "subheader"),
            notes: optional_text(entry, "notes"),
            game_mode: optional_text(entry, "game_mode").unwrap_or_else(|| "standard".to_string()),
            display,
            keywords: text_list(entry, "keywords"),
            requirements,
        })
    }

    fn haystack(&self) -> Vec<&str> {
        let mut fields = vec![self.display.as_str(), self.header.as_str(), self.game_mode.as_str()];
        fields.extend(self.keywords.iter().map(String::as_str));
        fields.extend(self.subheader.as_deref());
        fields.extend(self.notes.as_deref());
        for req in &self.requirements {
            fields.push(&req.display);
            fields.push(&req.component_id);
            for optional in [&req.monster, &req.family, &req.genus, &req.beast_group, &req.rarity] {
                fields.extend(optional.as_deref());
            }
        }
        fields.retain(|f| !f.is_empty());
        fields
    }
}

#[derive(Debug, Clone, Default)]
pub struct BestiaryIndex {
    recipes: Vec<BeastcraftRecipe>,
}

impl BestiaryIndex {
    pub const FILE_NAME: &'static str = "bestiary_recipes.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let payload = load_array(data_dir, Self::FILE_NAME)?;
        let index = Self::from_values(&payload);
        tracing::info!(count = index.recipes.len(), "bestiary index loaded");
        Ok(index)
    }

    pub fn from_values(entries: &[Value]) -> Self {
        Self {
            recipes: entries.iter().filter_map(BeastcraftRecipe::from_value).collect(),
        }
    }

    pub fn recipes(&self) -> &[BeastcraftRecipe] {
        &self.recipes
    }

    /// Matches sorted with standard-league recipes first, then by display.
    pub fn search(&self, query: &str) -> Vec<BeastcraftRecipe> {
        let needle = normalise(query);
        let mut matches: Vec<BeastcraftRecipe> = self
            .recipes
            .iter()
            .filter(|recipe| any_contains(recipe.haystack(), &needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            let rank = |r: &BeastcraftRecipe| u8::from(r.game_mode != "standard");
            rank(a).cmp(&rank(b)).then_with(|| a.display.cmp(&b.display))
        });
        matches
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> BestiaryIndex {
        BestiaryIndex::from_values(&[
            json!({
                "identifier": "ruthless-prefix",
                "header": "Split an item",
                "game_mode": "ruthless",
                "requirements": [{"component_id": "c1", "display": "Fenumal Plagued Arachnid", "amount": 0}]
            }),
            json!({
                "identifier": "imprint",
                "header": "Create an Imprint",
                "display": "Imprint an item",
                "requirements": [{"component_id": "c2", "display": "Craicic Chimeral", "rarity": "Unique"}]
            }),
            json!({
                "identifier": "arachnid",
                "header": "Add a prefix, remove a suffix",
                "notes": "Uses an arachnid",
                "requirements": [{"component_id": "c3", "display": "Farric Wolf Alpha"}]
            }),
            json!({"header": "missing identifier"})
        ])
    }

    #[test]
    fn entries_without_identifier_are_dropped() {
        let idx = index();
        assert_eq!(idx.recipes().len(), 3);
        assert_eq!(idx.recipes()[0].requirements[0].amount, 1);
        assert_eq!(idx.recipes()[1].game_mode, "standard");
        assert_eq!(idx.recipes()[2].display, "Add a prefix, remove a suffix");
    }

    #[test]
    fn search_sorts_standard_first_then_display() {
        let hits = index().search("arachnid");
        let ids: Vec<&str> = hits.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["arachnid", "ruthless-prefix"]);
    }

    #[test]
    fn search_covers_beast_rarity() {
        let hits = index().search("unique");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identifier, "imprint");
    }
}
