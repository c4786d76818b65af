//! Typed accessors over the Craft of Exile data bundle.
//!
//! The bundle's layout has changed across releases, so each section is looked
//! up under several key spellings and entries may come as an object keyed by
//! id or as a plain list.

use serde_json::{Map, Value};

use crate::knowledge::loader::scalar_text;

/// Keys compared against an identifier in [`CraftOfExileDataset::find`].
const IDENTIFIER_KEYS: &[&str] = &["id", "key", "name", "slug", "label"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Fossils,
    Harvest,
    Bench,
    MetaCrafting,
}

impl Section {
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Section::Fossils => &["fossils", "Fossils", "fossil"],
            Section::Harvest => &["harvest", "harvestCrafts", "Harvest", "HarvestCrafts"],
            Section::Bench => &["bench", "benchRecipes", "Bench", "recipes", "craftingBench"],
            Section::MetaCrafting => &[
                "metaCraftingOdds",
                "meta",
                "metaCraft",
                "metaCrafting",
                "meta_crafting_odds",
            ],
        }
    }

    /// Section named by a plan step's `reference_type`.
    pub fn from_reference(kind: &str) -> Option<Section> {
        match kind {
            "fossil" => Some(Section::Fossils),
            "harvest" => Some(Section::Harvest),
            "bench" => Some(Section::Bench),
            "meta" => Some(Section::MetaCrafting),
            _ => None,
        }
    }
}

fn is_empty_section(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

fn wrap_value(value: Value) -> Map<String, Value> {
    let mut entry = Map::new();
    entry.insert("value".into(), value);
    entry
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CraftOfExileDataset {
    pub payload: Value,
}

impl CraftOfExileDataset {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// First present alias of `section`; empty sections count as absent.
    pub fn section(&self, section: Section) -> Option<&Value> {
        section
            .aliases()
            .iter()
            .find_map(|key| self.payload.get(*key))
            .filter(|value| !is_empty_section(value))
    }

    /// Entries of a section as objects.
    ///
    /// Object sections merge their key into `id` and `key` (existing fields
    /// win); non-object values are wrapped as `{"value": …}`.
    pub fn entries(&self, section: Section) -> Vec<Map<String, Value>> {
        match self.section(section) {
            None => Vec::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, value)| match value {
                    Value::Object(fields) => {
                        let mut merged = fields.clone();
                        merged.entry("id").or_insert_with(|| Value::String(key.clone()));
                        merged.entry("key").or_insert_with(|| Value::String(key.clone()));
                        merged
                    }
                    other => {
                        let mut entry = Map::new();
                        entry.insert("id".into(), Value::String(key.clone()));
                        entry.insert("value".into(), other.clone());
                        entry
                    }
                })
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(fields) => fields.clone(),
                    other => wrap_value(other.clone()),
                })
                .collect(),
            Some(other) => vec![wrap_value(other.clone())],
        }
    }

    /// Entry whose id, key, name, slug or label equals `identifier`
    /// case-insensitively.
    pub fn find(&self, section: Section, identifier: &str) -> Option<Map<String, Value>> {
        let wanted = identifier.to_lowercase();
        self.entries(section).into_iter().find(|entry| {
            IDENTIFIER_KEYS.iter().any(|key| match entry.get(*key) {
                None | Some(Value::Null) => false,
                Some(value) => scalar_text(value).to_lowercase() == wanted,
            })
        })
    }

    pub fn fossil(&self, identifier: &str) -> Option<Map<String, Value>> {
        self.find(Section::Fossils, identifier)
    }

    pub fn harvest_craft(&self, identifier: &str) -> Option<Map<String, Value>> {
        self.find(Section::Harvest, identifier)
    }

    pub fn bench_recipe(&self, identifier: &str) -> Option<Map<String, Value>> {
        self.find(Section::Bench, identifier)
    }

    pub fn meta_craft(&self, identifier: &str) -> Option<Map<String, Value>> {
        self.find(Section::MetaCrafting, identifier)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
