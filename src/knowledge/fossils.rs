//! Fossils and resonators (`fossils.json`).
//!
//! Unlike the plain substring indices, fossil search is token based: every
//! meaningful query token has to appear somewhere in a record. Resonators can
//! additionally be selected by a socket count hint ("4-socket", "quad").

use std::collections::BTreeSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::errors::KnowledgeError;
use super::loader::{array_section, integer_field, load_json, text_field, text_list};
use super::text::{normalise, tokenise};

const STOP_TOKENS: &[&str] = &[
    "a", "an", "and", "apply", "craft", "crafting", "for", "in", "into", "on", "socket",
    "sockets", "socketed", "the", "to", "use", "using", "with",
];

const SOCKET_WORDS: &[(&str, i64)] = &[
    ("single", 1),
    ("one", 1),
    ("double", 2),
    ("two", 2),
    ("triple", 3),
    ("three", 3),
    ("quad", 4),
    ("quadruple", 4),
    ("four", 4),
];

static SOCKET_HINT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d+)[\s-]*(?:socket|sock|slot)").ok());

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagWeight {
    pub tag: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fossil {
    pub identifier: String,
    pub name: String,
    pub descriptions: Vec<String>,
    pub blocked_descriptions: Vec<String>,
    pub mod_texts: Vec<String>,
    pub notes: Vec<String>,
    pub allowed_tags: Vec<String>,
    pub forbidden_tags: Vec<String>,
    pub positive_mod_weights: Vec<TagWeight>,
    pub negative_mod_weights: Vec<TagWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resonator {
    pub identifier: String,
    pub name: String,
    pub sockets: i64,
    pub description: String,
    pub effects: Vec<String>,
    pub notes: Vec<String>,
    pub allowed_fossils: Vec<String>,
}

/// Fossil and resonator hits for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FossilSearch {
    pub fossils: Vec<Fossil>,
    pub resonators: Vec<Resonator>,
}

fn tag_weights(entry: &Value, key: &str) -> Vec<TagWeight> {
    let Some(Value::Array(items)) = entry.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let tag = text_field(item, "tag").trim().to_string();
            if tag.is_empty() {
                return None;
            }
            let weight = match item.get("weight") {
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
                _ => 0.0,
            };
            Some(TagWeight { tag, weight })
        })
        .collect()
}

impl Fossil {
    fn from_value(entry: &Value) -> Self {
        Self {
            identifier: text_field(entry, "identifier"),
            name: text_field(entry, "name"),
            descriptions: text_list(entry, "descriptions"),
            blocked_descriptions: text_list(entry, "blocked_descriptions"),
            mod_texts: text_list(entry, "mod_texts"),
            notes: text_list(entry, "notes"),
            allowed_tags: text_list(entry, "allowed_tags"),
            forbidden_tags: text_list(entry, "forbidden_tags"),
            positive_mod_weights: tag_weights(entry, "positive_mod_weights"),
            negative_mod_weights: tag_weights(entry, "negative_mod_weights"),
        }
    }

    fn haystack(&self) -> Vec<&str> {
        let mut fields = vec![self.identifier.as_str(), self.name.as_str()];
        for list in [
            &self.descriptions,
            &self.blocked_descriptions,
            &self.mod_texts,
            &self.notes,
            &self.allowed_tags,
            &self.forbidden_tags,
        ] {
            fields.extend(list.iter().map(String::as_str));
        }
        fields.extend(self.positive_mod_weights.iter().map(|w| w.tag.as_str()));
        fields.extend(self.negative_mod_weights.iter().map(|w| w.tag.as_str()));
        fields
    }
}

impl Resonator {
    fn from_value(entry: &Value) -> Self {
        Self {
            identifier: text_field(entry, "identifier"),
            name: text_field(entry, "name"),
            sockets: integer_field(entry, "sockets").unwrap_or(0),
            description: text_field(entry, "description"),
            effects: text_list(entry, "effects"),
            notes: text_list(entry, "notes"),
            allowed_fossils: text_list(entry, "allowed_fossils"),
        }
    }

    fn haystack(&self) -> Vec<String> {
        let mut fields = vec![
            self.identifier.clone(),
            self.name.clone(),
            self.description.clone(),
        ];
        fields.extend(self.effects.iter().cloned());
        fields.extend(self.notes.iter().cloned());
        fields.extend(self.allowed_fossils.iter().cloned());
        fields.push(self.sockets.to_string());
        fields
    }
}

fn socket_word(token: &str) -> Option<i64> {
    SOCKET_WORDS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, count)| *count)
}

fn without_stop_tokens(tokens: &[String], drop_socket_words: bool) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !STOP_TOKENS.contains(&t.as_str()))
        .filter(|t| !(drop_socket_words && socket_word(t).is_some()))
        .cloned()
        .collect()
}

/// Every token must be a substring of at least one non-empty field.
fn contains_tokens<'a, I>(haystack: I, tokens: &[String]) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    if tokens.is_empty() {
        return false;
    }
    let normalised: Vec<String> = haystack
        .into_iter()
        .filter(|field| !field.is_empty())
        .map(normalise)
        .collect();
    if normalised.is_empty() {
        return false;
    }
    tokens
        .iter()
        .all(|token| normalised.iter().any(|field| field.contains(token.as_str())))
}

fn socket_hints(query: &str) -> BTreeSet<i64> {
    let lowered = query.to_lowercase();
    let mut hints = BTreeSet::new();
    if let Some(re) = SOCKET_HINT.as_ref() {
        for caps in re.captures_iter(&lowered) {
            if let Some(count) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                hints.insert(count);
            }
        }
    }
    for token in tokenise(query) {
        if let Some(count) = socket_word(&token) {
            hints.insert(count);
        }
    }
    hints
}

#[derive(Debug, Clone, Default)]
pub struct FossilIndex {
    fossils: Vec<Fossil>,
    resonators: Vec<Resonator>,
}

impl FossilIndex {
    pub const FILE_NAME: &'static str = "fossils.json";

    pub fn load(data_dir: &Path) -> Result<Self, KnowledgeError> {
        let payload: Value = load_json(data_dir, Self::FILE_NAME)?;
        let index = Self::from_payload(&payload);
        tracing::info!(
            fossils = index.fossils.len(),
            resonators = index.resonators.len(),
            "fossil index loaded"
        );
        Ok(index)
    }

    /// Build from the `{ "fossils": [...], "resonators": [...] }` document.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            fossils: array_section(payload, "fossils")
                .iter()
                .map(Fossil::from_value)
                .collect(),
            resonators: array_section(payload, "resonators")
                .iter()
                .map(Resonator::from_value)
                .collect(),
        }
    }

    pub fn fossils(&self) -> &[Fossil] {
        &self.fossils
    }

    pub fn resonators(&self) -> &[Resonator] {
        &self.resonators
    }

    pub fn search(&self, query: &str) -> FossilSearch {
        FossilSearch {
            fossils: self.search_fossils(query),
            resonators: self.search_resonators(query),
        }
    }

    pub fn search_fossils(&self, query: &str) -> Vec<Fossil> {
        let raw_tokens = tokenise(query);
        let tokens: Vec<String> = without_stop_tokens(&raw_tokens, false)
            .into_iter()
            .filter(|t| t != "resonator" && t != "resonators")
            .filter(|t| socket_word(t).is_none())
            .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
            .collect();

        let matches: Vec<Fossil> = self
            .fossils
            .iter()
            .filter(|fossil| contains_tokens(fossil.haystack(), &tokens))
            .cloned()
            .collect();

        if matches.is_empty() && raw_tokens.iter().any(|t| t == "fossil" || t == "fossils") {
            return self.fossils.clone();
        }
        matches
    }

    pub fn search_resonators(&self, query: &str) -> Vec<Resonator> {
        let raw_tokens = tokenise(query);
        let tokens = without_stop_tokens(&raw_tokens, true);
        let hints = socket_hints(query);

        let mut matches = Vec::new();
        for resonator in &self.resonators {
            let haystack = resonator.haystack();
            if contains_tokens(haystack.iter().map(String::as_str), &tokens) {
                if hints.is_empty() || hints.contains(&resonator.sockets) {
                    matches.push(resonator.clone());
                }
                continue;
            }
            if hints.contains(&resonator.sockets) {
                matches.push(resonator.clone());
            }
        }

        if matches.is_empty()
            && raw_tokens
                .iter()
                .any(|t| t == "resonator" || t == "resonators")
        {
            return self.resonators.clone();
        }
        matches
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
