//! Blueprint input model and the `CraftingStep` output record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Affix slot a required modifier occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModType {
    Prefix,
    Suffix,
    Implicit,
    Crafted,
}

impl ModType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModType::Prefix => "prefix",
            ModType::Suffix => "suffix",
            ModType::Implicit => "implicit",
            ModType::Crafted => "crafted",
        }
    }
}

/// Crafting mechanism the author of a blueprint expects to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Essence,
    Bench,
    Harvest,
    Influence,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceHint {
    pub kind: SourceKind,
    /// Preferred search phrase, e.g. a specific essence name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SourceHint {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: SourceKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }
}

fn default_required() -> bool {
    true
}

/// One modifier the finished item must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModRequirement {
    pub text: String,
    pub mod_type: ModType,
    /// Reserved for soft requirements; planning treats every mod as required.
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hint: Option<SourceHint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ModRequirement {
    pub fn new(text: impl Into<String>, mod_type: ModType) -> Self {
        Self {
            text: text.into(),
            mod_type,
            required: true,
            source_hint: None,
            notes: Vec::new(),
        }
    }

    pub fn prefix(text: impl Into<String>) -> Self {
        Self::new(text, ModType::Prefix)
    }

    pub fn suffix(text: impl Into<String>) -> Self {
        Self::new(text, ModType::Suffix)
    }

    pub fn with_hint(mut self, hint: SourceHint) -> Self {
        self.source_hint = Some(hint);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Socket count, link and colour targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketBlueprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub colours: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl SocketBlueprint {
    /// Largest requested link group.
    pub fn max_link(&self) -> Option<u32> {
        self.links.iter().copied().max()
    }
}

/// A target item: base, influences, required affixes and sockets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBlueprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub base_item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_class: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub influences: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_prefixes: Vec<ModRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_suffixes: Vec<ModRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sockets: Option<SocketBlueprint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ItemBlueprint {
    pub fn new(base_item: impl Into<String>) -> Self {
        Self {
            name: None,
            base_item: base_item.into(),
            item_class: None,
            influences: Vec::new(),
            required_prefixes: Vec::new(),
            required_suffixes: Vec::new(),
            sockets: None,
            notes: Vec::new(),
        }
    }

    /// Prefixes in declared order, then suffixes in declared order.
    pub fn all_required_mods(&self) -> impl Iterator<Item = &ModRequirement> {
        self.required_prefixes
            .iter()
            .chain(self.required_suffixes.iter())
    }
}

// ─── Plan output ────────────────────────────────────────────────────────────

/// Value of the `type` metadata key on every emitted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    BaseItem,
    Sockets,
    Influence,
    Essence,
    Harvest,
    Bench,
    Gap,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::BaseItem => "base_item",
            StepType::Sockets => "sockets",
            StepType::Influence => "influence",
            StepType::Essence => "essence",
            StepType::Harvest => "harvest",
            StepType::Bench => "bench",
            StepType::Gap => "gap",
        }
    }
}

/// One instruction in a crafting plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftingStep {
    pub action: String,
    /// Newline-separated instruction lines.
    pub instruction: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CraftingStep {
    pub fn new(action: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            instruction: instruction.into(),
            metadata: Map::new(),
        }
    }

    pub fn step_type(&self) -> Option<&str> {
        self.metadata.get("type").and_then(Value::as_str)
    }

    /// Modifier texts this step addresses.
    pub fn covers_mods(&self) -> Vec<&str> {
        match self.metadata.get("covers_mods") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
