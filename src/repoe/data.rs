//! The subset of the RePoE game-data export used for crafting analysis.
//!
//! Records are kept as raw JSON objects; RePoE adds fields between game
//! patches and only a handful are read here.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::knowledge::loader::{integer_field, optional_text, scalar_text, text_field, text_list};

use super::errors::RePoEError;

pub const REPOE_DEFAULT_BRANCH: &str = "master";

/// Local file names tried, in order, for each logical dataset.
const MODS_FILES: &[&str] = &["mods.json", "mods.min.json"];
const MASTER_MODS_FILES: &[&str] = &[
    "master_mods.json",
    "crafting_bench_options.json",
    "crafting_bench_options.min.json",
];
const ITEM_BASES_FILES: &[&str] = &["item_bases.json", "base_items.json", "base_items.min.json"];
const TAGS_FILES: &[&str] = &["tags.json", "tags.min.json"];
const MOD_TYPES_FILES: &[&str] = &["mod_types.json", "mod_types.min.json"];

/// How many candidate ids an ambiguous mod error lists.
const AMBIGUOUS_MOD_LIMIT: usize = 5;

/// `<base>/<branch>/<league?>`.
pub fn repoe_data_root(base_path: &Path, branch: &str, league: Option<&str>) -> PathBuf {
    let mut root = base_path.join(branch);
    if let Some(league) = league.filter(|league| !league.is_empty()) {
        root.push(league);
    }
    root
}

fn load_first(root: &Path, candidates: &[&str]) -> Result<Value, RePoEError> {
    let Some(path) = candidates
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.exists())
    else {
        return Err(RePoEError::FileMissing {
            root: root.display().to_string(),
            candidates: candidates.iter().map(|name| name.to_string()).collect(),
        });
    };
    let raw = std::fs::read_to_string(&path).map_err(|e| RePoEError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let value = serde_json::from_str(&raw).map_err(|e| RePoEError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded RePoE file");
    Ok(value)
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Objects become their values, arrays stay as they are.
fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Tags ship as a list; older exports used an object keyed by tag.
fn into_tags(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
        _ => Vec::new(),
    }
}

fn mod_groups(mod_id: &str, data: &Value) -> Vec<String> {
    let groups = text_list(data, "groups");
    if groups.is_empty() {
        vec![mod_id.to_string()]
    } else {
        groups
    }
}

// ─── Reports ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseDescription {
    pub id: String,
    pub name: Option<String>,
    pub item_class: Option<String>,
    pub drop_level: Option<i64>,
    pub tags: Vec<String>,
    pub implicits: Vec<String>,
    pub requirements: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModTier {
    /// 1 is the highest tier.
    pub tier: usize,
    pub id: String,
    pub name: Option<String>,
    pub required_level: i64,
    pub stats: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierBreakdown {
    pub group: String,
    /// Position of the analysed mod within `tiers`.
    pub tier: Option<usize>,
    pub total_tiers: usize,
    pub tiers: Vec<ModTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnWeightBreakdown {
    /// Matching `(tag, weight)` pairs, heaviest first.
    pub relevant_tags: Vec<(String, i64)>,
    pub total_weight: i64,
    /// Tags with weight 0 that the item does not carry.
    pub disabled_tags: Vec<String>,
    pub is_spawnable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchCostEntry {
    pub currency_id: String,
    pub currency_name: String,
    pub amount: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchOption {
    pub master: Option<String>,
    pub bench_tier: Option<i64>,
    pub item_classes: Vec<String>,
    pub cost: Vec<BenchCostEntry>,
    pub actions: Value,
}

// ─── Export ─────────────────────────────────────────────────────────────────

pub struct RePoEData {
    root: PathBuf,
    mods: Map<String, Value>,
    master_mods: Vec<Value>,
    item_bases: Map<String, Value>,
    tags: Vec<String>,
    mod_types: Map<String, Value>,

    tag_set: HashSet<String>,
    mods_by_name: HashMap<String, Vec<String>>,
    /// Mod ids per group, highest required level first.
    mods_by_group: HashMap<String, Vec<String>>,
    bases_by_name: HashMap<String, Vec<String>>,
    /// Indices into `master_mods` per granted mod id.
    bench_by_mod: HashMap<String, Vec<usize>>,
}

impl RePoEData {
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, RePoEError> {
        let root = root.into();
        if !root.exists() {
            return Err(RePoEError::ExportMissing {
                path: root.display().to_string(),
            });
        }
        let data = Self::from_parts(
            root.clone(),
            into_object(load_first(&root, MODS_FILES)?),
            into_records(load_first(&root, MASTER_MODS_FILES)?),
            into_object(load_first(&root, ITEM_BASES_FILES)?),
            into_tags(load_first(&root, TAGS_FILES)?),
            into_object(load_first(&root, MOD_TYPES_FILES)?),
        );
        tracing::info!(
            root = %data.root.display(),
            mods = data.mods.len(),
            bases = data.item_bases.len(),
            bench_options = data.master_mods.len(),
            "loaded RePoE export"
        );
        Ok(data)
    }

    pub fn from_parts(
        root: PathBuf,
        mods: Map<String, Value>,
        master_mods: Vec<Value>,
        item_bases: Map<String, Value>,
        tags: Vec<String>,
        mod_types: Map<String, Value>,
    ) -> Self {
        let mut data = Self {
            root,
            tag_set: tags.iter().cloned().collect(),
            mods,
            master_mods,
            item_bases,
            tags,
            mod_types,
            mods_by_name: HashMap::new(),
            mods_by_group: HashMap::new(),
            bases_by_name: HashMap::new(),
            bench_by_mod: HashMap::new(),
        };
        data.build_indexes();
        data
    }

    fn build_indexes(&mut self) {
        for (mod_id, mod_data) in &self.mods {
            let name = text_field(mod_data, "name").trim().to_lowercase();
            if !name.is_empty() {
                self.mods_by_name.entry(name).or_default().push(mod_id.clone());
            }
            for group in mod_groups(mod_id, mod_data) {
                self.mods_by_group.entry(group).or_default().push(mod_id.clone());
            }
        }

        let mods = &self.mods;
        let sort_key = |id: &String| {
            let data = mods.get(id);
            (
                data.and_then(|d| integer_field(d, "required_level")).unwrap_or(0),
                data.map(|d| text_field(d, "generation_type")).unwrap_or_default(),
                id.clone(),
            )
        };
        for ids in self.mods_by_group.values_mut() {
            ids.sort_by_key(|id| std::cmp::Reverse(sort_key(id)));
        }

        for (base_id, base_data) in &self.item_bases {
            let name = text_field(base_data, "name").trim().to_lowercase();
            if !name.is_empty() {
                self.bases_by_name.entry(name).or_default().push(base_id.clone());
            }
        }

        for (index, option) in self.master_mods.iter().enumerate() {
            let Some(actions) = option.get("actions") else {
                continue;
            };
            for action in ["add_explicit_mod", "add_random_veiled_modifier"] {
                if let Some(mod_id) = optional_text(actions, action) {
                    self.bench_by_mod.entry(mod_id).or_default().push(index);
                }
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn mod_types(&self) -> &Map<String, Value> {
        &self.mod_types
    }

    pub fn mod_record(&self, mod_id: &str) -> Option<&Value> {
        self.mods.get(mod_id)
    }

    /// Resolve a base by metadata id, then by case-insensitive display name.
    pub fn resolve_base(&self, identifier: &str) -> Result<(&str, &Value), RePoEError> {
        let identifier = identifier.trim();
        if let Some((id, data)) = self.item_bases.get_key_value(identifier) {
            return Ok((id.as_str(), data));
        }
        let matches = self
            .bases_by_name
            .get(&identifier.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default();
        match matches {
            [] => Err(RePoEError::UnknownBase {
                name: identifier.to_string(),
            }),
            [only] => self
                .item_bases
                .get_key_value(only)
                .map(|(id, data)| (id.as_str(), data))
                .ok_or_else(|| RePoEError::UnknownBase {
                    name: identifier.to_string(),
                }),
            many => Err(RePoEError::AmbiguousBase {
                name: identifier.to_string(),
                ids: many.to_vec(),
            }),
        }
    }

    /// Resolve a mod by internal id, then by case-insensitive display name.
    pub fn resolve_mod(&self, identifier: &str) -> Result<(&str, &Value), RePoEError> {
        let identifier = identifier.trim();
        if let Some((id, data)) = self.mods.get_key_value(identifier) {
            return Ok((id.as_str(), data));
        }
        let matches = self
            .mods_by_name
            .get(&identifier.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default();
        match matches {
            [] => Err(RePoEError::UnknownMod {
                name: identifier.to_string(),
            }),
            [only] => self
                .mods
                .get_key_value(only)
                .map(|(id, data)| (id.as_str(), data))
                .ok_or_else(|| RePoEError::UnknownMod {
                    name: identifier.to_string(),
                }),
            many => {
                let mut candidates: Vec<String> =
                    many.iter().take(AMBIGUOUS_MOD_LIMIT).cloned().collect();
                if many.len() > AMBIGUOUS_MOD_LIMIT {
                    candidates.push("…".into());
                }
                Err(RePoEError::AmbiguousMod {
                    name: identifier.to_string(),
                    candidates,
                })
            }
        }
    }

    pub fn describe_base(&self, base_id: &str, base: &Value) -> BaseDescription {
        BaseDescription {
            id: base_id.to_string(),
            name: optional_text(base, "name"),
            item_class: optional_text(base, "item_class"),
            drop_level: integer_field(base, "drop_level"),
            tags: text_list(base, "tags"),
            implicits: text_list(base, "implicits"),
            requirements: base
                .get("requirements")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        }
    }

    /// Every tier of the mod's primary group, highest first.
    pub fn tier_breakdown(&self, mod_id: &str) -> Result<TierBreakdown, RePoEError> {
        let mod_data = self.mods.get(mod_id).ok_or_else(|| RePoEError::UnknownMod {
            name: mod_id.to_string(),
        })?;
        let group = mod_groups(mod_id, mod_data)
            .into_iter()
            .next()
            .unwrap_or_else(|| mod_id.to_string());
        let ids = self.mods_by_group.get(&group).map(Vec::as_slice).unwrap_or_default();

        let tiers: Vec<ModTier> = ids
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let data = self.mods.get(id)?;
                Some(ModTier {
                    tier: index + 1,
                    id: id.clone(),
                    name: optional_text(data, "name"),
                    required_level: integer_field(data, "required_level").unwrap_or(0),
                    stats: stat_values(data),
                })
            })
            .collect();

        Ok(TierBreakdown {
            tier: tiers.iter().find(|tier| tier.id == mod_id).map(|tier| tier.tier),
            total_tiers: ids.len(),
            group,
            tiers,
        })
    }

    /// `<tag>_<influence>` tags that exist in the export, e.g. `boots_shaper`.
    pub fn influence_tags(&self, base_tags: &[String], influences: &[String]) -> Vec<String> {
        let lowered: BTreeSet<String> = influences.iter().map(|i| i.to_lowercase()).collect();
        base_tags
            .iter()
            .flat_map(|tag| lowered.iter().map(move |influence| format!("{tag}_{influence}")))
            .filter(|candidate| self.tag_set.contains(candidate))
            .collect()
    }

    pub fn spawn_weights(
        &self,
        mod_id: &str,
        base_tags: &[String],
        influences: &[String],
    ) -> Result<SpawnWeightBreakdown, RePoEError> {
        let mod_data = self.mods.get(mod_id).ok_or_else(|| RePoEError::UnknownMod {
            name: mod_id.to_string(),
        })?;

        let mut tags_to_check: HashSet<String> = base_tags.iter().cloned().collect();
        if !influences.is_empty() {
            tags_to_check.extend(self.influence_tags(base_tags, influences));
        }
        tags_to_check.insert("default".into());

        let mut relevant = Vec::new();
        let mut disabled = Vec::new();
        let mut total = 0;
        let weights = mod_data.get("spawn_weights").and_then(Value::as_array);
        for entry in weights.into_iter().flatten() {
            let tag = text_field(entry, "tag");
            let weight = integer_field(entry, "weight").unwrap_or(0);
            if tags_to_check.contains(&tag) {
                total += weight.max(0);
                relevant.push((tag, weight));
            } else if weight == 0 {
                disabled.push(tag);
            }
        }
        relevant.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(SpawnWeightBreakdown {
            is_spawnable: relevant.iter().any(|(_, weight)| *weight > 0),
            relevant_tags: relevant,
            total_weight: total,
            disabled_tags: disabled,
        })
    }

    /// Bench options that grant `mod_id`, with costs named after their
    /// currency bases.
    pub fn bench_options(&self, mod_id: &str) -> Vec<BenchOption> {
        let indices = self.bench_by_mod.get(mod_id).map(Vec::as_slice).unwrap_or_default();
        indices
            .iter()
            .filter_map(|index| self.master_mods.get(*index))
            .map(|option| BenchOption {
                master: optional_text(option, "master"),
                bench_tier: integer_field(option, "bench_tier"),
                item_classes: text_list(option, "item_classes"),
                cost: self.describe_cost(option.get("cost")),
                actions: option
                    .get("actions")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            })
            .collect()
    }

    fn describe_cost(&self, cost: Option<&Value>) -> Vec<BenchCostEntry> {
        let Some(Value::Object(cost)) = cost else {
            return Vec::new();
        };
        cost.iter()
            .map(|(currency_id, amount)| BenchCostEntry {
                currency_name: self
                    .item_bases
                    .get(currency_id)
                    .and_then(|base| optional_text(base, "name"))
                    .unwrap_or_else(|| {
                        currency_id.rsplit('/').next().unwrap_or(currency_id.as_str()).to_string()
                    }),
                currency_id: currency_id.clone(),
                amount: amount.clone(),
            })
            .collect()
    }
}

fn stat_values(data: &Value) -> Vec<Value> {
    data.get("stats")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
