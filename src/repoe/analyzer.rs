//! Analyse an item base against a set of desired mods.

use serde::Serialize;
use serde_json::Value;

use crate::knowledge::loader::{integer_field, optional_text};

use super::data::{
    BaseDescription, BenchOption, RePoEData, SpawnWeightBreakdown, TierBreakdown,
    REPOE_DEFAULT_BRANCH,
};
use super::errors::RePoEError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRange {
    pub id: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModAnalysis {
    pub mod_id: String,
    pub display_name: Option<String>,
    pub tier: TierBreakdown,
    pub spawn_weights: SpawnWeightBreakdown,
    pub bench_options: Vec<BenchOption>,
    pub stats: Vec<StatRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAnalysis {
    pub base: BaseDescription,
    pub mods: Vec<ModAnalysis>,
    /// Lower-cased, sorted and deduplicated.
    pub influences: Vec<String>,
    pub branch: String,
    pub league: Option<String>,
}

pub struct CraftingAnalyzer {
    data: RePoEData,
    branch: String,
    league: Option<String>,
}

impl CraftingAnalyzer {
    pub fn new(data: RePoEData, branch: impl Into<String>, league: Option<String>) -> Self {
        Self {
            data,
            branch: branch.into(),
            league,
        }
    }

    /// Analyser over the default branch without a league.
    pub fn with_data(data: RePoEData) -> Self {
        Self::new(data, REPOE_DEFAULT_BRANCH, None)
    }

    pub fn data(&self) -> &RePoEData {
        &self.data
    }

    /// Resolve the base and every desired mod (by id or display name).
    ///
    /// Unknown or ambiguous mods are skipped with a warning; an unresolvable
    /// base is an error.
    pub fn analyse_item(
        &self,
        base_identifier: &str,
        desired_mods: &[String],
        influences: &[String],
    ) -> Result<ItemAnalysis, RePoEError> {
        let (base_id, base_data) = self.data.resolve_base(base_identifier)?;
        let base = self.data.describe_base(base_id, base_data);

        let mut mods = Vec::new();
        for entry in desired_mods {
            let (mod_id, mod_data) = match self.data.resolve_mod(entry) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::warn!(entry = %entry, error = %e, "skipping unknown mod");
                    continue;
                }
            };
            mods.push(ModAnalysis {
                mod_id: mod_id.to_string(),
                display_name: optional_text(mod_data, "name"),
                tier: self.data.tier_breakdown(mod_id)?,
                spawn_weights: self.data.spawn_weights(mod_id, &base.tags, influences)?,
                bench_options: self.data.bench_options(mod_id),
                stats: stat_ranges(mod_data),
            });
        }

        let mut influences: Vec<String> = influences.iter().map(|i| i.to_lowercase()).collect();
        influences.sort();
        influences.dedup();

        tracing::debug!(base = %base.id, mods = mods.len(), "analysed item");
        Ok(ItemAnalysis {
            base,
            mods,
            influences,
            branch: self.branch.clone(),
            league: self.league.clone(),
        })
    }
}

fn stat_ranges(mod_data: &Value) -> Vec<StatRange> {
    let Some(stats) = mod_data.get("stats").and_then(Value::as_array) else {
        return Vec::new();
    };
    stats
        .iter()
        .map(|stat| StatRange {
            id: optional_text(stat, "id"),
            min: integer_field(stat, "min"),
            max: integer_field(stat, "max"),
            kind: optional_text(stat, "type"),
        })
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
