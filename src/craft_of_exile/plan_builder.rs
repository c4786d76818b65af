//! Attach Craft of Exile records to raw plan steps.
//!
//! A raw step is a JSON object with `action`, `description`, optional
//! `metadata`, and optionally `reference_type` (`fossil`, `harvest`, `bench`
//! or `meta`) plus `reference_id`. Resolved records land under
//! `metadata.craft_of_exile`.

use std::path::PathBuf;
use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::knowledge::loader::scalar_text;
use crate::planner::CraftingStep;

use super::client::CraftOfExileClient;
use super::dataset::{CraftOfExileDataset, Section};
use super::errors::CraftOfExileError;

pub const BUNDLE_FILE_NAME: &str = "data.json";

pub struct CraftingPlanBuilder {
    base_path: PathBuf,
    league: Option<String>,
    dataset: OnceLock<CraftOfExileDataset>,
}

impl CraftingPlanBuilder {
    pub fn new(base_path: impl Into<PathBuf>, league: Option<String>) -> Self {
        Self {
            base_path: base_path.into(),
            league: league.filter(|league| !league.is_empty()),
            dataset: OnceLock::new(),
        }
    }

    /// `<base>/<league?>/data.json`.
    pub fn bundle_path(&self) -> PathBuf {
        let mut path = self.base_path.clone();
        if let Some(league) = &self.league {
            path.push(league);
        }
        path.join(BUNDLE_FILE_NAME)
    }

    fn dataset(&self) -> Result<&CraftOfExileDataset, CraftOfExileError> {
        if let Some(dataset) = self.dataset.get() {
            return Ok(dataset);
        }
        let loaded = CraftOfExileClient::load_from_path(&self.bundle_path())?;
        Ok(self.dataset.get_or_init(|| loaded))
    }

    /// Resolve a step's reference. The bundle is only loaded for steps that
    /// carry both a known reference type and an id.
    fn resolve_reference(
        &self,
        step: &Map<String, Value>,
    ) -> Result<Option<Map<String, Value>>, CraftOfExileError> {
        let kind = step.get("reference_type").map(scalar_text).unwrap_or_default();
        let id = step.get("reference_id").map(scalar_text).unwrap_or_default();
        if kind.is_empty() || id.is_empty() {
            return Ok(None);
        }
        let Some(section) = Section::from_reference(&kind) else {
            tracing::debug!(reference_type = %kind, "unknown craft of exile reference type");
            return Ok(None);
        };
        let found = self.dataset()?.find(section, &id);
        if found.is_none() {
            tracing::debug!(reference_type = %kind, reference_id = %id, "craft of exile reference not found");
        }
        Ok(found)
    }

    /// Build plan steps from raw step objects, resolving references.
    pub fn build(&self, steps: &[Map<String, Value>]) -> Result<Vec<CraftingStep>, CraftOfExileError> {
        steps
            .iter()
            .map(|step| {
                let mut built = CraftingStep::new(
                    step.get("action").map(scalar_text).unwrap_or_default(),
                    step.get("description").map(scalar_text).unwrap_or_default(),
                );
                if let Some(Value::Object(metadata)) = step.get("metadata") {
                    built.metadata = metadata.clone();
                }
                if let Some(reference) = self.resolve_reference(step)? {
                    built
                        .metadata
                        .insert("craft_of_exile".into(), Value::Object(reference));
                }
                Ok(built)
            })
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
