//! Blueprint-to-plan resolution.
//!
//! An [`ItemBlueprint`] describes a target item. Planning classifies each
//! required modifier against a [`SearchCatalog`], buckets the results by
//! crafting source and sequences one ordered list of [`CraftingStep`]s per
//! blueprint.
//!
//! ```text
//! classifier → bucketer → sequencer → assemble_plan_from_pob
//! ```
//!
//! [`enrich`] is a separate helper that decorates free-text actions with
//! dataset hits; it does not participate in blueprint planning.

pub(crate) mod bucketer;
pub(crate) mod classifier;
pub mod enrich;
pub(crate) mod sequencer;
pub mod types;

pub use enrich::enrich_actions;
pub use types::{
    CraftingStep, ItemBlueprint, ModRequirement, ModType, SocketBlueprint, SourceHint, SourceKind,
    StepType,
};

use crate::knowledge::{KnowledgeError, SearchCatalog};

/// Plan a single blueprint.
pub fn plan_blueprint(
    catalog: &dyn SearchCatalog,
    blueprint: &ItemBlueprint,
) -> Result<Vec<CraftingStep>, KnowledgeError> {
    let classifications = blueprint
        .all_required_mods()
        .map(|requirement| classifier::classify(catalog, blueprint, requirement))
        .collect::<Result<Vec<_>, _>>()?;

    let buckets = bucketer::bucket(classifications);
    let steps = sequencer::sequence(catalog, blueprint, &buckets)?;

    tracing::info!(
        base = %blueprint.base_item,
        steps = steps.len(),
        gaps = buckets.gaps.len(),
        "blueprint planned"
    );
    Ok(steps)
}

/// Plan every blueprint and concatenate the steps in blueprint order.
///
/// Steps are not deduplicated across blueprints. The first catalog error
/// aborts the whole plan.
pub fn assemble_plan_from_pob(
    catalog: &dyn SearchCatalog,
    blueprints: &[ItemBlueprint],
) -> Result<Vec<CraftingStep>, KnowledgeError> {
    let mut plan = Vec::new();
    for blueprint in blueprints {
        plan.extend(plan_blueprint(catalog, blueprint)?);
    }
    Ok(plan)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
