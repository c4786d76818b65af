//! Turn buckets into an ordered list of crafting steps.
//!
//! Per blueprint the order is fixed: base item, sockets, influence, essences,
//! harvest, bench (suffix crafts last), gaps. Every step carries `type` and
//! `covers_mods` in its metadata. The remaining keys depend on the type:
//!
//! | type        | keys                                                      |
//! |-------------|-----------------------------------------------------------|
//! | `base_item` | `base_item`, `item_class`, `name`, `influences`            |
//! | `sockets`   | `total`, `links`, `colours`, `search_query`, `bench_recipe` |
//! | `influence` | `influences`                                              |
//! | `essence`   | `essence`, `candidates`                                   |
//! | `harvest`   | `harvest_crafts`                                          |
//! | `bench`     | `bench_recipe`, `consumes_suffix`, `mod_type`             |
//! | `gap`       | `missing_source`, `search_terms`, `notes`, `mod_type`     |
//!
//! Absent optional fields are omitted rather than written as `null`.

use serde_json::{json, Map, Value};

use crate::knowledge::{KnowledgeError, Match, SearchCatalog};

use super::bucketer::{
    EssenceBucket, GapBucket, InfluenceBucket, PlanBuckets, SourceBucket,
    ESSENCE_CANDIDATE_LIMIT,
};
use super::types::{CraftingStep, ItemBlueprint, ModRequirement, ModType, SocketBlueprint, StepType};

fn step(
    step_type: StepType,
    action: String,
    lines: Vec<String>,
    covers: &[&ModRequirement],
) -> CraftingStep {
    let mut metadata = Map::new();
    metadata.insert("type".into(), json!(step_type.as_str()));
    metadata.insert(
        "covers_mods".into(),
        json!(covers.iter().map(|m| m.text.as_str()).collect::<Vec<_>>()),
    );
    CraftingStep {
        action,
        instruction: lines.join("\n"),
        metadata,
    }
}

fn mod_notes(mods: &[&ModRequirement]) -> Vec<String> {
    mods.iter()
        .flat_map(|m| m.notes.iter().cloned())
        .collect()
}

fn joined_texts(mods: &[&ModRequirement]) -> String {
    mods.iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// ─── Base item ──────────────────────────────────────────────────────────────

fn base_item_step(blueprint: &ItemBlueprint) -> CraftingStep {
    let mut first = format!("Acquire a {} base", blueprint.base_item);
    if let Some(class) = &blueprint.item_class {
        first.push_str(&format!(" (item class: {class})"));
    }
    first.push('.');

    let mut lines = vec![first];
    if let Some(name) = &blueprint.name {
        lines.push(format!("Target item: {name}."));
    }
    if !blueprint.influences.is_empty() {
        lines.push(format!(
            "Prefer a base that already carries {} influence.",
            blueprint.influences.join(" + ")
        ));
    }
    lines.extend(blueprint.notes.iter().cloned());

    let mut s = step(
        StepType::BaseItem,
        format!("Acquire {}", blueprint.base_item),
        lines,
        &[],
    );
    s.metadata.insert("base_item".into(), json!(blueprint.base_item));
    if let Some(class) = &blueprint.item_class {
        s.metadata.insert("item_class".into(), json!(class));
    }
    if let Some(name) = &blueprint.name {
        s.metadata.insert("name".into(), json!(name));
    }
    s.metadata.insert("influences".into(), json!(blueprint.influences));
    s
}

// ─── Sockets ────────────────────────────────────────────────────────────────

fn socket_query(sockets: &SocketBlueprint) -> Option<String> {
    sockets
        .max_link()
        .map(|link| format!("{link}-link"))
        .or_else(|| sockets.total.map(|total| format!("{total} socket")))
}

fn sockets_step(
    catalog: &dyn SearchCatalog,
    sockets: &SocketBlueprint,
) -> Result<CraftingStep, KnowledgeError> {
    let mut lines = Vec::new();
    if let Some(total) = sockets.total {
        lines.push(format!("Target {total} sockets."));
    }
    if let Some(link) = sockets.max_link() {
        lines.push(format!("Link them as a {link}-link."));
    }
    if !sockets.colours.is_empty() {
        let colours = sockets
            .colours
            .iter()
            .map(|(colour, count)| format!("{count} {colour}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Colours: {colours}."));
    }
    lines.extend(sockets.notes.iter().cloned());

    let query = socket_query(sockets);
    let recipe = match &query {
        Some(q) => catalog.find_bench_recipes(q)?.into_iter().next(),
        None => None,
    };
    match (&recipe, &query) {
        (Some(recipe), _) => lines.push(format!(
            "Bench option: {} ({}).",
            recipe.display,
            recipe.bench_summary()
        )),
        (None, Some(q)) => lines.push(format!(
            "No bench recipe matched '{q}'; use Jeweller's, Fusing and Chromatic orbs."
        )),
        (None, None) => {}
    }

    let mut s = step(StepType::Sockets, "Configure sockets".into(), lines, &[]);
    if let Some(total) = sockets.total {
        s.metadata.insert("total".into(), json!(total));
    }
    s.metadata.insert("links".into(), json!(sockets.links));
    s.metadata.insert("colours".into(), json!(sockets.colours));
    if let Some(q) = query {
        s.metadata.insert("search_query".into(), json!(q));
    }
    if let Some(recipe) = recipe {
        s.metadata
            .insert("bench_recipe".into(), Match::Bench(recipe).to_metadata()?);
    }
    Ok(s)
}

// ─── Influence ──────────────────────────────────────────────────────────────

fn influence_step(blueprint: &ItemBlueprint, bucket: &InfluenceBucket<'_>) -> CraftingStep {
    let mut lines = vec![format!(
        "Influence-exclusive modifiers: {}.",
        joined_texts(&bucket.mods)
    )];
    if !blueprint.influences.is_empty() {
        lines.push(format!("Required influence: {}.", blueprint.influences.join(", ")));
    }
    lines.push(format!(
        "Use an influence slam (the matching conqueror Exalted Orb, Awakener's Orb or Maven's Orb) or trade for a {} that already rolls these modifiers.",
        blueprint.base_item
    ));
    lines.extend(mod_notes(&bucket.mods));

    let mut s = step(
        StepType::Influence,
        "Add influence modifiers".into(),
        lines,
        &bucket.mods,
    );
    s.metadata.insert("influences".into(), json!(blueprint.influences));
    s
}

// ─── Essence ────────────────────────────────────────────────────────────────

fn essence_step(bucket: &EssenceBucket<'_>) -> Result<CraftingStep, KnowledgeError> {
    let name = bucket.representative.name();
    let guaranteed = bucket.representative.summary_lines();
    let mut lines = vec![if guaranteed.is_empty() {
        format!("Use {name}.")
    } else {
        format!("Use {name} to guarantee: {}.", guaranteed.join("; "))
    }];
    lines.push(format!("Covers: {}.", joined_texts(&bucket.mods)));
    lines.push("Apply essences before any bench craft so the guaranteed modifier is not blocked.".into());
    lines.extend(mod_notes(&bucket.mods));

    let mut s = step(StepType::Essence, format!("Apply {name}"), lines, &bucket.mods);
    s.metadata
        .insert("essence".into(), bucket.representative.to_metadata()?);
    let candidates = bucket
        .candidates
        .iter()
        .take(ESSENCE_CANDIDATE_LIMIT)
        .map(Match::to_metadata)
        .collect::<Result<Vec<_>, _>>()?;
    s.metadata.insert("candidates".into(), Value::Array(candidates));
    Ok(s)
}

// ─── Harvest ────────────────────────────────────────────────────────────────

fn harvest_step(bucket: &SourceBucket<'_>) -> Result<CraftingStep, KnowledgeError> {
    let description = bucket.chosen.summary_lines().join(" ");
    let mut lines = vec![
        format!("Use the Harvest craft: {description}"),
        format!("Targets: {}.", bucket.requirement.text),
        "Sequence Harvest crafts before bench crafts.".to_string(),
    ];
    if !bucket.alternatives.is_empty() {
        let names: Vec<&str> = bucket.alternatives.iter().map(Match::name).collect();
        lines.push(format!("Alternatives: {}.", names.join("; ")));
    }
    lines.extend(bucket.requirement.notes.iter().cloned());

    let mut s = step(
        StepType::Harvest,
        format!("Harvest: {}", bucket.chosen.name()),
        lines,
        &[bucket.requirement],
    );
    let crafts = std::iter::once(&bucket.chosen)
        .chain(&bucket.alternatives)
        .map(Match::to_metadata)
        .collect::<Result<Vec<_>, _>>()?;
    s.metadata.insert("harvest_crafts".into(), Value::Array(crafts));
    Ok(s)
}

// ─── Bench ──────────────────────────────────────────────────────────────────

fn bench_step(bucket: &SourceBucket<'_>) -> Result<CraftingStep, KnowledgeError> {
    let consumes_suffix = bucket.requirement.mod_type == ModType::Suffix;
    let mut lines = vec![match &bucket.chosen {
        Match::Bench(recipe) => format!(
            "Craft '{}' at the crafting bench ({}).",
            recipe.display,
            recipe.bench_summary()
        ),
        other => format!("Craft '{}' at the crafting bench.", other.name()),
    }];
    lines.push(format!("Targets: {}.", bucket.requirement.text));
    if consumes_suffix {
        lines.push("Apply this bench craft last; it occupies the open suffix slot.".into());
    }
    lines.extend(bucket.requirement.notes.iter().cloned());

    let mut s = step(
        StepType::Bench,
        format!("Bench craft: {}", bucket.chosen.name()),
        lines,
        &[bucket.requirement],
    );
    s.metadata
        .insert("bench_recipe".into(), bucket.chosen.to_metadata()?);
    s.metadata
        .insert("consumes_suffix".into(), json!(consumes_suffix));
    s.metadata
        .insert("mod_type".into(), json!(bucket.requirement.mod_type.as_str()));
    Ok(s)
}

// ─── Gap ────────────────────────────────────────────────────────────────────

fn gap_step(bucket: &GapBucket<'_>) -> CraftingStep {
    let requirement = bucket.requirement;
    tracing::warn!(
        mod_text = %requirement.text,
        terms = ?bucket.search_terms,
        "no curated source for modifier"
    );

    let mut lines = vec![format!(
        "No curated recipe found for '{}' ({}).",
        requirement.text,
        requirement.mod_type.as_str()
    )];
    if !bucket.search_terms.is_empty() {
        lines.push(format!("Searched for: {}.", bucket.search_terms.join(", ")));
    }
    lines.push(
        "Consider fossil crafting, eldritch implicits, or trading for a base that already has this modifier."
            .into(),
    );
    lines.extend(requirement.notes.iter().cloned());

    let mut s = step(
        StepType::Gap,
        format!("Source: {}", requirement.text),
        lines,
        &[requirement],
    );
    s.metadata.insert("missing_source".into(), json!(true));
    s.metadata
        .insert("search_terms".into(), json!(bucket.search_terms));
    s.metadata.insert("notes".into(), json!(requirement.notes));
    s.metadata
        .insert("mod_type".into(), json!(requirement.mod_type.as_str()));
    s
}

/// Emit the steps for one blueprint in the fixed order.
///
/// The only catalog call made here is the socket bench lookup.
pub(crate) fn sequence(
    catalog: &dyn SearchCatalog,
    blueprint: &ItemBlueprint,
    buckets: &PlanBuckets<'_>,
) -> Result<Vec<CraftingStep>, KnowledgeError> {
    let mut steps = vec![base_item_step(blueprint)];

    if let Some(sockets) = &blueprint.sockets {
        steps.push(sockets_step(catalog, sockets)?);
    }

    if !buckets.influence.mods.is_empty() {
        steps.push(influence_step(blueprint, &buckets.influence));
    }

    for bucket in &buckets.essences {
        steps.push(essence_step(bucket)?);
    }
    for bucket in &buckets.harvest {
        steps.push(harvest_step(bucket)?);
    }

    let (suffix_crafts, other_crafts): (Vec<&SourceBucket<'_>>, Vec<&SourceBucket<'_>>) = buckets
        .bench
        .iter()
        .partition(|b| b.requirement.mod_type == ModType::Suffix);
    for bucket in other_crafts.into_iter().chain(suffix_crafts) {
        steps.push(bench_step(bucket)?);
    }

    steps.extend(buckets.gaps.iter().map(gap_step));
    Ok(steps)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{BenchRecipe, StaticCatalog};

    fn recipe(id: &str, display: &str, keyword: &str) -> BenchRecipe {
        BenchRecipe {
            identifier: id.into(),
            display: display.into(),
            description: String::new(),
            bench_tier: 2,
            master: "Vorici".into(),
            item_classes: vec![],
            action: "link".into(),
            keywords: vec![keyword.into()],
            costs: vec![],
        }
    }

    #[test]
    fn socket_query_prefers_links() {
        let mut sockets = SocketBlueprint {
            total: Some(4),
            links: vec![3, 4],
            ..Default::default()
        };
        assert_eq!(socket_query(&sockets).as_deref(), Some("4-link"));
        sockets.links.clear();
        assert_eq!(socket_query(&sockets).as_deref(), Some("4 socket"));
        sockets.total = None;
        assert_eq!(socket_query(&sockets), None);
    }

    #[test]
    fn sockets_step_suggests_bench_recipe() {
        let catalog = StaticCatalog::new(vec![], vec![], vec![recipe("link4", "Four Linked Sockets", "4-link")]);
        let sockets = SocketBlueprint {
            total: Some(4),
            links: vec![4],
            colours: [("G".to_string(), 2), ("R".to_string(), 1)].into_iter().collect(),
            notes: vec!["Off-colour chromatic spam is cheap".into()],
        };
        let s = sockets_step(&catalog, &sockets).unwrap();
        assert_eq!(s.action, "Configure sockets");
        assert!(s.instruction.contains("Target 4 sockets."));
        assert!(s.instruction.contains("4-link"));
        assert!(s.instruction.contains("Colours: 2 G, 1 R."));
        assert!(s.instruction.contains("Bench option: Four Linked Sockets (Vorici, tier 2; cost free)."));
        assert_eq!(s.metadata["bench_recipe"]["identifier"], "link4");
        assert!(s.covers_mods().is_empty());
    }

    #[test]
    fn sockets_step_without_recipe_recommends_orbs() {
        let catalog = StaticCatalog::default();
        let sockets = SocketBlueprint {
            total: Some(6),
            ..Default::default()
        };
        let s = sockets_step(&catalog, &sockets).unwrap();
        assert!(s.instruction.contains("No bench recipe matched '6 socket'"));
        assert!(s.metadata.get("bench_recipe").is_none());
    }

    #[test]
    fn base_item_step_lists_influence_and_notes() {
        let mut blueprint = ItemBlueprint::new("Two-Toned Boots");
        blueprint.influences = vec!["Hunter".into()];
        blueprint.notes = vec!["Item level 86+".into()];
        let s = base_item_step(&blueprint);
        assert_eq!(s.action, "Acquire Two-Toned Boots");
        assert_eq!(s.step_type(), Some("base_item"));
        let lines: Vec<&str> = s.instruction.lines().collect();
        assert_eq!(lines[0], "Acquire a Two-Toned Boots base.");
        assert!(lines[1].contains("Hunter influence"));
        assert_eq!(lines[2], "Item level 86+");
    }
}
