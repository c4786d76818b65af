//! Decorate free-text crafting actions with curated dataset intel.
//!
//! Each action is searched against every dataset; non-empty hit lists add a
//! headed section (first three hits) to the instruction and the full list to
//! the step metadata.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::knowledge::{
    BeastcraftRecipe, BenchRecipe, BetrayalBench, BossEncounter, CraftingStrategy, Essence,
    Fossil, HarvestCraft, KnowledgeBase, KnowledgeError, MapBoss, Resonator, SearchCatalog,
    VendorRecipe,
};

use super::types::CraftingStep;

const SECTION_LIMIT: usize = 3;

struct Enrichment {
    parts: Vec<String>,
    metadata: Map<String, Value>,
}

impl Enrichment {
    fn new(action: &str) -> Self {
        Self {
            parts: vec![action.to_string()],
            metadata: Map::new(),
        }
    }

    fn add<T: Serialize>(
        &mut self,
        key: &str,
        header: &str,
        hits: &[T],
        line: impl Fn(&T) -> String,
    ) -> Result<(), KnowledgeError> {
        if hits.is_empty() {
            return Ok(());
        }
        self.metadata
            .insert(key.to_string(), serde_json::to_value(hits)?);
        let body: Vec<String> = hits
            .iter()
            .take(SECTION_LIMIT)
            .map(line)
            .filter(|l| !l.is_empty())
            .collect();
        if !body.is_empty() {
            self.parts.push(format!("{header}\n{}", body.join("\n")));
        }
        Ok(())
    }

    fn finish(self, action: &str) -> CraftingStep {
        CraftingStep {
            action: action.to_string(),
            instruction: self
                .parts
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
            metadata: self.metadata,
        }
    }
}

// ─── Line formats ───────────────────────────────────────────────────────────

fn atlas_boss_line(boss: &BossEncounter) -> String {
    let mut line = format!("- {} ({})", boss.name, boss.encounter);
    if let Some(unlock) = boss.unlock.first() {
        line.push_str(&format!(" – Unlock: {unlock}"));
    }
    line
}

fn map_boss_line(boss: &MapBoss) -> String {
    let mut line = format!("- {} (Tier {}) – {}", boss.map, boss.tier, boss.bosses.join(", "));
    if let Some(unlock) = boss.unlock.first() {
        line.push_str(&format!("; {unlock}"));
    }
    line
}

fn bench_line(recipe: &BenchRecipe) -> String {
    format!("- {} ({})", recipe.display, recipe.bench_summary())
}

fn fossil_line(fossil: &Fossil) -> String {
    let effect = fossil
        .descriptions
        .first()
        .map(String::as_str)
        .unwrap_or("See details");
    let mut line = format!("- {}: {effect}", fossil.name);
    if !fossil.blocked_descriptions.is_empty() {
        line.push_str(&format!(" (Constraints: {})", fossil.blocked_descriptions.join(", ")));
    }
    line
}

fn resonator_line(resonator: &Resonator) -> String {
    let plural = if resonator.sockets == 1 { "" } else { "s" };
    let mut line = format!("- {} ({} socket{plural})", resonator.name, resonator.sockets);
    if !resonator.description.is_empty() {
        line.push_str(&format!(": {}", resonator.description));
    }
    line
}

fn harvest_line(craft: &HarvestCraft) -> String {
    let mut line = format!("- {}", craft.headline());
    if !craft.groups.is_empty() {
        line.push_str(&format!(" [{}]", craft.groups.join(", ")));
    }
    line
}

fn essence_line(essence: &Essence) -> String {
    let mods: Vec<&str> = essence.mods.iter().take(2).map(String::as_str).collect();
    format!(
        "- {} (Tier {}, lvl {}) – {}",
        essence.name,
        essence.tier,
        essence.level,
        mods.join(", ")
    )
}

fn beastcraft_line(craft: &BeastcraftRecipe) -> String {
    let beasts = craft
        .requirements
        .iter()
        .map(|req| match &req.rarity {
            Some(rarity) => format!("{}x {} ({rarity})", req.amount, req.display),
            None => format!("{}x {}", req.amount, req.display),
        })
        .collect::<Vec<_>>()
        .join(", ");
    let mut suffix_parts = Vec::new();
    if !beasts.is_empty() {
        suffix_parts.push(format!("Requires: {beasts}"));
    }
    if let Some(note) = &craft.notes {
        suffix_parts.push(note.clone());
    }
    let outcome = craft.subheader.as_deref().unwrap_or("Outcome");
    let mut line = format!("- {} – {outcome} ({})", craft.display, craft.game_mode);
    if !suffix_parts.is_empty() {
        line.push_str(&format!(" – {}", suffix_parts.join("; ")));
    }
    line
}

fn betrayal_line(bench: &BetrayalBench) -> String {
    format!(
        "- {} ({} rank {}) – {}",
        bench.member, bench.division, bench.rank, bench.summary
    )
}

fn strategy_line(strategy: &CraftingStrategy) -> String {
    let mut line = format!("- {}: {}", strategy.name, strategy.summary);
    if let Some(best) = strategy.best_for.first() {
        line.push_str(&format!(" (Best for: {best})"));
    }
    line
}

fn vendor_line(recipe: &VendorRecipe) -> String {
    let inputs: Vec<String> = recipe
        .parts
        .iter()
        .map(|part| match part.amount {
            Some(amount) if amount > 1 => format!("{amount}x {}", part.label()),
            _ => part.label().to_string(),
        })
        .collect();
    let reward = match recipe.result_amount {
        Some(amount) if amount > 1 => format!("{amount}x {}", recipe.page),
        _ => recipe.page.clone(),
    };
    let mut line = format!("- {reward} (Inputs: {})", inputs.join(", "));
    if let Some(description) = &recipe.description {
        line.push_str(&format!(" – {description}"));
    }
    line
}

/// Search every dataset for each action and attach what was found.
pub fn enrich_actions<S: AsRef<str>>(
    kb: &KnowledgeBase,
    actions: &[S],
) -> Result<Vec<CraftingStep>, KnowledgeError> {
    let mut steps = Vec::with_capacity(actions.len());

    for raw in actions {
        let action = raw.as_ref().trim();
        let mut enrichment = Enrichment::new(action);

        let bosses = kb.find_bosses(action)?;
        enrichment.add("atlas_bosses", "Boss Intel:", &bosses.atlas_bosses, atlas_boss_line)?;
        enrichment.add("map_bosses", "Map Boss Details:", &bosses.map_bosses, map_boss_line)?;

        let bench = kb.find_bench_recipes(action)?;
        enrichment.add("bench_recipes", "Workbench Options:", &bench, bench_line)?;

        let fossils = kb.find_fossils(action)?;
        enrichment.add("fossils", "Fossil Options:", &fossils.fossils, fossil_line)?;
        enrichment.add("resonators", "Resonator Choices:", &fossils.resonators, resonator_line)?;

        let harvest = kb.find_harvest_crafts(action)?;
        enrichment.add("harvest_crafts", "Harvest Options:", &harvest, harvest_line)?;

        let essences = kb.find_essences(action)?;
        enrichment.add("essences", "Essence Notes:", &essences, essence_line)?;

        let beastcrafts = kb.find_beastcrafts(action)?;
        enrichment.add("beastcrafts", "Bestiary Crafts:", &beastcrafts, beastcraft_line)?;

        let benches = kb.find_betrayal_benches(action)?;
        enrichment.add("betrayal_benches", "Betrayal Benches:", &benches, betrayal_line)?;

        let strategies = kb.find_strategies(action)?;
        enrichment.add("strategies", "Crafting Strategies:", &strategies, strategy_line)?;

        let vendor = kb.find_vendor_recipes(action)?;
        enrichment.add("vendor_recipes", "Vendor Recipes:", &vendor, vendor_line)?;

        tracing::debug!(action, sections = enrichment.parts.len() - 1, "action enriched");
        steps.push(enrichment.finish(action));
    }

    Ok(steps)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(dir: &TempDir) {
        let files = [
            ("bosses.json", r#"{"atlas_bosses": [{"name": "The Maven", "aliases": ["Maven"], "encounter": "The Maven's Crucible", "unlock": ["Complete Maven's Invitations"]}], "map_bosses": []}"#),
            ("bench_recipes.json", r#"[{"identifier": "ms", "display": "Movement Speed", "bench_tier": 2, "master": "Alva", "action": "add", "costs": [{"currency": "Chaos Orb", "amount": 3}]}]"#),
            ("fossils.json", r#"{"fossils": [], "resonators": []}"#),
            ("harvest_crafts.json", "[]"),
            ("essences.json", "[]"),
            ("bestiary_recipes.json", "[]"),
            ("crafting_methods.json", r#"{"betrayal_benches": [], "strategies": [{"name": "Maven Orb", "summary": "Elevate influenced modifiers", "best_for": ["Influenced items"]}]}"#),
            ("vendor_recipes.json", "[]"),
        ];
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
    }

    #[test]
    fn sections_follow_hits() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        let kb = KnowledgeBase::new(dir.path());

        let steps = enrich_actions(&kb, &["  Maven  ", "Movement Speed"]).unwrap();
        assert_eq!(steps.len(), 2);

        let maven = &steps[0];
        assert_eq!(maven.action, "Maven");
        let parts: Vec<&str> = maven.instruction.split("\n\n").collect();
        assert_eq!(parts[0], "Maven");
        assert_eq!(
            parts[1],
            "Boss Intel:\n- The Maven (The Maven's Crucible) – Unlock: Complete Maven's Invitations"
        );
        assert_eq!(
            parts[2],
            "Crafting Strategies:\n- Maven Orb: Elevate influenced modifiers (Best for: Influenced items)"
        );
        assert!(maven.metadata.contains_key("atlas_bosses"));
        assert!(!maven.metadata.contains_key("map_bosses"));

        let speed = &steps[1];
        assert!(speed
            .instruction
            .contains("Workbench Options:\n- Movement Speed (Alva, tier 2; cost 3 Chaos Orb)"));
        assert_eq!(speed.metadata["bench_recipes"][0]["identifier"], "ms");
    }

    #[test]
    fn action_without_hits_is_just_the_action() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        let kb = KnowledgeBase::new(dir.path());
        let steps = enrich_actions(&kb, &["Reforge with Chaos"]).unwrap();
        assert_eq!(steps[0].instruction, "Reforge with Chaos");
        assert!(steps[0].metadata.is_empty());
    }

    #[test]
    fn missing_dataset_aborts_enrichment() {
        let dir = TempDir::new().unwrap();
        let kb = KnowledgeBase::new(dir.path());
        assert!(enrich_actions(&kb, &["anything"]).is_err());
    }

    #[test]
    fn beastcraft_and_vendor_lines_render() {
        let craft = BeastcraftRecipe {
            identifier: "imprint".into(),
            header: "Imprint".into(),
            subheader: Some("Create an Imprint of a magic item".into()),
            notes: None,
            game_mode: "standard".into(),
            display: "Imprint".into(),
            keywords: vec![],
            requirements: vec![crate::knowledge::BeastRequirement {
                component_id: "c".into(),
                amount: 1,
                display: "Craicic Chimeral".into(),
                monster: None,
                family: None,
                genus: None,
                beast_group: None,
                rarity: Some("Rare".into()),
            }],
        };
        assert_eq!(
            beastcraft_line(&craft),
            "- Imprint – Create an Imprint of a magic item (standard) – Requires: 1x Craicic Chimeral (Rare)"
        );

        let recipe = VendorRecipe {
            page: "Chromatic Orb".into(),
            recipe_id: 1,
            result_amount: None,
            description: Some("Sockets must be linked".into()),
            automatic: false,
            parts: vec![crate::knowledge::VendorRecipePart {
                part_id: None,
                item_name: "Item with R-G-B linked sockets".into(),
                item_page: None,
                item_id: None,
                amount: Some(1),
                notes: None,
            }],
        };
        assert_eq!(
            vendor_line(&recipe),
            "- Chromatic Orb (Inputs: Item with R-G-B linked sockets) – Sockets must be linked"
        );
    }
}
