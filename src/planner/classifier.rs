//! Modifier classification: decide which crafting source covers one mod.

use crate::knowledge::{CraftDomain, KnowledgeError, Match, SearchCatalog};

use super::types::{ItemBlueprint, ModRequirement, SourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolutionKind {
    Essence,
    Harvest,
    Bench,
    Influence,
    Unresolved,
}

impl From<CraftDomain> for ResolutionKind {
    fn from(domain: CraftDomain) -> Self {
        match domain {
            CraftDomain::Essence => ResolutionKind::Essence,
            CraftDomain::Harvest => ResolutionKind::Harvest,
            CraftDomain::Bench => ResolutionKind::Bench,
        }
    }
}

/// Outcome of classifying one required modifier.
#[derive(Debug, Clone)]
pub(crate) struct ModClassification<'a> {
    pub requirement: &'a ModRequirement,
    pub kind: ResolutionKind,
    pub matches: Vec<Match>,
    pub search_terms: Vec<String>,
}

/// Hint detail first, then the mod text, skipping case-insensitive repeats.
pub(crate) fn search_terms(requirement: &ModRequirement) -> Vec<String> {
    let detail = requirement
        .source_hint
        .as_ref()
        .and_then(|hint| hint.detail.as_deref());

    let mut terms: Vec<String> = Vec::new();
    for candidate in detail.into_iter().chain(std::iter::once(requirement.text.as_str())) {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        let lowered = candidate.to_lowercase();
        if terms.iter().any(|t| t.to_lowercase() == lowered) {
            continue;
        }
        terms.push(candidate.to_string());
    }
    terms
}

fn domain_priority(hint: Option<SourceKind>) -> Vec<CraftDomain> {
    let preferred = match hint {
        Some(SourceKind::Essence) => Some(CraftDomain::Essence),
        Some(SourceKind::Harvest) => Some(CraftDomain::Harvest),
        Some(SourceKind::Bench) => Some(CraftDomain::Bench),
        _ => None,
    };
    let mut order: Vec<CraftDomain> = preferred.into_iter().collect();
    order.extend(
        CraftDomain::DEFAULT_ORDER
            .into_iter()
            .filter(|d| Some(*d) != preferred),
    );
    order
}

fn influence_matches(blueprint: &ItemBlueprint) -> Vec<Match> {
    blueprint
        .influences
        .iter()
        .cloned()
        .map(Match::Influence)
        .collect()
}

/// Classify `requirement` for `blueprint`.
///
/// Domains are tried in priority order and, inside a domain, terms in order;
/// the first non-empty search result wins. Catalog errors propagate.
pub(crate) fn classify<'a>(
    catalog: &dyn SearchCatalog,
    blueprint: &ItemBlueprint,
    requirement: &'a ModRequirement,
) -> Result<ModClassification<'a>, KnowledgeError> {
    let hint_kind = requirement.source_hint.as_ref().map(|hint| hint.kind);

    if hint_kind == Some(SourceKind::Influence) {
        tracing::debug!(mod_text = %requirement.text, "influence hint, skipping search");
        return Ok(ModClassification {
            requirement,
            kind: ResolutionKind::Influence,
            matches: influence_matches(blueprint),
            search_terms: Vec::new(),
        });
    }

    let terms = search_terms(requirement);

    for domain in domain_priority(hint_kind) {
        for term in &terms {
            let matches = catalog.find(domain, term)?;
            if !matches.is_empty() {
                tracing::debug!(
                    mod_text = %requirement.text,
                    domain = domain.as_str(),
                    term = %term,
                    hits = matches.len(),
                    "modifier resolved"
                );
                return Ok(ModClassification {
                    requirement,
                    kind: domain.into(),
                    matches,
                    search_terms: terms,
                });
            }
        }
    }

    let attempted = terms.join(" ").to_lowercase();
    let influenced = blueprint.influences.iter().any(|influence| {
        let influence = influence.trim().to_lowercase();
        !influence.is_empty() && attempted.contains(&influence)
    });
    if influenced {
        return Ok(ModClassification {
            requirement,
            kind: ResolutionKind::Influence,
            matches: influence_matches(blueprint),
            search_terms: terms,
        });
    }

    tracing::debug!(mod_text = %requirement.text, terms = ?terms, "modifier unresolved");
    Ok(ModClassification {
        requirement,
        kind: ResolutionKind::Unresolved,
        matches: Vec::new(),
        search_terms: terms,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{BenchRecipe, Essence, HarvestCraft, StaticCatalog};
    use crate::planner::types::SourceHint;

    fn essence(name: &str, mods: &[&str]) -> Essence {
        Essence {
            identifier: name.to_lowercase().replace(' ', "_"),
            name: name.into(),
            tier: "7".into(),
            level: 82,
            kind: Default::default(),
            mods: mods.iter().map(|m| m.to_string()).collect(),
            item_level_restriction: None,
            spawn_level_min: None,
            spawn_level_max: None,
        }
    }

    fn bench(id: &str, display: &str) -> BenchRecipe {
        BenchRecipe {
            identifier: id.into(),
            display: display.into(),
            description: String::new(),
            bench_tier: 1,
            master: "Alva".into(),
            item_classes: vec![],
            action: "add_explicit_mod".into(),
            keywords: vec![],
            costs: vec![],
        }
    }

    fn harvest(id: &str, description: &str) -> HarvestCraft {
        HarvestCraft {
            identifier: id.into(),
            description: vec![description.into()],
            groups: vec![],
            tags: vec![],
            item_classes: vec![],
        }
    }

    #[test]
    fn search_terms_put_detail_first_and_dedupe() {
        let m = ModRequirement::prefix("+70 to maximum Life")
            .with_hint(SourceHint::with_detail(SourceKind::Essence, "Essence of Greed"));
        assert_eq!(search_terms(&m), vec!["Essence of Greed", "+70 to maximum Life"]);

        let same = ModRequirement::prefix("Movement Speed")
            .with_hint(SourceHint::with_detail(SourceKind::Bench, "movement speed"));
        assert_eq!(search_terms(&same), vec!["movement speed"]);

        let blank = ModRequirement::prefix("Life").with_hint(SourceHint::with_detail(SourceKind::Other, "  "));
        assert_eq!(search_terms(&blank), vec!["Life"]);
    }

    #[test]
    fn hinted_domain_is_tried_first() {
        assert_eq!(
            domain_priority(Some(SourceKind::Bench)),
            vec![CraftDomain::Bench, CraftDomain::Essence, CraftDomain::Harvest]
        );
        assert_eq!(domain_priority(Some(SourceKind::Other)), CraftDomain::DEFAULT_ORDER.to_vec());
        assert_eq!(domain_priority(None), CraftDomain::DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn first_domain_wins_over_better_term() {
        // the detail term only hits essences, the mod text only hits the
        // hinted bench; the hinted domain exhausts both terms first
        let catalog = StaticCatalog::new(
            vec![essence("Essence of Haste", &["10% increased Movement Speed"])],
            vec![harvest("h1", "Augment a Speed modifier")],
            vec![bench("ms", "Movement Speed")],
        );
        let blueprint = ItemBlueprint::new("Boots");
        let m = ModRequirement::suffix("Movement Speed")
            .with_hint(SourceHint::with_detail(SourceKind::Bench, "Essence of Haste"));
        let c = classify(&catalog, &blueprint, &m).unwrap();
        assert_eq!(c.kind, ResolutionKind::Bench);
        assert_eq!(c.matches[0].name(), "Movement Speed");
        assert_eq!(c.search_terms, vec!["Essence of Haste", "Movement Speed"]);
    }

    #[test]
    fn unhinted_mod_prefers_essence() {
        let catalog = StaticCatalog::new(
            vec![essence("Deafening Essence of Greed", &["+70 to maximum Life"])],
            vec![],
            vec![bench("life", "+70 to maximum Life")],
        );
        let blueprint = ItemBlueprint::new("Boots");
        let m = ModRequirement::prefix("maximum Life");
        let c = classify(&catalog, &blueprint, &m).unwrap();
        assert_eq!(c.kind, ResolutionKind::Essence);
        assert_eq!(c.search_terms, vec!["maximum Life"]);
    }

    #[test]
    fn influence_text_fallback_and_unresolved() {
        let catalog = StaticCatalog::default();
        let mut blueprint = ItemBlueprint::new("Boots");
        blueprint.influences = vec!["Hunter".into()];

        let hunter = ModRequirement::prefix("Hunter: +1 to Level of Chaos Gems");
        let c = classify(&catalog, &blueprint, &hunter).unwrap();
        assert_eq!(c.kind, ResolutionKind::Influence);
        assert_eq!(c.matches, vec![Match::Influence("Hunter".into())]);

        let unknown = ModRequirement::suffix("Totally made up mod");
        let c = classify(&catalog, &blueprint, &unknown).unwrap();
        assert_eq!(c.kind, ResolutionKind::Unresolved);
        assert!(c.matches.is_empty());
        assert_eq!(c.search_terms, vec!["Totally made up mod"]);
    }

    #[test]
    fn blank_influence_never_matches() {
        let catalog = StaticCatalog::default();
        let mut blueprint = ItemBlueprint::new("Boots");
        blueprint.influences = vec!["  ".into()];
        let m = ModRequirement::suffix("Something");
        let c = classify(&catalog, &blueprint, &m).unwrap();
        assert_eq!(c.kind, ResolutionKind::Unresolved);
    }
}
