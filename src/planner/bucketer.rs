//! Group classifications into step buckets.

use std::collections::HashMap;

use crate::knowledge::Match;

use super::classifier::{ModClassification, ResolutionKind};
use super::types::ModRequirement;

/// Candidate records kept on an essence step.
pub(crate) const ESSENCE_CANDIDATE_LIMIT: usize = 5;
/// Extra harvest crafts listed beside the chosen one.
pub(crate) const HARVEST_ALTERNATIVE_LIMIT: usize = 2;

#[derive(Debug, Clone)]
pub(crate) struct EssenceBucket<'a> {
    pub representative: Match,
    pub mods: Vec<&'a ModRequirement>,
    pub candidates: Vec<Match>,
}

#[derive(Debug, Clone)]
pub(crate) struct SourceBucket<'a> {
    pub requirement: &'a ModRequirement,
    pub chosen: Match,
    pub alternatives: Vec<Match>,
}

#[derive(Debug, Clone)]
pub(crate) struct GapBucket<'a> {
    pub requirement: &'a ModRequirement,
    pub search_terms: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InfluenceBucket<'a> {
    pub mods: Vec<&'a ModRequirement>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PlanBuckets<'a> {
    pub influence: InfluenceBucket<'a>,
    pub essences: Vec<EssenceBucket<'a>>,
    pub harvest: Vec<SourceBucket<'a>>,
    pub bench: Vec<SourceBucket<'a>>,
    pub gaps: Vec<GapBucket<'a>>,
}

fn essence_key(classification: &ModClassification<'_>) -> String {
    classification
        .matches
        .first()
        .and_then(Match::group_key)
        .map(str::to_string)
        .or_else(|| classification.search_terms.first().cloned())
        .unwrap_or_else(|| classification.requirement.text.clone())
}

/// Bucket classifications, preserving their order within each bucket kind.
///
/// A resolved classification with no matches cannot carry a source record
/// and is emitted as a gap.
pub(crate) fn bucket<'a>(classifications: Vec<ModClassification<'a>>) -> PlanBuckets<'a> {
    let mut buckets = PlanBuckets::default();
    let mut essence_slots: HashMap<String, usize> = HashMap::new();

    for classification in classifications {
        match classification.kind {
            ResolutionKind::Influence => buckets.influence.mods.push(classification.requirement),
            ResolutionKind::Unresolved => buckets.gaps.push(GapBucket {
                requirement: classification.requirement,
                search_terms: classification.search_terms,
            }),
            ResolutionKind::Essence => {
                let key = essence_key(&classification);
                let ModClassification { requirement, matches, search_terms, .. } = classification;
                let Some(first) = matches.first().cloned() else {
                    buckets.gaps.push(GapBucket { requirement, search_terms });
                    continue;
                };
                match essence_slots.get(&key) {
                    Some(&slot) => buckets.essences[slot].mods.push(requirement),
                    None => {
                        essence_slots.insert(key, buckets.essences.len());
                        buckets.essences.push(EssenceBucket {
                            representative: first,
                            mods: vec![requirement],
                            candidates: matches,
                        });
                    }
                }
            }
            ResolutionKind::Harvest | ResolutionKind::Bench => {
                let kind = classification.kind;
                let ModClassification { requirement, matches, search_terms, .. } = classification;
                let mut matches = matches.into_iter();
                let Some(chosen) = matches.next() else {
                    buckets.gaps.push(GapBucket { requirement, search_terms });
                    continue;
                };
                if kind == ResolutionKind::Harvest {
                    buckets.harvest.push(SourceBucket {
                        requirement,
                        chosen,
                        alternatives: matches.take(HARVEST_ALTERNATIVE_LIMIT).collect(),
                    });
                } else {
                    buckets.bench.push(SourceBucket {
                        requirement,
                        chosen,
                        alternatives: Vec::new(),
                    });
                }
            }
        }
    }

    buckets
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{Essence, HarvestCraft};

    fn essence(identifier: &str) -> Match {
        Match::Essence(Essence {
            identifier: identifier.into(),
            name: format!("Essence {identifier}"),
            tier: "7".into(),
            level: 82,
            kind: Default::default(),
            mods: vec![],
            item_level_restriction: None,
            spawn_level_min: None,
            spawn_level_max: None,
        })
    }

    fn harvest(identifier: &str) -> Match {
        Match::Harvest(HarvestCraft {
            identifier: identifier.into(),
            description: vec![format!("craft {identifier}")],
            groups: vec![],
            tags: vec![],
            item_classes: vec![],
        })
    }

    fn classification<'a>(
        requirement: &'a ModRequirement,
        kind: ResolutionKind,
        matches: Vec<Match>,
    ) -> ModClassification<'a> {
        ModClassification {
            requirement,
            kind,
            matches,
            search_terms: vec![requirement.text.clone()],
        }
    }

    #[test]
    fn essence_mods_sharing_an_identifier_merge() {
        let life = ModRequirement::prefix("+70 to maximum Life");
        let regen = ModRequirement::suffix("Life Regeneration");
        let speed = ModRequirement::prefix("Attack Speed");
        let buckets = bucket(vec![
            classification(&life, ResolutionKind::Essence, vec![essence("greed"), essence("zeal")]),
            classification(&speed, ResolutionKind::Essence, vec![essence("zeal")]),
            classification(&regen, ResolutionKind::Essence, vec![essence("greed")]),
        ]);

        assert_eq!(buckets.essences.len(), 2);
        assert_eq!(buckets.essences[0].representative.group_key(), Some("greed"));
        let texts: Vec<&str> = buckets.essences[0].mods.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["+70 to maximum Life", "Life Regeneration"]);
        assert_eq!(buckets.essences[0].candidates.len(), 2);
        assert_eq!(buckets.essences[1].representative.group_key(), Some("zeal"));
    }

    #[test]
    fn essence_without_identifier_groups_by_first_term() {
        let a = ModRequirement::prefix("Life");
        let b = ModRequirement::prefix("Life");
        let first = classification(&a, ResolutionKind::Essence, vec![essence("")]);
        assert_eq!(essence_key(&first), "Life");
        let buckets = bucket(vec![
            first,
            classification(&b, ResolutionKind::Essence, vec![essence(" ")]),
        ]);
        assert_eq!(buckets.essences.len(), 1);
        assert_eq!(buckets.essences[0].mods.len(), 2);
    }

    #[test]
    fn harvest_keeps_two_alternatives() {
        let m = ModRequirement::suffix("Lightning Resistance");
        let buckets = bucket(vec![classification(
            &m,
            ResolutionKind::Harvest,
            vec![harvest("a"), harvest("b"), harvest("c"), harvest("d")],
        )]);
        assert_eq!(buckets.harvest.len(), 1);
        assert_eq!(buckets.harvest[0].chosen.group_key(), Some("a"));
        let alts: Vec<_> = buckets.harvest[0].alternatives.iter().filter_map(Match::group_key).collect();
        assert_eq!(alts, vec!["b", "c"]);
    }

    #[test]
    fn influence_merges_and_gaps_stay_separate() {
        let a = ModRequirement::prefix("Hunter mod");
        let b = ModRequirement::suffix("Another Hunter mod");
        let g1 = ModRequirement::suffix("Unknown one");
        let g2 = ModRequirement::suffix("Unknown two");
        let buckets = bucket(vec![
            classification(&a, ResolutionKind::Influence, vec![]),
            classification(&g1, ResolutionKind::Unresolved, vec![]),
            classification(&b, ResolutionKind::Influence, vec![]),
            classification(&g2, ResolutionKind::Unresolved, vec![]),
        ]);
        assert_eq!(buckets.influence.mods.len(), 2);
        assert_eq!(buckets.gaps.len(), 2);
        assert_eq!(buckets.gaps[1].requirement.text, "Unknown two");
    }

    #[test]
    fn resolved_kind_without_matches_becomes_gap() {
        let m = ModRequirement::suffix("Odd");
        let buckets = bucket(vec![classification(&m, ResolutionKind::Bench, vec![])]);
        assert!(buckets.bench.is_empty());
        assert_eq!(buckets.gaps.len(), 1);
    }
}
