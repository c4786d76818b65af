//! Derive planner blueprints from imported PoB items.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::planner::{ItemBlueprint, ModRequirement, ModType, SocketBlueprint};

use super::decoder::PobBuild;
use super::items::PobItem;

static RANGE_MARKER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\{[^}]*\}").ok());

/// Strip `{range:…}`/`{crafted}` style markers from an affix line.
pub fn clean_affix(raw: &str) -> String {
    let stripped = match RANGE_MARKER.as_ref() {
        Some(re) => re.replace_all(raw, "").into_owned(),
        None => raw.to_string(),
    };
    stripped.trim().to_string()
}

fn requirements(lines: &[String], mod_type: ModType) -> Vec<ModRequirement> {
    lines
        .iter()
        .map(|line| clean_affix(line))
        .filter(|text| !text.is_empty() && !text.eq_ignore_ascii_case("none"))
        .map(|text| ModRequirement::new(text, mod_type))
        .collect()
}

/// Socket groups → total, largest link and colour counts.
pub fn socket_blueprint(groups: &[Vec<String>]) -> Option<SocketBlueprint> {
    let total: usize = groups.iter().map(Vec::len).sum();
    if total == 0 {
        return None;
    }
    let largest = groups.iter().map(Vec::len).max().unwrap_or(0);
    let mut colours: BTreeMap<String, u32> = BTreeMap::new();
    for socket in groups.iter().flatten() {
        *colours.entry(socket.to_uppercase()).or_insert(0) += 1;
    }
    Some(SocketBlueprint {
        total: u32::try_from(total).ok(),
        links: if largest >= 2 {
            u32::try_from(largest).ok().into_iter().collect()
        } else {
            Vec::new()
        },
        colours,
        notes: Vec::new(),
    })
}

/// Convert one item into a blueprint. Items without a base type yield `None`.
///
/// `influences` is merged with any influence markers found on the item.
pub fn blueprint_from_item(item: &PobItem, influences: &[String]) -> Option<ItemBlueprint> {
    let base_item = item.base_type.as_deref()?.trim();
    if base_item.is_empty() {
        return None;
    }

    let mut blueprint = ItemBlueprint::new(base_item);
    blueprint.name = item
        .name
        .as_deref()
        .filter(|name| *name != base_item)
        .map(str::to_string);

    for influence in influences.iter().chain(&item.influences) {
        if !blueprint
            .influences
            .iter()
            .any(|known| known.eq_ignore_ascii_case(influence))
        {
            blueprint.influences.push(influence.clone());
        }
    }

    blueprint.required_prefixes = requirements(&item.affixes.prefixes, ModType::Prefix);
    blueprint.required_suffixes = requirements(&item.affixes.suffixes, ModType::Suffix);
    blueprint.sockets = socket_blueprint(&item.sockets);
    if let Some(slot) = &item.slot {
        blueprint.notes.push(format!("Equipped in {slot}."));
    }
    Some(blueprint)
}

/// Blueprints for every item in the build that has a base type.
pub fn blueprints_from_build(build: &PobBuild) -> Vec<ItemBlueprint> {
    build
        .items
        .iter()
        .filter_map(|item| blueprint_from_item(item, &[]))
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pob::decoder::tests::{encode, SAMPLE_XML};
    use crate::pob::decoder::parse_pob_build;

    #[test]
    fn affix_markers_are_stripped() {
        assert_eq!(clean_affix("{range:0}Glowing"), "Glowing");
        assert_eq!(clean_affix("{crafted}{range:0.5} +70 to maximum Life "), "+70 to maximum Life");
    }

    #[test]
    fn sample_build_yields_wand_and_ring() {
        let build = parse_pob_build(&encode(SAMPLE_XML)).unwrap();
        let blueprints = blueprints_from_build(&build);
        assert_eq!(blueprints.len(), 2);

        let wand = &blueprints[0];
        assert_eq!(wand.base_item, "Imbued Wand");
        assert_eq!(wand.name.as_deref(), Some("Glowing Imbued Wand of Lightning"));
        assert_eq!(wand.required_prefixes[0].text, "Glowing");
        assert_eq!(wand.required_suffixes[0].mod_type, ModType::Suffix);
        let sockets = wand.sockets.as_ref().unwrap();
        assert_eq!(sockets.total, Some(3));
        assert_eq!(sockets.links, vec![3]);
        assert_eq!(sockets.colours.get("B"), Some(&2));
        assert_eq!(sockets.colours.get("G"), Some(&1));
        assert_eq!(wand.notes, vec!["Equipped in Weapon 1."]);

        let ring = &blueprints[1];
        assert_eq!(ring.name, None);
        assert!(ring.sockets.is_none());
        assert!(ring.required_prefixes.is_empty());
    }

    #[test]
    fn influences_merge_without_duplicates() {
        let item = PobItem {
            base_type: Some("Two-Toned Boots".into()),
            influences: vec!["Hunter".into()],
            affixes: crate::pob::items::ItemAffixes {
                prefixes: vec![],
                suffixes: vec!["None".into()],
            },
            ..Default::default()
        };
        let blueprint = blueprint_from_item(&item, &["hunter".into(), "Warlord".into()]).unwrap();
        assert_eq!(blueprint.influences, vec!["hunter", "Warlord"]);
        assert!(blueprint.required_suffixes.is_empty());
    }

    #[test]
    fn unlinked_sockets_have_no_links() {
        let groups = vec![vec!["R".to_string()], vec!["g".to_string()]];
        let sockets = socket_blueprint(&groups).unwrap();
        assert_eq!(sockets.total, Some(2));
        assert!(sockets.links.is_empty());
        assert_eq!(sockets.colours.get("G"), Some(&1));
        assert!(socket_blueprint(&[]).is_none());
    }

    #[test]
    fn items_without_base_are_skipped() {
        assert!(blueprint_from_item(&PobItem::default(), &[]).is_none());
    }
}
