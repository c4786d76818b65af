//! Item text blocks as exported inside `<Item>` elements.

use serde::{Deserialize, Serialize};

const HEADER_SEPARATOR: &str = "--------";

/// Influence markers PoB writes as `"<Name> Item"` lines.
const INFLUENCE_MARKERS: &[&str] = &[
    "Shaper", "Elder", "Crusader", "Hunter", "Redeemer", "Warlord", "Searing Exarch",
    "Eater of Worlds",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAffixes {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PobItem {
    pub id: Option<String>,
    pub slot: Option<String>,
    pub name: Option<String>,
    pub base_type: Option<String>,
    pub rarity: Option<String>,
    /// Link groups, each a list of socket colour letters.
    pub sockets: Vec<Vec<String>>,
    pub affixes: ItemAffixes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub influences: Vec<String>,
}

fn after_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or_default()
}

/// `"R-G-B B-B (abyss)"` → `[["R","G","B"], ["B","B"]]`.
pub fn parse_socket_groups(socket_line: &str) -> Vec<Vec<String>> {
    socket_line
        .split(' ')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(|group| group.split('(').next().unwrap_or_default().trim())
        .map(|group| {
            group
                .split('-')
                .filter(|socket| !socket.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|sockets| !sockets.is_empty())
        .collect()
}

/// Parse one item text block.
///
/// Header lines run until the first `--------`: a `Rarity:` line, then the
/// item name, then the base type. Uniques and rares carry both; normal and
/// magic items only carry a name, which doubles as the base type.
pub fn parse_item_text(text: &str) -> PobItem {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_matches(|c| c == '\n' || c == '\r' || c == ' '))
        .filter(|line| !line.is_empty())
        .collect();

    let (header, body): (&[&str], &[&str]) =
        match lines.iter().position(|line| *line == HEADER_SEPARATOR) {
            Some(idx) => (&lines[..idx], &lines[idx + 1..]),
            None => (&lines[..], &[]),
        };

    let mut item = PobItem::default();
    for line in header {
        if line.starts_with("Rarity:") {
            item.rarity = Some(after_colon(line).to_string());
        } else if item.name.is_none() {
            item.name = Some(line.to_string());
        } else if item.base_type.is_none() {
            item.base_type = Some(line.to_string());
        }
    }
    if item.base_type.is_none() {
        item.base_type = item.name.clone();
    }

    for line in body {
        if line.starts_with("Sockets:") {
            item.sockets = parse_socket_groups(after_colon(line));
        } else if line.starts_with("Prefix:") {
            item.affixes.prefixes.push(after_colon(line).to_string());
        } else if line.starts_with("Suffix:") {
            item.affixes.suffixes.push(after_colon(line).to_string());
        } else if let Some(marker) = line.strip_suffix(" Item") {
            if INFLUENCE_MARKERS.contains(&marker) {
                item.influences.push(marker.to_string());
            }
        }
    }

    item
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rare_item_header_and_body() {
        let item = parse_item_text(
            "\n  Rarity: RARE\n  Doom Cry\n  Two-Toned Boots\n  --------\n  Hunter Item\n  Sockets: G-G-R-B\n  Prefix: {range:0.5}IncreasedLife7\n  Suffix: {range:0}MovementVelocity4\n  Suffix: None\n",
        );
        assert_eq!(item.rarity.as_deref(), Some("RARE"));
        assert_eq!(item.name.as_deref(), Some("Doom Cry"));
        assert_eq!(item.base_type.as_deref(), Some("Two-Toned Boots"));
        assert_eq!(item.sockets, vec![vec!["G", "G", "R", "B"]]);
        assert_eq!(item.affixes.prefixes, vec!["{range:0.5}IncreasedLife7"]);
        assert_eq!(item.affixes.suffixes, vec!["{range:0}MovementVelocity4", "None"]);
        assert_eq!(item.influences, vec!["Hunter"]);
    }

    #[test]
    fn name_doubles_as_base_type() {
        let item = parse_item_text("Rarity: NORMAL\nTwo-Stone Ring\n--------\nItem Level: 84");
        assert_eq!(item.name.as_deref(), Some("Two-Stone Ring"));
        assert_eq!(item.base_type.as_deref(), Some("Two-Stone Ring"));
        assert!(item.sockets.is_empty());
    }

    #[test]
    fn text_without_separator_is_all_header() {
        let item = parse_item_text("Rarity: MAGIC\nGlowing Wand\nImbued Wand\nSockets: R");
        assert_eq!(item.base_type.as_deref(), Some("Imbued Wand"));
        assert!(item.sockets.is_empty());
    }

    #[test]
    fn socket_groups_drop_annotations() {
        assert_eq!(
            parse_socket_groups("R-G-B  B-B (abyss) A"),
            vec![vec!["R", "G", "B"], vec!["B", "B"], vec!["A"]]
        );
        assert!(parse_socket_groups("").is_empty());
    }
}
