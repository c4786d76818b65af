//! Text normalisation shared by every keyword index.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").ok());

/// Lower-case `text` and collapse every run of characters outside
/// `[a-z0-9]` into a single space, trimming both ends.
///
/// `"+70 to Maximum-Life"` → `"70 to maximum life"`.
pub fn normalise(text: &str) -> String {
    let lowered = text.to_lowercase();
    match NON_ALPHANUMERIC.as_ref() {
        Some(pattern) => pattern.replace_all(&lowered, " ").trim().to_string(),
        None => lowered.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Split normalised text into tokens.
pub fn tokenise(text: &str) -> Vec<String> {
    normalise(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Whether the already-normalised `needle` is a substring of any candidate.
pub fn any_contains<'a, I>(candidates: I, needle: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .any(|candidate| normalise(candidate).contains(needle))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_collapses_punctuation_runs() {
        assert_eq!(normalise("+70 to Maximum-Life!!"), "70 to maximum life");
        assert_eq!(normalise("  Deafening   Essence of Greed "), "deafening essence of greed");
    }

    #[test]
    fn normalise_trims_leading_and_trailing_symbols() {
        assert_eq!(normalise("--(Hunter)--"), "hunter");
        assert_eq!(normalise("!!!"), "");
        assert_eq!(normalise("4-Link_Sockets"), "4 link sockets");
    }

    #[test]
    fn normalise_drops_non_ascii_letters() {
        assert_eq!(normalise("Maven's Orb"), "maven s orb");
        assert_eq!(normalise("Émeraude"), "meraude");
    }

    #[test]
    fn normalise_empty_and_symbols_only() {
        assert_eq!(normalise(""), "");
        assert_eq!(normalise("-- ** --"), "");
    }

    #[test]
    fn tokenise_splits_words() {
        assert_eq!(tokenise("Quad-socket Resonator"), vec!["quad", "socket", "resonator"]);
    }

    #[test]
    fn any_contains_matches_normalised_candidates() {
        let needle = normalise("lightning resistance");
        assert!(any_contains(["Adds +Lightning Resistance"], &needle));
        assert!(!any_contains(["Fire Resistance"], &needle));
    }
}
