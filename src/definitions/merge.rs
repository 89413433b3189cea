//! Idempotent merge of the flag into a definitions list
//!
//! Stale flag entries and every inherited marker are dropped, other entries
//! keep their relative order, and the fresh flag entry followed by the
//! inherited marker is appended last.

use serde::{Deserialize, Serialize};

use crate::flag::{Flag, INHERITED_ENTRY};

/// How an existing entry is recognised as a stale copy of the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Staleness {
    /// Any entry whose text contains the flag name.
    ///
    /// An unrelated definition that merely contains the name (for example
    /// `"LEGACY_WK_WEBVIEW_ENGINE_IS_USED_X=1"`) is dropped too. Known
    /// limitation, kept for compatibility with existing projects.
    #[default]
    Substring,
    /// Only entries that define exactly the flag name (`NAME` or `NAME=...`,
    /// quoted or not).
    ExactName,
}

impl Staleness {
    pub fn is_stale(self, entry: &str, flag_name: &str) -> bool {
        match self {
            Staleness::Substring => entry.contains(flag_name),
            Staleness::ExactName => {
                let text = entry
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(entry);
                match text.strip_prefix(flag_name) {
                    Some(rest) => rest.is_empty() || rest.starts_with('='),
                    None => false,
                }
            }
        }
    }
}

/// Produce the merged list. `current` is never modified.
pub fn merge(current: &[String], flag: &Flag, staleness: Staleness) -> Vec<String> {
    let mut merged: Vec<String> = current
        .iter()
        .filter(|entry| entry.as_str() != INHERITED_ENTRY && !staleness.is_stale(entry, &flag.name))
        .cloned()
        .collect();
    merged.push(flag.entry());
    merged.push(INHERITED_ENTRY.to_string());
    merged
}

/// True when merging would leave `current` unchanged.
pub fn is_merged(current: &[String], flag: &Flag, staleness: Staleness) -> bool {
    merge(current, flag, staleness) == current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_empty() {
        let merged = merge(&[], &Flag::engine(false), Staleness::Substring);
        assert_eq!(merged, list(&["\"WK_WEBVIEW_ENGINE_IS_USED=0\"", "\"$(inherited)\""]));
    }

    #[test]
    fn test_merge_replaces_stale_value() {
        let current = list(&["\"FOO=1\"", "\"WK_WEBVIEW_ENGINE_IS_USED=0\"", "\"$(inherited)\""]);
        let merged = merge(&current, &Flag::engine(true), Staleness::Substring);
        assert_eq!(
            merged,
            list(&["\"FOO=1\"", "\"WK_WEBVIEW_ENGINE_IS_USED=1\"", "\"$(inherited)\""])
        );
    }

    #[test]
    fn test_merge_moves_marker_last() {
        let current = list(&["\"$(inherited)\"", "DEBUG=1", "\"COCOAPODS=1\""]);
        let merged = merge(&current, &Flag::engine(true), Staleness::Substring);
        assert_eq!(
            merged,
            list(&["DEBUG=1", "\"COCOAPODS=1\"", "\"WK_WEBVIEW_ENGINE_IS_USED=1\"", "\"$(inherited)\""])
        );
    }

    #[test]
    fn test_merge_drops_duplicate_markers_and_flags() {
        let current = list(&[
            "\"$(inherited)\"",
            "\"WK_WEBVIEW_ENGINE_IS_USED=1\"",
            "A",
            "WK_WEBVIEW_ENGINE_IS_USED",
            "\"$(inherited)\"",
        ]);
        let merged = merge(&current, &Flag::engine(false), Staleness::Substring);
        assert_eq!(merged, list(&["A", "\"WK_WEBVIEW_ENGINE_IS_USED=0\"", "\"$(inherited)\""]));
    }

    #[test]
    fn test_unquoted_marker_is_not_the_marker() {
        // Only the quoted literal counts as the inherited marker
        let current = list(&["$(inherited)"]);
        let merged = merge(&current, &Flag::engine(false), Staleness::Substring);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], "$(inherited)");
    }

    #[test]
    fn test_merge_does_not_touch_input() {
        let current = list(&["\"WK_WEBVIEW_ENGINE_IS_USED=0\""]);
        let snapshot = current.clone();
        let _ = merge(&current, &Flag::engine(true), Staleness::Substring);
        assert_eq!(current, snapshot);
    }

    #[test]
    fn test_merge_accepts_other_values() {
        let merged = merge(&[], &Flag::new("WK_WEBVIEW_ENGINE_IS_USED", 42), Staleness::Substring);
        assert_eq!(merged[0], "\"WK_WEBVIEW_ENGINE_IS_USED=42\"");
    }

    #[test]
    fn test_substring_match_is_over_broad() {
        let current = list(&["\"LEGACY_WK_WEBVIEW_ENGINE_IS_USED_X=1\""]);
        let merged = merge(&current, &Flag::engine(true), Staleness::Substring);
        assert!(!merged.contains(&current[0]));
    }

    #[test]
    fn test_exact_name_keeps_unrelated_definitions() {
        let current = list(&[
            "\"LEGACY_WK_WEBVIEW_ENGINE_IS_USED_X=1\"",
            "\"WK_WEBVIEW_ENGINE_IS_USED=0\"",
            "WK_WEBVIEW_ENGINE_IS_USED",
        ]);
        let merged = merge(&current, &Flag::engine(true), Staleness::ExactName);
        assert_eq!(
            merged,
            list(&[
                "\"LEGACY_WK_WEBVIEW_ENGINE_IS_USED_X=1\"",
                "\"WK_WEBVIEW_ENGINE_IS_USED=1\"",
                "\"$(inherited)\"",
            ])
        );
    }

    #[test]
    fn test_is_stale() {
        let name = "WK_WEBVIEW_ENGINE_IS_USED";
        assert!(Staleness::Substring.is_stale("\"WK_WEBVIEW_ENGINE_IS_USED=1\"", name));
        assert!(Staleness::Substring.is_stale("X_WK_WEBVIEW_ENGINE_IS_USED", name));
        assert!(Staleness::ExactName.is_stale("\"WK_WEBVIEW_ENGINE_IS_USED=1\"", name));
        assert!(Staleness::ExactName.is_stale("WK_WEBVIEW_ENGINE_IS_USED", name));
        assert!(!Staleness::ExactName.is_stale("X_WK_WEBVIEW_ENGINE_IS_USED", name));
        assert!(!Staleness::ExactName.is_stale("WK_WEBVIEW_ENGINE_IS_USED_2=1", name));
    }

    #[test]
    fn test_is_merged() {
        let flag = Flag::engine(true);
        let merged = merge(&list(&["A"]), &flag, Staleness::Substring);
        assert!(is_merged(&merged, &flag, Staleness::Substring));
        assert!(!is_merged(&merged, &Flag::engine(false), Staleness::Substring));
        assert!(!is_merged(&[], &flag, Staleness::Substring));
    }

    #[test]
    fn test_staleness_serde() {
        let parsed: Staleness = serde_json::from_str("\"exact_name\"").unwrap();
        assert_eq!(parsed, Staleness::ExactName);
        assert_eq!(Staleness::default(), Staleness::Substring);
    }
}
