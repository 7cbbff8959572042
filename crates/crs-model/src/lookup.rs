//! Label matching for the ordinal mapping tables.

use crate::options::MatchingMode;

/// Canonical form of a label under the given matching mode.
pub fn canonical_label(value: &str, mode: MatchingMode) -> String {
    match mode {
        MatchingMode::Strict => value.trim().to_string(),
        MatchingMode::Lenient => value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase(),
    }
}

/// Returns true if `value` names the table entry `label`.
pub fn labels_match(label: &str, value: &str, mode: MatchingMode) -> bool {
    canonical_label(label, mode) == canonical_label(value, mode)
}
