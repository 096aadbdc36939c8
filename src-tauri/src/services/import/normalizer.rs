//! Folder-name cleanup for metadata queries and executable ranking.

use deunicode::deunicode;
use regex::Regex;
use std::sync::LazyLock;

/// Bracketed release-group/edition tags, ASCII and fullwidth forms.
static RE_BRACKETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[【（(「].*?[\]】）)」]").expect("Invalid brackets regex")
});

/// Trailing version markers like `v1.02`, `Ver 2`, `version 1.0.3`.
static RE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:v|ver|version)\.?\s*\d+(?:\.\d+)*\b").expect("Invalid version regex")
});

static RE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_.]+").expect("Invalid separator regex"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Default lookup query for a scanned folder name.
///
/// Strips bracketed tags and version suffixes, treats `_` and `.` as
/// word separators, and collapses runs of whitespace. Falls back to the
/// trimmed original when cleanup would leave nothing (e.g. a name that
/// is a single bracketed tag).
pub fn derive_search_name(folder_name: &str) -> String {
    let stripped = RE_BRACKETS.replace_all(folder_name, " ");
    let stripped = RE_VERSION.replace_all(&stripped, " ");
    let stripped = RE_SEPARATORS.replace_all(&stripped, " ");
    let cleaned = RE_WHITESPACE.replace_all(&stripped, " ").trim().to_string();

    if cleaned.is_empty() {
        folder_name.trim().to_string()
    } else {
        cleaned
    }
}

/// Normalize a name for fuzzy comparison: transliterate to ASCII,
/// lowercase, keep only alphanumerics and single spaces. Used when
/// ranking executables against their folder name.
pub fn normalize_for_compare(name: &str) -> String {
    let ascii = deunicode(name).to_lowercase();
    let mut out = String::with_capacity(ascii.len());
    let mut last_was_space = true;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
