//! Shared normalization functions for record/catalog matching.
//!
//! Normalized keys are comparison keys only and are never written back into
//! a document.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Parenthetical asides, non-greedy, possibly empty: "(Live)", "()".
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Comparison key for a title, alias, or author name.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = PARENTHETICAL.replace_all(&lower, " ");
    let collapsed = NON_ALNUM.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Remove parenthetical asides while keeping the display text readable.
pub fn strip_parentheticals(text: &str) -> String {
    let stripped = PARENTHETICAL.replace_all(text, "");
    WHITESPACE.replace_all(stripped.trim(), " ").to_string()
}

/// Ordered, de-duplicated search queries for a record.
///
/// Order: the title, the title without parentheticals (when it differs), then
/// each alias. Entries whose normalized form is empty or already present are
/// dropped.
pub fn build_queries(title: &str, aliases: &[String]) -> Vec<String> {
    let title = title.trim();
    let mut raw: Vec<String> = vec![title.to_string()];

    let bare = strip_parentheticals(title);
    if !bare.is_empty() && bare.to_lowercase() != title.to_lowercase() {
        raw.push(bare);
    }
    raw.extend(
        aliases
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    );

    let mut seen: FxHashSet<String> = FxHashSet::default();
    raw.into_iter()
        .filter(|q| {
            let key = normalize(q);
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Upper-case the first character of a musical key ("g" -> "G", "eb" -> "Eb").
pub fn normalize_musical_key(value: &str) -> Option<String> {
    let key = value.trim();
    let mut chars = key.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Trim names and drop duplicates by normalized form, keeping the first
/// spelling seen.
pub fn dedupe_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: FxHashSet<String> = FxHashSet::default();
    names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref().trim();
            let key = normalize(name);
            (!key.is_empty() && seen.insert(key)).then(|| name.to_string())
        })
        .collect()
}
