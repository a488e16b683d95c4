//! Candidate source abstraction.
//!
//! A source is a remote catalog searchable by free text. Callers treat every
//! [`SourceError`] as "no results from this source" and keep going.

use serde_json::Value as Json;
use thiserror::Error;

use crate::models::SourceRecord;

/// Errors a source can report for a single call.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_label}: request failed: {message}")]
    Transient {
        source_label: String,
        message: String,
    },

    #[error("{source_label}: HTTP status {status}")]
    Status { source_label: String, status: u16 },

    #[error("{source_label}: invalid response: {message}")]
    Decode {
        source_label: String,
        message: String,
    },
}

/// A searchable external catalog.
pub trait CandidateSource {
    /// Label recorded on candidates from this source.
    fn label(&self) -> &str;

    /// Free-text search. Result order is the source's own ranking.
    fn search(&self, query: &str) -> Result<Vec<SourceRecord>, SourceError>;

    /// Detailed entry for a known catalog id. Sources without a detail
    /// endpoint return `Ok(None)`.
    fn lookup(&self, _catalog_id: &str, _slug: &str) -> Result<Option<SourceRecord>, SourceError> {
        Ok(None)
    }
}

// ============================================================================
// Payload helpers shared by the concrete sources
// ============================================================================

/// Collapse every whitespace run, line breaks included, to one space.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line, non-empty string at `key`. Numbers are accepted and rendered.
pub(crate) fn json_text(item: &Json, key: &str) -> Option<String> {
    let text = match item.get(key)? {
        Json::String(s) => single_line(s),
        Json::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub(crate) fn json_number(item: &Json, key: &str) -> Option<f64> {
    item.get(key)?.as_f64()
}

/// Author names from either a list of strings or a list of `{label}` objects.
pub(crate) fn json_names(item: &Json, key: &str) -> Vec<String> {
    let Some(list) = item.get(key).and_then(Json::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|entry| match entry {
            Json::Object(_) => json_text(entry, "label"),
            Json::String(s) => Some(single_line(s)).filter(|s| !s.is_empty()),
            Json::Null => None,
            other => Some(other.to_string()),
        })
        .collect()
}

/// Whether the source marks this item as the original master recording.
pub(crate) fn is_original_master(item: &Json) -> bool {
    json_text(item, "sourceLabel").is_some_and(|label| label.eq_ignore_ascii_case("original master"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_text() {
        let item = json!({"a": "  x ", "b": "", "c": 4545, "d": null});
        assert_eq!(json_text(&item, "a"), Some("x".to_string()));
        assert_eq!(json_text(&item, "b"), None);
        assert_eq!(json_text(&item, "c"), Some("4545".to_string()));
        assert_eq!(json_text(&item, "d"), None);
        assert_eq!(json_text(&item, "missing"), None);
    }

    #[test]
    fn test_line_breaks_collapse_to_spaces() {
        let item = json!({
            "artistName": "Hillsong\nWorship",
            "authors": [{"label": "Reuben\r\n Morgan"}, "Ben\tFielding"]
        });
        assert_eq!(json_text(&item, "artistName"), Some("Hillsong Worship".to_string()));
        assert_eq!(json_names(&item, "authors"), vec!["Reuben Morgan", "Ben Fielding"]);
    }

    #[test]
    fn test_json_names_accepts_both_shapes() {
        let item = json!({"authors": [{"label": "John Newton"}, " Chris Tomlin ", {"id": 1}, null, ""]});
        assert_eq!(json_names(&item, "authors"), vec!["John Newton", "Chris Tomlin"]);
        assert!(json_names(&json!({}), "authors").is_empty());
    }

    #[test]
    fn test_original_master_flag() {
        assert!(is_original_master(&json!({"sourceLabel": "Original Master"})));
        assert!(!is_original_master(&json!({"sourceLabel": "Cover"})));
        assert!(!is_original_master(&json!({})));
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::Status {
            source_label: "rehearse".into(),
            status: 503,
        };
        assert_eq!(err.to_string(), "rehearse: HTTP status 503");
    }
}
