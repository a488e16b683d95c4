//! Core data models for catalog enrichment.
//!
//! This module contains the typed header values, the ordered field mapping
//! of a record, the shapes produced by catalog sources, and the report
//! structures written after a pass.

use serde::Serialize;

// ============================================================================
// Header Values
// ============================================================================

/// A single typed header token.
#[derive(Clone, Debug)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used for emptiness checks and display (`null` -> "").
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s.clone(),
        }
    }
}

/// Numbers compare by value, so `2` and `2.0` are equal. An integral float
/// is written without a decimal point and reads back as an integer.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Int(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Int(a)) => {
                *a as f64 == *b
            }
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

/// A header field value: a scalar or a flat list of scalars.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Str(s.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => s.as_str(),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Value::List(items) => Some(items),
            Value::Scalar(_) => None,
        }
    }

    /// Null, a blank string, or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(Scalar::Null) => true,
            Value::Scalar(Scalar::Str(s)) => s.trim().is_empty(),
            Value::Scalar(_) => false,
            Value::List(items) => items.is_empty(),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

// ============================================================================
// Record Fields
// ============================================================================

/// Ordered mapping of field name to value. Names are unique; re-inserting a
/// name replaces the value in place and keeps its original position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Absent fields count as empty.
    pub fn is_empty_field(&self, name: &str) -> bool {
        self.get(name).map_or(true, Value::is_empty)
    }

    /// Trimmed string value of a field, if it holds a non-blank string.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Source Models
// ============================================================================

/// One search result from a catalog source, lifted out of the source's raw
/// JSON shape. Every attribute except the title is optional.
#[derive(Clone, Debug, Default)]
pub struct SourceRecord {
    pub title: String,
    pub catalog_id: Option<String>,
    pub slug: Option<String>,
    pub artist: Option<String>,
    pub tempo: Option<f64>,
    pub key: Option<String>,
    pub time_signature: Option<String>,
    pub authors: Vec<String>,
    /// Relevance reported by the source itself, if any.
    pub relevance: Option<f64>,
    /// Source marks this entry as the original/master version.
    pub authoritative: bool,
    /// The untouched payload item, logged with the accepted candidate.
    pub raw: serde_json::Value,
}

/// A scored prospective match for a record.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub score: f64,
    pub record: SourceRecord,
    pub query: String,
    pub source: String,
}

/// Field values pulled out of an accepted candidate, ready to merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedFields {
    pub catalog_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub authors: Vec<String>,
    pub tempo: Option<f64>,
    pub key: Option<String>,
    pub time_signature: Option<String>,
}

// ============================================================================
// Report Models
// ============================================================================

/// Per-record match summary.
#[derive(Clone, Debug, Serialize)]
pub struct MatchSummary {
    pub file: String,
    pub title: String,
    pub matched_title: String,
    pub ccli_number: String,
    pub score: f64,
    pub query: String,
    pub source: String,
}

/// Summary written after a full catalog pass.
#[derive(Default, Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub updated_files: usize,
    pub skipped_already_populated: usize,
    pub unmatched_count: usize,
    pub unmatched_files: Vec<String>,
    pub failed_count: usize,
    pub failed_files: Vec<String>,
    pub matches: Vec<MatchSummary>,
}

impl EnrichmentReport {
    pub fn record_unmatched(&mut self, entry: String) {
        self.unmatched_files.push(entry);
        self.unmatched_count = self.unmatched_files.len();
    }

    pub fn record_failed(&mut self, entry: String) {
        self.failed_files.push(entry);
        self.failed_count = self.failed_files.len();
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut fields = Fields::new();
        fields.insert("b", Value::string("1"));
        fields.insert("a", Value::string("2"));
        fields.insert("b", Value::string("3"));

        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(fields.get("b"), Some(&Value::string("3")));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_emptiness() {
        let mut fields = Fields::new();
        fields.insert("null", Value::null());
        fields.insert("blank", Value::string("  "));
        fields.insert("list", Value::List(vec![]));
        fields.insert("zero", Value::Scalar(Scalar::Int(0)));

        assert!(fields.is_empty_field("missing"));
        assert!(fields.is_empty_field("null"));
        assert!(fields.is_empty_field("blank"));
        assert!(fields.is_empty_field("list"));
        assert!(!fields.is_empty_field("zero"));
        assert_eq!(fields.text("blank"), None);
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Scalar::Int(2), Scalar::Float(2.0));
        assert_ne!(Scalar::Int(2), Scalar::Float(2.5));
        assert_ne!(Scalar::Str("2".into()), Scalar::Int(2));
    }

    #[test]
    fn test_report_counts_follow_lists() {
        let mut report = EnrichmentReport::default();
        report.record_unmatched("a.md".into());
        report.record_unmatched("b.md (missing title)".into());
        report.record_failed("c.md".into());
        assert_eq!(report.unmatched_count, 2);
        assert_eq!(report.failed_count, 1);
    }
}
