//! Frontmatter document codec.
//!
//! A document is a `---` delimited header of `name: value` lines followed by
//! an opaque body. The header grammar is deliberately small: scalars and
//! one-level lists of scalars. Parsing is a line-oriented state machine;
//! dumping writes fields in a canonical order so that a dumped document
//! parses and dumps back to the same bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Fields, Value};
use crate::scalar::{dump_scalar, parse_item, parse_scalar, DumpError};

const DELIMITER: &str = "---";

const BOM: char = '\u{feff}';

static FIELD_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z0-9_]+):\s*(.*)$").unwrap());

static LIST_ITEM_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-\s*(.*)$").unwrap());

/// Published field order for song records.
pub const DEFAULT_FIELD_ORDER: &[&str] = &[
    "title",
    "slug",
    "aka",
    "ccli_number",
    "songselect_url",
    "lyrics_source",
    "lyrics_hint",
    "original_artist",
    "writers",
    "publisher",
    "year",
    "tempo_bpm",
    "key",
    "time_signature",
    "congregational_fit",
    "vocal_range",
    "dominant_themes",
    "doctrinal_categories",
    "emotional_tone",
    "scriptural_anchors",
    "theological_summary",
    "arrangement_notes",
    "slides_path",
    "tags",
    "last_sung_override",
    "status",
    "licensing_notes",
    "language",
    "meter",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("document does not start with a '---' frontmatter line")]
    MissingOpeningDelimiter,

    #[error("frontmatter closing '---' line not found")]
    MissingClosingDelimiter,
}

/// Priority list for header fields. Fields not in the list are written after
/// the listed ones, in the order they were encountered.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FieldOrder(Vec<String>);

impl FieldOrder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldOrder(names.into_iter().map(Into::into).collect())
    }

    /// Field names of `fields` in write order.
    pub fn arrange<'a>(&self, fields: &'a Fields) -> Vec<&'a str> {
        let mut keys: Vec<&str> = fields
            .keys()
            .filter(|k| self.0.iter().any(|name| name == k))
            .collect();
        keys.sort_by_key(|k| self.0.iter().position(|name| name == k));
        keys.extend(fields.keys().filter(|k| !self.0.iter().any(|name| name == k)));
        keys
    }
}

impl Default for FieldOrder {
    fn default() -> Self {
        FieldOrder::new(DEFAULT_FIELD_ORDER.iter().copied())
    }
}

/// A parsed document: structured header plus verbatim body.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub fields: Fields,
    pub body: String,
}

/// Parse a document into header fields and body.
pub fn parse(text: &str) -> Result<Document, FormatError> {
    let text = text.trim_start_matches(BOM);
    let mut lines = text.split_inclusive('\n');

    let mut offset = match lines.next() {
        Some(first) if strip_terminator(first) == DELIMITER => first.len(),
        _ => return Err(FormatError::MissingOpeningDelimiter),
    };
    let mut header: Vec<&str> = Vec::new();
    let mut closed = false;
    for line in lines {
        offset += line.len();
        let content = strip_terminator(line);
        if content == DELIMITER {
            closed = true;
            break;
        }
        header.push(content);
    }
    if !closed {
        return Err(FormatError::MissingClosingDelimiter);
    }

    Ok(Document {
        fields: parse_header(&header),
        body: text[offset..].to_string(),
    })
}

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

#[derive(Clone, Copy)]
enum State {
    SeekingField,
    ConsumingList,
}

fn parse_header(lines: &[&str]) -> Fields {
    let mut fields = Fields::new();
    let mut state = State::SeekingField;
    let mut list_name = String::new();
    let mut items = Vec::new();

    for line in lines {
        if let State::ConsumingList = state {
            if let Some(caps) = LIST_ITEM_LINE.captures(line) {
                items.push(parse_item(&caps[1]));
                continue;
            }
            fields.insert(std::mem::take(&mut list_name), Value::List(std::mem::take(&mut items)));
            state = State::SeekingField;
        }

        if line.trim().is_empty() {
            continue;
        }
        let Some(caps) = FIELD_LINE.captures(line) else {
            continue;
        };
        let name = &caps[1];
        let remainder = &caps[2];
        if remainder.is_empty() {
            list_name = name.to_string();
            state = State::ConsumingList;
        } else {
            fields.insert(name, parse_scalar(remainder));
        }
    }

    if let State::ConsumingList = state {
        fields.insert(list_name, Value::List(items));
    }
    fields
}

/// Render header fields as a delimited frontmatter block, ending in a newline.
pub fn dump(fields: &Fields, order: &FieldOrder) -> Result<String, DumpError> {
    let mut out = vec![DELIMITER.to_string()];
    for name in order.arrange(fields) {
        match fields.get(name) {
            Some(Value::Scalar(scalar)) => out.push(format!("{}: {}", name, dump_scalar(scalar)?)),
            Some(Value::List(items)) if items.is_empty() => out.push(format!("{}: []", name)),
            Some(Value::List(items)) => {
                out.push(format!("{}:", name));
                for item in items {
                    out.push(format!("  - {}", dump_scalar(item)?));
                }
            }
            None => {}
        }
    }
    out.push(DELIMITER.to_string());
    Ok(out.join("\n") + "\n")
}

impl Document {
    /// Full document text: header followed by the untouched body.
    pub fn render(&self, order: &FieldOrder) -> Result<String, DumpError> {
        Ok(dump(&self.fields, order)? + &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scalar;

    const SAMPLE: &str = concat!(
        "---\n",
        "title: \"Amazing Grace\"\n",
        "slug: \"amazing-grace\"\n",
        "aka:\n",
        "  - \"Amazing Grace (My Chains Are Gone)\"\n",
        "ccli_number: null\n",
        "writers: []\n",
        "tempo_bpm: 72\n",
        "status: \"active\"\n",
        "---\n",
        "\n",
        "Notes about the arrangement.\n",
    );

    #[test]
    fn test_parse_fields_and_body() {
        let doc = parse(SAMPLE).unwrap();
        assert_eq!(doc.fields.text("title"), Some("Amazing Grace"));
        assert_eq!(
            doc.fields.get("aka"),
            Some(&Value::List(vec![Scalar::from("Amazing Grace (My Chains Are Gone)")]))
        );
        assert_eq!(doc.fields.get("ccli_number"), Some(&Value::null()));
        assert_eq!(doc.fields.get("tempo_bpm"), Some(&Value::Scalar(Scalar::Int(72))));
        assert_eq!(doc.fields.get("writers"), Some(&Value::List(vec![])));
        assert_eq!(doc.body, "\nNotes about the arrangement.\n");
    }

    #[test]
    fn test_dumped_document_round_trips() {
        let order = FieldOrder::default();
        let doc = parse(SAMPLE).unwrap();
        let rendered = doc.render(&order).unwrap();
        assert_eq!(rendered, SAMPLE);

        let again = parse(&rendered).unwrap().render(&order).unwrap();
        assert_eq!(again, rendered);
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(parse("title: x\n"), Err(FormatError::MissingOpeningDelimiter));
        assert_eq!(parse(""), Err(FormatError::MissingOpeningDelimiter));
        assert_eq!(
            parse("---\ntitle: x\nbody without close\n"),
            Err(FormatError::MissingClosingDelimiter)
        );
    }

    #[test]
    fn test_bom_is_stripped() {
        let doc = parse("\u{feff}---\ntitle: \"x\"\n---\nbody").unwrap();
        assert_eq!(doc.fields.text("title"), Some("x"));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_body_kept_verbatim() {
        let text = "---\ntitle: \"x\"\n---\r\n---\n  indented\r\nlast line no newline";
        let doc = parse(text).unwrap();
        assert_eq!(doc.body, "---\n  indented\r\nlast line no newline");
    }

    #[test]
    fn test_stray_lines_skipped() {
        let text = "---\n# comment\ntitle: \"x\"\n  - orphan item\n\nnot a field\nkey: G\n---\n";
        let doc = parse(text).unwrap();
        let keys: Vec<&str> = doc.fields.keys().collect();
        assert_eq!(keys, vec!["title", "key"]);
        assert_eq!(doc.fields.text("key"), Some("G"));
    }

    #[test]
    fn test_list_consumption_stops_at_next_field() {
        let text = "---\nwriters:\n  - \"John Newton\"\n  - 'Chris Tomlin'\n- bare\ntags:\nkey: \"G\"\n---\n";
        let doc = parse(text).unwrap();
        assert_eq!(
            doc.fields.get("writers"),
            Some(&Value::List(vec![
                Scalar::from("John Newton"),
                Scalar::from("Chris Tomlin"),
                Scalar::from("bare"),
            ]))
        );
        // A list header with no items is an empty list
        assert_eq!(doc.fields.get("tags"), Some(&Value::List(vec![])));
        assert_eq!(doc.fields.text("key"), Some("G"));
    }

    #[test]
    fn test_empty_list_round_trip() {
        let order = FieldOrder::default();
        let doc = parse("---\ntags: []\n---\n").unwrap();
        assert_eq!(doc.fields.get("tags"), Some(&Value::List(vec![])));
        assert_eq!(dump(&doc.fields, &order).unwrap(), "---\ntags: []\n---\n");

        // The multi-line empty form normalizes to the inline form
        let doc = parse("---\ntags:\n---\n").unwrap();
        assert_eq!(dump(&doc.fields, &order).unwrap(), "---\ntags: []\n---\n");
    }

    #[test]
    fn test_canonical_order_with_unknown_fields() {
        let mut fields = Fields::new();
        fields.insert("zeta", Value::string("z"));
        fields.insert("key", Value::string("G"));
        fields.insert("alpha", Value::string("a"));
        fields.insert("title", Value::string("T"));

        let order = FieldOrder::default();
        assert_eq!(order.arrange(&fields), vec!["title", "key", "zeta", "alpha"]);
        assert_eq!(
            dump(&fields, &order).unwrap(),
            "---\ntitle: \"T\"\nkey: \"G\"\nzeta: \"z\"\nalpha: \"a\"\n---\n"
        );
    }

    #[test]
    fn test_custom_field_order() {
        let mut fields = Fields::new();
        fields.insert("title", Value::string("T"));
        fields.insert("key", Value::string("G"));

        let order = FieldOrder::new(["key"]);
        assert_eq!(order.arrange(&fields), vec!["key", "title"]);
    }

    #[test]
    fn test_dump_rejects_non_finite() {
        let mut fields = Fields::new();
        fields.insert("tempo_bpm", Value::Scalar(Scalar::Float(f64::NAN)));
        assert!(dump(&fields, &FieldOrder::default()).is_err());
    }

    #[test]
    fn test_dump_refuses_line_breaks_instead_of_splitting_field() {
        let mut fields = Fields::new();
        fields.insert("original_artist", Value::string("Hillsong\nWorship"));
        assert_eq!(
            dump(&fields, &FieldOrder::default()),
            Err(DumpError::MultilineString("Hillsong\nWorship".into()))
        );

        let mut fields = Fields::new();
        fields.insert("writers", Value::List(vec![Scalar::from("A\r\nB")]));
        assert!(dump(&fields, &FieldOrder::default()).is_err());
    }

    #[test]
    fn test_huge_float_document_is_idempotent() {
        let order = FieldOrder::default();
        let first = parse("---\nx: 100000000000000000000.0\n---\n").unwrap().render(&order).unwrap();
        assert_eq!(first, "---\nx: 100000000000000000000.0\n---\n");
        let second = parse(&first).unwrap().render(&order).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_hand_written_header_canonicalizes_once() {
        let order = FieldOrder::default();
        let text = "---\nkey: G\ntitle: 'It Is Well'\nwriters:\n- Horatio Spafford\n---\nBody\n";
        let first = parse(text).unwrap().render(&order).unwrap();
        assert_eq!(
            first,
            "---\ntitle: \"It Is Well\"\nwriters:\n  - \"Horatio Spafford\"\nkey: \"G\"\n---\nBody\n"
        );
        let second = parse(&first).unwrap().render(&order).unwrap();
        assert_eq!(second, first);
    }
}
