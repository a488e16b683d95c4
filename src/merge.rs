//! Non-destructive merge of extracted catalog fields into a record.
//!
//! A target field is written only when it is currently absent, null, blank,
//! or an empty list. Populated fields are never overwritten.

use serde::Deserialize;

use crate::models::{ExtractedFields, Fields, Scalar, Value};

pub const CCLI_NUMBER: &str = "ccli_number";
pub const SONGSELECT_URL: &str = "songselect_url";
pub const LYRICS_SOURCE: &str = "lyrics_source";
pub const ORIGINAL_ARTIST: &str = "original_artist";
pub const WRITERS: &str = "writers";
pub const TEMPO_BPM: &str = "tempo_bpm";
pub const KEY: &str = "key";
pub const TIME_SIGNATURE: &str = "time_signature";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MergePolicy {
    /// Written to `lyrics_source` whenever a catalog id is known
    pub lyrics_source_label: String,
    /// `lyrics_source` values that count as empty
    pub lyrics_source_placeholders: Vec<String>,
    /// Song page URL prefix; the id and slug are appended as path segments
    pub url_base: String,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            lyrics_source_label: "SongSelect".to_string(),
            lyrics_source_placeholders: vec!["Unknown".to_string()],
            url_base: "https://songselect.ccli.com/songs".to_string(),
        }
    }
}

impl MergePolicy {
    /// Merge `extracted` into `fields`. Returns the names of the fields that
    /// were written; an empty result means the record is unchanged.
    pub fn apply(&self, fields: &mut Fields, extracted: &ExtractedFields, slug: &str) -> Vec<&'static str> {
        let mut written = Vec::new();

        if let Some(id) = extracted.catalog_id.as_deref().filter(|id| !id.is_empty()) {
            fill(fields, &mut written, CCLI_NUMBER, Value::string(id));
            fill(fields, &mut written, SONGSELECT_URL, Value::string(self.song_url(id, slug)));
            if self.lyrics_source_is_empty(fields) {
                fields.insert(LYRICS_SOURCE, Value::string(self.lyrics_source_label.clone()));
                written.push(LYRICS_SOURCE);
            }
        }

        if let Some(artist) = &extracted.artist {
            fill(fields, &mut written, ORIGINAL_ARTIST, Value::string(artist.clone()));
        }

        if !extracted.authors.is_empty() {
            let writers = extracted.authors.iter().cloned().map(Scalar::Str).collect();
            fill(fields, &mut written, WRITERS, Value::List(writers));
        }

        if let Some(tempo) = extracted.tempo.filter(|t| t.is_finite()) {
            fill(fields, &mut written, TEMPO_BPM, Value::Scalar(Scalar::Int(tempo.round() as i64)));
        }

        if let Some(key) = &extracted.key {
            fill(fields, &mut written, KEY, Value::string(key.clone()));
        }

        if let Some(time_signature) = &extracted.time_signature {
            fill(fields, &mut written, TIME_SIGNATURE, Value::string(time_signature.clone()));
        }

        written
    }

    pub fn song_url(&self, catalog_id: &str, slug: &str) -> String {
        format!("{}/{}/{}", self.url_base.trim_end_matches('/'), catalog_id, slug)
    }

    fn lyrics_source_is_empty(&self, fields: &Fields) -> bool {
        if fields.is_empty_field(LYRICS_SOURCE) {
            return true;
        }
        fields
            .text(LYRICS_SOURCE)
            .is_some_and(|current| self.lyrics_source_placeholders.iter().any(|p| p == current))
    }
}

fn fill(fields: &mut Fields, written: &mut Vec<&'static str>, name: &'static str, value: Value) {
    if fields.is_empty_field(name) {
        fields.insert(name, value);
        written.push(name);
    }
}

/// Records that already carry an id, writers, and a song URL need no lookup.
pub fn is_fully_populated(fields: &Fields) -> bool {
    !fields.is_empty_field(CCLI_NUMBER) && !fields.is_empty_field(WRITERS) && !fields.is_empty_field(SONGSELECT_URL)
}
