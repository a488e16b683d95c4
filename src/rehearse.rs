//! Rehearse catalog source (secondary).
//!
//! Results carry performance attributes (artist, tempo, key, meter) that
//! SongSelect search does not, and can be looked up by catalog number.

use serde_json::Value as Json;

use crate::config::HttpConfig;
use crate::http::HttpSession;
use crate::models::SourceRecord;
use crate::source::{is_original_master, json_names, json_number, json_text, CandidateSource, SourceError};

pub const LABEL: &str = "rehearse";

const SEARCH_LIMIT: &str = "20";

const LOOKUP_LIMIT: &str = "5";

pub struct Rehearse {
    session: HttpSession,
    url: String,
    country: String,
}

impl Rehearse {
    pub fn new(session: HttpSession, config: &HttpConfig) -> Self {
        Self {
            session,
            url: config.rehearse_url.clone(),
            country: config.country.clone(),
        }
    }
}

impl CandidateSource for Rehearse {
    fn label(&self) -> &str {
        LABEL
    }

    fn search(&self, query: &str) -> Result<Vec<SourceRecord>, SourceError> {
        let params = [
            ("search", query),
            ("page", "1"),
            ("limit", SEARCH_LIMIT),
            ("countrycode", self.country.as_str()),
        ];
        let body = self.session.get_json(LABEL, &self.url, &params)?;
        Ok(payload_records(&body))
    }

    fn lookup(&self, catalog_id: &str, _slug: &str) -> Result<Option<SourceRecord>, SourceError> {
        if catalog_id.is_empty() {
            return Ok(None);
        }
        let params = [
            ("cclisongnumber", catalog_id),
            ("page", "1"),
            ("limit", LOOKUP_LIMIT),
            ("countrycode", self.country.as_str()),
        ];
        let body = self.session.get_json(LABEL, &self.url, &params)?;
        Ok(payload_records(&body).into_iter().next())
    }
}

/// `payload[]` of a search or lookup response.
pub fn payload_records(body: &Json) -> Vec<SourceRecord> {
    body.get("payload")
        .and_then(Json::as_array)
        .map(|items| items.iter().map(payload_item).collect())
        .unwrap_or_default()
}

fn payload_item(item: &Json) -> SourceRecord {
    let catalog_id = item.get("otherIds").and_then(|ids| json_text(ids, "ccliSongNumber"));
    SourceRecord {
        title: json_text(item, "title").unwrap_or_default(),
        catalog_id,
        artist: json_text(item, "artistName"),
        tempo: json_number(item, "bpm"),
        key: json_text(item, "key"),
        time_signature: json_text(item, "timeSignature"),
        authors: json_names(item, "authors"),
        relevance: json_number(item, "score"),
        authoritative: is_original_master(item),
        raw: item.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_records() {
        let body = json!({
            "payload": [
                {
                    "title": "Cornerstone",
                    "otherIds": {"ccliSongNumber": "6158927"},
                    "artistName": "Hillsong Worship",
                    "bpm": 70.5,
                    "key": "c",
                    "timeSignature": "4/4",
                    "authors": ["Edward Mote", "Jonas Myrin"],
                    "score": 0.9,
                    "sourceLabel": "original master"
                },
                {"title": "Cornerstone (Live)", "otherIds": null}
            ]
        });
        let records = payload_records(&body);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.catalog_id.as_deref(), Some("6158927"));
        assert_eq!(first.artist.as_deref(), Some("Hillsong Worship"));
        assert_eq!(first.tempo, Some(70.5));
        assert_eq!(first.key.as_deref(), Some("c"));
        assert_eq!(first.time_signature.as_deref(), Some("4/4"));
        assert_eq!(first.authors, vec!["Edward Mote", "Jonas Myrin"]);
        assert!(first.authoritative);

        assert_eq!(records[1].catalog_id, None);
        assert_eq!(records[1].tempo, None);
    }

    #[test]
    fn test_payload_must_be_a_list() {
        assert!(payload_records(&json!({"payload": {"title": "x"}})).is_empty());
        assert!(payload_records(&json!({"payload": null})).is_empty());
    }
}
