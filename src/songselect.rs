//! SongSelect catalog source (primary).
//!
//! Search results carry the catalog number and slug; the details endpoint
//! adds the canonical title and the author list.

use serde_json::Value as Json;

use crate::config::HttpConfig;
use crate::http::HttpSession;
use crate::models::SourceRecord;
use crate::source::{is_original_master, json_names, json_number, json_text, CandidateSource, SourceError};

pub const LABEL: &str = "songselect";

const PAGE_SIZE: &str = "25";

pub struct SongSelect {
    session: HttpSession,
    search_url: String,
    details_url: String,
}

impl SongSelect {
    pub fn new(session: HttpSession, config: &HttpConfig) -> Self {
        Self {
            session,
            search_url: config.songselect_search_url.clone(),
            details_url: config.songselect_details_url.clone(),
        }
    }
}

impl CandidateSource for SongSelect {
    fn label(&self) -> &str {
        LABEL
    }

    fn search(&self, query: &str) -> Result<Vec<SourceRecord>, SourceError> {
        let form = [("numPerPage", PAGE_SIZE), ("search", query), ("page", "1")];
        let body = self.session.post_form_json(LABEL, &self.search_url, &form)?;
        Ok(search_records(&body))
    }

    fn lookup(&self, catalog_id: &str, slug: &str) -> Result<Option<SourceRecord>, SourceError> {
        if catalog_id.is_empty() {
            return Ok(None);
        }
        let params = [("songNumber", catalog_id), ("slug", slug)];
        let body = self.session.get_json(LABEL, &self.details_url, &params)?;
        Ok(details_record(&body))
    }
}

/// `payload.items[]` of a search response.
pub fn search_records(body: &Json) -> Vec<SourceRecord> {
    body.get("payload")
        .and_then(|p| p.get("items"))
        .and_then(Json::as_array)
        .map(|items| items.iter().map(search_item).collect())
        .unwrap_or_default()
}

fn search_item(item: &Json) -> SourceRecord {
    SourceRecord {
        title: json_text(item, "title").unwrap_or_default(),
        catalog_id: json_text(item, "songNumber"),
        slug: json_text(item, "slug"),
        authors: json_names(item, "authors"),
        relevance: json_number(item, "score"),
        authoritative: is_original_master(item),
        raw: item.clone(),
        ..Default::default()
    }
}

/// `payload` object of a details response.
pub fn details_record(body: &Json) -> Option<SourceRecord> {
    let payload = body.get("payload").filter(|p| p.is_object())?;
    Some(SourceRecord {
        title: json_text(payload, "title").unwrap_or_default(),
        catalog_id: json_text(payload, "ccliSongNumber"),
        slug: json_text(payload, "slug"),
        authors: json_names(payload, "authors"),
        raw: payload.clone(),
        ..Default::default()
    })
}
