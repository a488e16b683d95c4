//! In-memory catalog source for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::models::SourceRecord;
use crate::source::{CandidateSource, SourceError};

/// Minimal source record with only a title.
pub fn record(title: &str) -> SourceRecord {
    SourceRecord {
        title: title.to_string(),
        ..Default::default()
    }
}

/// Source answering from fixed per-query results.
///
/// Every `search` and `lookup` call is recorded so tests can assert on what
/// was asked, and in which order.
pub struct StaticSource {
    label: String,
    results: HashMap<String, Vec<SourceRecord>>,
    details: HashMap<String, SourceRecord>,
    fail: bool,
    queries: Rc<RefCell<Vec<String>>>,
    lookups: Rc<RefCell<Vec<String>>>,
}

impl StaticSource {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            results: HashMap::new(),
            details: HashMap::new(),
            fail: false,
            queries: Rc::default(),
            lookups: Rc::default(),
        }
    }

    pub fn with_results(mut self, query: &str, records: Vec<SourceRecord>) -> Self {
        self.results.insert(query.to_string(), records);
        self
    }

    pub fn with_lookup(mut self, catalog_id: &str, record: SourceRecord) -> Self {
        self.details.insert(catalog_id.to_string(), record);
        self
    }

    /// Every call fails as a transport error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn queries(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.queries)
    }

    pub fn lookups(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.lookups)
    }

    fn transient(&self) -> SourceError {
        SourceError::Transient {
            source_label: self.label.clone(),
            message: "connection reset".to_string(),
        }
    }
}

impl CandidateSource for StaticSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn search(&self, query: &str) -> Result<Vec<SourceRecord>, SourceError> {
        self.queries.borrow_mut().push(query.to_string());
        if self.fail {
            return Err(self.transient());
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    fn lookup(&self, catalog_id: &str, _slug: &str) -> Result<Option<SourceRecord>, SourceError> {
        self.lookups.borrow_mut().push(catalog_id.to_string());
        if self.fail {
            return Err(self.transient());
        }
        Ok(self.details.get(catalog_id).cloned())
    }
}
