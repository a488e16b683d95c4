//! Match resolution against the configured catalog sources.
//!
//! Sources are queried in priority order for each query derived from the
//! record. The single highest-scoring result wins; ties keep the first one
//! seen (query order, then source order, then result order).

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;

use crate::models::{Candidate, ExtractedFields, SourceRecord};
use crate::normalize::{build_queries, dedupe_names, normalize, normalize_musical_key};
use crate::scoring::{score_record, ScoringWeights};
use crate::source::CandidateSource;

/// Expected "nothing to merge" outcomes of a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no candidates returned for any query")]
    NoMatchFound,

    #[error("best candidate '{title}' scored {score:.2}, below threshold {threshold}")]
    LowConfidenceMatch {
        title: String,
        score: f64,
        threshold: f64,
    },
}

pub struct Resolver {
    sources: Vec<Box<dyn CandidateSource>>,
    weights: ScoringWeights,
    query_delay: Duration,
}

impl Resolver {
    /// `sources` are in priority order: earlier sources are always queried,
    /// later ones only while no high-confidence match is known.
    pub fn new(sources: Vec<Box<dyn CandidateSource>>, weights: ScoringWeights, query_delay: Duration) -> Self {
        Self {
            sources,
            weights,
            query_delay,
        }
    }

    /// Best accepted candidate for a record title and its aliases.
    pub fn resolve(&self, title: &str, aliases: &[String]) -> Result<Candidate, ResolveError> {
        let title_norm = normalize(title);
        let mut best: Option<Candidate> = None;

        for query in build_queries(title, aliases) {
            if self.reached_high_confidence(&best) {
                break;
            }
            let query_norm = normalize(&query);

            for (index, source) in self.sources.iter().enumerate() {
                if index > 0 && self.reached_high_confidence(&best) {
                    debug!("'{}': skipping {} after high-confidence match", query, source.label());
                    break;
                }

                let records = match source.search(&query) {
                    Ok(records) => records,
                    Err(e) => {
                        warn!("{} (treated as no results for '{}')", e, query);
                        continue;
                    }
                };

                for record in records {
                    let Some(score) = score_record(&record, &title_norm, &query_norm, &self.weights) else {
                        continue;
                    };
                    debug!("'{}' via {}: '{}' scored {:.2}", query, source.label(), record.title, score);
                    if best.as_ref().map_or(true, |b| score > b.score) {
                        best = Some(Candidate {
                            score,
                            record,
                            query: query.clone(),
                            source: source.label().to_string(),
                        });
                    }
                }
            }

            if !self.query_delay.is_zero() {
                thread::sleep(self.query_delay);
            }
        }

        let best = best.ok_or(ResolveError::NoMatchFound)?;
        if !self.weights.accepts(best.score) {
            return Err(ResolveError::LowConfidenceMatch {
                title: best.record.title,
                score: best.score,
                threshold: self.weights.accept_threshold,
            });
        }
        debug!(
            "'{}': accepted '{}' via {} ({:.2}), raw: {}",
            title, best.record.title, best.source, best.score, best.record.raw
        );
        Ok(best)
    }

    fn reached_high_confidence(&self, best: &Option<Candidate>) -> bool {
        best.as_ref().is_some_and(|b| self.weights.is_high_confidence(b.score))
    }

    /// Collect merge values for an accepted candidate.
    ///
    /// Detail lookups (in source order) are authoritative for identity: the
    /// title, catalog id, and authors. The candidate's own performance
    /// attributes win over lookups, which only fill gaps.
    pub fn extract(&self, candidate: &Candidate, slug: &str) -> ExtractedFields {
        let record = &candidate.record;
        let mut catalog_id = non_blank(record.catalog_id.as_deref());
        let mut details: Vec<SourceRecord> = Vec::new();

        if let Some(id) = catalog_id.clone() {
            let lookup_slug = record.slug.as_deref().unwrap_or(slug);
            for source in &self.sources {
                if source.label() == candidate.source && has_performance_attributes(record) {
                    debug!("{}: candidate already carries {} attributes, no lookup", id, source.label());
                    continue;
                }
                match source.lookup(&id, lookup_slug) {
                    Ok(Some(detail)) => details.push(detail),
                    Ok(None) => {}
                    Err(e) => warn!("{} (detail lookup for {} skipped)", e, id),
                }
            }
        }

        if let Some(id) = details.iter().find_map(|d| non_blank(d.catalog_id.as_deref())) {
            catalog_id = Some(id);
        }

        let title = details
            .iter()
            .find_map(|d| non_blank(Some(d.title.as_str())))
            .or_else(|| non_blank(Some(record.title.as_str())));

        let authors = details
            .iter()
            .map(|d| dedupe_names(&d.authors))
            .find(|a| !a.is_empty())
            .unwrap_or_else(|| dedupe_names(&record.authors));

        let ordered: Vec<&SourceRecord> = std::iter::once(record).chain(details.iter()).collect();

        ExtractedFields {
            catalog_id,
            title,
            artist: first_attribute(&ordered, |r| r.artist.as_deref()),
            authors,
            tempo: ordered.iter().find_map(|r| r.tempo),
            key: first_attribute(&ordered, |r| r.key.as_deref()).and_then(|k| normalize_musical_key(&k)),
            time_signature: first_attribute(&ordered, |r| r.time_signature.as_deref()),
        }
    }
}

fn has_performance_attributes(record: &SourceRecord) -> bool {
    record.tempo.is_some()
        || non_blank(record.artist.as_deref()).is_some()
        || non_blank(record.key.as_deref()).is_some()
        || non_blank(record.time_signature.as_deref()).is_some()
}

fn first_attribute<'a>(records: &[&'a SourceRecord], pick: impl Fn(&'a SourceRecord) -> Option<&'a str>) -> Option<String> {
    records.iter().find_map(|r| non_blank(pick(r)))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
