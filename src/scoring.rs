//! Scoring functions for catalog matching.
//!
//! Every contribution is additive. The weights are empirical; they live in
//! [`ScoringWeights`] so they can be recalibrated from configuration without
//! touching the resolver.

use serde::Deserialize;

use crate::models::SourceRecord;
use crate::normalize::normalize;

// ============================================================================
// Score Thresholds
// ============================================================================

/// Minimum score to accept a match
pub const ACCEPT_THRESHOLD: f64 = 78.0;

/// At or above this, lower-priority sources and later queries are skipped
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 90.0;

// ============================================================================
// Weights
// ============================================================================

/// Named scoring weights and thresholds.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    /// Result title equals the record title
    pub exact_title: f64,
    /// One of result/record title contains the other
    pub partial_title: f64,
    /// Result title equals the current query
    pub exact_query: f64,
    /// One of result title/query contains the other
    pub partial_query: f64,
    /// Multiplier for the relevance reported by the source
    pub relevance_multiplier: f64,
    /// Result carries a catalog identifier
    pub catalog_id_bonus: f64,
    /// Source flags the result as the original entry
    pub authoritative_bonus: f64,
    /// Penalty per character of normalized title length difference
    pub length_penalty_per_char: f64,
    /// Length difference beyond this is not penalized further
    pub length_penalty_cap: usize,
    pub accept_threshold: f64,
    pub high_confidence: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_title: 120.0,
            partial_title: 70.0,
            exact_query: 40.0,
            partial_query: 20.0,
            relevance_multiplier: 8.0,
            catalog_id_bonus: 8.0,
            authoritative_bonus: 4.0,
            length_penalty_per_char: 0.6,
            length_penalty_cap: 20,
            accept_threshold: ACCEPT_THRESHOLD,
            high_confidence: HIGH_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ScoringWeights {
    pub fn accepts(&self, score: f64) -> bool {
        score >= self.accept_threshold
    }

    pub fn is_high_confidence(&self, score: f64) -> bool {
        score >= self.high_confidence
    }
}

// ============================================================================
// Title Matching
// ============================================================================

/// Non-empty containment in either direction.
fn overlaps(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn match_bonus(result_norm: &str, target_norm: &str, exact: f64, partial: f64) -> f64 {
    if result_norm == target_norm {
        exact
    } else if overlaps(result_norm, target_norm) {
        partial
    } else {
        0.0
    }
}

// ============================================================================
// Combined Scoring
// ============================================================================

/// Score one source record against the record title and the query that
/// produced it. Both `title_norm` and `query_norm` must already be
/// normalized. Returns `None` for results without a usable title.
pub fn score_record(
    record: &SourceRecord,
    title_norm: &str,
    query_norm: &str,
    weights: &ScoringWeights,
) -> Option<f64> {
    let result_title = record.title.trim();
    if result_title.is_empty() {
        return None;
    }
    let result_norm = normalize(result_title);

    let mut score = 0.0;
    score += match_bonus(&result_norm, title_norm, weights.exact_title, weights.partial_title);
    score += match_bonus(&result_norm, query_norm, weights.exact_query, weights.partial_query);

    if let Some(relevance) = record.relevance {
        score += relevance * weights.relevance_multiplier;
    }

    if record.catalog_id.as_deref().is_some_and(|id| !id.trim().is_empty()) {
        score += weights.catalog_id_bonus;
    }

    if record.authoritative {
        score += weights.authoritative_bonus;
    }

    let length_delta = result_norm.chars().count().abs_diff(title_norm.chars().count());
    score -= length_delta.min(weights.length_penalty_cap) as f64 * weights.length_penalty_per_char;

    Some(score)
}
