//! One enrichment pass over a catalog directory.
//!
//! Each document is parsed, resolved against the catalog sources, merged, and
//! written back only when at least one field was filled. A document that
//! cannot be read or parsed is reported and skipped; the pass never aborts
//! because of a single document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::frontmatter::{self, FieldOrder};
use crate::merge::{is_fully_populated, MergePolicy};
use crate::models::{EnrichmentReport, Fields, MatchSummary, Scalar, Value};
use crate::progress::{create_progress_bar, log_progress};
use crate::resolver::Resolver;

const TITLE: &str = "title";
const SLUG: &str = "slug";
const ALIASES: &str = "aka";

/// Catalog documents in `dir`: files with `extension`, excluding names that
/// start with `_` (templates), sorted by file name.
pub fn list_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read catalog directory {}", dir.display()))?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = file_name(&path);
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches_ext && !name.starts_with('_') {
            documents.push(path);
        }
    }
    documents.sort_by_key(|p| file_name(p));
    Ok(documents)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// What happened to a single document.
#[derive(Debug, PartialEq)]
enum Outcome {
    Updated,
    Unchanged,
    AlreadyPopulated,
    Unmatched(String),
}

pub struct CatalogPass<'a> {
    resolver: &'a Resolver,
    policy: &'a MergePolicy,
    order: &'a FieldOrder,
    dry_run: bool,
}

impl<'a> CatalogPass<'a> {
    pub fn new(resolver: &'a Resolver, policy: &'a MergePolicy, order: &'a FieldOrder, dry_run: bool) -> Self {
        Self {
            resolver,
            policy,
            order,
            dry_run,
        }
    }

    /// Process every document in order and summarize the results.
    pub fn run(&self, documents: &[PathBuf]) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();
        let total = documents.len() as u64;
        let pb = create_progress_bar(total, "Enriching");

        for (i, path) in documents.iter().enumerate() {
            let name = file_name(path);
            match self.process(path, &name, &mut report) {
                Ok(Outcome::Updated) => {
                    report.updated_files += 1;
                    info!("{}: updated", name);
                }
                Ok(Outcome::Unchanged) => info!("{}: matched, nothing to fill", name),
                Ok(Outcome::AlreadyPopulated) => {
                    report.skipped_already_populated += 1;
                    debug!("{}: already populated", name);
                }
                Ok(Outcome::Unmatched(entry)) => {
                    info!("{}: unmatched", entry);
                    report.record_unmatched(entry);
                }
                Err(e) => {
                    warn!("{}: {:#}", name, e);
                    report.record_failed(format!("{} ({:#})", name, e));
                }
            }
            pb.inc(1);
            log_progress("Enriching", i as u64 + 1, total, 25);
        }

        pb.finish_with_message(format!("Enriched {} of {}", report.updated_files, total));
        report
    }

    fn process(&self, path: &Path, name: &str, report: &mut EnrichmentReport) -> Result<Outcome> {
        let text = fs::read_to_string(path).context("Failed to read document")?;
        let mut doc = frontmatter::parse(&text)?;

        let Some(title) = doc.fields.text(TITLE).map(str::to_string) else {
            return Ok(Outcome::Unmatched(format!("{} (missing title)", name)));
        };
        if is_fully_populated(&doc.fields) {
            return Ok(Outcome::AlreadyPopulated);
        }

        let slug = doc
            .fields
            .text(SLUG)
            .map(str::to_string)
            .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let aliases = aliases(&doc.fields);

        let candidate = match self.resolver.resolve(&title, &aliases) {
            Ok(candidate) => candidate,
            Err(e) => {
                debug!("{}: {}", name, e);
                return Ok(Outcome::Unmatched(name.to_string()));
            }
        };

        let extracted = self.resolver.extract(&candidate, &slug);
        let written = self.policy.apply(&mut doc.fields, &extracted, &slug);

        let outcome = if written.is_empty() {
            Outcome::Unchanged
        } else {
            let rendered = doc.render(self.order)?;
            if self.dry_run {
                info!("{}: would write {}", name, written.join(", "));
            } else {
                write_replacing(path, &rendered).context("Failed to write document")?;
            }
            Outcome::Updated
        };

        report.matches.push(MatchSummary {
            file: name.to_string(),
            title: title.clone(),
            matched_title: extracted.title.clone().unwrap_or_else(|| candidate.record.title.clone()),
            ccli_number: extracted.catalog_id.clone().unwrap_or_default(),
            score: round2(candidate.score),
            query: candidate.query.clone(),
            source: candidate.source.clone(),
        });

        Ok(outcome)
    }
}

/// Alias strings from the `aka` list; null items are dropped.
fn aliases(fields: &Fields) -> Vec<String> {
    fields
        .get(ALIASES)
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .filter(|item| !matches!(item, Scalar::Null))
        .map(Scalar::to_text)
        .collect()
}

/// Write to a sibling temp file, then rename it over `path`.
fn write_replacing(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = path.with_file_name(format!(".{}.tmp", file_name(path)));
    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
