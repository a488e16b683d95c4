//! Audit a catalog's frontmatter without touching any file.
//!
//! Lists documents that fail to parse, and documents whose header would be
//! rewritten (reordered or requoted) by the next enrichment pass.

use anyhow::Result;
use clap::Parser;
use hymnops_enrich::catalog::list_documents;
use hymnops_enrich::config::Config;
use hymnops_enrich::frontmatter::{self, FieldOrder};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "frontmatter-check")]
#[command(about = "Report song documents that fail to parse or are not in canonical form")]
struct Args {
    /// TOML config file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog directory (overrides config)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum Finding {
    Canonical,
    NonCanonical,
    Failed(String),
}

fn check(text: &str, order: &FieldOrder) -> Finding {
    let doc = match frontmatter::parse(text) {
        Ok(doc) => doc,
        Err(e) => return Finding::Failed(e.to_string()),
    };
    match doc.render(order) {
        Ok(rendered) if rendered == text => Finding::Canonical,
        Ok(_) => Finding::NonCanonical,
        Err(e) => Finding::Failed(e.to_string()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(catalog) = args.catalog {
        config.catalog_dir = catalog;
    }

    let documents = list_documents(&config.catalog_dir, &config.extension)?;
    let mut failed = Vec::new();
    let mut non_canonical = Vec::new();

    for path in &documents {
        let name = display_name(path);
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("{}: {}", name, e);
                failed.push(name);
                continue;
            }
        };
        match check(&text, &config.field_order) {
            Finding::Canonical => {}
            Finding::NonCanonical => non_canonical.push(name),
            Finding::Failed(reason) => {
                warn!("{}: {}", name, reason);
                failed.push(name);
            }
        }
    }

    info!("Checked {} documents", documents.len());
    println!("checked={}", documents.len());
    println!("non_canonical_count={}", non_canonical.len());
    for name in &non_canonical {
        println!("  non-canonical: {}", name);
    }
    println!("failed_count={}", failed.len());
    for name in &failed {
        println!("  failed: {}", name);
    }

    if !failed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_document() {
        let text = "---\ntitle: \"Be Thou My Vision\"\nkey: \"D\"\n---\nbody\n";
        assert_eq!(check(text, &FieldOrder::default()), Finding::Canonical);
    }

    #[test]
    fn test_non_canonical_order_and_quoting() {
        let reordered = "---\nkey: \"D\"\ntitle: \"Be Thou My Vision\"\n---\n";
        assert_eq!(check(reordered, &FieldOrder::default()), Finding::NonCanonical);

        let bare = "---\ntitle: Be Thou My Vision\n---\n";
        assert_eq!(check(bare, &FieldOrder::default()), Finding::NonCanonical);
    }

    #[test]
    fn test_parse_failure() {
        let finding = check("no frontmatter here\n", &FieldOrder::default());
        assert!(matches!(finding, Finding::Failed(_)));
    }
}
