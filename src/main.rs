use anyhow::{Context, Result};
use clap::Parser;
use hymnops_enrich::catalog::{list_documents, CatalogPass};
use hymnops_enrich::config::Config;
use hymnops_enrich::http::HttpSession;
use hymnops_enrich::progress::{format_duration, set_log_only};
use hymnops_enrich::rehearse::Rehearse;
use hymnops_enrich::resolver::Resolver;
use hymnops_enrich::safety::validate_report_path;
use hymnops_enrich::songselect::SongSelect;
use hymnops_enrich::source::CandidateSource;
use log::info;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "hymnops-enrich")]
#[command(about = "Fill empty CCLI metadata in song frontmatter from SongSelect and Rehearse")]
struct Args {
    /// TOML config file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog directory (overrides config)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Report output path (overrides config)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Resolve and report, but write no documents
    #[arg(long)]
    dry_run: bool,

    /// Disable progress bars, log progress instead
    #[arg(long)]
    log_only: bool,
}

const UNMATCHED_SAMPLE: usize = 15;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    set_log_only(args.log_only);

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(catalog) = args.catalog {
        config.catalog_dir = catalog;
    }
    if let Some(report) = args.report {
        config.report_path = report;
    }

    let start = Instant::now();

    let documents = list_documents(&config.catalog_dir, &config.extension)?;
    let document_paths: Vec<&Path> = documents.iter().map(PathBuf::as_path).collect();
    validate_report_path(&config.report_path, &config.extension, &document_paths)?;
    info!("Found {} documents in {}", documents.len(), config.catalog_dir.display());
    if args.dry_run {
        info!("Dry run: documents will not be written");
    }

    let session = HttpSession::new(&config.http);
    let sources: Vec<Box<dyn CandidateSource>> = vec![
        Box::new(SongSelect::new(session.clone(), &config.http)),
        Box::new(Rehearse::new(session, &config.http)),
    ];
    let resolver = Resolver::new(
        sources,
        config.scoring.clone(),
        Duration::from_millis(config.http.query_delay_ms),
    );

    let report = CatalogPass::new(&resolver, &config.merge, &config.field_order, args.dry_run).run(&documents);
    report
        .write_to_file(&config.report_path)
        .context("Failed to write enrichment report")?;

    println!("updated_files={}", report.updated_files);
    println!("skipped_already_populated={}", report.skipped_already_populated);
    println!("unmatched_count={}", report.unmatched_count);
    println!("failed_count={}", report.failed_count);
    println!("report={}", config.report_path.display());
    if !report.unmatched_files.is_empty() {
        let sample: Vec<&str> = report
            .unmatched_files
            .iter()
            .take(UNMATCHED_SAMPLE)
            .map(String::as_str)
            .collect();
        println!("unmatched_sample={}", sample.join(", "));
    }
    info!("Elapsed: {}", format_duration(start.elapsed()));

    Ok(())
}
