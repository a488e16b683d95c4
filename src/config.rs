//! Enrichment configuration.
//!
//! Everything has a default, so an empty (or absent) TOML file yields the
//! stock setup for the song catalog.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::frontmatter::FieldOrder;
use crate::merge::MergePolicy;
use crate::scoring::ScoringWeights;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Directory holding one document per song
    pub catalog_dir: PathBuf,
    pub report_path: PathBuf,
    /// Document file extension, without the dot
    pub extension: String,
    pub field_order: FieldOrder,
    pub http: HttpConfig,
    pub scoring: ScoringWeights,
    pub merge: MergePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("songs"),
            report_path: PathBuf::from("imports/ccli-enrichment-report.json"),
            extension: "md".to_string(),
            field_order: FieldOrder::default(),
            http: HttpConfig::default(),
            scoring: ScoringWeights::default(),
            merge: MergePolicy::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Pause after each query, to stay under the catalogs' rate limits
    pub query_delay_ms: u64,
    pub user_agent: String,
    pub locale: String,
    pub country: String,
    pub songselect_search_url: String,
    pub songselect_details_url: String,
    pub rehearse_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            query_delay_ms: 80,
            user_agent: "HymnOps-Importer/1.0".to_string(),
            locale: "en-US".to_string(),
            country: "US".to_string(),
            songselect_search_url: "https://songselect.ccli.com/api/GetSongSearchResults".to_string(),
            songselect_details_url: "https://songselect.ccli.com/api/GetSongDetails".to_string(),
            rehearse_url: "https://rehearse-api.ccli.com/api/songs".to_string(),
        }
    }
}
