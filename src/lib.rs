//! Song catalog enrichment library - shared modules for all binaries.

pub mod catalog;
pub mod config;
pub mod frontmatter;
pub mod http;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod rehearse;
pub mod resolver;
pub mod safety;
pub mod scalar;
pub mod scoring;
pub mod songselect;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;
