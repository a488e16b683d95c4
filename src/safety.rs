//! Safety checks before writing the enrichment report.
//!
//! The report lives next to the catalog, so a typo in its path could
//! otherwise overwrite a song document.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that a report path is safe to overwrite.
///
/// Checks:
/// - The report must be a `.json` file
/// - The report must not carry the catalog's document extension
/// - The report must not be one of the catalog documents
pub fn validate_report_path(report: &Path, extension: &str, documents: &[&Path]) -> Result<()> {
    let report_ext = report.extension().and_then(|e| e.to_str()).unwrap_or("");

    if !report_ext.eq_ignore_ascii_case("json") {
        bail!(
            "Safety check failed: report '{}' must be a .json file",
            report.display()
        );
    }

    if report_ext.eq_ignore_ascii_case(extension) {
        bail!(
            "Safety check failed: report '{}' uses the catalog document extension '{}'",
            report.display(),
            extension
        );
    }

    for document in documents {
        if report == *document {
            bail!(
                "Safety check failed: report '{}' cannot be the same as catalog document '{}'",
                report.display(),
                document.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_report_path() {
        let report = PathBuf::from("imports/ccli-enrichment-report.json");
        let doc = PathBuf::from("songs/amazing-grace.md");
        assert!(validate_report_path(&report, "md", &[&doc]).is_ok());
    }

    #[test]
    fn test_report_must_be_json() {
        let report = PathBuf::from("imports/report.txt");
        let result = validate_report_path(&report, "md", &[]);
        assert!(result.unwrap_err().to_string().contains("must be a .json file"));
    }

    #[test]
    fn test_report_cannot_use_document_extension() {
        let report = PathBuf::from("songs/report.json");
        let result = validate_report_path(&report, "json", &[]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("uses the catalog document extension"));
    }

    #[test]
    fn test_report_equals_document() {
        let path = PathBuf::from("songs/data.json");
        let result = validate_report_path(&path, "md", &[&path]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as catalog document"));
    }
}
