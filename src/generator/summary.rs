//! `summary.json` generation from the per-type manifests.
//!
//! The summary lets landing pages show counts without fetching every
//! manifest. Types with no manifest on disk are listed with zero counts.

use crate::{
    config::SiteConfig,
    log,
    outputs::{OutputCounts, OutputManifest, OutputSummary, OutputType},
};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::{fs, io, path::Path};

/// Write `[outputs].dir/[outputs].summary`.
pub fn build_summary(config: &SiteConfig) -> Result<OutputSummary> {
    let mut summary = collect_summary(&config.outputs.dir)?;
    summary.generated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

    let path = config.summary_path();
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    log!(
        "summary";
        "{} files across {} types -> {}",
        summary.total_files(),
        summary.outputs.values().filter(|c| c.total_files > 0).count(),
        path.display()
    );
    Ok(summary)
}

fn collect_summary(outputs_dir: &Path) -> Result<OutputSummary> {
    let mut summary = OutputSummary::default();

    for output in OutputType::ALL {
        let path = outputs_dir.join(output.slug()).join("manifest.json");
        let counts = match fs::read_to_string(&path) {
            Ok(content) => {
                let manifest: OutputManifest = serde_json::from_str(&content)
                    .with_context(|| format!("Invalid manifest {}", path.display()))?;
                OutputCounts {
                    total_files: manifest.file_count(),
                    categories: manifest.categories.len(),
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log!("summary"; "{output}: no manifest");
                OutputCounts::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        summary.outputs.insert(output.slug().to_owned(), counts);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, output: OutputType, json: &str) {
        let dir = dir.join(output.slug());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("manifest.json"), json).unwrap();
    }

    #[test]
    fn test_counts_per_type() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            dir.path(),
            OutputType::Latex,
            r#"{"total_files": 99, "categories": {
                "algebra": [{"filename": "a.tex"}, {"filename": "b.tex"}],
                "pde": [{"filename": "heat.tex"}]
            }}"#,
        );

        let summary = collect_summary(dir.path()).unwrap();

        assert_eq!(summary.outputs.len(), OutputType::ALL.len());
        // Counted from the entries, not the declared total
        assert_eq!(
            summary.counts(OutputType::Latex),
            OutputCounts {
                total_files: 3,
                categories: 2
            }
        );
        assert_eq!(summary.counts(OutputType::Colab), OutputCounts::default());
        assert_eq!(summary.total_files(), 3);
    }

    #[test]
    fn test_malformed_manifest_fails() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), OutputType::Vue, "{}");
        assert!(collect_summary(dir.path()).is_err());
    }

    #[test]
    fn test_build_summary_writes_file() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            dir.path(),
            OutputType::Json,
            r#"{"categories": {"limits": [{"filename": "l.json"}]}}"#,
        );
        let mut config = SiteConfig::default();
        config.outputs.dir = dir.path().to_path_buf();

        build_summary(&config).unwrap();

        let written: OutputSummary =
            serde_json::from_str(&fs::read_to_string(config.summary_path()).unwrap()).unwrap();
        assert_eq!(written.counts(OutputType::Json).total_files, 1);
        assert!(written.generated_at.is_some());
    }
}
