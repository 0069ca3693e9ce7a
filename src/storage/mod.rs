//! Report persistence.
//!
//! One JSON report per run: the assembled results, the run statistics, and a
//! generation timestamp, written atomically to the output directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{JobSourceResult, ResultRecord, RunStatistics, StatisticsReport};
use crate::utils::log;

/// Report envelope as serialized to disk.
#[derive(Debug, Serialize)]
struct Report {
    results: Vec<ResultRecord>,
    statistics: StatisticsReport,
    generated_at: DateTime<Utc>,
}

/// Writes the run report into the output directory.
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Dated report filename, `job_sources_<YYYY-MM-DD>.json`.
    pub fn report_filename(&self) -> String {
        format!("job_sources_{}.json", Local::now().format("%Y-%m-%d"))
    }

    /// Full path for a file inside the output directory.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Persist results and statistics, returning the report path.
    pub async fn save_report(
        &self,
        results: &[JobSourceResult],
        stats: &RunStatistics,
    ) -> Result<PathBuf> {
        let report = Report {
            results: results.iter().map(ResultRecord::from).collect(),
            statistics: stats.report(),
            generated_at: Utc::now(),
        };

        let path = self.path_for(&self.report_filename());
        self.write_json(&path, &report).await?;

        log::info(&format!(
            "Saved {} results to {}",
            results.len(),
            path.display()
        ));
        Ok(path)
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(path, &bytes).await
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn sample_result() -> JobSourceResult {
        JobSourceResult {
            company_name: "Acme".to_string(),
            career_page_url: "https://acme.com/careers".to_string(),
            open_position_url: "https://acme.com/careers/123".to_string(),
            timestamp: Utc::now(),
            source_tier: Tier::HomepageScrape,
            processing_time_seconds: 0.8,
        }
    }

    #[test]
    fn report_filename_is_dated() {
        let writer = OutputWriter::new("output");
        let name = writer.report_filename();
        assert!(name.starts_with("job_sources_"));
        assert!(name.ends_with(".json"));
        // job_sources_YYYY-MM-DD.json
        assert_eq!(name.len(), "job_sources_0000-00-00.json".len());
    }

    #[tokio::test]
    async fn save_report_writes_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());

        let mut stats = RunStatistics::default();
        stats.record_success(Tier::HomepageScrape);

        let path = writer.save_report(&[sample_result()], &stats).await.unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert_eq!(value["results"][0]["company_name"], "Acme");
        assert_eq!(value["statistics"]["total_processed"], 1);
        assert_eq!(value["statistics"]["success_rate"], "100.0%");
        assert!(value["generated_at"].is_string());

        // The temp file from the atomic write must be gone.
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn save_report_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/output");
        let writer = OutputWriter::new(&nested);

        let stats = RunStatistics::default();
        let path = writer.save_report(&[], &stats).await.unwrap();
        assert!(path.exists());
    }
}
