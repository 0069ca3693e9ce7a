// src/pipeline/run.rs

//! Pipeline orchestration.
//!
//! Drives the per-company state machine: discover the career page, extract
//! one open position, assemble a result or record a failure, and keep going.
//! One company's failure never aborts the batch.

use std::io::Write;
use std::time::Instant;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{CompanyRecord, Config, Credentials, JobSourceResult, RunStatistics};
use crate::services::{
    AiFallback, ApifyListingSource, CareerPageFinder, ChromiumRenderer, ListingSource,
    PositionExtractor, extract_companies,
};
use crate::storage::OutputWriter;
use crate::utils::{http, log};

/// Bounds for the per-run company count.
pub const MIN_COMPANIES: usize = 1;
pub const MAX_COMPANIES: usize = 50;

/// Clamp the requested company count into the supported range.
pub fn clamp_max_companies(requested: usize) -> usize {
    if (MIN_COMPANIES..=MAX_COMPANIES).contains(&requested) {
        requested
    } else {
        log::warn(&format!(
            "max companies {requested} out of range, clamping to {MIN_COMPANIES}-{MAX_COMPANIES}"
        ));
        requested.clamp(MIN_COMPANIES, MAX_COMPANIES)
    }
}

/// Validate run-level inputs. Any failure here aborts the run before a
/// single company is processed.
fn validate_inputs(listing_url: &str, config: &Config, credentials: &Credentials) -> Result<()> {
    if listing_url.trim().is_empty() {
        return Err(AppError::validation("listing search URL is required"));
    }
    if !listing_url.starts_with("http") {
        return Err(AppError::validation(format!(
            "invalid listing search URL: {listing_url}"
        )));
    }
    if credentials.listing_api_token.trim().is_empty() {
        return Err(AppError::validation("APIFY_TOKEN is not set"));
    }
    config.validate()
}

/// Run the full pipeline for one listing search URL.
pub async fn run_pipeline(
    config: &Config,
    credentials: &Credentials,
    listing_url: &str,
    max_companies: usize,
) -> Result<()> {
    let renderer = ChromiumRenderer::new(&config.extraction, &config.http.user_agent);
    let mut extractor = PositionExtractor::new(Box::new(renderer), config.extraction.clone());

    // The browser must be released on every exit path, including fatal
    // aborts after this point, so the fallible part runs behind a seam.
    let outcome = run_inner(config, credentials, listing_url, max_companies, &mut extractor).await;
    extractor.shutdown().await;

    let writer = OutputWriter::new(&config.output.dir);
    let log_path = writer.path_for(&config.output.log_file);
    if let Err(e) = log::save_to(&log_path) {
        eprintln!("Failed to persist log file: {e}");
    }

    outcome
}

async fn run_inner(
    config: &Config,
    credentials: &Credentials,
    listing_url: &str,
    max_companies: usize,
    extractor: &mut PositionExtractor,
) -> Result<()> {
    validate_inputs(listing_url, config, credentials)?;
    let max_companies = clamp_max_companies(max_companies);

    log::header("Job source pipeline");

    let mut stats = RunStatistics::default();
    stats.start_time = Some(Utc::now());
    let run_started = Instant::now();

    let source = ApifyListingSource::new(
        config.listings.clone(),
        credentials.listing_api_token.clone(),
    )?;
    let raw_items = source
        .fetch_job_listings(listing_url, max_companies, &mut stats)
        .await?;
    if raw_items.is_empty() {
        return Err(AppError::fetch("no listings fetched, aborting"));
    }

    let mut companies = extract_companies(&raw_items);
    if companies.is_empty() {
        return Err(AppError::fetch("no valid companies extracted, aborting"));
    }
    companies.truncate(max_companies);
    let total = companies.len();
    log::info(&format!("Processing {total} companies"));

    let client = http::create_client(&config.http)?;
    let ai = credentials.has_ai_key().then(|| {
        AiFallback::new(
            client.clone(),
            config.ai.clone(),
            credentials.ai_api_key.clone(),
        )
    });
    if ai.is_none() {
        log::warn("AI credential absent; tier 3 is disabled for this run");
    }
    let mut finder = CareerPageFinder::new(client, config.discovery.clone(), ai);

    let mut results: Vec<JobSourceResult> = Vec::new();
    for (index, company) in companies.iter().enumerate() {
        print_progress(index + 1, total);
        if let Some(result) = process_company(company, &mut finder, extractor, &mut stats).await {
            results.push(result);
        }
    }

    stats.end_time = Some(Utc::now());
    stats.total_processing_time_seconds = run_started.elapsed().as_secs_f64();

    let writer = OutputWriter::new(&config.output.dir);
    let report_path = writer.save_report(&results, &stats).await?;

    let report = stats.report();
    log::summary(
        "Run results",
        &[
            ("Total processed", report.total_processed.to_string()),
            ("Successful", report.successful.to_string()),
            ("Failed", report.failed.to_string()),
            ("Success rate", report.success_rate.clone()),
            ("Heuristic success rate", report.heuristic_success_rate.clone()),
            ("AI calls", report.ai_calls_made.to_string()),
        ],
    );
    log::success(&stats.summary_line());
    log::info(&format!("Output: {}", report_path.display()));

    Ok(())
}

/// Process one company through career discovery and position extraction.
///
/// Exactly one of success or failure is recorded per company; both
/// sub-lookups contain their own errors and report a miss as `None`.
async fn process_company(
    company: &CompanyRecord,
    finder: &mut CareerPageFinder,
    extractor: &mut PositionExtractor,
    stats: &mut RunStatistics,
) -> Option<JobSourceResult> {
    let started = Instant::now();
    log::info(&format!("Processing: {} ({})", company.name, company.url));

    let Some(career) = finder.discover(&company.url, stats).await else {
        stats.record_failure();
        log::warn(&format!("No career page found for {}", company.name));
        return None;
    };

    let Some(position_url) = extractor.extract_first_position(&career.url).await else {
        stats.record_failure();
        log::warn(&format!("No positions found for {}", company.name));
        return None;
    };

    stats.record_success(career.tier);
    log::info(&format!("Success: {}", company.name));

    Some(JobSourceResult {
        company_name: company.name.clone(),
        career_page_url: career.url,
        open_position_url: position_url,
        timestamp: Utc::now(),
        source_tier: career.tier,
        processing_time_seconds: started.elapsed().as_secs_f64(),
    })
}

fn print_progress(current: usize, total: usize) {
    let percent = current as f64 / total as f64 * 100.0;
    print!("  [{current}/{total}] ({percent:.0}%)\r");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            listing_api_token: "token".to_string(),
            ai_api_key: String::new(),
        }
    }

    #[test]
    fn clamp_keeps_values_in_range() {
        assert_eq!(clamp_max_companies(1), 1);
        assert_eq!(clamp_max_companies(25), 25);
        assert_eq!(clamp_max_companies(50), 50);
    }

    #[test]
    fn clamp_pulls_values_into_range() {
        assert_eq!(clamp_max_companies(0), 1);
        assert_eq!(clamp_max_companies(51), 50);
        assert_eq!(clamp_max_companies(10_000), 50);
    }

    #[test]
    fn validate_rejects_missing_url() {
        let err = validate_inputs("", &Config::default(), &credentials());
        assert!(err.is_err());
    }

    #[test]
    fn validate_rejects_schemeless_url() {
        let err = validate_inputs("example.com/jobs", &Config::default(), &credentials());
        assert!(err.is_err());
    }

    #[test]
    fn validate_rejects_missing_listing_token() {
        let creds = Credentials::default();
        let err = validate_inputs("https://example.com/jobs", &Config::default(), &creds);
        assert!(err.is_err());
    }

    #[test]
    fn validate_accepts_good_inputs_without_ai_key() {
        // The AI credential is optional: its absence only disables tier 3.
        let ok = validate_inputs("https://example.com/jobs", &Config::default(), &credentials());
        assert!(ok.is_ok());
    }
}
