//! Upstream job-listing acquisition.
//!
//! Fetches raw job-listing items from the search API and turns them into
//! processable company records.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{CompanyRecord, ListingsConfig, RawListing, RunStatistics};
use crate::utils::log;

/// Source of raw job-listing items for a search URL.
#[async_trait]
pub trait ListingSource {
    /// Fetch up to `limit` raw items for the given search URL.
    async fn fetch_job_listings(
        &self,
        search_url: &str,
        limit: usize,
        stats: &mut RunStatistics,
    ) -> Result<Vec<RawListing>>;
}

/// Listing source backed by an Apify scraper actor.
pub struct ApifyListingSource {
    client: reqwest::Client,
    config: ListingsConfig,
    token: String,
}

impl ApifyListingSource {
    /// Create a new source. Uses its own client because the synchronous
    /// actor run takes far longer than ordinary page fetches.
    pub fn new(config: ListingsConfig, token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            token,
        })
    }
}

#[async_trait]
impl ListingSource for ApifyListingSource {
    async fn fetch_job_listings(
        &self,
        search_url: &str,
        limit: usize,
        stats: &mut RunStatistics,
    ) -> Result<Vec<RawListing>> {
        log::info(&format!("Fetching up to {limit} listings from the job search API"));

        let endpoint = format!(
            "{}/acts/{}/run-sync-get-dataset-items",
            self.config.api_base, self.config.actor_id
        );
        let body = serde_json::json!({
            "startUrls": [{ "url": search_url }],
            "maxItems": limit,
        });

        let response = self
            .client
            .post(&endpoint)
            .query(&[("token", self.token.as_str()), ("format", "json")])
            .json(&body)
            .send()
            .await?;

        stats.upstream_api_calls += 1;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(format!("listing API returned {status}")));
        }

        let items: Vec<RawListing> = response.json().await?;
        log::info(&format!(
            "Estimated listing API cost for {} items: ${:.2}",
            items.len(),
            items.len() as f64 * 0.01
        ));
        Ok(items)
    }
}

/// Extract processable company records, dropping unusable items with a
/// warning. Order is preserved.
pub fn extract_companies(items: &[RawListing]) -> Vec<CompanyRecord> {
    let mut companies = Vec::new();
    for item in items {
        match CompanyRecord::from_listing(item) {
            Ok(record) => companies.push(record),
            Err(reason) => {
                let label = item
                    .company_name
                    .as_deref()
                    .or(item.title.as_deref())
                    .unwrap_or("unknown");
                log::warn(&format!("Skipping listing item '{label}': {reason}"));
            }
        }
    }
    log::info(&format!(
        "Extracted {} companies from {} listing items",
        companies.len(),
        items.len()
    ));
    companies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: Option<&str>, url: Option<&str>) -> RawListing {
        RawListing {
            company_name: name.map(String::from),
            company_url: url.map(String::from),
            ..RawListing::default()
        }
    }

    #[test]
    fn extract_keeps_valid_items_in_order() {
        let items = vec![
            item(Some("Acme"), Some("https://acme.com")),
            item(Some("Globex"), Some("https://globex.com")),
        ];
        let companies = extract_companies(&items);
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].name, "Acme");
        assert_eq!(companies[1].name, "Globex");
    }

    #[test]
    fn extract_drops_unusable_items() {
        let items = vec![
            item(None, Some("https://acme.com")),
            item(Some("NoSite"), None),
            item(Some("Schemeless"), Some("acme.com")),
            item(Some("Profile"), Some("https://linkedin.com/company/x")),
            item(Some("Valid"), Some("https://valid.example")),
        ];
        let companies = extract_companies(&items);
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, "Valid");
    }
}
