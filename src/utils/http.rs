// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
///
/// Redirects are followed with reqwest's default policy, which is what the
/// direct-path probes rely on to land on the final career page URL.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Lightweight existence probe: HEAD request, redirects followed.
///
/// Returns the response so the caller can inspect both the status and the
/// final resolved URL.
pub async fn probe(client: &reqwest::Client, url: &str) -> Result<reqwest::Response> {
    let response = client.head(url).send().await?;
    Ok(response)
}

/// Fetch a page and parse it as HTML.
///
/// A non-success status is an error here; callers that treat it as an
/// expected miss convert it to `None` at their own scope.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<Html> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::fetch(format!("{url} returned {status}")));
    }
    let text = response.text().await?;
    Ok(Html::parse_document(&text))
}
