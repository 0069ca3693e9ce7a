//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Career page discovery rules
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Position extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// AI fallback settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Upstream job-listing API settings
    #[serde(default)]
    pub listings: ListingsConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            crate::utils::log::warn(&format!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            ));
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.discovery.career_paths.is_empty() {
            return Err(AppError::validation("No career paths defined"));
        }
        if self.discovery.career_keywords.is_empty() {
            return Err(AppError::validation("No career keywords defined"));
        }
        if self.extraction.job_selectors.is_empty() {
            return Err(AppError::validation("No job selectors defined"));
        }
        if self.extraction.page_load_timeout_ms == 0 {
            return Err(AppError::validation(
                "extraction.page_load_timeout_ms must be > 0",
            ));
        }
        if self.ai.max_tokens == 0 {
            return Err(AppError::validation("ai.max_tokens must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Career page discovery rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Path suffixes probed against the company base URL, in order
    #[serde(default = "defaults::career_paths")]
    pub career_paths: Vec<String>,

    /// Keywords matched (lowercase substring) against link text and hrefs
    #[serde(default = "defaults::career_keywords")]
    pub career_keywords: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            career_paths: defaults::career_paths(),
            career_keywords: defaults::career_keywords(),
        }
    }
}

/// Position extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// CSS selectors tried in order against the rendered career page
    #[serde(default = "defaults::job_selectors")]
    pub job_selectors: Vec<String>,

    /// Page load timeout in milliseconds
    #[serde(default = "defaults::page_load_timeout")]
    pub page_load_timeout_ms: u64,

    /// Best-effort wait for late-loading content, ignored on timeout
    #[serde(default = "defaults::network_idle_timeout")]
    pub network_idle_timeout_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            job_selectors: defaults::job_selectors(),
            page_load_timeout_ms: defaults::page_load_timeout(),
            network_idle_timeout_ms: defaults::network_idle_timeout(),
        }
    }
}

/// AI fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API base URL
    #[serde(default = "defaults::ai_api_base")]
    pub api_base: String,

    /// Model identifier
    #[serde(default = "defaults::ai_model")]
    pub model: String,

    /// Output token ceiling per request
    #[serde(default = "defaults::ai_max_tokens")]
    pub max_tokens: u32,

    /// Maximum paid calls per accounting period
    #[serde(default = "defaults::ai_max_calls")]
    pub max_calls_per_period: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::ai_api_base(),
            model: defaults::ai_model(),
            max_tokens: defaults::ai_max_tokens(),
            max_calls_per_period: defaults::ai_max_calls(),
        }
    }
}

/// Upstream job-listing API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsConfig {
    /// API base URL
    #[serde(default = "defaults::listings_api_base")]
    pub api_base: String,

    /// Scraper actor identifier
    #[serde(default = "defaults::listings_actor_id")]
    pub actor_id: String,

    /// Timeout for the synchronous actor run, in seconds
    #[serde(default = "defaults::listings_timeout")]
    pub timeout_secs: u64,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::listings_api_base(),
            actor_id: defaults::listings_actor_id(),
            timeout_secs: defaults::listings_timeout(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for the JSON report and the persisted log
    #[serde(default = "defaults::output_dir")]
    pub dir: String,

    /// Log filename within the output directory
    #[serde(default = "defaults::log_file")]
    pub log_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            log_file: defaults::log_file(),
        }
    }
}

/// API credentials, read from the environment only.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Token for the upstream listing API; required for any run
    pub listing_api_token: String,

    /// AI model credential; absence disables the AI fallback tier
    pub ai_api_key: String,
}

impl Credentials {
    /// Read credentials from environment variables.
    pub fn from_env() -> Self {
        Self {
            listing_api_token: std::env::var("APIFY_TOKEN").unwrap_or_default(),
            ai_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
        }
    }

    pub fn has_ai_key(&self) -> bool {
        !self.ai_api_key.trim().is_empty()
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        5
    }

    // Discovery defaults
    pub fn career_paths() -> Vec<String> {
        [
            "/careers",
            "/jobs",
            "/about/careers",
            "/about/jobs",
            "/join-us",
            "/work-with-us",
            "/career",
            "/job-openings",
            "/open-positions",
            "/opportunities",
            "/en/careers",
            "/us/careers",
            "/company/careers",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn career_keywords() -> Vec<String> {
        [
            "careers",
            "jobs",
            "join us",
            "opportunities",
            "work with us",
            "open positions",
            "job openings",
            "we're hiring",
            "hiring",
            "come work",
            "employment",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Extraction defaults
    pub fn job_selectors() -> Vec<String> {
        [
            r#"a[href*="job"]"#,
            r#"a[href*="position"]"#,
            r#"a[href*="opening"]"#,
            r#"a[href*="posting"]"#,
            r#"a[href*="apply"]"#,
            r#"a[href*="career"]"#,
            ".job-listing a",
            ".job-card a",
            ".careers-list a",
            ".opening a",
            r#"[class*="job"] a"#,
            r#"[class*="position"] a"#,
            r#"[class*="career"] a"#,
            "[data-job] a",
            r#"a[class*="job"]"#,
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn page_load_timeout() -> u64 {
        15_000
    }
    pub fn network_idle_timeout() -> u64 {
        5_000
    }

    // AI defaults
    pub fn ai_api_base() -> String {
        "https://api.anthropic.com".into()
    }
    pub fn ai_model() -> String {
        "claude-sonnet-4-5-20250929".into()
    }
    pub fn ai_max_tokens() -> u32 {
        256
    }
    pub fn ai_max_calls() -> u32 {
        50
    }

    // Listings defaults
    pub fn listings_api_base() -> String {
        "https://api.apify.com/v2".into()
    }
    pub fn listings_actor_id() -> String {
        "hMvNSpz3JnHgl5jkh".into()
    }
    pub fn listings_timeout() -> u64 {
        120
    }

    // Output defaults
    pub fn output_dir() -> String {
        "./output".into()
    }
    pub fn log_file() -> String {
        "pipeline.log".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_keywords() {
        let mut config = Config::default();
        config.discovery.career_keywords.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_selectors() {
        let mut config = Config::default();
        config.extraction.job_selectors.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.http.timeout_secs, 5);
        assert!(config.discovery.career_paths.contains(&"/careers".to_string()));
    }

    #[test]
    fn default_paths_start_with_slash() {
        let config = Config::default();
        assert!(config.discovery.career_paths.iter().all(|p| p.starts_with('/')));
    }
}
