//! AI fallback client.
//!
//! Last-resort career page lookup through a paid language model call,
//! gated by a per-period call budget.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{AiConfig, RunStatistics};
use crate::utils::log;

/// Sentinel the model is instructed to answer when it has no URL.
const UNKNOWN_SENTINEL: &str = "UNKNOWN";

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// AI-powered career page discovery as last resort.
pub struct AiFallback {
    client: reqwest::Client,
    config: AiConfig,
    api_key: String,
    calls_this_period: u32,
}

impl AiFallback {
    pub fn new(client: reqwest::Client, config: AiConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
            calls_this_period: 0,
        }
    }

    /// Paid calls made so far this run.
    pub fn calls_this_period(&self) -> u32 {
        self.calls_this_period
    }

    /// Ask the model for the careers URL of the given site.
    ///
    /// Returns `None` when the budget is exhausted, no credential is
    /// configured, the model answers the unknown sentinel, or the call fails.
    /// None of these outcomes is an error for the caller.
    pub async fn find_career_page(
        &mut self,
        company_url: &str,
        stats: &mut RunStatistics,
    ) -> Option<String> {
        if self.calls_this_period >= self.config.max_calls_per_period {
            log::warn("AI call budget exhausted, skipping fallback");
            return None;
        }
        if self.api_key.trim().is_empty() {
            log::warn("No AI credential configured, skipping fallback");
            return None;
        }

        log::info(&format!("Tier 3: querying model for {company_url}"));

        let prompt = build_prompt(company_url);
        let outcome = self.request(&prompt).await;

        // Attempts count against the budget, not just parsable answers.
        self.calls_this_period += 1;
        stats.ai_calls_made += 1;

        match outcome {
            Ok(text) => parse_response(&text),
            Err(e) => {
                log::error(&format!("AI fallback call failed for {company_url}: {e}"));
                None
            }
        }
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ai(format!("API returned {status}: {detail}")));
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .unwrap_or_default())
    }
}

fn build_prompt(company_url: &str) -> String {
    format!(
        "What is the careers/jobs page URL for the company at {company_url}? \
         Return ONLY the full URL, nothing else. \
         If you don't know, return '{UNKNOWN_SENTINEL}'."
    )
}

/// Accept only answers that begin with a URL scheme; everything else,
/// including the unknown sentinel in any case, is a miss.
fn parse_response(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case(UNKNOWN_SENTINEL) || !trimmed.starts_with("http") {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunStatistics;

    #[test]
    fn parse_accepts_url_verbatim() {
        assert_eq!(
            parse_response("  https://acme.com/jobs \n"),
            Some("https://acme.com/jobs".to_string())
        );
    }

    #[test]
    fn parse_rejects_unknown_sentinel_any_case() {
        assert_eq!(parse_response("UNKNOWN"), None);
        assert_eq!(parse_response("unknown"), None);
        assert_eq!(parse_response("  Unknown  "), None);
    }

    #[test]
    fn parse_rejects_non_url_answers() {
        assert_eq!(parse_response("The careers page is at acme.com/jobs"), None);
        assert_eq!(parse_response(""), None);
    }

    #[tokio::test]
    async fn exhausted_budget_skips_without_network() {
        let config = AiConfig {
            max_calls_per_period: 0,
            ..AiConfig::default()
        };
        let client = reqwest::Client::new();
        let mut fallback = AiFallback::new(client, config, "test-key".to_string());
        let mut stats = RunStatistics::default();

        let result = fallback.find_career_page("https://acme.com", &mut stats).await;

        assert_eq!(result, None);
        assert_eq!(fallback.calls_this_period(), 0);
        assert_eq!(stats.ai_calls_made, 0);
    }

    #[tokio::test]
    async fn missing_credential_disables_fallback() {
        let client = reqwest::Client::new();
        let mut fallback = AiFallback::new(client, AiConfig::default(), String::new());
        let mut stats = RunStatistics::default();

        let result = fallback.find_career_page("https://acme.com", &mut stats).await;

        assert_eq!(result, None);
        assert_eq!(stats.ai_calls_made, 0);
    }

    #[test]
    fn prompt_names_the_company_url() {
        let prompt = build_prompt("https://acme.com");
        assert!(prompt.contains("https://acme.com"));
        assert!(prompt.contains(UNKNOWN_SENTINEL));
    }
}
