//! Career page discovery engine.
//!
//! Finds a company's careers page with a tiered strategy, cheapest first:
//! direct-path probing, then homepage link scraping, then an AI-assisted
//! lookup. The first tier to succeed wins and no further tier is attempted.

use scraper::{Html, Selector};
use url::Url;

use crate::models::{CareerPage, DiscoveryConfig, RunStatistics, Tier};
use crate::services::AiFallback;
use crate::utils::{http, is_structurally_valid, log, normalize, resolve};

/// Service for discovering career pages on company websites.
pub struct CareerPageFinder {
    client: reqwest::Client,
    config: DiscoveryConfig,
    ai: Option<AiFallback>,
}

impl CareerPageFinder {
    /// Create a new finder. Passing `None` for the AI fallback disables
    /// tier 3 entirely.
    pub fn new(client: reqwest::Client, config: DiscoveryConfig, ai: Option<AiFallback>) -> Self {
        Self { client, config, ai }
    }

    /// Run the tiered strategy for one company.
    ///
    /// Returns the career page URL together with the tier that found it, or
    /// `None` when every tier came up empty. Tier misses are expected
    /// outcomes, never errors.
    pub async fn discover(
        &mut self,
        company_url: &Url,
        stats: &mut RunStatistics,
    ) -> Option<CareerPage> {
        let base = normalize(company_url);
        log::info(&format!("Finding career page for {base}"));

        if let Some(url) = self.probe_direct_paths(&base).await {
            log::info(&format!("Tier 1 success: {url}"));
            return Some(CareerPage {
                url,
                tier: Tier::DirectPath,
            });
        }

        if let Some(url) = self.scrape_homepage(&base).await {
            log::info(&format!("Tier 2 success: {url}"));
            return Some(CareerPage {
                url,
                tier: Tier::HomepageScrape,
            });
        }

        if let Some(ai) = self.ai.as_mut() {
            if let Some(url) = ai.find_career_page(&base, stats).await {
                log::info(&format!("Tier 3 success: {url}"));
                return Some(CareerPage {
                    url,
                    tier: Tier::AiFallback,
                });
            }
        }

        log::warn(&format!("No career page found for {base}"));
        None
    }

    /// Tier 1: probe common career path suffixes in configured order.
    ///
    /// A probe counts as a hit only when it resolves with a success status
    /// AND the final URL still looks career-related, which guards against
    /// sites that redirect unknown paths back to the homepage.
    async fn probe_direct_paths(&self, base: &str) -> Option<String> {
        for path in &self.config.career_paths {
            let candidate = format!("{}{}", base.trim_end_matches('/'), path);
            match http::probe(&self.client, &candidate).await {
                Ok(response) if response.status().is_success() => {
                    let final_url = response.url().to_string();
                    if matches_career_keyword(&final_url, "", &self.config.career_keywords) {
                        return Some(final_url);
                    }
                }
                Ok(_) => {}
                // Network error on one path: skip to the next silently.
                Err(_) => continue,
            }
        }
        None
    }

    /// Tier 2: fetch the homepage once and scan it for a career link.
    async fn scrape_homepage(&self, base: &str) -> Option<String> {
        let document = match http::fetch_document(&self.client, base).await {
            Ok(document) => document,
            Err(e) => {
                log::error(&format!("Homepage scrape failed for {base}: {e}"));
                return None;
            }
        };
        find_career_link(&document, base, &self.config.career_keywords)
    }
}

/// Scan a homepage document for the first plausible career link.
///
/// Header/footer/nav containers are checked first since that is where career
/// links usually live; only if none matches is the whole page scanned.
fn find_career_link(document: &Html, base_url: &str, keywords: &[String]) -> Option<String> {
    if let Some(href) = scan_containers(document, keywords) {
        return resolve(base_url, &href);
    }
    scan_all_anchors(document, base_url, keywords)
}

fn scan_containers(document: &Html, keywords: &[String]) -> Option<String> {
    let container_sel = Selector::parse("header, nav, footer").ok()?;
    let anchor_sel = Selector::parse("a[href]").ok()?;

    for container in document.select(&container_sel) {
        for anchor in container.select(&anchor_sel) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let text: String = anchor.text().collect();
            if matches_career_keyword(href, &text, keywords) {
                return Some(href.to_string());
            }
        }
    }
    None
}

fn scan_all_anchors(document: &Html, base_url: &str, keywords: &[String]) -> Option<String> {
    let anchor_sel = Selector::parse("a[href]").ok()?;

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text: String = anchor.text().collect();
        if !matches_career_keyword(href, &text, keywords) {
            continue;
        }
        if let Some(absolute) = resolve(base_url, href) {
            if is_structurally_valid(&absolute) {
                return Some(absolute);
            }
        }
    }
    None
}

/// Case-insensitive substring test against link text and href combined.
fn matches_career_keyword(href: &str, text: &str, keywords: &[String]) -> bool {
    let combined = format!("{} {}", text.to_lowercase(), href.to_lowercase());
    keywords.iter().any(|k| combined.contains(&k.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscoveryConfig;

    fn keywords() -> Vec<String> {
        DiscoveryConfig::default().career_keywords
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        assert!(matches_career_keyword(
            "/team",
            "Join Our Team — Careers!",
            &keywords()
        ));
        assert!(matches_career_keyword("/careers", "", &keywords()));
        assert!(matches_career_keyword("", "WE'RE HIRING", &keywords()));
        assert!(!matches_career_keyword("/about", "About us", &keywords()));
    }

    #[test]
    fn final_url_keyword_guard() {
        // The tier 1 hit condition applies the keyword test to the resolved
        // URL alone; a redirect back to the homepage must not count.
        assert!(matches_career_keyword(
            "https://acme.com/careers",
            "",
            &keywords()
        ));
        assert!(!matches_career_keyword("https://acme.com/", "", &keywords()));
    }

    #[test]
    fn container_links_win_over_earlier_body_links() {
        let html = r#"
            <html><body>
                <a href="/press">Careers in journalism article</a>
                <footer><a href="/careers">Careers</a></footer>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let found = find_career_link(&document, "https://acme.com", &keywords());
        assert_eq!(found, Some("https://acme.com/careers".to_string()));
    }

    #[test]
    fn falls_back_to_page_wide_scan() {
        let html = r#"
            <html><body>
                <nav><a href="/products">Products</a></nav>
                <div><a href="/join-us">Join us</a></div>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let found = find_career_link(&document, "https://acme.com", &keywords());
        assert_eq!(found, Some("https://acme.com/join-us".to_string()));
    }

    #[test]
    fn footer_career_link_resolves_absolute() {
        let html = r#"<html><body><footer><a href="/careers">Careers</a></footer></body></html>"#;
        let document = Html::parse_document(html);
        let found = find_career_link(&document, "https://acme.com", &keywords());
        assert_eq!(found, Some("https://acme.com/careers".to_string()));
    }

    #[test]
    fn no_keyword_match_anywhere_is_a_miss() {
        let html = r#"
            <html><body>
                <nav><a href="/about">About</a></nav>
                <a href="/contact">Contact</a>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(find_career_link(&document, "https://acme.com", &keywords()), None);
    }

    #[test]
    fn page_wide_scan_requires_structurally_valid_resolution() {
        // The keyword matches but the href cannot be resolved into an
        // http(s) URL, so the scan keeps looking and finds the later link.
        let html = r#"
            <html><body>
                <a href="mailto:jobs@acme.com">jobs inbox</a>
                <a href="/jobs">Jobs</a>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let found = find_career_link(&document, "https://acme.com", &keywords());
        assert_eq!(found, Some("https://acme.com/jobs".to_string()));
    }
}
