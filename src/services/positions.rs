//! Position extraction service.
//!
//! Pulls the first plausible job-posting link out of a rendered career page
//! using an ordered list of CSS selectors.

use scraper::{Html, Selector};

use crate::models::ExtractionConfig;
use crate::services::RenderEngine;
use crate::utils::{log, resolve};

/// Extracts the first open-position URL from career pages.
pub struct PositionExtractor {
    engine: Box<dyn RenderEngine + Send>,
    config: ExtractionConfig,
}

impl PositionExtractor {
    pub fn new(engine: Box<dyn RenderEngine + Send>, config: ExtractionConfig) -> Self {
        Self { engine, config }
    }

    /// Extract the first available job posting URL, absolute.
    ///
    /// Any rendering failure is logged and treated as "no position found";
    /// one bad career page must not take the run down.
    pub async fn extract_first_position(&mut self, career_page_url: &str) -> Option<String> {
        log::info(&format!("Extracting position from {career_page_url}"));

        let html = match self.engine.render(career_page_url).await {
            Ok(html) => html,
            Err(e) => {
                log::error(&format!("Rendering failed for {career_page_url}: {e}"));
                return None;
            }
        };

        let document = Html::parse_document(&html);
        match find_first_position(&document, &self.config.job_selectors, career_page_url) {
            Some(url) => {
                log::info(&format!("Found position: {url}"));
                Some(url)
            }
            None => {
                log::warn(&format!("No job links found on {career_page_url}"));
                None
            }
        }
    }

    /// Release the render engine. The orchestrator calls this on every exit
    /// path; skipping it leaks the browser process.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.engine.close().await {
            log::warn(&format!("Browser shutdown failed: {e}"));
        }
    }
}

/// First usable href of the first selector that yields one.
///
/// Selectors are tried strictly in order and the search stops at the first
/// hit; `javascript:`, `mailto:` and fragment-only hrefs never qualify.
fn find_first_position(document: &Html, selectors: &[String], base_url: &str) -> Option<String> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !is_candidate_href(href) {
                continue;
            }
            let absolute = resolve(base_url, href).unwrap_or_else(|| href.to_string());
            return Some(absolute);
        }
    }
    None
}

fn is_candidate_href(href: &str) -> bool {
    !href.is_empty()
        && !href.starts_with("javascript:")
        && !href.starts_with("mailto:")
        && !href.starts_with('#')
}
