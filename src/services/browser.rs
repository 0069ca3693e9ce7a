//! Render engine for JS-heavy career pages.
//!
//! Career pages frequently build their job lists client-side, so position
//! extraction works against browser-rendered markup rather than the raw
//! HTTP response. The engine is a seam: the pipeline only needs "render this
//! URL to HTML", and tests substitute a static implementation.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::error::{AppError, Result};
use crate::models::ExtractionConfig;
use crate::utils::log;

/// Browser-automation capability: render a URL, hand back the markup.
#[async_trait]
pub trait RenderEngine {
    /// Render the URL and return the resulting HTML.
    async fn render(&mut self, url: &str) -> Result<String>;

    /// Release the underlying browser resources.
    async fn close(&mut self) -> Result<()>;
}

/// Chromium-backed render engine.
///
/// The browser process is launched lazily on first use and reused for every
/// page in the run. `close` must be called on all pipeline exit paths; the
/// page/browser/handler teardown cannot run in `Drop` because it is async.
pub struct ChromiumRenderer {
    user_agent: String,
    page_load_timeout: Duration,
    idle_timeout: Duration,
    browser: Option<(Browser, JoinHandle<()>)>,
}

impl ChromiumRenderer {
    pub fn new(config: &ExtractionConfig, user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            page_load_timeout: Duration::from_millis(config.page_load_timeout_ms),
            idle_timeout: Duration::from_millis(config.network_idle_timeout_ms),
            browser: None,
        }
    }

    async fn ensure_browser(&mut self) -> Result<()> {
        if self.browser.is_some() {
            return Ok(());
        }

        let browser_config = BrowserConfig::builder()
            .build()
            .map_err(AppError::browser)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(AppError::browser)?;

        // The handler stream must be driven for the browser connection to
        // make progress.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        log::debug("Browser launched");
        self.browser = Some((browser, handle));
        Ok(())
    }
}

#[async_trait]
impl RenderEngine for ChromiumRenderer {
    async fn render(&mut self, url: &str) -> Result<String> {
        self.ensure_browser().await?;
        let Some((browser, _)) = self.browser.as_ref() else {
            return Err(AppError::browser("browser not initialized"));
        };

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(AppError::browser)?;
        if let Err(e) = page.set_user_agent(self.user_agent.as_str()).await {
            log::debug(&format!("Could not set user agent: {e}"));
        }

        match timeout(self.page_load_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                let _ = page.close().await;
                return Err(AppError::browser(format!("navigation failed for {url}: {e}")));
            }
            Err(_) => {
                let _ = page.close().await;
                return Err(AppError::browser(format!(
                    "page load timed out after {:?} for {url}",
                    self.page_load_timeout
                )));
            }
        }

        // Best-effort wait for late-loading content. Timeout is a proceed
        // signal here, not an error.
        match timeout(self.idle_timeout, page.wait_for_navigation()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => log::debug(&format!("Post-load wait failed for {url}: {e}")),
            Err(_) => log::debug(&format!("Post-load wait timed out for {url}, proceeding")),
        }

        let content = page.content().await.map_err(AppError::browser);
        let _ = page.close().await;
        content
    }

    async fn close(&mut self) -> Result<()> {
        if let Some((mut browser, handle)) = self.browser.take() {
            let outcome = browser.close().await;
            let _ = browser.wait().await;
            handle.abort();
            outcome.map_err(AppError::browser)?;
            log::debug("Browser released");
        }
        Ok(())
    }
}
