//! The live browser session the whole harvest runs through.
//!
//! `PortalSession` owns the `chromiumoxide::Browser`, its CDP event-handler
//! task, and the single primary `Page` every component drives in turn. The
//! session moves through three states — search form, results grid, detail
//! page — and every transition invalidates previously fetched element
//! handles, so callers re-locate elements after each navigation instead of
//! caching them.
//!
//! The only second context ever opened is the photo downloader's auxiliary
//! tab; it must be closed and the primary page re-activated before any other
//! component touches the session again.

use anyhow::{anyhow, Result};
use chromiumoxide::{Browser, Element, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::scraping::browser_manager;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("timed out after {timeout:?} waiting for element `{selector}`")]
    ElementTimeout { selector: String, timeout: Duration },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("results grid out of sync after history back: expected page {expected}")]
    GridDesync { expected: usize },
}

/// Launch-time knobs, resolved from `ScoutConfig`.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub headless: bool,
    pub element_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            element_timeout: Duration::from_secs(10),
        }
    }
}

pub struct PortalSession {
    browser: Browser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
    element_timeout: Duration,
}

impl PortalSession {
    /// Launch the browser and prepare the primary page with the network-layer
    /// stealth overrides. Failure here is fatal to the run — there is no
    /// retry, callers propagate it straight out of `main`.
    pub async fn launch(opts: &SessionOptions) -> Result<Self, SessionError> {
        let exe = browser_manager::find_chrome_executable().ok_or_else(|| {
            SessionError::LaunchFailed(
                "No browser found. Install Chrome or Chromium, or set CHROME_EXECUTABLE."
                    .to_string(),
            )
        })?;

        info!("🚀 Launching portal session ({})", exe);

        let config = browser_manager::build_browser_config(&exe, opts.headless, 1280, 900)
            .map_err(|e| SessionError::LaunchFailed(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::LaunchFailed(format!("{}: {}", exe, e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Navigation(format!("failed to open primary page: {}", e)))?;

        browser_manager::apply_network_overrides(&page)
            .await
            .map_err(|e| SessionError::LaunchFailed(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler_task,
            element_timeout: opts.element_timeout,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn element_timeout(&self) -> Duration {
        self.element_timeout
    }

    pub async fn goto(&self, url: &str) -> Result<(), SessionError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| SessionError::Navigation(format!("goto({}): {}", url, e)))?;
        Ok(())
    }

    /// Snapshot the current DOM as HTML. All data extraction parses snapshots;
    /// live handles are only used to click and type.
    pub async fn snapshot(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| anyhow!("failed to capture page content: {}", e))
    }

    /// Bounded poll for an element on the primary page.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, SessionError> {
        wait_for_element_on(&self.page, selector, timeout).await
    }

    /// Wait for a control with the session-default timeout, then click it.
    pub async fn click(&self, selector: &str) -> Result<(), SessionError> {
        let el = self.wait_for_element(selector, self.element_timeout).await?;
        el.click()
            .await
            .map_err(|e| SessionError::Navigation(format!("click({}): {}", selector, e)))?;
        Ok(())
    }

    /// Wait for a text input, reset any prefilled value, then type into it
    /// with trusted key events.
    pub async fn clear_and_type(&self, selector: &str, text: &str) -> Result<(), SessionError> {
        let el = self.wait_for_element(selector, self.element_timeout).await?;
        self.page
            .evaluate(format!(
                r#"document.querySelector("{}").value = ''"#,
                selector
            ))
            .await
            .map_err(|e| SessionError::Navigation(format!("clear({}): {}", selector, e)))?;
        el.click()
            .await
            .map_err(|e| SessionError::Navigation(format!("focus({}): {}", selector, e)))?;
        el.type_str(text)
            .await
            .map_err(|e| SessionError::Navigation(format!("type({}): {}", selector, e)))?;
        Ok(())
    }

    /// Find the first link under `scope_selector` whose trimmed text equals
    /// `text`. Pager links carry no stable ids, only their page-number label.
    pub async fn find_link_by_text(
        &self,
        scope_selector: &str,
        text: &str,
    ) -> Result<Option<Element>> {
        let links = self
            .page
            .find_elements(scope_selector)
            .await
            .unwrap_or_default();
        for link in links {
            let label = link.inner_text().await.ok().flatten().unwrap_or_default();
            if label.trim() == text {
                return Ok(Some(link));
            }
        }
        Ok(None)
    }

    /// `window.history.go(-1)` — the portal's detail pages have no reliable
    /// back control, so the exit transition rides browser history. Callers
    /// must verify the grid state afterwards.
    pub async fn history_back(&self) -> Result<(), SessionError> {
        self.page
            .evaluate("window.history.go(-1)")
            .await
            .map_err(|e| SessionError::Navigation(format!("history back: {}", e)))?;
        Ok(())
    }

    /// Open the auxiliary tab. Exactly one may exist at a time; the caller is
    /// responsible for closing it and calling `restore_primary`.
    pub async fn open_aux_tab(&self, url: &str) -> Result<Page, SessionError> {
        self.browser
            .new_page(url)
            .await
            .map_err(|e| SessionError::Navigation(format!("auxiliary tab open failed: {}", e)))
    }

    /// Re-focus the primary page after auxiliary-tab work. Element lookups
    /// issued against a non-active target resolve in the wrong context.
    pub async fn restore_primary(&self) {
        if let Err(e) = self.page.bring_to_front().await {
            warn!("Failed to re-focus primary page: {}", e);
        }
    }

    /// Number of open browsing contexts. The steady state is 1; the photo
    /// downloader briefly raises it to 2.
    pub async fn context_count(&self) -> usize {
        self.browser
            .pages()
            .await
            .map(|pages| pages.len())
            .unwrap_or(0)
    }

    /// Gracefully shut the browser down and reap the handler task.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close error (non-fatal): {}", e);
        }
        self.handler_task.abort();
        info!("🛑 Portal session closed");
    }
}

/// Bounded poll for an element on an arbitrary page (primary or auxiliary).
/// Exceeding the timeout yields a catchable error, never a stall.
pub async fn wait_for_element_on(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<Element, SessionError> {
    let start = Instant::now();
    loop {
        if let Ok(el) = page.find_element(selector).await {
            return Ok(el);
        }
        if start.elapsed() >= timeout {
            return Err(SessionError::ElementTimeout {
                selector: selector.to_string(),
                timeout,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
