//! Mugshot capture through an auxiliary browser tab.
//!
//! The portal serves photos behind an image endpoint with no stable
//! content-type or direct byte access, so the capture renders the URL in a
//! tab and screenshots the `img` element instead of fetching bytes. The tab
//! is closed and the primary page re-activated on every path out of here —
//! a leaked tab changes the active target and corrupts every element lookup
//! that follows.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use tracing::{info, warn};
use url::Url;

use crate::scraping::session::{wait_for_element_on, PortalSession};

const IMAGE_WAIT: Duration = Duration::from_secs(5);

/// Resolve a grid photo `src` against the portal base. The grid emits
/// relative paths; an already-absolute URL passes through unchanged.
pub fn absolute_photo_url(base_url: &str, src: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()?
        .join(src)
        .ok()
        .map(|u| u.to_string())
}

/// Capture the photo at `photo_url` into `target`. Returns `true` on
/// success; failures are logged and swallowed — a missing mugshot never
/// stops the harvest.
pub async fn download_photo(session: &PortalSession, photo_url: &str, target: &Path) -> bool {
    let tab = match session.open_aux_tab("about:blank").await {
        Ok(tab) => tab,
        Err(e) => {
            warn!("Photo tab open failed for {}: {}", photo_url, e);
            session.restore_primary().await;
            return false;
        }
    };

    let outcome: Result<()> = async {
        tab.goto(photo_url)
            .await
            .map_err(|e| anyhow!("photo navigation failed: {}", e))?;
        let img = wait_for_element_on(&tab, "img", IMAGE_WAIT).await?;
        img.save_screenshot(CaptureScreenshotFormat::Jpeg, target)
            .await
            .map_err(|e| anyhow!("photo capture failed: {}", e))?;
        Ok(())
    }
    .await;

    // Tab cleanup and focus restore happen on success and failure alike.
    if let Err(e) = tab.close().await {
        warn!("Photo tab close error (non-fatal): {}", e);
    }
    session.restore_primary().await;

    match outcome {
        Ok(()) => {
            info!("📷 Saved photo {}", target.display());
            true
        }
        Err(e) => {
            warn!("Photo download failed ({}): {}", photo_url, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_src_joins_against_the_base() {
        assert_eq!(
            absolute_photo_url("https://portal.example.gov/", "Photos/100001.jpg").as_deref(),
            Some("https://portal.example.gov/Photos/100001.jpg")
        );
    }

    #[test]
    fn absolute_src_passes_through() {
        assert_eq!(
            absolute_photo_url(
                "https://portal.example.gov/",
                "https://cdn.example.gov/p/1.jpg"
            )
            .as_deref(),
            Some("https://cdn.example.gov/p/1.jpg")
        );
    }

    #[test]
    fn garbage_base_yields_none() {
        assert!(absolute_photo_url("not a url", "Photos/1.jpg").is_none());
    }
}
