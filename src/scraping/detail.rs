//! Detail-page collection and the verified return transition.

use anyhow::Result;
use tracing::info;

use crate::core::types::InmateDetail;
use crate::scraping::grid::GRID_TABLE;
use crate::scraping::parse;
use crate::scraping::session::{PortalSession, SessionError};

/// The sub-table that signals the detail page has rendered.
const DETAIL_ANCHOR: &str = "table#GridView8";

/// Collect the full detail record for the inmate whose link was just clicked.
///
/// Waits for the anchor table, snapshots the page once, and parses every
/// section from that snapshot. Per-section failures surface as warnings on
/// the returned record; only a page that never renders is an error (which
/// aborts the surrounding query).
pub async fn collect_detail(session: &PortalSession, inmate_id: &str) -> Result<InmateDetail> {
    session
        .wait_for_element(DETAIL_ANCHOR, session.element_timeout())
        .await?;

    info!("Collecting detail record for inmate {}", inmate_id);
    let html = session.snapshot().await?;
    let detail = parse::parse_inmate_detail(&html);

    for warning in &detail.warnings {
        tracing::warn!("inmate {}: {}", inmate_id, warning);
    }

    Ok(detail)
}

/// Leave the detail page via browser history and verify the grid came back
/// on the page we left it at.
///
/// History navigation is the only exit the portal offers, but nothing
/// guarantees the grid's pagination state survives it. So the transition is
/// verified, not assumed: the grid table must reappear, and when a pager is
/// present its plain-text (non-link) cell must still carry `expected_page`.
/// A mismatch aborts the query instead of silently iterating rows of the
/// wrong page.
pub async fn return_to_grid(session: &PortalSession, expected_page: usize) -> Result<()> {
    session.history_back().await?;
    session
        .wait_for_element(GRID_TABLE, session.element_timeout())
        .await?;

    let html = session.snapshot().await?;
    let cells = parse::parse_pager_cells(&html);
    if !cells.is_empty() {
        let expected = expected_page.to_string();
        let on_expected = cells.iter().any(|c| !c.is_link && c.label == expected);
        if !on_expected {
            return Err(SessionError::GridDesync {
                expected: expected_page,
            }
            .into());
        }
    }
    Ok(())
}
