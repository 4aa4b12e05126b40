//! Result-grid pagination.
//!
//! The grid is live page state: walking it is finite and not restartable.
//! The advance/stop decision is pure (`next_page_label`) so it can be tested
//! against synthetic pager rows; the click that acts on the decision
//! re-locates the pager link from the DOM every time, because the postback
//! that renders each page invalidates all prior element handles.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::core::types::PagerCell;
use crate::scraping::parse;
use crate::scraping::session::PortalSession;

pub const GRID_TABLE: &str = "table#gvInmate";
pub const GRID_ROWS: &str = "table#gvInmate tr.GridViewRow";
pub const PAGER_LINKS: &str = "table#gvInmate td[colspan='6'] a";

/// Decide whether another page follows `current_page` (1-based).
///
/// The pager renders sequential numeric labels starting at 1 with no gaps;
/// the cell at the current page's position must carry the current page's
/// number, and a further cell must exist. Anything else — broken sequence,
/// exhausted labels, or no pager at all — means stop.
pub fn next_page_label(cells: &[PagerCell], current_page: usize) -> Option<String> {
    let idx = current_page.checked_sub(1)?;
    let expected = current_page.to_string();
    if cells.get(idx).map(|c| c.label.as_str()) != Some(expected.as_str()) {
        return None;
    }
    if idx + 1 >= cells.len() {
        return None;
    }
    Some((current_page + 1).to_string())
}

/// Click the `index`-th row's detail link. The row list is re-fetched from
/// the live DOM here, never carried over from a previous lookup.
pub async fn open_row_detail(session: &PortalSession, index: usize) -> Result<()> {
    let rows = session
        .page()
        .find_elements(GRID_ROWS)
        .await
        .map_err(|e| anyhow!("grid rows lookup failed: {}", e))?;
    let row = rows
        .get(index)
        .ok_or_else(|| anyhow!("grid row {} vanished after relocation", index))?;
    let link = row
        .find_element("a")
        .await
        .map_err(|e| anyhow!("row {} has no detail link: {}", index, e))?;
    link.click()
        .await
        .map_err(|e| anyhow!("detail link click failed: {}", e))?;
    Ok(())
}

/// Click the pager link carrying `label`, triggering the postback that
/// renders the next page.
pub async fn advance_to_page(session: &PortalSession, label: &str) -> Result<()> {
    match session.find_link_by_text(PAGER_LINKS, label).await? {
        Some(link) => {
            link.click()
                .await
                .map_err(|e| anyhow!("pager link '{}' click failed: {}", label, e))?;
            Ok(())
        }
        None => Err(anyhow!("pager link '{}' not found", label)),
    }
}

/// Poll snapshots until the pager's plain-text cell carries `expected_page`.
///
/// The postback replaces the grid in place, so the old page's markup stays
/// visible for a moment after the click; reading rows before the marker
/// moves would re-process the page just finished. Returns `false` when the
/// marker never moves within `timeout`.
pub async fn wait_for_page(
    session: &PortalSession,
    expected_page: usize,
    timeout: Duration,
) -> Result<bool> {
    let started = Instant::now();
    let expected = expected_page.to_string();
    loop {
        let html = session.snapshot().await?;
        let cells = parse::parse_pager_cells(&html);
        if cells.iter().any(|c| !c.is_link && c.label == expected) {
            return Ok(true);
        }
        if started.elapsed() >= timeout {
            return Ok(false);
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager(labels: &[(&str, bool)]) -> Vec<PagerCell> {
        labels
            .iter()
            .map(|(label, is_link)| PagerCell {
                label: label.to_string(),
                is_link: *is_link,
            })
            .collect()
    }

    #[test]
    fn sequential_labels_visit_exactly_n_pages() {
        let cells = pager(&[("1", false), ("2", true), ("3", true)]);
        let mut current = 1;
        let mut visited = 1;
        while let Some(label) = next_page_label(&cells, current) {
            assert_eq!(label, (current + 1).to_string());
            current += 1;
            visited += 1;
        }
        assert_eq!(visited, 3);
    }

    #[test]
    fn absent_pager_stops_after_the_first_page() {
        assert_eq!(next_page_label(&[], 1), None);
    }

    #[test]
    fn broken_label_sequence_halts() {
        let cells = pager(&[("1", false), ("...", true), ("7", true)]);
        assert_eq!(next_page_label(&cells, 1), Some("2".to_string()));
        // position 2 carries "..." instead of "2" — stop rather than guess
        assert_eq!(next_page_label(&cells, 2), None);
    }

    #[test]
    fn last_cell_never_advances() {
        let cells = pager(&[("1", true), ("2", false)]);
        assert_eq!(next_page_label(&cells, 2), None);
    }

    #[test]
    fn page_zero_is_rejected() {
        let cells = pager(&[("1", false)]);
        assert_eq!(next_page_label(&cells, 0), None);
    }
}
