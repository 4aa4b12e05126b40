//! The harvest orchestrator: sweeps the (last name × first initial)
//! cross-product through the portal, one query at a time.
//!
//! Everything runs serially on the one browser session. A failed query is
//! logged and skipped — never retried — and the sweep moves on. Each row's
//! records are flushed to disk as soon as they are collected, so a crash
//! loses at most the inmate being processed.

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::core::config::ScoutConfig;
use crate::core::types::{
    CustodyStatus, Gender, GridRow, HarvestStats, InmateSummary, SearchQuery,
};
use crate::scraping::grid::{self, GRID_TABLE};
use crate::scraping::session::PortalSession;
use crate::scraping::{detail, parse, photo, search_form};
use crate::store::CsvStore;

/// How long to wait for the result grid before concluding a query returned
/// nothing. Shorter than the control timeout: an empty result set is a
/// normal outcome, not a slow page.
const GRID_WAIT: Duration = Duration::from_secs(5);

struct QueryOutcome {
    inmates: usize,
    photos: usize,
}

pub struct InmateHarvester {
    session: PortalSession,
    store: CsvStore,
    base_url: String,
    last_names: Vec<String>,
    first_initials: Vec<String>,
    gender: Gender,
    status: CustodyStatus,
    delay_range_ms: (u64, u64),
}

impl InmateHarvester {
    pub fn new(session: PortalSession, store: CsvStore, config: &ScoutConfig) -> Self {
        Self {
            session,
            store,
            base_url: config.resolve_base_url(),
            last_names: config.resolve_last_names(),
            first_initials: config.resolve_first_initials(),
            gender: config.resolve_gender(),
            status: config.resolve_status(),
            delay_range_ms: config.resolve_delay_range(),
        }
    }

    /// Run the full sweep. Individual query failures are absorbed here;
    /// only the session itself dying would surface as an error.
    pub async fn run(&self) -> Result<HarvestStats> {
        let mut stats = HarvestStats {
            started_at: Utc::now().to_rfc3339(),
            ..Default::default()
        };

        let total = self.last_names.len() * self.first_initials.len();
        info!(
            "Starting sweep: {} surnames × {} initials = {} queries",
            self.last_names.len(),
            self.first_initials.len(),
            total
        );

        for last_name in &self.last_names {
            for first_initial in &self.first_initials {
                let query = SearchQuery {
                    last_name: last_name.clone(),
                    first_initial: first_initial.clone(),
                    gender: self.gender,
                    status: self.status,
                };

                info!("Searching for {}, {}", query.last_name, query.first_initial);
                stats.queries_run += 1;

                match self.run_query(&query).await {
                    Ok(outcome) => {
                        stats.inmates_found += outcome.inmates;
                        stats.photos_saved += outcome.photos;
                    }
                    Err(e) => {
                        warn!(
                            "Error searching for {}, {}: {}",
                            query.last_name, query.first_initial, e
                        );
                        stats.queries_failed += 1;
                    }
                }

                self.throttle().await;
            }
        }

        Ok(stats)
    }

    /// One (last name, first initial) probe: submit the form, walk every
    /// grid page, visit every row's detail page, stream records to disk.
    async fn run_query(&self, query: &SearchQuery) -> Result<QueryOutcome> {
        search_form::submit_search(&self.session, &self.base_url, query).await?;

        let mut outcome = QueryOutcome {
            inmates: 0,
            photos: 0,
        };
        let mut current_page = 1usize;

        loop {
            // No grid within the short wait means an empty result set.
            if self
                .session
                .wait_for_element(GRID_TABLE, GRID_WAIT)
                .await
                .is_err()
            {
                info!(
                    "No results for {}, {}",
                    query.last_name, query.first_initial
                );
                break;
            }

            let html = self.session.snapshot().await?;
            let rows = parse::parse_grid_rows(&html);

            for (index, row) in rows.iter().enumerate() {
                let (summary, photo_saved) = self.process_row(index, row, current_page).await?;
                self.store
                    .append_summary(&summary)
                    .map_err(|e| anyhow!("summary write failed: {}", e))?;
                outcome.inmates += 1;
                if photo_saved {
                    outcome.photos += 1;
                }
                info!(
                    "Found inmate: {} {} (ID: {})",
                    summary.first_name_middle_initial, summary.last_name, summary.inmate_id
                );
            }

            // Pager state is re-read from a fresh snapshot; the row loop's
            // back-navigations have rebuilt the DOM since the last one.
            let html = self.session.snapshot().await?;
            let pager = parse::parse_pager_cells(&html);
            match grid::next_page_label(&pager, current_page) {
                Some(label) => {
                    grid::advance_to_page(&self.session, &label).await?;
                    current_page += 1;
                    if !grid::wait_for_page(&self.session, current_page, GRID_WAIT).await? {
                        warn!("Pager never reached page {}; stopping pagination", current_page);
                        break;
                    }
                }
                None => {
                    info!("No more pages to process. Total pages processed: {}", current_page);
                    break;
                }
            }
        }

        Ok(outcome)
    }

    /// Photo capture, detail visit, and verified return for one grid row.
    async fn process_row(
        &self,
        index: usize,
        row: &GridRow,
        current_page: usize,
    ) -> Result<(InmateSummary, bool)> {
        let mut photo_saved = false;
        let photo_filename = match &row.photo_url {
            Some(src) => match photo::absolute_photo_url(&self.base_url, src) {
                Some(url) => {
                    let target = self.store.photo_path(&row.inmate_id);
                    if photo::download_photo(&self.session, &url, &target).await {
                        photo_saved = true;
                        format!("{}.jpg", row.inmate_id)
                    } else {
                        "None".to_string()
                    }
                }
                None => {
                    warn!("Unresolvable photo src for inmate {}: {}", row.inmate_id, src);
                    "None".to_string()
                }
            },
            None => {
                info!("No inmate photo for inmate {}", row.inmate_id);
                "None".to_string()
            }
        };

        if row.has_detail_link {
            grid::open_row_detail(&self.session, index).await?;
            let detail = detail::collect_detail(&self.session, &row.inmate_id).await?;
            self.store
                .append_detail(&row.inmate_id, &detail)
                .map_err(|e| anyhow!("detail write failed: {}", e))?;
            detail::return_to_grid(&self.session, current_page).await?;
        } else {
            warn!(
                "Inmate {} has no detail link; summary only",
                row.inmate_id
            );
        }

        Ok((
            InmateSummary {
                inmate_id: row.inmate_id.clone(),
                last_name: row.last_name.clone(),
                first_name_middle_initial: row.first_name_middle_initial.clone(),
                admitted_date: row.admitted_date.clone(),
                photo_filename,
            },
            photo_saved,
        ))
    }

    /// Randomized pause between queries — the only rate limiting applied.
    async fn throttle(&self) {
        let (min, max) = self.delay_range_ms;
        if max == 0 {
            return;
        }
        let pause = {
            use rand::prelude::*;
            let mut rng = rand::rng();
            rng.random_range(min..=max)
        };
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }

    /// Close the browser session. Called from the entry point in every exit
    /// path, mirroring a scoped-cleanup block.
    pub async fn shutdown(self) {
        self.session.close().await;
    }
}
