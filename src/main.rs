use tracing::{info, warn};

use roster_scout::core::config;
use roster_scout::harvest::InmateHarvester;
use roster_scout::scraping::session::{PortalSession, SessionOptions};
use roster_scout::store::CsvStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cfg = config::load_scout_config();
    let output_dir = cfg.resolve_output_dir();
    info!("Starting roster-scout (output: {})", output_dir);

    let store = CsvStore::new(&output_dir)?;

    // Browser startup is the one unrecoverable failure: no browser, no run.
    let opts = SessionOptions {
        headless: cfg.resolve_headless(),
        element_timeout: cfg.resolve_element_timeout(),
    };
    let session = PortalSession::launch(&opts).await?;

    let harvester = InmateHarvester::new(session, store, &cfg);
    let result = harvester.run().await;

    // Session close is guaranteed before any error propagates.
    harvester.shutdown().await;

    let stats = result?;
    if stats.queries_failed > 0 {
        warn!(
            "{} of {} queries failed and were skipped",
            stats.queries_failed, stats.queries_run
        );
    }
    info!(
        "Harvest complete: {} inmates across {} queries, {} photos saved (started {})",
        stats.inmates_found, stats.queries_run, stats.photos_saved, stats.started_at
    );

    Ok(())
}
