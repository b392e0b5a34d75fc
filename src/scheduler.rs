//! Fetch scheduler: one feed per tick, ingested to completion before the
//! next tick fires. No overlapping fetches, no backoff, no jitter; the loop
//! runs until the process is interrupted.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::ingestion::{self, FetchFeed, IngestError, IngestReport};
use crate::store::Store;

/// Tick every `every`, starting one full interval from now.
pub async fn run<S, F>(store: &S, fetcher: &F, every: Duration) -> anyhow::Result<()>
where
    S: Store,
    F: FetchFeed,
{
    info!(interval = ?every, "aggregator started");
    let mut ticker = time::interval_at(Instant::now() + every, every);
    loop {
        ticker.tick().await;
        if let Err(err) = run_tick(store, fetcher).await {
            // Per-feed errors are contained inside the tick; anything that
            // reaches here is a store-level fault. Keep looping either way.
            error!(error = %err, "tick failed");
        }
    }
}

/// Select the least-recently-fetched feed and ingest it exactly once.
/// Returns `None` when there is nothing to do (no feeds, or the fetch
/// failed and the feed was left due for the next tick).
pub async fn run_tick<S, F>(store: &S, fetcher: &F) -> anyhow::Result<Option<IngestReport>>
where
    S: Store,
    F: FetchFeed,
{
    let Some(feed) = store.next_feed_to_fetch().await? else {
        debug!("no feeds registered, skipping tick");
        return Ok(None);
    };

    info!(name = %feed.name, url = %feed.url, "fetching feed");
    match ingestion::ingest_feed(store, fetcher, &feed).await {
        Ok(report) => {
            info!(
                name = %feed.name,
                new = report.new,
                duplicate = report.duplicate,
                failed = report.failed,
                "feed ingested"
            );
            Ok(Some(report))
        }
        Err(IngestError::Fetch(err)) => {
            warn!(url = %feed.url, error = %err, "fetch failed, feed stays due for next tick");
            Ok(None)
        }
        Err(IngestError::Store(err)) => Err(err.into()),
    }
}
