//! Ingestion pipeline: fetch one feed, mark it fetched, persist its items.
//!
//! Failure containment is the point here. A transport or decode failure
//! aborts the whole feed for this tick and leaves `last_fetched_at`
//! untouched, so the feed stays due. Once the document is in hand the feed
//! is marked fetched before item processing, so a partially-ingested feed
//! still advances the recency ordering. Per-item failures never abort the
//! batch, and duplicates are expected steady state, not errors.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::store::{Feed, NewPost, Store, StoreError};

pub mod fetch;
pub mod parse;
pub mod pubdate;
pub mod types;

pub use fetch::{FeedFetcher, FetchError, FetchFeed};
pub use types::{FeedDocument, IngestReport};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Failure outside the per-item loop (marking the feed fetched).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub async fn ingest_feed<S, F>(
    store: &S,
    fetcher: &F,
    feed: &Feed,
) -> Result<IngestReport, IngestError>
where
    S: Store,
    F: FetchFeed,
{
    let doc = fetcher.fetch(&feed.url).await?;
    Ok(ingest_document(store, feed, &doc).await?)
}

pub async fn ingest_document<S: Store>(
    store: &S,
    feed: &Feed,
    doc: &FeedDocument,
) -> Result<IngestReport, StoreError> {
    store.mark_feed_fetched(feed.id, Utc::now()).await?;

    let mut report = IngestReport::default();
    for item in &doc.items {
        let Some(link) = item.link.as_deref() else {
            warn!(feed = %feed.name, title = %item.title, "item has no link, skipping");
            report.failed += 1;
            continue;
        };

        let (published_at, exact) = pubdate::normalize(&item.pub_date);
        if !exact {
            debug!(url = %link, raw = %item.pub_date, "unrecognized pubDate, using current time");
        }

        let post = NewPost {
            title: item.title.clone(),
            url: link.to_string(),
            description: item.description.clone(),
            published_at: Some(published_at),
            feed_id: feed.id,
        };
        match store.create_post(post).await {
            Ok(post) => {
                report.new += 1;
                info!(title = %post.title, url = %post.url, "added post");
            }
            Err(err) if err.is_post_url_conflict() => {
                report.duplicate += 1;
                debug!(url = %link, "post already recorded in a previous fetch");
            }
            Err(err) => {
                report.failed += 1;
                error!(url = %link, error = %err, "post insert failed");
            }
        }
    }
    Ok(report)
}
