use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;

use super::parse;
use super::types::FeedDocument;

/// Client identifier sent with every fetch.
pub const USER_AGENT: &str = "heron";

/// Fixed total timeout for one fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connect or timeout failure; no body was retrievable.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The body came back but was not parseable RSS.
    #[error("decode error: {0}")]
    Decode(#[from] rss::Error),
}

/// Seam between the pipeline and the network, stubbed out in tests.
pub trait FetchFeed {
    async fn fetch(&self, url: &str) -> Result<FeedDocument, FetchError>;
}

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_body(&self, url: &str) -> Result<Bytes, FetchError> {
        // No status check: a 4xx/5xx body is still handed to the parser,
        // where failure surfaces as a decode error rather than transport.
        let bytes = self.client.get(url).send().await?.bytes().await?;
        Ok(bytes)
    }
}

impl FetchFeed for FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<FeedDocument, FetchError> {
        let body = self.fetch_body(url).await?;
        Ok(parse::parse_document(&body)?)
    }
}
