/// Fetch-scoped view of one RSS document. Never persisted as-is; items are
/// mapped into post records by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct FeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    /// Raw publish-date string as it appeared in the document.
    pub pub_date: String,
}

/// Per-feed ingestion outcome, for observability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub new: usize,
    pub duplicate: usize,
    pub failed: usize,
}
