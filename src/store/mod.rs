use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub mod pg;
pub mod types;

#[cfg(test)]
pub mod mem;

pub use types::{Feed, Follow, NewPost, Post, User};

/// Name of the unique constraint protecting post URLs. A `Conflict` carrying
/// this constraint is the steady-state "already ingested" signal.
pub const POSTS_URL_CONSTRAINT: &str = "posts_url_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("uniqueness violation on {constraint}")]
    Conflict { constraint: String },
    #[error("store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn is_post_url_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { constraint } if constraint == POSTS_URL_CONSTRAINT)
    }
}

/// Durable feed/user/post/follow persistence. Each operation is atomic from
/// the caller's perspective; the pipeline holds no cross-call locks.
pub trait Store {
    async fn get_user(&self, name: &str) -> Result<User, StoreError>;
    async fn create_user(&self, name: &str) -> Result<User, StoreError>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn reset_users(&self) -> Result<(), StoreError>;

    async fn create_feed(&self, name: &str, url: &str, user_id: Uuid) -> Result<Feed, StoreError>;
    async fn list_feeds(&self) -> Result<Vec<Feed>, StoreError>;
    async fn feed_id_by_url(&self, url: &str) -> Result<Uuid, StoreError>;
    /// Oldest `last_fetched_at` first, nulls before everything.
    async fn next_feed_to_fetch(&self) -> Result<Option<Feed>, StoreError>;
    async fn mark_feed_fetched(&self, id: Uuid, fetched_at: DateTime<Utc>)
    -> Result<(), StoreError>;

    async fn create_feed_follow(&self, user_id: Uuid, feed_id: Uuid)
    -> Result<Follow, StoreError>;
    async fn follows_for_user(&self, user_id: Uuid) -> Result<Vec<Follow>, StoreError>;
    async fn delete_follow(&self, user_id: Uuid, feed_id: Uuid) -> Result<(), StoreError>;

    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError>;
}
