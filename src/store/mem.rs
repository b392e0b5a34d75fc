//! In-memory store used by tests. Mirrors the Postgres semantics the
//! pipeline relies on: name/url uniqueness, cascade on reset, cold-first
//! fetch ordering.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Feed, Follow, NewPost, Post, Store, StoreError, User};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    feeds: Vec<Feed>,
    follows: Vec<Follow>,
    posts: Vec<Post>,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_count(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.inner.lock().unwrap().posts.clone()
    }
}

fn conflict(constraint: &str) -> StoreError {
    StoreError::Conflict {
        constraint: constraint.to_string(),
    }
}

impl Store for MemStore {
    async fn get_user(&self, name: &str) -> Result<User, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.name == name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.name == name) {
            return Err(conflict("users_name_key"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: name.to_string(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.inner.lock().unwrap().users.clone();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn reset_users(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.users.clear();
        inner.feeds.clear();
        inner.follows.clear();
        inner.posts.clear();
        Ok(())
    }

    async fn create_feed(&self, name: &str, url: &str, user_id: Uuid) -> Result<Feed, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.feeds.iter().any(|f| f.url == url) {
            return Err(conflict("feeds_url_key"));
        }
        if !inner.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::NotFound);
        }
        let now = Utc::now();
        let feed = Feed {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: name.to_string(),
            url: url.to_string(),
            user_id,
            last_fetched_at: None,
        };
        inner.feeds.push(feed.clone());
        Ok(feed)
    }

    async fn list_feeds(&self) -> Result<Vec<Feed>, StoreError> {
        Ok(self.inner.lock().unwrap().feeds.clone())
    }

    async fn feed_id_by_url(&self, url: &str) -> Result<Uuid, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .feeds
            .iter()
            .find(|f| f.url == url)
            .map(|f| f.id)
            .ok_or(StoreError::NotFound)
    }

    async fn next_feed_to_fetch(&self) -> Result<Option<Feed>, StoreError> {
        let inner = self.inner.lock().unwrap();
        // Option ordering puts never-fetched feeds first, then oldest.
        Ok(inner
            .feeds
            .iter()
            .min_by_key(|f| f.last_fetched_at)
            .cloned())
    }

    async fn mark_feed_fetched(
        &self,
        id: Uuid,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let feed = inner
            .feeds
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(StoreError::NotFound)?;
        feed.last_fetched_at = Some(fetched_at);
        feed.updated_at = fetched_at;
        Ok(())
    }

    async fn create_feed_follow(
        &self,
        user_id: Uuid,
        feed_id: Uuid,
    ) -> Result<Follow, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.feed_id == feed_id)
        {
            return Err(conflict("feed_follows_user_id_feed_id_key"));
        }
        let user_name = inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.name.clone())
            .ok_or(StoreError::NotFound)?;
        let feed_name = inner
            .feeds
            .iter()
            .find(|f| f.id == feed_id)
            .map(|f| f.name.clone())
            .ok_or(StoreError::NotFound)?;
        let now = Utc::now();
        let follow = Follow {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            user_id,
            feed_id,
            user_name,
            feed_name,
        };
        inner.follows.push(follow.clone());
        Ok(follow)
    }

    async fn follows_for_user(&self, user_id: Uuid) -> Result<Vec<Follow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_follow(&self, user_id: Uuid, feed_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.follows.len();
        inner
            .follows
            .retain(|f| !(f.user_id == user_id && f.feed_id == feed_id));
        if inner.follows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.posts.iter().any(|p| p.url == post.url) {
            return Err(conflict(super::POSTS_URL_CONSTRAINT));
        }
        let now = Utc::now();
        let row = Post {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: post.title,
            url: post.url,
            description: post.description,
            published_at: post.published_at,
            feed_id: post.feed_id,
        };
        inner.posts.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn next_feed_prefers_cold_feeds() {
        let store = MemStore::new();
        let user = store.create_user("alice").await.unwrap();
        let warm = store
            .create_feed("warm", "http://warm.test/rss", user.id)
            .await
            .unwrap();
        let cold = store
            .create_feed("cold", "http://cold.test/rss", user.id)
            .await
            .unwrap();
        store
            .mark_feed_fetched(warm.id, Utc::now())
            .await
            .unwrap();

        let next = store.next_feed_to_fetch().await.unwrap().unwrap();
        assert_eq!(next.id, cold.id);
    }

    #[tokio::test]
    async fn next_feed_ties_break_by_oldest_fetch() {
        let store = MemStore::new();
        let user = store.create_user("alice").await.unwrap();
        let a = store
            .create_feed("a", "http://a.test/rss", user.id)
            .await
            .unwrap();
        let b = store
            .create_feed("b", "http://b.test/rss", user.id)
            .await
            .unwrap();
        let old = Utc::now() - chrono::Duration::hours(2);
        store.mark_feed_fetched(a.id, old).await.unwrap();
        store.mark_feed_fetched(b.id, Utc::now()).await.unwrap();

        let next = store.next_feed_to_fetch().await.unwrap().unwrap();
        assert_eq!(next.id, a.id);
    }

    #[tokio::test]
    async fn next_feed_none_when_empty() {
        let store = MemStore::new();
        assert!(store.next_feed_to_fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_post_url_is_a_conflict() {
        let store = MemStore::new();
        let user = store.create_user("alice").await.unwrap();
        let feed = store
            .create_feed("a", "http://a.test/rss", user.id)
            .await
            .unwrap();
        let post = NewPost {
            title: "one".into(),
            url: "http://a.test/1".into(),
            description: String::new(),
            published_at: None,
            feed_id: feed.id,
        };
        store.create_post(post.clone()).await.unwrap();
        let err = store.create_post(post).await.unwrap_err();
        assert!(err.is_post_url_conflict());
    }

    #[tokio::test]
    async fn delete_missing_follow_is_not_found() {
        let store = MemStore::new();
        let user = store.create_user("alice").await.unwrap();
        let feed = store
            .create_feed("a", "http://a.test/rss", user.id)
            .await
            .unwrap();
        let err = store.delete_follow(user.id, feed.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn reset_cascades() {
        let store = MemStore::new();
        let user = store.create_user("alice").await.unwrap();
        let feed = store
            .create_feed("a", "http://a.test/rss", user.id)
            .await
            .unwrap();
        store.create_feed_follow(user.id, feed.id).await.unwrap();
        store.reset_users().await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
        assert!(store.list_feeds().await.unwrap().is_empty());
    }
}
