use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{Feed, Follow, NewPost, Post, Store, StoreError, User};

/// Postgres-backed store. Queries are runtime-bound so the crate builds
/// without a live database.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(dsn)
            .await
            .map_err(map_err)?;
        Ok(Self { pool })
    }

    /// Apply any pending migrations (idempotent).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(())
    }
}

fn map_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict {
                constraint: db.constraint().unwrap_or_default().to_string(),
            }
        }
        _ => StoreError::Backend(Box::new(err)),
    }
}

impl Store for PgStore {
    async fn get_user(&self, name: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, name FROM users WHERE name = $1",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, created_at, updated_at, name)
            VALUES ($1, $2, $2, $3)
            RETURNING id, created_at, updated_at, name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, created_at, updated_at, name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT id, created_at, updated_at, name FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn reset_users(&self) -> Result<(), StoreError> {
        // Cascades to feeds, follows and posts through the FKs.
        sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn create_feed(&self, name: &str, url: &str, user_id: Uuid) -> Result<Feed, StoreError> {
        let now = Utc::now();
        sqlx::query_as::<_, Feed>(
            r#"
            INSERT INTO feeds (id, created_at, updated_at, name, url, user_id)
            VALUES ($1, $2, $2, $3, $4, $5)
            RETURNING id, created_at, updated_at, name, url, user_id, last_fetched_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(name)
        .bind(url)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_feeds(&self) -> Result<Vec<Feed>, StoreError> {
        sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, created_at, updated_at, name, url, user_id, last_fetched_at
            FROM feeds ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn feed_id_by_url(&self, url: &str) -> Result<Uuid, StoreError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM feeds WHERE url = $1")
            .bind(url)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn next_feed_to_fetch(&self) -> Result<Option<Feed>, StoreError> {
        sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, created_at, updated_at, name, url, user_id, last_fetched_at
            FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn mark_feed_fetched(
        &self,
        id: Uuid,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE feeds SET last_fetched_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(fetched_at)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_feed_follow(
        &self,
        user_id: Uuid,
        feed_id: Uuid,
    ) -> Result<Follow, StoreError> {
        let now = Utc::now();
        sqlx::query_as::<_, Follow>(
            r#"
            WITH inserted AS (
                INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id)
                VALUES ($1, $2, $2, $3, $4)
                RETURNING id, created_at, updated_at, user_id, feed_id
            )
            SELECT inserted.id, inserted.created_at, inserted.updated_at,
                   inserted.user_id, inserted.feed_id,
                   users.name AS user_name, feeds.name AS feed_name
            FROM inserted
            JOIN users ON users.id = inserted.user_id
            JOIN feeds ON feeds.id = inserted.feed_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(user_id)
        .bind(feed_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn follows_for_user(&self, user_id: Uuid) -> Result<Vec<Follow>, StoreError> {
        sqlx::query_as::<_, Follow>(
            r#"
            SELECT ff.id, ff.created_at, ff.updated_at, ff.user_id, ff.feed_id,
                   users.name AS user_name, feeds.name AS feed_name
            FROM feed_follows ff
            JOIN users ON users.id = ff.user_id
            JOIN feeds ON feeds.id = ff.feed_id
            WHERE ff.user_id = $1
            ORDER BY ff.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_follow(&self, user_id: Uuid, feed_id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM feed_follows WHERE user_id = $1 AND feed_id = $2")
            .bind(user_id)
            .bind(feed_id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let now = Utc::now();
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, created_at, updated_at, title, url, description, published_at, feed_id)
            VALUES ($1, $2, $2, $3, $4, $5, $6, $7)
            RETURNING id, created_at, updated_at, title, url, description, published_at, feed_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(post.published_at)
        .bind(post.feed_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }
}
