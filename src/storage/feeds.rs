use super::schema::Database;
use super::types::{Feed, FeedWithOwner, StoreError};

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Add a feed owned by a user. Feed URLs are unique across all users.
    pub async fn insert_feed(
        &self,
        name: &str,
        url: &str,
        user_id: i64,
    ) -> Result<Feed, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO feeds (created_at, updated_at, name, url, user_id, last_fetched_at)
            VALUES (?, ?, ?, ?, ?, NULL)
        "#,
        )
        .bind(now)
        .bind(now)
        .bind(name)
        .bind(url)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_insert)?;

        Ok(Feed {
            id: result.last_insert_rowid(),
            created_at: now,
            updated_at: now,
            name: name.to_string(),
            url: url.to_string(),
            user_id,
            last_fetched_at: None,
        })
    }

    pub async fn feed_by_url(&self, url: &str) -> Result<Option<Feed>, StoreError> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, created_at, updated_at, name, url, user_id, last_fetched_at
            FROM feeds WHERE url = ?
        "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(feed)
    }

    /// All feeds with the name of the user who added them.
    pub async fn all_feeds(&self) -> Result<Vec<FeedWithOwner>, StoreError> {
        let feeds = sqlx::query_as::<_, FeedWithOwner>(
            r#"
            SELECT f.name, f.url, u.name AS user_name
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.name
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(feeds)
    }

    // ========================================================================
    // Scrape Queue
    // ========================================================================

    /// Returns the next feed to scrape, or `None` when no feeds exist.
    ///
    /// Never-fetched feeds (`last_fetched_at IS NULL`) come first, then the
    /// rest by oldest fetch time.
    pub async fn next_feed_to_fetch(&self) -> Result<Option<Feed>, StoreError> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, created_at, updated_at, name, url, user_id, last_fetched_at
            FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST
            LIMIT 1
        "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(feed)
    }

    /// Stamps a feed as fetched now. Exactly one row is touched per call.
    pub async fn mark_feed_fetched(&self, feed_id: i64) -> Result<(), StoreError> {
        self.mark_feed_fetched_at(feed_id, chrono::Utc::now().timestamp())
            .await
    }

    /// Stamps a feed as fetched at an explicit time (epoch seconds). Also
    /// bumps `updated_at`.
    pub async fn mark_feed_fetched_at(
        &self,
        feed_id: i64,
        fetched_at: i64,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE feeds SET last_fetched_at = ?, updated_at = ? WHERE id = ?")
            .bind(fetched_at)
            .bind(chrono::Utc::now().timestamp())
            .bind(feed_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
