use super::schema::Database;
use super::types::{Feed, StoreError};

impl Database {
    // ========================================================================
    // Feed Follow Operations
    // ========================================================================

    /// Follow a feed. Idempotent: following an already-followed feed is a
    /// no-op (composite primary key, INSERT OR IGNORE).
    pub async fn insert_follow(&self, user_id: i64, feed_id: i64) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            "INSERT OR IGNORE INTO feed_follows (created_at, feed_id, user_id) VALUES (?, ?, ?)",
        )
        .bind(now)
        .bind(feed_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Feeds the user follows, in the order they were followed.
    pub async fn follows_for_user(&self, user_id: i64) -> Result<Vec<Feed>, StoreError> {
        let feeds = sqlx::query_as::<_, Feed>(
            r#"
            SELECT f.id, f.created_at, f.updated_at, f.name, f.url, f.user_id, f.last_fetched_at
            FROM feeds f
            JOIN feed_follows ff ON ff.feed_id = f.id
            WHERE ff.user_id = ?
            ORDER BY ff.created_at
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feeds)
    }

    /// Unfollow a feed. Returns true when a follow row was actually removed.
    pub async fn delete_follow(&self, user_id: i64, feed_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?")
            .bind(user_id)
            .bind(feed_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
