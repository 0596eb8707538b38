use super::schema::Database;
use super::types::{NewPost, Post, PostWithFeed, StoreError};

impl Database {
    // ========================================================================
    // Post Operations
    // ========================================================================

    /// Insert one post.
    ///
    /// Post URLs are unique; inserting an already-seen URL fails with
    /// [`StoreError::DuplicateUrl`], which callers treat as the normal
    /// outcome of re-polling a feed.
    pub async fn insert_post(&self, post: &NewPost<'_>) -> Result<Post, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO posts (created_at, title, url, description, published_at, feed_id)
            VALUES (?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(now)
        .bind(post.title)
        .bind(post.url)
        .bind(post.description)
        .bind(post.published_at)
        .bind(post.feed_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_insert)?;

        Ok(Post {
            id: result.last_insert_rowid(),
            created_at: now,
            title: post.title.to_string(),
            url: post.url.to_string(),
            description: post.description.to_string(),
            published_at: post.published_at,
            feed_id: post.feed_id,
        })
    }

    /// Latest posts from the feeds a user follows, newest first.
    pub async fn posts_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<PostWithFeed>, StoreError> {
        let posts = sqlx::query_as::<_, PostWithFeed>(
            r#"
            SELECT p.title, p.url, p.description, p.published_at, f.name AS feed_name
            FROM posts p
            JOIN feeds f ON f.id = p.feed_id
            JOIN feed_follows ff ON ff.feed_id = f.id
            WHERE ff.user_id = ?
            ORDER BY p.published_at DESC, p.id DESC
            LIMIT ?
        "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Total number of persisted posts.
    pub async fn count_posts(&self) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
