use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage errors surfaced to callers.
///
/// `DuplicateUrl` is split out because the scrape cycle treats it as an
/// expected per-item outcome (re-polling a feed re-sees old posts), while
/// every other database failure is unexpected.
#[derive(Debug, Error)]
pub enum StoreError {
    /// UNIQUE(url) constraint violation on insert
    #[error("a record with this URL already exists")]
    DuplicateUrl,

    /// Any other database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps unique-constraint violations to `DuplicateUrl`; everything else
    /// passes through as `Database`.
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateUrl
            }
            _ => StoreError::Database(err),
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A registered user. Timestamps are epoch seconds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub name: String,
}

/// A subscribed RSS source. `last_fetched_at = None` means never fetched,
/// which sorts the feed to the front of the scrape queue.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Feed {
    pub id: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub name: String,
    pub url: String,
    pub user_id: i64,
    pub last_fetched_at: Option<i64>,
}

/// A persisted feed item. Created once by the scrape cycle, never mutated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub created_at: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: i64,
    pub feed_id: i64,
}

/// Insert payload for one post, derived from a surviving [`crate::feed::FeedItem`].
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub description: &'a str,
    pub published_at: i64,
    pub feed_id: i64,
}

/// A post joined with the name of the feed it came from, for `browse` output.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithFeed {
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: i64,
    pub feed_name: String,
}

/// A feed joined with its owner's name, for `feeds` output.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedWithOwner {
    pub name: String,
    pub url: String,
    pub user_name: String,
}
