use chrono::DateTime;
use thiserror::Error;

use crate::feed::{FeedFetcher, FeedItem, FetchError};
use crate::storage::{Database, NewPost, StoreError};

/// Errors that fail a whole scrape cycle.
///
/// Per-item persistence failures are NOT here: those are isolated inside
/// [`Scraper::run_once`] and reported through [`CycleOutcome`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The feeds table is empty; nothing to scrape this tick
    #[error("no feeds available to scrape")]
    NoFeedsAvailable,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary of one completed cycle.
#[derive(Debug)]
pub struct CycleOutcome {
    pub feed_name: String,
    pub feed_url: String,
    /// New posts persisted this cycle
    pub inserted: usize,
    /// Items whose URL was already in the posts table (expected on re-poll)
    pub duplicates: usize,
    /// Items that failed for any other reason (bad pubDate, storage error)
    pub failed: usize,
}

/// Why one item in a batch was not persisted.
#[derive(Debug)]
enum ItemFailure {
    Duplicate,
    InvalidPubDate(String),
    Store(StoreError),
}

/// Runs scrape cycles: select feed → mark fetched → fetch → persist items.
pub struct Scraper {
    db: Database,
    fetcher: FeedFetcher,
}

impl Scraper {
    pub fn new(db: Database, fetcher: FeedFetcher) -> Self {
        Self { db, fetcher }
    }

    /// Executes one scrape cycle against the highest-priority feed.
    ///
    /// The feed is marked fetched immediately after selection, before the
    /// fetch starts: a slow or failing fetch must not keep the same feed at
    /// the front of the queue on every subsequent tick.
    ///
    /// Each item insert is isolated. A failed item (duplicate URL, bad date,
    /// storage error) is logged and the batch continues; the cycle still
    /// succeeds even when every single insert failed, as long as the fetch
    /// itself succeeded.
    pub async fn run_once(&self) -> Result<CycleOutcome, ScrapeError> {
        let feed = self
            .db
            .next_feed_to_fetch()
            .await?
            .ok_or(ScrapeError::NoFeedsAvailable)?;

        tracing::debug!(feed = %feed.url, "Selected feed for scraping");
        self.db.mark_feed_fetched(feed.id).await?;

        let document = self.fetcher.fetch(&feed.url).await?;

        // Fold every item into a (success | failure) result; no failure stops
        // the batch.
        let mut results = Vec::with_capacity(document.items.len());
        for item in &document.items {
            results.push(self.persist_item(item, feed.id).await);
        }

        let mut outcome = CycleOutcome {
            feed_name: feed.name,
            feed_url: feed.url,
            inserted: 0,
            duplicates: 0,
            failed: 0,
        };
        for (item, result) in document.items.iter().zip(&results) {
            match result {
                Ok(()) => outcome.inserted += 1,
                Err(ItemFailure::Duplicate) => {
                    tracing::debug!(url = %item.link, "Post already collected, skipping");
                    outcome.duplicates += 1;
                }
                Err(ItemFailure::InvalidPubDate(raw)) => {
                    tracing::warn!(url = %item.link, pub_date = %raw, "Unparseable pubDate, skipping item");
                    outcome.failed += 1;
                }
                Err(ItemFailure::Store(e)) => {
                    tracing::warn!(url = %item.link, error = %e, "Failed to persist post");
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    async fn persist_item(&self, item: &FeedItem, feed_id: i64) -> Result<(), ItemFailure> {
        let published_at = parse_pub_date(&item.pub_date)
            .ok_or_else(|| ItemFailure::InvalidPubDate(item.pub_date.clone()))?;

        let post = NewPost {
            title: &item.title,
            url: &item.link,
            description: &item.description,
            published_at,
            feed_id,
        };

        match self.db.insert_post(&post).await {
            Ok(_) => Ok(()),
            Err(StoreError::DuplicateUrl) => Err(ItemFailure::Duplicate),
            Err(e) => Err(ItemFailure::Store(e)),
        }
    }
}

/// Parses an RSS pubDate to epoch seconds. RFC 2822 is the RSS 2.0 format;
/// RFC 3339 shows up in the wild often enough to warrant a fallback.
fn parse_pub_date(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.timestamp())
        .ok()
}
