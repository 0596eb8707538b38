//! End-to-end tests for the scrape cycle and scheduler against a mock HTTP
//! server and an in-memory database.

use std::sync::Arc;
use std::time::Duration;

use gator::feed::{FeedFetcher, FetchError};
use gator::scrape::{Scheduler, ScrapeError, Scraper};
use gator::storage::Database;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_WITH_MIXED_ITEMS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Example</title>
    <link>https://example.com</link>
    <description>Example feed</description>
    <item>
        <title>One</title>
        <link>https://example.com/1</link>
        <description>first</description>
        <pubDate>Mon, 06 Sep 2021 12:00:00 +0000</pubDate>
    </item>
    <item>
        <title>Two</title>
        <link>https://example.com/2</link>
        <description>second</description>
        <pubDate>Tue, 07 Sep 2021 12:00:00 +0000</pubDate>
    </item>
    <item>
        <title>Three</title>
        <link>https://example.com/3</link>
        <description>third</description>
        <pubDate>Wed, 08 Sep 2021 12:00:00 +0000</pubDate>
    </item>
    <item>
        <title>No date</title>
        <link>https://example.com/4</link>
        <description>dropped during normalization</description>
    </item>
</channel></rss>"#;

async fn test_db() -> Database {
    Database::open(":memory:").await.unwrap()
}

async fn serve_feed(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "application/xml"),
        )
        .mount(&server)
        .await;
    server
}

async fn scraper_with_feed(db: &Database, feed_url: &str) -> Scraper {
    let user = db.insert_user("ada").await.unwrap();
    let feed = db.insert_feed("Example", feed_url, user.id).await.unwrap();
    db.insert_follow(user.id, feed.id).await.unwrap();
    Scraper::new(db.clone(), FeedFetcher::new().unwrap())
}

// ============================================================================
// Scrape Cycle
// ============================================================================

#[tokio::test]
async fn test_cycle_persists_surviving_items_and_marks_feed() {
    let server = serve_feed(FEED_WITH_MIXED_ITEMS).await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;

    let outcome = scraper.run_once().await.unwrap();

    // 3 well-formed items persisted; the one missing pubDate was dropped
    // before the persistence stage ever saw it.
    assert_eq!(outcome.inserted, 3);
    assert_eq!(outcome.duplicates, 0);
    assert_eq!(outcome.failed, 0);
    assert_eq!(db.count_posts().await.unwrap(), 3);

    let feed = db.feed_by_url(&feed_url).await.unwrap().unwrap();
    assert!(feed.last_fetched_at.is_some(), "feed marked fetched once");
}

#[tokio::test]
async fn test_cycle_reports_http_error_but_feed_stays_marked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;

    let err = scraper.run_once().await.unwrap_err();
    match err {
        ScrapeError::Fetch(FetchError::HttpStatus(404)) => {}
        e => panic!("expected HttpStatus(404), got {e:?}"),
    }

    // Zero posts, but selection happened before the fetch, so the feed is
    // already stamped and won't be re-selected ahead of its peers.
    assert_eq!(db.count_posts().await.unwrap(), 0);
    let feed = db.feed_by_url(&feed_url).await.unwrap().unwrap();
    assert!(feed.last_fetched_at.is_some());
}

#[tokio::test]
async fn test_repolling_same_feed_yields_only_duplicates() {
    let server = serve_feed(FEED_WITH_MIXED_ITEMS).await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;

    scraper.run_once().await.unwrap();
    let second = scraper.run_once().await.unwrap();

    // Every insert hit the unique-URL constraint; the cycle still succeeds.
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, 3);
    assert_eq!(second.failed, 0);
    assert_eq!(db.count_posts().await.unwrap(), 3);
}

#[tokio::test]
async fn test_cycle_with_no_feeds_fails_with_no_feeds_available() {
    let db = test_db().await;
    let scraper = Scraper::new(db.clone(), FeedFetcher::new().unwrap());

    let err = scraper.run_once().await.unwrap_err();
    assert!(matches!(err, ScrapeError::NoFeedsAvailable));
}

#[tokio::test]
async fn test_unparseable_pub_date_is_isolated_item_failure() {
    let body = r#"<rss version="2.0"><channel>
        <title>T</title>
        <link>https://example.com</link>
        <description>D</description>
        <item>
            <title>Bad date</title>
            <link>https://example.com/bad</link>
            <description>x</description>
            <pubDate>sometime soon</pubDate>
        </item>
        <item>
            <title>Good</title>
            <link>https://example.com/good</link>
            <description>y</description>
            <pubDate>Mon, 06 Sep 2021 12:00:00 +0000</pubDate>
        </item>
    </channel></rss>"#;
    let server = serve_feed(body).await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;

    let outcome = scraper.run_once().await.unwrap();
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(db.count_posts().await.unwrap(), 1);
}

#[tokio::test]
async fn test_persisted_posts_are_browsable() {
    let server = serve_feed(FEED_WITH_MIXED_ITEMS).await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;

    scraper.run_once().await.unwrap();

    let ada = db.user_by_name("ada").await.unwrap().unwrap();
    let posts = db.posts_for_user(ada.id, 10).await.unwrap();
    assert_eq!(posts.len(), 3);
    // Newest first
    assert_eq!(posts[0].title, "Three");
    assert_eq!(posts[2].title, "One");
}

// ============================================================================
// Scheduler
// ============================================================================

#[tokio::test]
async fn test_scheduler_runs_first_cycle_immediately() {
    let server = serve_feed(FEED_WITH_MIXED_ITEMS).await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;
    let scheduler = Arc::new(Scheduler::new(scraper));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            // An hour-long interval: only the immediate first tick can fire.
            scheduler
                .run(Duration::from_secs(3600), async {
                    let _ = stop_rx.await;
                })
                .await;
        })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    stop_tx.send(()).unwrap();
    handle.await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "exactly the immediate cycle ran");
}

#[tokio::test]
async fn test_scheduler_repeats_and_stops_on_cancellation() {
    let server = serve_feed(FEED_WITH_MIXED_ITEMS).await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;
    let scheduler = Arc::new(Scheduler::new(scraper));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            scheduler
                .run(Duration::from_millis(50), async {
                    let _ = stop_rx.await;
                })
                .await;
        })
    };

    tokio::time::sleep(Duration::from_millis(230)).await;
    stop_tx.send(()).unwrap();
    handle.await.unwrap();

    // Give any in-flight cycle a moment to finish, then take the count.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after_stop = server.received_requests().await.unwrap().len();
    assert!(
        after_stop >= 3,
        "immediate run plus repeated ticks, got {after_stop}"
    );

    // No new cycle starts once cancellation was observed.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let later = server.received_requests().await.unwrap().len();
    assert_eq!(later, after_stop);
}

#[tokio::test]
async fn test_scheduler_survives_failing_cycles() {
    // Every fetch 500s, but the loop keeps ticking.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;
    let scheduler = Arc::new(Scheduler::new(scraper));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            scheduler
                .run(Duration::from_millis(50), async {
                    let _ = stop_rx.await;
                })
                .await;
        })
    };

    tokio::time::sleep(Duration::from_millis(180)).await;
    stop_tx.send(()).unwrap();
    handle.await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.len() >= 2,
        "loop kept running despite per-cycle errors, got {}",
        requests.len()
    );
    assert_eq!(db.count_posts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_interval_aborts_before_any_cycle() {
    let server = serve_feed(FEED_WITH_MIXED_ITEMS).await;
    let feed_url = format!("{}/rss", server.uri());
    let db = test_db().await;
    let scraper = scraper_with_feed(&db, &feed_url).await;
    let scheduler = Scheduler::new(scraper);

    assert!(scheduler.start("5x").await.is_err());
    assert!(server.received_requests().await.unwrap().is_empty());
}
