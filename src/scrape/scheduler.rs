use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::scrape::cycle::{CycleOutcome, ScrapeError, Scraper};
use crate::util::{parse_duration, DurationError};

/// Drives scrape cycles on a fixed wall-clock interval until cancelled.
///
/// Ticks are wall-clock-paced, not completion-paced: each tick spawns its
/// cycle as an independent task and the timer keeps firing regardless of
/// whether the previous cycle finished. A cycle slower than the interval
/// therefore overlaps the next one; each overlapping cycle selects (and
/// marks fetched) its own feed, so the same feed is not processed twice.
pub struct Scheduler {
    scraper: Arc<Scraper>,
}

impl Scheduler {
    pub fn new(scraper: Scraper) -> Self {
        Self {
            scraper: Arc::new(scraper),
        }
    }

    /// Parses the interval string and runs the scheduling loop until Ctrl-C.
    ///
    /// A malformed interval fails here, before the first cycle. Everything
    /// after that point is non-fatal: cycle errors are logged and the loop
    /// continues to the next tick. Returns once the signal is received, so
    /// the process can exit cleanly.
    pub async fn start(&self, interval_str: &str) -> Result<(), DurationError> {
        let every = parse_duration(interval_str)?;
        println!("Collecting feeds every {interval_str}. Press Ctrl+C to stop.");

        self.run(every, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await;

        Ok(())
    }

    /// The scheduling loop, with cancellation supplied by the caller.
    ///
    /// The interval's first tick fires immediately, which gives the required
    /// run-once-on-start behavior. After `shutdown` resolves no new cycle is
    /// started; a cycle already in flight is left to finish on its own.
    pub async fn run(&self, every: Duration, shutdown: impl Future<Output = ()>) {
        // tokio rejects a zero interval; "0ms" degrades to the tightest loop we allow
        let every = every.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(every);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let scraper = Arc::clone(&self.scraper);
                    // Spawned, not awaited: the next tick must not wait for
                    // this cycle to finish.
                    tokio::spawn(async move {
                        log_cycle(scraper.run_once().await);
                    });
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping scheduler");
                    break;
                }
            }
        }

        tracing::info!("Scheduler stopped");
    }
}

/// One diagnostic line per cycle; errors are swallowed so the loop survives.
fn log_cycle(result: Result<CycleOutcome, ScrapeError>) {
    match result {
        Ok(outcome) => {
            tracing::info!(
                feed = %outcome.feed_url,
                name = %outcome.feed_name,
                inserted = outcome.inserted,
                duplicates = outcome.duplicates,
                failed = outcome.failed,
                "Scrape cycle complete"
            );
        }
        Err(ScrapeError::NoFeedsAvailable) => {
            tracing::warn!("No feeds available, waiting for the next tick");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Scrape cycle failed");
        }
    }
}
