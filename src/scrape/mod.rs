//! The aggregation loop: one feed per tick, repeated on a timer.
//!
//! - [`cycle`] - a single select → mark → fetch → persist pass
//! - [`scheduler`] - the cancellable wall-clock loop driving cycles

mod cycle;
mod scheduler;

pub use cycle::{CycleOutcome, ScrapeError, Scraper};
pub use scheduler::Scheduler;
