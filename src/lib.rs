//! gator: a CLI RSS aggregator.
//!
//! The core is the feed ingestion pipeline (fetch → parse → validate →
//! normalize → persist) in [`feed`] and [`scrape`], driven by a cancellable
//! wall-clock scheduler. [`storage`], [`config`], and [`cli`] are the
//! surrounding plumbing.

pub mod cli;
pub mod config;
pub mod feed;
pub mod scrape;
pub mod storage;
pub mod util;
