//! Feed ingestion: fetching RSS XML over HTTP and normalizing it into a
//! validated document.
//!
//! The module is organized into two submodules:
//!
//! - [`schema`] - Raw and normalized document shapes plus accumulating
//!   validation of the untrusted wire format
//! - [`fetcher`] - HTTP retrieval with the fixed client identifier and the
//!   closed fetch error taxonomy

mod fetcher;
mod schema;

pub use fetcher::{FeedFetcher, FetchError, USER_AGENT};
pub use schema::{
    FeedItem, NormalizedFeedDocument, RawFeedDocument, ValidationIssue, ValidationIssues,
};
