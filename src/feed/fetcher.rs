use std::time::Duration;
use thiserror::Error;

use crate::feed::schema::{NormalizedFeedDocument, RawFeedDocument, ValidationIssues};

/// Fixed client identifier sent on every feed request.
pub const USER_AGENT: &str = "gator";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching and normalizing one feed.
///
/// The taxonomy is deliberately closed: HTTP status, empty body, XML parse,
/// and schema validation each get their own variant, and everything else
/// (DNS, TLS, connection resets, body read failures) collapses into
/// [`FetchError::Unexpected`] with the original message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx HTTP response
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body was empty or whitespace-only
    #[error("empty XML response")]
    EmptyResponse,
    /// Body could not be parsed as XML
    #[error("XML parse error: {0}")]
    Parse(String),
    /// Document parsed but violated the raw feed schema
    #[error("feed validation failed: {0}")]
    Validation(ValidationIssues),
    /// Anything outside the taxonomy above
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Unexpected(err.to_string())
    }
}

/// HTTP feed fetcher. One instance is shared across all scrape cycles; the
/// underlying `reqwest::Client` pools connections internally.
#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches one feed URL and returns its validated, normalized document.
    ///
    /// Failure mapping, in order:
    /// 1. non-2xx status → [`FetchError::HttpStatus`]
    /// 2. empty or whitespace-only body → [`FetchError::EmptyResponse`]
    /// 3. malformed XML → [`FetchError::Parse`]
    /// 4. schema violation → [`FetchError::Validation`] with every issue found
    ///
    /// Incomplete items are dropped silently (logged, not an error). No
    /// retries happen here; a failed feed is simply tried again on a later
    /// scheduled tick.
    pub async fn fetch(&self, url: &str) -> Result<NormalizedFeedDocument, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyResponse);
        }

        let raw: RawFeedDocument =
            quick_xml::de::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        let result = raw.validate().map_err(FetchError::Validation)?;
        if result.dropped > 0 {
            tracing::warn!(
                feed = %url,
                dropped = result.dropped,
                "Dropped items missing required fields"
            );
        }

        Ok(result.document)
    }
}
