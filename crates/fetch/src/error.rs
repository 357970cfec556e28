//! Error types for the outage feed client.

use thiserror::Error;

/// Errors that can occur while fetching the paginated outage feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body was not the expected page structure.
    #[error("malformed response body: {0}")]
    MalformedResponse(String),

    /// A single page kept failing until the retry budget ran out.
    #[error("retries exhausted at offset {offset} after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        /// Pagination offset of the failing page.
        offset: usize,
        /// Total attempts made for that page.
        attempts: u32,
        /// The error from the final attempt.
        last_error: String,
    },
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
