//! Paginated retrieval of the upstream outage feed.

pub mod client;
pub mod error;

pub use client::{FetchOutcome, OutageClient, OutageClientConfig, PageResponse};
pub use error::{FetchError, Result};
