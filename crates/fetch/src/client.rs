//! Outage feed client.
//!
//! The upstream map server pages its query results by feature count: each
//! page body carries a `features` array plus an `exceededTransferLimit`
//! flag, and the next page is requested by appending `&resultOffset=<n>`
//! where `n` is the number of features consumed so far. The accumulator is
//! threaded explicitly through the page loop so retries never touch
//! partially merged state.

use crate::error::{FetchError, Result};
use gridwatch_core::feed::OutageFeature;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Configuration for the outage feed client.
#[derive(Debug, Clone)]
pub struct OutageClientConfig {
    /// Fully formed query URL; `&resultOffset=<n>` is appended per page.
    pub query_url: String,

    /// Retries per page after the initial attempt.
    pub max_retries: u32,

    /// Fixed delay between attempts for the same page.
    pub retry_delay: Duration,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OutageClientConfig {
    fn default() -> Self {
        Self {
            query_url: String::new(),
            max_retries: 5,
            retry_delay: Duration::from_secs(1),
            timeout_secs: 30,
        }
    }
}

impl OutageClientConfig {
    /// Sets the query URL.
    #[must_use]
    pub fn with_query_url(mut self, url: impl Into<String>) -> Self {
        self.query_url = url.into();
        self
    }

    /// Sets the per-page retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// One page of the upstream feed.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub features: Vec<OutageFeature>,

    /// True when the server truncated the page and more data remains.
    #[serde(rename = "exceededTransferLimit", default)]
    pub exceeded_transfer_limit: bool,
}

/// Result of one full fetch run.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// All features merged across the pages that were retrieved.
    pub features: Vec<OutageFeature>,

    /// False when pagination was cut short by an exhausted-retries page;
    /// `features` then holds only the pages merged before the failure.
    pub complete: bool,
}

/// HTTP client for the paginated outage feed.
pub struct OutageClient {
    http: Client,
    config: OutageClientConfig,
}

impl OutageClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transport` if the HTTP client cannot be built.
    pub fn new(config: OutageClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Fetches every page of the feed and concatenates the features.
    ///
    /// A page that exhausts its retry budget ends the run: if no page had
    /// been merged yet this is `ExhaustedRetries`, otherwise the pages
    /// merged so far are returned with `complete = false`. Pages are atomic
    /// units; a failing page never contributes partial features.
    pub async fn fetch_all(&self) -> Result<FetchOutcome> {
        let mut features: Vec<OutageFeature> = Vec::new();
        let mut offset = 0usize;
        let mut pages_merged = 0u32;

        loop {
            tracing::info!(offset, "fetching outage page");
            let page = match self.fetch_page_with_retry(offset).await {
                Ok(page) => page,
                Err(err) if pages_merged == 0 => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        offset,
                        pages_merged,
                        error = %err,
                        "pagination aborted, publishing pages merged before the failure"
                    );
                    return Ok(FetchOutcome {
                        features,
                        complete: false,
                    });
                }
            };

            let count = page.features.len();
            let more = page.exceeded_transfer_limit;
            features.extend(page.features);
            offset += count;
            pages_merged += 1;

            if !more {
                break;
            }
            if count == 0 {
                // The server claims more data but returned nothing, so the
                // offset can never advance. Stop instead of spinning.
                tracing::warn!(offset, "transfer limit reported on an empty page");
                return Ok(FetchOutcome {
                    features,
                    complete: false,
                });
            }
        }

        tracing::info!(total = features.len(), "fetch run complete");
        Ok(FetchOutcome {
            features,
            complete: true,
        })
    }

    /// Fetches a single page, retrying on transport or parse failure.
    async fn fetch_page_with_retry(&self, offset: usize) -> Result<PageResponse> {
        let attempts = self.config.max_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fetch_page(offset).await {
                Ok(page) => return Ok(page),
                Err(err) => {
                    tracing::warn!(
                        offset,
                        attempt,
                        attempts,
                        error = %err,
                        "page fetch failed"
                    );
                    last_error = Some(err);
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Err(FetchError::ExhaustedRetries {
            offset,
            attempts,
            last_error,
        })
    }

    async fn fetch_page(&self, offset: usize) -> Result<PageResponse> {
        let url = format!("{}&resultOffset={}", self.config.query_url, offset);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "status {} at offset {}",
                response.status(),
                offset
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }
}
