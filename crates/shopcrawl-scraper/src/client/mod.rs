//! HTTP fetch substrate shared by both storefront extractors.

mod origin;

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use origin::site_origin;
pub(crate) use origin::extract_domain;

/// Products requested per Shopify listing page; the storefront maximum.
pub const SHOPIFY_PAGE_LIMIT: u32 = 250;

/// HTTP client for storefront endpoints (Shopify JSON, sitemap XML and
/// product detail HTML).
///
/// Rate limiting (429), not-found (404) and other non-2xx responses surface
/// as typed errors. Transient errors (429, 5xx, network failures) are
/// retried with exponential backoff up to `max_retries` additional attempts.
///
/// One client is shared read-only by every site of a batch run.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    backoff_base_secs: u64,
    /// Pause before every request; zero disables it.
    request_delay: Duration,
}

impl StoreClient {
    /// Creates a `StoreClient` with configured timeout, `User-Agent`, and
    /// retry policy. Set `max_retries` to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
            request_delay: Duration::ZERO,
        })
    }

    /// Sets a fixed pause applied before every request.
    #[must_use]
    pub fn with_request_delay(mut self, delay_ms: u64) -> Self {
        self.request_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Fetches `url` and returns the response body as text, with automatic
    /// retry on transient errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`ScraperError::Http`]: network or TLS failure after all retries exhausted.
    pub async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "application/json,application/xml,text/html;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await?;
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            check_status(response.status(), retry_after, url)?;

            Ok(response.text().await?)
        })
        .await
    }

    /// Builds the storefront `meta.json` URL for a site origin.
    #[must_use]
    pub fn meta_url(origin: &str) -> String {
        format!("{}/meta.json", origin.trim_end_matches('/'))
    }

    /// Builds the `products.json` URL for a site origin, page size and
    /// 1-based page number.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSiteUrl`] if `origin` is not a valid
    /// URL base.
    pub fn products_url(origin: &str, limit: u32, page: u32) -> Result<String, ScraperError> {
        let base = format!("{}/products.json", origin.trim_end_matches('/'));
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidSiteUrl {
            url: origin.to_owned(),
            reason: format!("origin \"{origin}\" is not a valid URL base: {e}"),
        })?;

        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("page", &page.to_string());

        Ok(url.to_string())
    }
}

/// Maps a non-success status to its typed error. A 429 without a usable
/// `Retry-After` header is reported as 60 seconds.
pub(crate) fn check_status(
    status: reqwest::StatusCode,
    retry_after: Option<u64>,
    url: &str,
) -> Result<(), ScraperError> {
    match status.as_u16() {
        _ if status.is_success() => Ok(()),
        429 => Err(ScraperError::RateLimited {
            domain: extract_domain(url),
            retry_after_secs: retry_after.unwrap_or(60),
        }),
        404 => Err(ScraperError::NotFound {
            url: url.to_owned(),
        }),
        code => Err(ScraperError::UnexpectedStatus {
            status: code,
            url: url.to_owned(),
        }),
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
