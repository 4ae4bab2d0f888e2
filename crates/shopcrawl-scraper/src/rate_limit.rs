//! Retry with exponential backoff for transient fetch failures.
//!
//! 429 responses, 5xx responses and network-level failures are retried.
//! Everything else (404, other 4xx, unparsable bodies) is returned on the
//! first attempt; the extractors decide what a failure means for the site.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
/// - [`ScraperError::Http`]: connection reset, timeout, TLS failure.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds, scaled by a random factor in `[0.75, 1.25)`. With
/// `max_retries = 3` the operation is attempted at most 4 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && attempt < max_retries => err,
            Err(err) => return Err(err),
        };

        let delay_ms = backoff_delay_ms(backoff_base_secs, attempt);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn backoff_delay_ms(backoff_base_secs: u64, attempt: u32) -> u64 {
    let base_ms = backoff_base_secs
        .saturating_mul(1000)
        .saturating_mul(1u64 << attempt.min(62));
    let jitter = rand::random::<f64>() * 0.5 + 0.75;
    (base_ms as f64 * jitter) as u64
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn status(status: u16) -> ScraperError {
        ScraperError::UnexpectedStatus {
            status,
            url: "https://shop.example/products.json".to_owned(),
        }
    }

    /// Runs `retry_with_backoff` with a zero backoff over an operation that
    /// fails with `fail(attempt)` until it returns `None`. Returns the result
    /// and the number of attempts made.
    async fn run_counted(
        max_retries: u32,
        fail: impl Fn(u32) -> Option<ScraperError>,
    ) -> (Result<u32, ScraperError>, u32) {
        let attempts = Cell::new(0u32);
        let result = retry_with_backoff(max_retries, 0, || {
            let n = attempts.get();
            attempts.set(n + 1);
            let outcome = fail(n).map_or(Ok(n), Err);
            async move { outcome }
        })
        .await;
        (result, attempts.get())
    }

    #[tokio::test]
    async fn success_is_returned_without_retry() {
        let (result, attempts) = run_counted(3, |_| None).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn rate_limit_is_retried_until_success() {
        let (result, attempts) = run_counted(3, |n| {
            (n < 2).then(|| ScraperError::RateLimited {
                domain: "shop.example".to_owned(),
                retry_after_secs: 0,
            })
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn server_errors_exhaust_the_retry_budget() {
        let (result, attempts) = run_counted(2, |_| Some(status(503))).await;
        assert_eq!(attempts, 3);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn client_errors_fail_on_first_attempt() {
        let (result, attempts) = run_counted(3, |_| Some(status(403))).await;
        assert_eq!(attempts, 1);
        assert!(result.is_err());

        let (result, attempts) = run_counted(3, |_| {
            Some(ScraperError::NotFound {
                url: "https://shop.example/meta.json".to_owned(),
            })
        })
        .await;
        assert_eq!(attempts, 1);
        assert!(matches!(result, Err(ScraperError::NotFound { .. })));
    }

    #[test]
    fn only_transient_errors_are_retriable() {
        assert!(is_retriable(&status(500)));
        assert!(is_retriable(&status(599)));
        assert!(!is_retriable(&status(499)));
        assert!(!is_retriable(&ScraperError::ListingUnparsable {
            domain: "shop.example".to_owned(),
            page: 1,
            attempts: 3,
        }));
    }

    #[test]
    fn backoff_delay_doubles_within_jitter_bounds() {
        for attempt in 0..4 {
            let nominal = 1000u64 << attempt;
            let delay = backoff_delay_ms(1, attempt);
            assert!(delay >= nominal * 3 / 4, "attempt {attempt}: {delay}");
            assert!(delay <= nominal * 5 / 4, "attempt {attempt}: {delay}");
        }
        assert_eq!(backoff_delay_ms(0, 5), 0);
    }
}
