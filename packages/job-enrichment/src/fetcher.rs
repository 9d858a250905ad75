//! Detail-page fetcher: cache first, then one GET.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::DetailCache;
use crate::error::{FetchError, FetchResult};
use crate::extract::extract_main_text;
use crate::session::Session;

/// Timeout for a single detail-page request.
pub const DETAIL_TIMEOUT_SECS: u64 = 12;

/// Fetches detail pages and returns their extracted text.
///
/// Hits are served from the shared [`DetailCache`] with no network call.
/// Misses issue exactly one GET; successful responses are extracted and
/// cached, failures are never cached.
pub struct DetailFetcher<S: Session> {
    session: Arc<S>,
    cache: Arc<DetailCache>,
    timeout: Duration,
}

impl<S: Session> DetailFetcher<S> {
    pub fn new(session: Arc<S>, cache: Arc<DetailCache>) -> Self {
        Self {
            session,
            cache,
            timeout: Duration::from_secs(DETAIL_TIMEOUT_SECS),
        }
    }

    /// Set the per-request timeout for detail pages.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<DetailCache> {
        &self.cache
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    /// Fetch the extracted text for `url`, keeping the error on failure.
    pub async fn try_fetch(&self, url: &str) -> FetchResult<String> {
        if url.trim().is_empty() {
            return Err(FetchError::MissingUrl);
        }

        if let Some(text) = self.cache.get(url) {
            debug!(url = %url, "Detail cache hit");
            return Ok(text);
        }

        debug!(url = %url, "Detail cache miss, fetching");
        let response = self.session.get(url, &[], Some(self.timeout)).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let text = extract_main_text(&response.body);
        self.cache.put(url, text.clone());
        Ok(text)
    }

    /// Fetch the extracted text for `url`, or an empty string on any failure.
    ///
    /// One bad detail page must not abort a batch, so errors are logged and
    /// swallowed here.
    pub async fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url = %url, error = %e, "Detail fetch failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::clock::{Clock, ManualClock};
    use crate::testing::{MockSession, MockSessionCall};

    const PAGE: &str = "<html><body><nav>Menu</nav><main>Python and SQL</main></body></html>";

    fn fetcher(session: MockSession, clock: Arc<ManualClock>) -> DetailFetcher<MockSession> {
        let cache = Arc::new(DetailCache::with_clock(CacheConfig::default(), clock));
        DetailFetcher::new(Arc::new(session), cache)
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_is_cache_hit() {
        let clock = Arc::new(ManualClock::new());
        let fetcher = fetcher(
            MockSession::new().with_page("https://example.com/1", PAGE),
            clock.clone(),
        );

        let first = fetcher.fetch("https://example.com/1").await;
        clock.advance(chrono::Duration::minutes(10));
        let second = fetcher.fetch("https://example.com/1").await;

        assert_eq!(first, "Python and SQL");
        assert_eq!(first, second);
        assert_eq!(fetcher.session().call_count("https://example.com/1"), 1);
    }

    #[tokio::test]
    async fn test_fetch_after_ttl_refetches_and_restamps() {
        let clock = Arc::new(ManualClock::new());
        let fetcher = fetcher(
            MockSession::new().with_page("https://example.com/1", PAGE),
            clock.clone(),
        );

        fetcher.fetch("https://example.com/1").await;
        clock.advance(chrono::Duration::minutes(31));
        fetcher.fetch("https://example.com/1").await;

        assert_eq!(fetcher.session().call_count("https://example.com/1"), 2);
        let entry = fetcher.cache().entry("https://example.com/1").unwrap();
        assert_eq!(entry.fetched_at, clock.now());
    }

    #[tokio::test]
    async fn test_http_error_yields_empty_text_and_is_not_cached() {
        let fetcher = fetcher(
            MockSession::new().with_status("https://example.com/broken", 500, "oops"),
            Arc::new(ManualClock::new()),
        );

        assert_eq!(fetcher.fetch("https://example.com/broken").await, "");
        assert!(fetcher.cache().is_empty());

        let err = fetcher.try_fetch("https://example.com/broken").await.unwrap_err();
        assert!(err.is_http_status());
    }

    #[tokio::test]
    async fn test_transport_error_yields_empty_text() {
        let fetcher = fetcher(
            MockSession::new().fail_url("https://example.com/down"),
            Arc::new(ManualClock::new()),
        );

        assert_eq!(fetcher.fetch("https://example.com/down").await, "");
        assert!(matches!(
            fetcher.try_fetch("https://example.com/down").await,
            Err(FetchError::Session(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_url_makes_no_request() {
        let fetcher = fetcher(MockSession::new(), Arc::new(ManualClock::new()));

        assert!(matches!(
            fetcher.try_fetch("  ").await,
            Err(FetchError::MissingUrl)
        ));
        assert!(fetcher.session().calls().is_empty());
    }

    #[tokio::test]
    async fn test_uses_detail_timeout() {
        let fetcher = fetcher(
            MockSession::new().with_page("https://example.com/1", PAGE),
            Arc::new(ManualClock::new()),
        )
        .with_timeout(Duration::from_secs(3));

        fetcher.fetch("https://example.com/1").await;

        let calls = fetcher.session().calls();
        assert_eq!(
            calls,
            vec![MockSessionCall {
                url: "https://example.com/1".to_string(),
                timeout: Some(Duration::from_secs(3)),
            }]
        );
    }
}
