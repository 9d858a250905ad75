//! Testing utilities including a mock session.
//!
//! Useful for exercising the fetcher and the enrichment pool without making
//! real network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{SessionError, SessionResult};
use crate::session::{Session, SessionResponse};

pub use crate::clock::ManualClock;

/// A mock [`Session`] with predefined responses.
///
/// Unknown URLs answer 404. Clones share state, so a test can keep a handle
/// to inspect calls after giving the session away.
#[derive(Default, Clone)]
pub struct MockSession {
    /// Predefined responses by URL
    responses: Arc<RwLock<HashMap<String, SessionResponse>>>,

    /// URLs that fail at the transport level
    fail_urls: Arc<RwLock<Vec<String>>>,

    /// URLs whose request panics
    panic_urls: Arc<RwLock<Vec<String>>>,

    /// Delay before every response
    latency: Option<Duration>,

    /// Call tracking
    calls: Arc<RwLock<Vec<MockSessionCall>>>,

    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// Record of a call made to the mock session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSessionCall {
    pub url: String,
    pub timeout: Option<Duration>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockSession {
    /// Create a new mock session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with 200 and the given HTML.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.with_status(url, 200, html)
    }

    /// Answer `url` with an arbitrary status and body.
    pub fn with_status(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), SessionResponse::new(status, body));
        self
    }

    /// Mark a URL as failing with a connection error.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Mark a URL as panicking inside the request.
    pub fn panic_url(self, url: impl Into<String>) -> Self {
        self.panic_urls.write().unwrap().push(url.into());
        self
    }

    /// Delay every response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockSessionCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of requests made for `url`.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| call.url == url)
            .count()
    }

    /// Highest number of requests that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Session for MockSession {
    async fn get(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> SessionResult<SessionResponse> {
        self.calls.write().unwrap().push(MockSessionCall {
            url: url.to_string(),
            timeout,
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.panic_urls.read().unwrap().iter().any(|u| u == url) {
            panic!("mock session panic for {}", url);
        }

        if self.fail_urls.read().unwrap().iter().any(|u| u == url) {
            return Err(SessionError::Transport {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "Mock connection refused",
                )),
            });
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| SessionResponse::new(404, "Not Found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_url_is_not_found() {
        let session = MockSession::new();
        let response = session.get("https://example.com/x", &[], None).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(session.call_count("https://example.com/x"), 1);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let session = MockSession::new().with_page("https://example.com/1", "<p>hi</p>");
        let handle = session.clone();

        session.get("https://example.com/1", &[], None).await.unwrap();
        assert_eq!(handle.calls().len(), 1);
        assert_eq!(handle.max_in_flight(), 1);
    }
}
