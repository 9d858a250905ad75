//! HTTP session shared by every fetch.
//!
//! The pipeline only needs one operation from the transport,
//! `get(url, headers, timeout) -> (status, body)`, so that is all the
//! [`Session`] trait exposes. [`HttpSession`] implements it with reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::debug;

use crate::error::{SessionError, SessionResult};

/// User-Agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; KUJobsMinimal/1.0)";

/// Timeout applied when a request does not specify its own (listing pages).
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub status: u16,
    pub body: String,
}

impl SessionResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by the fetcher and the listings loader.
///
/// Implementations must be safe to share between worker tasks; each call is
/// an independent request.
#[async_trait]
pub trait Session: Send + Sync {
    /// Issue a GET. `timeout` of `None` means the session default.
    ///
    /// A response with any status is `Ok`; only transport failures are `Err`.
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> SessionResult<SessionResponse>;
}

/// reqwest-backed session with default headers and a default timeout.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    /// Create a session with the default User-Agent, headers and 20s timeout.
    pub fn new() -> SessionResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpSessionBuilder {
        HttpSessionBuilder::new()
    }

    fn map_error(url: &str, error: reqwest::Error) -> SessionError {
        if error.is_timeout() {
            SessionError::Timeout {
                url: url.to_string(),
            }
        } else {
            SessionError::Transport {
                url: url.to_string(),
                source: Box::new(error),
            }
        }
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> SessionResult<SessionResponse> {
        debug!(url = %url, timeout = ?timeout, "HTTP GET");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        Ok(SessionResponse { status, body })
    }
}

/// Builder for [`HttpSession`].
pub struct HttpSessionBuilder {
    user_agent: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
}

impl Default for HttpSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSessionBuilder {
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers: Vec::new(),
        }
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the default per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> SessionResult<HttpSession> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| SessionError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| SessionError::InvalidHeader { name: name.clone() })?;
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SessionError::Build(Box::new(e)))?;

        Ok(HttpSession { client })
    }
}
