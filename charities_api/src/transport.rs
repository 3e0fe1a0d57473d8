//! Single-request HTTP execution with timeout and bounded retry.

use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Method;
use url::Url;

use crate::config::RetryPolicy;
use crate::errors::{ConfigError, Error};
use std::time::Duration;

/// A request body. Text is sent verbatim; anything else is sent as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Json(serde_json::Value),
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        RequestBody::Text(value)
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        RequestBody::Text(value.to_string())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

/// One outbound exchange.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// A response body: parsed JSON when the server declared JSON and it parsed,
/// otherwise the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// The uniform result of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// True for 2xx statuses.
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    /// Final URL of the exchange.
    pub url: Url,
    pub body: ResponseBody,
    /// The body exactly as received.
    pub raw_text: String,
}

impl TransportResponse {
    /// Parses the `Retry-After` header as whole seconds.
    ///
    /// Absent, empty or non-numeric values (including HTTP dates) yield `None`.
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// True when the body is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.raw_text.trim().is_empty()
    }
}

/// Executes requests with a fixed timeout, retrying transient failures.
///
/// Retries 5xx, 408 and 429 responses and connectivity errors with capped
/// exponential backoff. Any completed exchange is returned as data, even a
/// failed one; only a connectivity failure that outlives the retry budget is
/// returned as [`Error::NetworkFailure`].
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl Transport {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("charities/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()?;
        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Performs the exchange, retrying per the configured policy.
    pub async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, Error> {
        let mut attempt = 0u32;
        loop {
            attempt = attempt.saturating_add(1);
            let can_retry = attempt <= self.retry.max_retries;
            match self.send_once(request).await {
                Ok(resp) => {
                    if !(can_retry && is_retryable_status(resp.status)) {
                        return Ok(resp);
                    }
                    let delay = self.backoff(attempt, &resp);
                    tracing::warn!(
                        "{} {} returned {} (attempt {}/{}), retrying in {:.1}s",
                        request.method,
                        request.url.path(),
                        resp.status,
                        attempt,
                        self.retry.max_attempts(),
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if !(can_retry && is_retryable_error(&err)) {
                        tracing::error!(
                            "{} {} failed after {} attempt(s): {}",
                            request.method,
                            request.url.path(),
                            attempt,
                            err
                        );
                        return Err(Error::NetworkFailure {
                            attempts: attempt,
                            source: err,
                        });
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} {} failed (attempt {}/{}): {}, retrying in {:.1}s",
                        request.method,
                        request.url.path(),
                        attempt,
                        self.retry.max_attempts(),
                        err,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn backoff(&self, attempt: u32, resp: &TransportResponse) -> Duration {
        match resp.retry_after() {
            Some(wait) if resp.status == 429 => wait.min(self.retry.max_delay),
            _ => self.retry.delay_for_attempt(attempt),
        }
    }

    async fn send_once(&self, request: &TransportRequest) -> Result<TransportResponse, reqwest::Error> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        builder = match &request.body {
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            Some(RequestBody::Json(value)) => builder.json(value),
            None => builder,
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let url = resp.url().clone();
        let raw_text = resp.text().await?;

        let body = if is_json_content_type(&headers) {
            match serde_json::from_str(&raw_text) {
                Ok(value) => ResponseBody::Json(value),
                Err(e) => {
                    tracing::debug!("Declared JSON body did not parse, keeping text: {}", e);
                    ResponseBody::Text(raw_text.clone())
                }
            }
        } else {
            ResponseBody::Text(raw_text.clone())
        };

        Ok(TransportResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            url,
            body,
            raw_text,
        })
    }
}

/// 5xx, 408 Request Timeout and 429 Too Many Requests.
pub fn is_retryable_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    if error.is_builder() {
        return false;
    }
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let v = v.to_ascii_lowercase();
            v.contains("application/json") || v.contains("+json")
        })
        .unwrap_or(false)
}
