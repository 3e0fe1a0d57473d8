//! The request core shared by every regulator client.
//!
//! Glues together URL assembly, header merging, the retrying [`Transport`],
//! status classification and the per-client [`ResponseCache`].

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::errors::{ConfigError, Error};
use crate::query::QueryParams;
use crate::transport::{
    RequestBody, ResponseBody, Transport, TransportRequest, TransportResponse,
};
use crate::types::Regulator;

/// The per-regulator capabilities the request core needs.
pub trait AuthProvider: Send + Sync {
    fn regulator(&self) -> Regulator;

    /// Production base URL, used when the config has no override.
    fn default_base_url(&self) -> &'static str;

    /// Headers that authenticate a request. Empty for open APIs.
    fn auth_headers(&self) -> HeaderMap;
}

/// Per-call options: extra query parameters and headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: QueryParams,
    /// Caller headers. These override the defaults and the auth headers.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_header(mut self, name: &'static str, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Orchestrates one regulator's requests: auth, retries, classification, caching.
///
/// Each instance owns its cache; two clients never share entries.
pub struct RequestCore<A> {
    auth: A,
    base_url: String,
    transport: Transport,
    cache: ResponseCache,
}

impl<A: AuthProvider> RequestCore<A> {
    pub fn new(auth: A, config: &ClientConfig) -> Result<Self, ConfigError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| auth.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        let transport = Transport::new(config.timeout(), config.retry.clone())?;
        Ok(Self {
            auth,
            base_url,
            transport,
            cache: ResponseCache::from_config(&config.cache),
        })
    }

    pub fn regulator(&self) -> Regulator {
        self.auth.regulator()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a GET. Non-success statuses come back as classified errors.
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<TransportResponse, Error> {
        self.request(Method::GET, path, None, options).await
    }

    /// Issues a POST with the given body.
    pub async fn post(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<TransportResponse, Error> {
        self.request(Method::POST, path, Some(body), options).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<TransportResponse, Error> {
        let url = self.url_for(path, &options.query)?;
        let request = TransportRequest {
            method,
            url,
            headers: self.merge_headers(options.headers),
            body,
        };
        tracing::debug!(
            regulator = %self.regulator(),
            "{} {}",
            request.method,
            request.url.path()
        );

        let resp = self.transport.execute(&request).await?;
        if resp.ok {
            return Ok(resp);
        }
        let err = self.classify(&resp);
        tracing::warn!(
            regulator = %self.regulator(),
            "{} {} failed: {}",
            request.method,
            request.url.path(),
            err
        );
        Err(err)
    }

    fn url_for(&self, path: &str, query: &QueryParams) -> Result<Url, Error> {
        let mut raw = format!("{}{}", self.base_url, path);
        let qs = Self::build_query_string(query);
        if !qs.is_empty() {
            raw.push(if raw.contains('?') { '&' } else { '?' });
            raw.push_str(&qs);
        }
        Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::api(0, "Invalid URL", &raw)
        })
    }

    /// `Accept: application/json`, then auth headers, then caller headers;
    /// later sources win.
    fn merge_headers(&self, caller: HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in self.auth.auth_headers().iter() {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in caller.iter() {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Serializes parameters, skipping absent and empty values, in insertion order.
    pub fn build_query_string(params: &QueryParams) -> String {
        params.to_query_string()
    }

    /// Cache key for an operation: `regulator:operation:params`.
    pub fn cache_key(&self, operation: &str, params: &QueryParams) -> String {
        format!(
            "{}:{}:{}",
            self.regulator().code(),
            operation,
            Self::build_query_string(params)
        )
    }

    /// Typed cache read. Undecodable entries are treated as misses.
    pub fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cached = self.cache.get(key)?;
        match serde_json::from_str(&cached) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Typed cache write. `None` values are stored too, as `null`.
    pub fn set_cache<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.cache.set(key.to_string(), json),
            Err(e) => tracing::warn!("Not caching {}: {}", key, e),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its
    /// successful result. Errors are never cached.
    pub async fn cached<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        if let Some(hit) = self.get_cached::<T>(key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(hit);
        }
        let value = fetch().await?;
        self.set_cache(key, &value);
        Ok(value)
    }

    /// Maps a non-success response to exactly one error kind.
    pub fn classify(&self, resp: &TransportResponse) -> Error {
        match resp.status {
            404 => Error::NotFound {
                resource: format!("{} {}", self.regulator(), resp.url.path()),
            },
            429 => Error::RateLimited {
                retry_after: resp.retry_after(),
            },
            401 | 403 => Error::AuthenticationFailed {
                status: resp.status,
            },
            status => Error::api(status, resp.status_text.clone(), &resp.raw_text),
        }
    }

    /// The JSON body of a successful response, or an [`Error::Api`] if the
    /// regulator answered with something else.
    pub fn expect_json(&self, resp: TransportResponse) -> Result<serde_json::Value, Error> {
        match resp.body {
            ResponseBody::Json(value) => Ok(value),
            ResponseBody::Text(_) => Err(Error::api(
                resp.status,
                "Expected a JSON body",
                &resp.raw_text,
            )),
        }
    }
}
