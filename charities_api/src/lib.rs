//! Request core for the UK charity register clients.
//!
//! Provides the retrying HTTP [`Transport`], the closed [`Error`] taxonomy,
//! the bounded [`ResponseCache`], the [`RequestCore`] every regulator client
//! delegates to, and the normalized record types those clients return.

pub mod cache;
pub mod config;
mod errors;
mod query;
pub mod request;
pub mod transport;
pub mod types;

pub use self::cache::ResponseCache;
pub use self::config::{CacheConfig, ClientConfig, RetryPolicy};
pub use self::errors::{ConfigError, Error};
pub use self::query::{ParamValue, QueryParams, SearchQuery, DEFAULT_PAGE_SIZE};
pub use self::request::{AuthProvider, RequestCore, RequestOptions};
pub use self::transport::{RequestBody, ResponseBody, Transport, TransportResponse};
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
