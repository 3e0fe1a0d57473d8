//! Error types for the request core and client construction.

use std::time::Duration;

use crate::types::Regulator;

/// Maximum number of response-body bytes kept on [`Error::Api`].
const MAX_BODY_SNIPPET: usize = 2000;

/// Errors that can occur when calling a regulator API.
///
/// Every failure an operation can surface is exactly one of these variants.
/// HTTP-level outcomes are classified once by the request core; the transport
/// itself only ever produces [`Error::NetworkFailure`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request resolved but the target entity does not exist.
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// The regulator rejected the request with HTTP 429.
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// The credential was missing, invalid or not permitted (HTTP 401/403).
    #[error("Authentication failed with status {status}")]
    AuthenticationFailed { status: u16 },

    /// The exchange could not be completed (timeout, connection failure).
    #[error("Network failure after {attempts} attempt(s): {source}")]
    NetworkFailure {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Any other non-success status, or a body the operation could not use.
    #[error("Request failed with status {status} {status_text}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },
}

impl Error {
    /// Builds an [`Error::Api`], truncating the body for diagnostics.
    pub fn api(status: u16, status_text: impl Into<String>, body: &str) -> Self {
        Error::Api {
            status,
            status_text: status_text.into(),
            body: truncate_body(body),
        }
    }

    /// True for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::RateLimited { .. } => Some(429),
            Error::AuthenticationFailed { status } => Some(*status),
            Error::Api { status, .. } => Some(*status),
            Error::NetworkFailure { .. } => None,
        }
    }
}

/// Errors raised synchronously while constructing a client.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The regulator requires a credential and none was configured.
    #[error("{regulator} requires an API key but none was configured")]
    MissingCredential { regulator: Regulator },

    /// The credential cannot be sent as an HTTP header value.
    #[error("{regulator} API key contains characters not allowed in a header")]
    InvalidCredential { regulator: Regulator },

    /// The base URL override does not parse.
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}

pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_SNIPPET {
        return body.to_string();
    }
    let mut end = MAX_BODY_SNIPPET;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_cuts_long_bodies_on_char_boundary() {
        let body = "£".repeat(MAX_BODY_SNIPPET);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert!(out.len() < body.len());
    }

    #[test]
    fn status_per_variant() {
        assert_eq!(
            Error::NotFound {
                resource: "x".into()
            }
            .status(),
            Some(404)
        );
        assert_eq!(Error::RateLimited { retry_after: None }.status(), Some(429));
        assert_eq!(Error::AuthenticationFailed { status: 403 }.status(), Some(403));
        assert_eq!(Error::api(502, "Bad Gateway", "").status(), Some(502));
    }

    #[test]
    fn config_error_display_names_regulator() {
        let err = ConfigError::MissingCredential {
            regulator: Regulator::Ccew,
        };
        assert!(err.to_string().contains("CCEW"));
    }
}
