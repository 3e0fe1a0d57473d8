//! Per-client configuration: credential, base URL, timeout, retry and cache tuning.

use std::time::Duration;

use rand::Rng;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry tuning for the transport.
///
/// The backoff constants are local defaults; none of the regulators publish
/// retry guidance.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Scale each delay by a random factor in `0.8..1.2`.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(30000),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Total attempts a request may take, the first included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
    /// capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(30);
        let exp = 1u64 << shift;
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let capped = base_ms.saturating_mul(exp).min(max_ms);
        if !self.jitter {
            return Duration::from_millis(capped);
        }
        let factor = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((capped as f64 * factor) as u64)
    }
}

/// Response cache tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
            max_entries: 500,
        }
    }
}

/// Configuration for one regulator client.
///
/// Every knob has a default and can be overridden independently, either with
/// the `with_*` builders or from environment variables via [`ClientConfig::from_env`].
#[derive(Clone, PartialEq, Default)]
pub struct ClientConfig {
    /// API key sent in the regulator's auth header.
    pub credential: Option<String>,
    /// Overrides the regulator's production base URL.
    pub base_url: Option<String>,
    /// Per-request timeout. `None` uses [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
    pub cache: CacheConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("cache", &self.cache)
            .finish()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from `{PREFIX}_API_KEY`, `{PREFIX}_BASE_URL`,
    /// `{PREFIX}_TIMEOUT_SECS`, `{PREFIX}_RETRY_MAX`, `{PREFIX}_RETRY_BASE_MS`,
    /// `{PREFIX}_RETRY_MAX_MS`, `{PREFIX}_CACHE`, `{PREFIX}_CACHE_TTL_SECS` and
    /// `{PREFIX}_CACHE_MAX_ENTRIES`. Missing or unparsable values keep the default.
    pub fn from_env(prefix: &str) -> Self {
        let defaults = Self::default();
        let var = |name: &str| env_string(&format!("{}_{}", prefix, name));
        Self {
            credential: var("API_KEY"),
            base_url: var("BASE_URL"),
            timeout: var("TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
            retry: RetryPolicy {
                max_retries: parse_or(var("RETRY_MAX"), defaults.retry.max_retries),
                base_delay: Duration::from_millis(parse_or(
                    var("RETRY_BASE_MS"),
                    defaults.retry.base_delay.as_millis() as u64,
                )),
                max_delay: Duration::from_millis(parse_or(
                    var("RETRY_MAX_MS"),
                    defaults.retry.max_delay.as_millis() as u64,
                )),
                jitter: defaults.retry.jitter,
            },
            cache: CacheConfig {
                enabled: var("CACHE")
                    .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"))
                    .unwrap_or(defaults.cache.enabled),
                ttl: Duration::from_secs(parse_or(
                    var("CACHE_TTL_SECS"),
                    defaults.cache.ttl.as_secs(),
                )),
                max_entries: parse_or(var("CACHE_MAX_ENTRIES"), defaults.cache.max_entries),
            },
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, base_delay: Duration) -> Self {
        self.retry.base_delay = base_delay;
        self
    }

    pub fn with_retry_max_delay(mut self, max_delay: Duration) -> Self {
        self.retry.max_delay = max_delay;
        self
    }

    pub fn with_retry_jitter(mut self, jitter: bool) -> Self {
        self.retry.jitter = jitter;
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl = ttl;
        self
    }

    pub fn with_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.cache.max_entries = max_entries;
        self
    }

    /// The credential, if one is set and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Effective request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
