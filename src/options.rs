use std::time::Duration;

use crate::RetryPolicy;

/// Configures timeout, retry, cache and fan-out behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry/backoff policy applied to every upstream request.
    pub retry: RetryPolicy,
    /// Time-to-live of cached absolute-URL lookups, in milliseconds.
    pub cache_ttl_ms: u64,
    /// Ceiling on concurrent workers used when resolving reference lists.
    pub max_workers: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 3_000,
            retry: RetryPolicy::default(),
            cache_ttl_ms: 300_000,
            max_workers: 10,
        }
    }
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Builds options from the environment, falling back to defaults.
    ///
    /// Reads (all optional):
    /// - `SWAPI_TIMEOUT_MS`
    /// - `SWAPI_MAX_RETRIES`
    /// - `SWAPI_CACHE_TTL_MS`
    /// - `SWAPI_MAX_WORKERS`
    ///
    /// Returns an error if a variable is set but not a non-negative integer.
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();
        if let Some(value) = parse_var(&lookup, "SWAPI_TIMEOUT_MS")? {
            opts.timeout_ms = value;
        }
        if let Some(value) = parse_var(&lookup, "SWAPI_MAX_RETRIES")? {
            opts.retry.max_retries = value;
        }
        if let Some(value) = parse_var(&lookup, "SWAPI_CACHE_TTL_MS")? {
            opts.cache_ttl_ms = value;
        }
        if let Some(value) = parse_var::<_, usize>(&lookup, "SWAPI_MAX_WORKERS")? {
            if value == 0 {
                return Err("SWAPI_MAX_WORKERS must be at least 1".to_owned());
            }
            opts.max_workers = value;
        }
        Ok(opts)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> std::result::Result<Option<T>, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| format!("{key} must be a non-negative integer, got '{trimmed}'"))
}
