use std::fmt;
use std::sync::Arc;

use reqwest::{header, StatusCode};
use serde_json::Value as JsonValue;

use crate::{
    cache::ResponseCache, wire::ListPage, ClientOptions, Delay, QueryParams, Resource, Result,
    SwapiError,
};

/// Public SWAPI deployment used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";

/// Fixed page size of upstream list endpoints.
pub const UPSTREAM_PAGE_SIZE: usize = 10;

#[derive(Clone)]
/// Resilient HTTP client for the SWAPI catalog.
///
/// Cloning is cheap; clones share the connection pool and the response cache.
pub struct SwapiClient {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
    upstream_page_size: usize,
    cache: Arc<ResponseCache>,
    delay: Delay,
}

impl fmt::Debug for SwapiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapiClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .field("upstream_page_size", &self.upstream_page_size)
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

impl Default for SwapiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Failure of a single attempt that the retry loop may try again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Retryable {
    Timeout,
    Unreachable,
    Status(u16),
}

impl Retryable {
    fn into_error(self, url: String, attempts: usize) -> SwapiError {
        match self {
            Self::Timeout => SwapiError::Timeout { url, attempts },
            Self::Unreachable => SwapiError::UpstreamService { status: None, url },
            Self::Status(status) => SwapiError::UpstreamService {
                status: Some(status),
                url,
            },
        }
    }
}

impl SwapiClient {
    /// Creates a client for the given API root, e.g. `https://swapi.dev/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let options = ClientOptions::default();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim().trim_end_matches('/').to_owned(),
            cache: Arc::new(ResponseCache::new(options.cache_ttl())),
            options,
            upstream_page_size: UPSTREAM_PAGE_SIZE,
            delay: Delay::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `SWAPI_BASE_URL` (defaults to [`DEFAULT_BASE_URL`]) plus the
    /// variables documented on [`ClientOptions::from_env`].
    pub fn from_env() -> std::result::Result<Self, String> {
        let base_url = std::env::var("SWAPI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let options = ClientOptions::from_env()?;
        Ok(Self::new(base_url).with_options(options))
    }

    /// Applies timeout, retry, cache and fan-out options.
    ///
    /// Replaces the response cache, so call this before sharing clones.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.cache = Arc::new(ResponseCache::new(opts.cache_ttl()));
        self.options = opts;
        self
    }

    /// Replaces the sleep used between retry attempts.
    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = delay;
        self
    }

    /// Overrides the upstream list page size (minimum 1).
    pub fn with_upstream_page_size(mut self, size: usize) -> Self {
        self.upstream_page_size = size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn upstream_page_size(&self) -> usize {
        self.upstream_page_size
    }

    /// Fetches a resource by path relative to the base URL.
    ///
    /// Never cached: list results depend on mutable upstream state.
    pub async fn get<P: Into<QueryParams>>(&self, resource: &str, params: P) -> Result<JsonValue> {
        let url = format!("{}{}", self.base_url, normalize_path(resource));
        self.send_with_retry(&url, &params.into()).await
    }

    /// Fetches an absolute URL, such as a cross-reference inside another resource.
    ///
    /// Successful responses are cached for the configured TTL.
    pub async fn get_by_url<P: Into<QueryParams>>(&self, url: &str, params: P) -> Result<JsonValue> {
        let params = params.into();
        let key = ResponseCache::key(url, &params);
        if let Some(value) = self.cache.get(&key) {
            return Ok(value);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(key = %key, "cache miss");

        let value = self.send_with_retry(url, &params).await?;
        self.cache.set(key, value.clone());
        Ok(value)
    }

    /// Fetches one upstream page of a collection.
    pub async fn list(
        &self,
        resource: Resource,
        page: usize,
        search: Option<&str>,
    ) -> Result<JsonValue> {
        self.get(resource.path(), QueryParams::page(page, search))
            .await
    }

    pub(crate) async fn fetch_list_page(
        &self,
        resource: &str,
        page: usize,
        search: Option<&str>,
    ) -> Result<ListPage> {
        let body = self.get(resource, QueryParams::page(page, search)).await?;
        ListPage::from_json(body)
    }

    /// Drops every cached lookup.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached entries, including expired ones not yet evicted.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Issues one logical GET with retry, backoff and error classification.
    ///
    /// Dropping the returned future cancels the in-flight attempt and any
    /// pending backoff.
    async fn send_with_retry(&self, url: &str, params: &QueryParams) -> Result<JsonValue> {
        let attempts = self.options.retry.total_attempts();
        let mut attempt = 0usize;
        loop {
            let request = self
                .http
                .get(url)
                .query(params.as_pairs())
                .header(header::ACCEPT, "application/json")
                .timeout(self.options.timeout())
                .build()
                .map_err(|_| SwapiError::UpstreamService {
                    status: None,
                    url: url.to_owned(),
                })?;
            let target = request.url().to_string();

            let failure = match self.send_once(request, &target).await {
                Ok(result) => return result,
                Err(failure) => failure,
            };

            if attempt + 1 >= attempts {
                return Err(failure.into_error(target, attempts));
            }

            let delay = self.options.retry.backoff(attempt);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                url = %target,
                attempt,
                failure = ?failure,
                delay_ms = delay.as_millis() as u64,
                "retrying upstream request"
            );

            self.delay.wait(delay).await;
            attempt += 1;
        }
    }

    /// Runs one attempt. `Ok` carries the final outcome, `Err` a retryable failure.
    async fn send_once(
        &self,
        request: reqwest::Request,
        target: &str,
    ) -> std::result::Result<Result<JsonValue>, Retryable> {
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|err| classify_transport(&err))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Err(SwapiError::NotFound {
                url: target.to_owned(),
            }));
        }

        if !status.is_success() {
            let code = status.as_u16();
            if self.options.retry.is_retryable_status(code) {
                return Err(Retryable::Status(code));
            }
            return Ok(Err(SwapiError::UpstreamService {
                status: Some(code),
                url: target.to_owned(),
            }));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| classify_transport(&err))?;
        Ok(serde_json::from_slice(&body).map_err(|err| {
            SwapiError::BadResponse(format!("invalid JSON from {target}: {err}"))
        }))
    }
}

fn classify_transport(err: &reqwest::Error) -> Retryable {
    if err.is_timeout() {
        Retryable::Timeout
    } else {
        Retryable::Unreachable
    }
}

fn normalize_path(resource: &str) -> String {
    let trimmed = resource.trim();
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_path, SwapiClient, UPSTREAM_PAGE_SIZE};

    #[test]
    fn normalize_path_adds_leading_slash() {
        assert_eq!(normalize_path("films/"), "/films/");
        assert_eq!(normalize_path(" /people/1/ "), "/people/1/");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = SwapiClient::new("https://swapi.dev/api/");
        assert_eq!(client.base_url(), "https://swapi.dev/api");
        assert_eq!(client.upstream_page_size(), UPSTREAM_PAGE_SIZE);
    }

    #[test]
    fn upstream_page_size_is_at_least_one() {
        let client = SwapiClient::default().with_upstream_page_size(0);
        assert_eq!(client.upstream_page_size(), 1);
    }

    #[test]
    fn debug_lists_configuration() {
        let client = SwapiClient::new("http://localhost:9/api");
        let debug = format!("{client:?}");
        assert!(debug.contains("http://localhost:9/api"));
        assert!(debug.contains("cached_entries"));
    }
}
