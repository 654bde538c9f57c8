/// Error type returned by this crate.
///
/// The four kinds are mutually exclusive and are never wrapped further by
/// the client, window or fan-out layers.
#[derive(Debug, thiserror::Error)]
pub enum SwapiError {
    /// Transport deadline exceeded on every attempt.
    #[error("timeout calling {url} after {attempts} attempt(s)")]
    Timeout {
        /// Target that timed out, or `fan-out of N url(s)` when the deadline
        /// of [`SwapiClient::resolve_within`](crate::SwapiClient::resolve_within) expired.
        url: String,
        /// Total attempts made, including the first. Always 1 for an expired
        /// fan-out deadline.
        attempts: usize,
    },
    /// Non-success, non-404 status, or upstream unreachable.
    ///
    /// `status` is `None` when no HTTP response was ever received
    /// (connection refused, DNS failure).
    #[error("upstream error for {url}: {}", describe_status(.status))]
    UpstreamService {
        /// Last HTTP status observed, if any.
        status: Option<u16>,
        /// Target of the failing request.
        url: String,
    },
    /// Success status with a body that is not valid JSON, or not the expected shape.
    #[error("bad response: {0}")]
    BadResponse(String),
    /// Upstream answered 404.
    ///
    /// For list endpoints this also means "page past the end".
    #[error("not found: {url}")]
    NotFound {
        /// Target that returned 404.
        url: String,
    },
}

impl SwapiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status an outer API layer is expected to expose for this error.
    pub fn status_hint(&self) -> u16 {
        match self {
            Self::Timeout { .. } => 504,
            Self::NotFound { .. } => 404,
            Self::UpstreamService { .. } | Self::BadResponse(_) => 502,
        }
    }
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "unreachable".to_owned(),
    }
}
