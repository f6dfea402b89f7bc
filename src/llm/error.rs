//! LLM error types with retry classification.
//!
//! Transient failures (rate limits, 5xx, network) are retried with backoff;
//! everything else fails the chat turn immediately.

use std::time::Duration;

use thiserror::Error;

/// Classification of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Rate limited (429) - transient, should retry with backoff
    RateLimited,
    /// Server error (5xx) - transient
    ServerError,
    /// Client error (400, 401, 403, 404) - permanent
    ClientError,
    /// Connection failed or timed out - transient
    NetworkError,
    /// Response body did not match the expected shape
    ParseError,
}

impl LlmErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }

    fn base_delay(&self) -> Duration {
        match self {
            LlmErrorKind::RateLimited => Duration::from_secs(5),
            LlmErrorKind::ServerError => Duration::from_secs(2),
            _ => Duration::from_secs(1),
        }
    }
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LlmErrorKind::RateLimited => "Rate limited",
            LlmErrorKind::ServerError => "Server error",
            LlmErrorKind::ClientError => "Client error",
            LlmErrorKind::NetworkError => "Network error",
            LlmErrorKind::ParseError => "Parse error",
        };
        f.write_str(s)
    }
}

/// Error from LLM API calls.
#[derive(Debug, Error)]
#[error("{kind}{}: {message}", .status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
    /// Delay requested by the provider via `Retry-After`
    pub retry_after: Option<Duration>,
}

impl LlmError {
    /// Build an error from a non-success HTTP response.
    pub fn from_status(status_code: u16, message: String, retry_after: Option<Duration>) -> Self {
        Self {
            kind: classify_http_status(status_code),
            status_code: Some(status_code),
            message,
            retry_after,
        }
    }

    pub fn network_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::NetworkError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    pub fn parse_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// Delay before retry `attempt` (0-based): `Retry-After` if given,
    /// otherwise exponential backoff capped at 60 seconds.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let Some(retry_after) = self.retry_after {
            return retry_after;
        }
        let secs = self
            .kind
            .base_delay()
            .as_secs()
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_secs(secs.min(60))
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// Upper bound on total time spent in one request including retries
    pub max_retry_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_duration: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Whether `error` should be retried after `attempt` failed attempts.
    pub fn should_retry(&self, error: &LlmError, attempt: u32) -> bool {
        error.is_transient() && attempt < self.max_retries
    }
}

/// Map an HTTP status code to an error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}
