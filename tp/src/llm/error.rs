//! LLM error types

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Retry delay assumed when a 429 carries no usable `retry-after` header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Missing API credentials: {0}")]
    MissingCredentials(String),

    #[error("Rate limited (429): {message}, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration, message: String },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

/// Coarse classification callers use to decide how to react to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials missing, invalid or revoked
    Authentication,
    /// Request rate or account quota exhausted
    RateLimit,
    /// Anything else between us and the model
    Transport,
}

/// Error envelope shared by the OpenAI and Anthropic APIs
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl LlmError {
    /// Build the error for a non-success HTTP response
    ///
    /// `retry_after` is the parsed `retry-after` header in seconds, if any.
    /// JSON error bodies are reduced to their `error.message`; anything else
    /// is kept verbatim.
    pub fn from_status(status: u16, retry_after: Option<u64>, body: &str) -> Self {
        debug!(%status, ?retry_after, body_len = body.len(), "LlmError::from_status: called");
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => match parsed.error.code {
                Some(code) => format!("{} [{}]", parsed.error.message, code),
                None => parsed.error.message,
            },
            Err(_) => body.trim().to_string(),
        };

        match status {
            401 | 403 => LlmError::Authentication { status, message },
            429 => LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
                message,
            },
            _ => LlmError::ApiError { status, message },
        }
    }

    /// Map a reqwest failure, keeping timeouts distinct from other network errors
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(err)
        }
    }

    /// Classify this error for callers
    pub fn kind(&self) -> FailureKind {
        match self {
            LlmError::Authentication { .. } | LlmError::MissingCredentials(_) => FailureKind::Authentication,
            LlmError::RateLimited { .. } => FailureKind::RateLimit,
            _ => FailureKind::Transport,
        }
    }

    /// HTTP status associated with this error, if there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Authentication { status, .. } | LlmError::ApiError { status, .. } => Some(*status),
            LlmError::RateLimited { .. } => Some(429),
            LlmError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is retryable by the client's internal policy
    ///
    /// Rate limits are never retried here.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::ApiError { status, .. } => *status == 408 || *status >= 500,
            LlmError::Network(_) => true,
            LlmError::Timeout(_) => true,
            LlmError::Authentication { .. }
            | LlmError::MissingCredentials(_)
            | LlmError::RateLimited { .. }
            | LlmError::InvalidResponse(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_unauthorized() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#;
        let err = LlmError::from_status(401, None, body);

        assert_eq!(err.kind(), FailureKind::Authentication);
        assert_eq!(err.status(), Some(401));
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid_api_key"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_status_quota() {
        let body = r#"{"error": {"message": "You exceeded your current quota", "code": "insufficient_quota"}}"#;
        let err = LlmError::from_status(429, Some(7), body);

        assert_eq!(err.kind(), FailureKind::RateLimit);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("quota"));
    }

    #[test]
    fn test_from_status_rate_limit_default_retry() {
        let err = LlmError::from_status(429, None, "slow down");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(DEFAULT_RETRY_AFTER_SECS)));
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn test_from_status_plain_body() {
        let err = LlmError::from_status(500, None, "  upstream exploded \n");
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "API error 500: upstream exploded");
    }

    #[test]
    fn test_forbidden_is_authentication() {
        let err = LlmError::from_status(403, None, "");
        assert_eq!(err.kind(), FailureKind::Authentication);
    }

    #[test]
    fn test_missing_credentials_is_authentication() {
        let err = LlmError::MissingCredentials("OPENAI_API_KEY is not set".to_string());
        assert_eq!(err.kind(), FailureKind::Authentication);
        assert_eq!(err.status(), None);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_is_retryable() {
        assert!(
            LlmError::ApiError {
                status: 502,
                message: "Bad gateway".to_string()
            }
            .is_retryable()
        );

        assert!(
            LlmError::ApiError {
                status: 408,
                message: "Request timeout".to_string()
            }
            .is_retryable()
        );

        // 4xx errors should not be retryable
        assert!(
            !LlmError::ApiError {
                status: 400,
                message: "Bad request".to_string()
            }
            .is_retryable()
        );

        // Rate limits go back to the caller
        assert!(
            !LlmError::RateLimited {
                retry_after: Duration::from_secs(60),
                message: String::new()
            }
            .is_retryable()
        );

        assert!(LlmError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!LlmError::InvalidResponse("Bad JSON".to_string()).is_retryable());
    }

    #[test]
    fn test_transport_kinds() {
        assert_eq!(LlmError::Timeout(Duration::from_secs(1)).kind(), FailureKind::Transport);
        assert_eq!(LlmError::InvalidResponse("x".to_string()).kind(), FailureKind::Transport);
        assert_eq!(LlmError::Timeout(Duration::from_secs(1)).status(), None);
    }
}
