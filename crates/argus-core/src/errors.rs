use std::time::Duration;

/// Typed error hierarchy for backend calls.
/// Classifies errors as fatal (don't retry), retryable, or operational.
/// This layer never retries; the classification exists for injected
/// backends and wrappers that do.
#[derive(Clone, Debug, thiserror::Error)]
pub enum BackendError {
    // Fatal, never retried
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("context window exceeded: {actual} > {limit}")]
    ContextWindowExceeded { limit: usize, actual: usize },
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // Retryable
    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },
    #[error("backend overloaded")]
    Overloaded,
    #[error("network error: {0}")]
    NetworkError(String),

    // Operational
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    #[error("cancelled")]
    Cancelled,
}

impl BackendError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ServerError { .. }
                | Self::Overloaded
                | Self::NetworkError(_)
        )
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_)
                | Self::ContextWindowExceeded { .. }
                | Self::InvalidRequest(_)
        )
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::ContextWindowExceeded { .. } => "context_window_exceeded",
            Self::InvalidRequest(_) => "invalid_request",
            Self::RateLimited { .. } => "rate_limited",
            Self::ServerError { .. } => "server_error",
            Self::Overloaded => "overloaded",
            Self::NetworkError(_) => "network_error",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(BackendError::RateLimited { retry_after: None }.is_retryable());
        assert!(BackendError::ServerError { status: 500, body: "err".into() }.is_retryable());
        assert!(BackendError::Overloaded.is_retryable());
        assert!(BackendError::NetworkError("tcp".into()).is_retryable());
    }

    #[test]
    fn fatal_classification() {
        assert!(BackendError::AuthenticationFailed("bad key".into()).is_fatal());
        assert!(BackendError::ContextWindowExceeded { limit: 200_000, actual: 250_000 }.is_fatal());
        assert!(BackendError::InvalidRequest("bad".into()).is_fatal());
    }

    #[test]
    fn not_retryable_and_not_fatal() {
        let timeout = BackendError::Timeout(Duration::from_secs(30));
        assert!(!timeout.is_retryable());
        assert!(!timeout.is_fatal());

        let cancelled = BackendError::Cancelled;
        assert!(!cancelled.is_retryable());
        assert!(!cancelled.is_fatal());
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(BackendError::Cancelled.error_kind(), "cancelled");
        assert_eq!(BackendError::Overloaded.error_kind(), "overloaded");
        assert_eq!(
            BackendError::RateLimited { retry_after: None }.error_kind(),
            "rate_limited"
        );
    }
}
