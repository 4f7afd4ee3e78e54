//! Error types for the upstream client adapters

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling an upstream service.
///
/// The coordinator does not differentiate transport failures from
/// remote-reported errors; both surface as an upstream failure.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (transport, timeout, connect)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream returned an error status code
    #[error("upstream error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the upstream
        message: String,
    },

    /// Failed to parse response
    #[error("failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found_matches_only_404() {
        assert!(ClientError::api_error(404, "missing").is_not_found());
        assert!(!ClientError::api_error(500, "boom").is_not_found());
        assert!(!ClientError::ParseError("bad".to_string()).is_not_found());
    }
}
