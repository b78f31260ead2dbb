//! Typed failures of a model call.

use thiserror::Error;

/// Why a completion call failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Connection failure, transport timeout, or a body that could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status. `body` is verbatim.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The body was not a valid completion response.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ModelError {
    /// Whether another attempt could succeed.
    ///
    /// Transport failures, 429 and 5xx are retryable; other statuses and
    /// decode failures are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Transport(_) => true,
            ModelError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            ModelError::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ModelError {
        ModelError::Api {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ModelError::Transport("connection refused".into()).is_retryable());
        assert!(api(429).is_retryable());
        assert!(api(500).is_retryable());
        assert!(api(503).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(!api(404).is_retryable());
        assert!(!ModelError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_api_error_display_keeps_body() {
        let err = ModelError::Api {
            status: 401,
            body: r#"{"error":"invalid key"}"#.into(),
        };
        assert_eq!(err.to_string(), r#"API error 401: {"error":"invalid key"}"#);
    }
}
