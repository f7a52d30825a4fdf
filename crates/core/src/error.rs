//! Error types for Lumina.
//!
//! This module defines a unified error enum covering configuration,
//! outbound HTTP, prompt and serialization errors. Outbound failures are split
//! by kind so callers can log what actually went wrong before collapsing
//! them into a softer signal.

use thiserror::Error;

/// Unified error type for Lumina.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential is absent
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Network failure or timeout on an outbound call
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-2xx status
    #[error("Upstream rejected request ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Upstream payload did not match the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether this error should be reported to a caller as a server-side fault.
    ///
    /// Only missing configuration qualifies; everything else is absorbed by
    /// the answer pipeline.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AppError::MissingCredential(_) | AppError::Config(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return AppError::Upstream {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }

        if err.is_decode() {
            AppError::Malformed(err.to_string())
        } else if err.is_timeout() {
            AppError::Transport(format!("request timed out: {}", err))
        } else if err.is_builder() {
            AppError::Config(format!("invalid request: {}", err))
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_is_server_error() {
        assert!(AppError::MissingCredential("GEMINI_API_KEY".to_string()).is_server_error());
        assert!(AppError::Config("bad".to_string()).is_server_error());
        assert!(!AppError::Transport("reset".to_string()).is_server_error());
        assert!(!AppError::Upstream {
            status: 503,
            body: "busy".to_string()
        }
        .is_server_error());
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Serialization(_)));
    }

    #[test]
    fn test_upstream_display() {
        let err = AppError::Upstream {
            status: 429,
            body: "quota".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream rejected request (429): quota");
    }
}
