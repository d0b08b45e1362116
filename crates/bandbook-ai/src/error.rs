//! Error types for setlist suggestions.

use thiserror::Error;

/// Errors that can occur while asking for or processing a suggestion.
#[derive(Debug, Error)]
pub enum AiError {
    /// The text-generation API answered with a non-success status.
    #[error("HTTP {status} from {source_name}: {message}")]
    Http {
        source_name: String,
        status: u16,
        message: String,
    },

    /// The API returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// The response could not be parsed into a suggestion.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the core domain layer.
    #[error("store error: {0}")]
    Store(#[from] bandbook_core::Error),

    #[error("no API key configured for the text-generation service (set BAND_AI_API_KEY)")]
    MissingApiKey,

    #[error("the song catalog is empty; add songs before asking for a suggestion")]
    EmptyCatalog,

    /// Nothing the generator proposed matched the catalog.
    #[error("suggestion contained no usable songs ({dropped} references dropped)")]
    EmptySuggestion { dropped: usize },
}

impl AiError {
    /// Returns `true` when the error is transient and the request may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Convenience alias for suggestion results.
pub type AiResult<T> = std::result::Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_transient() {
        let err = AiError::Http {
            source_name: "api".into(),
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        let err = AiError::Http {
            source_name: "api".into(),
            status: 401,
            message: "bad key".into(),
        };
        assert!(!err.is_transient());
        assert!(!AiError::MissingApiKey.is_transient());
        assert!(!AiError::EmptySuggestion { dropped: 3 }.is_transient());
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let err = AiError::RateLimited {
            source_name: "api".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "rate limited by api");
    }
}
