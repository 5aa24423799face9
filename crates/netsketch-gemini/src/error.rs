//! Error types for the Gemini backend

use netsketch_core::GeneratorError;

/// Gemini backend error
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// No API key available
    #[error("API key is not configured")]
    MissingCredential,

    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the provider
    #[error("provider error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the raw body
        message: String,
    },

    /// Body was not the expected JSON shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Response carried no inline image
    #[error("no image in response")]
    NoImage {
        /// Block or finish reason, when reported
        reason: Option<String>,
    },
}

impl From<GeminiError> for GeneratorError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingCredential => Self::MissingCredential,
            GeminiError::Http(e) => Self::Transport(e.to_string()),
            GeminiError::Api { status, message } => Self::Api { status, message },
            GeminiError::Decode(message) => Self::InvalidResponse(message),
            GeminiError::NoImage { reason } => Self::NoImage { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_generator_error() {
        let err: GeneratorError = GeminiError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        assert!(err.is_retryable());

        let err: GeneratorError = GeminiError::NoImage {
            reason: Some("SAFETY".to_string()),
        }
        .into();
        assert_eq!(err.to_string(), "no image was produced (SAFETY)");

        let err: GeneratorError = GeminiError::Decode("eof".to_string()).into();
        assert!(matches!(err, GeneratorError::InvalidResponse(_)));
    }
}
