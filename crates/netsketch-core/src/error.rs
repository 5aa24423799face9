//! Error types for Netsketch Core
//!
//! Provides error handling for:
//! - Rejected workflow state transitions
//! - External image-generation failures
//! - Credential availability
//! - Orchestration failures surfaced to the user
//! - Configuration loading

use crate::types::{BatchId, VariantId};

/// Main orchestration error type
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// No API key available; the request was not sent
    #[error("no API key is configured; select a key before generating diagrams")]
    MissingCredential,

    /// Workflow state rejected the transition
    #[error("invalid workflow transition: {0}")]
    State(#[from] StateError),

    /// Edit request failed; the selected variant is unchanged
    #[error("edit failed: {0}")]
    EditFailed(#[source] GeneratorError),

    /// Credential provider failed
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Background image preparation task did not complete
    #[error("image preparation task failed: {0}")]
    Preparation(String),
}

impl StudioError {
    /// Check if the user can fix this by selecting an API key
    #[inline]
    #[must_use]
    pub fn needs_credential(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::EditFailed(GeneratorError::MissingCredential)
        )
    }

    /// Check if re-submitting the same request may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EditFailed(e) => e.is_retryable(),
            Self::Preparation(_) => true,
            _ => false,
        }
    }
}

/// Rejected state transition; the state is left unchanged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// No source image uploaded
    #[error("no source image has been uploaded")]
    NoSource,

    /// A generation batch is already running
    #[error("generation already in progress")]
    GenerationInProgress,

    /// An edit is already running
    #[error("edit already in progress")]
    EditInProgress,

    /// No variant is selected
    #[error("no variant selected")]
    NoSelection,

    /// Variant id is not part of the current batch
    #[error("unknown variant: {0}")]
    UnknownVariant(VariantId),

    /// Variant has no image to select or edit
    #[error("variant {0} is not ready")]
    VariantNotReady(VariantId),

    /// Variant already holds a result for this batch
    #[error("variant {0} is already resolved")]
    AlreadyResolved(VariantId),

    /// Result belongs to a batch that has since been replaced
    #[error("stale batch {got} (current: {current:?})")]
    StaleBatch {
        /// Batch the result was produced for
        got: BatchId,
        /// Batch currently held by the state
        current: Option<BatchId>,
    },
}

/// External image-generation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// No API key available to the backend
    #[error("API key is not configured")]
    MissingCredential,

    /// Network or transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider returned an error status
    #[error("provider error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider message
        message: String,
    },

    /// Response contained no image part
    #[error("no image was produced{}", reason_suffix(.reason))]
    NoImage {
        /// Block or finish reason reported by the provider
        reason: Option<String>,
    },

    /// Response body could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GeneratorError {
    /// Check if a retry may succeed without changing the request
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::NoImage { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredential | Self::InvalidResponse(_) => false,
        }
    }

    /// Provider-facing message without the category prefix
    ///
    /// This is what a failed variant records.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Transport(message)
            | Self::InvalidResponse(message)
            | Self::Api { message, .. } => message.clone(),
            Self::MissingCredential | Self::NoImage { .. } => self.to_string(),
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

/// Credential provider errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The environment offers no way to select a key
    #[error("API key selection is not available here: {0}")]
    Unavailable(String),

    /// The user dismissed the selection
    #[error("no API key was selected")]
    Dismissed,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StyleCategory;

    #[test]
    fn studio_error_display() {
        let err = StudioError::MissingCredential;
        assert!(err.to_string().contains("API key"));

        let err = StudioError::from(StateError::NoSelection);
        assert!(err.to_string().contains("no variant selected"));
    }

    #[test]
    fn studio_error_needs_credential() {
        assert!(StudioError::MissingCredential.needs_credential());
        assert!(StudioError::EditFailed(GeneratorError::MissingCredential).needs_credential());
        assert!(!StudioError::State(StateError::NoSource).needs_credential());
    }

    #[test]
    fn generator_error_is_retryable() {
        assert!(GeneratorError::Transport("reset".to_string()).is_retryable());
        assert!(GeneratorError::Api {
            status: 503,
            message: "overloaded".to_string()
        }
        .is_retryable());
        assert!(!GeneratorError::Api {
            status: 400,
            message: "bad request".to_string()
        }
        .is_retryable());
        assert!(!GeneratorError::MissingCredential.is_retryable());
    }

    #[test]
    fn generator_error_detail_drops_prefix() {
        let err = GeneratorError::Transport("timeout".to_string());
        assert_eq!(err.to_string(), "transport error: timeout");
        assert_eq!(err.detail(), "timeout");
        assert_eq!(
            GeneratorError::Api {
                status: 429,
                message: "quota exceeded".to_string()
            }
            .detail(),
            "quota exceeded"
        );
        assert_eq!(
            GeneratorError::NoImage { reason: None }.detail(),
            "no image was produced"
        );
    }

    #[test]
    fn no_image_display_includes_reason() {
        let err = GeneratorError::NoImage {
            reason: Some("SAFETY".to_string()),
        };
        assert_eq!(err.to_string(), "no image was produced (SAFETY)");
        let err = GeneratorError::NoImage { reason: None };
        assert_eq!(err.to_string(), "no image was produced");
    }

    #[test]
    fn state_error_display() {
        let id = VariantId::new(StyleCategory::Flat2d, 1);
        assert_eq!(
            StateError::VariantNotReady(id).to_string(),
            "variant flat-2d-1 is not ready"
        );
    }
}
