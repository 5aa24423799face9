//! External collaborator seams
//!
//! The image model and the API-key flow are black boxes to the core.
//! Backends implement these traits; tests substitute mocks.

use crate::error::{CredentialError, GeneratorError};
use crate::types::GenerationRequest;
use netsketch_imaging::ImagePayload;
use std::fmt;

/// External image-generation capability
///
/// Submit image(s) plus a text prompt and render hints, receive one image.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Run one generation request
    async fn generate(&self, request: GenerationRequest) -> Result<ImagePayload, GeneratorError>;
}

/// Provider API key
///
/// `Debug` output never contains the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key; blank input yields `None`
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// The raw key, for request headers
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// API-key/session capability
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Whether a key is currently available
    async fn has_active_credential(&self) -> bool;

    /// Run the provider-side key selection flow
    ///
    /// Resolves once a key has been chosen.
    async fn prompt_for_credential(&self) -> Result<(), CredentialError>;

    /// The active key, if any
    fn api_key(&self) -> Option<ApiKey>;
}

/// Credentials read from an environment variable
///
/// The variable is read on every call, so a key exported after start-up is
/// picked up. There is no interactive selection flow.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    /// Read the key from `var`
    #[inline]
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Environment variable name
    #[inline]
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

#[async_trait::async_trait]
impl CredentialProvider for EnvCredentials {
    async fn has_active_credential(&self) -> bool {
        self.api_key().is_some()
    }

    async fn prompt_for_credential(&self) -> Result<(), CredentialError> {
        Err(CredentialError::Unavailable(format!(
            "export {} and restart",
            self.var
        )))
    }

    fn api_key(&self) -> Option<ApiKey> {
        std::env::var(&self.var).ok().and_then(ApiKey::new)
    }
}
