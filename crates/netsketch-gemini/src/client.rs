//! `generateContent` client

use crate::error::GeminiError;
use crate::wire::{error_message, GenerateContentRequest, GenerateContentResponse};
use netsketch_core::{
    CredentialProvider, GenerationRequest, GeneratorError, ImageGenerator, ImagePayload,
    StudioConfig,
};
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini image-model client
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiClient {
    /// Build a client for the configured endpoint and model
    ///
    /// # Errors
    /// `GeminiError::Http` when the HTTP client cannot be constructed.
    pub fn new(
        config: &StudioConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, GeminiError> {
        Self::with_timeout(config, credentials, DEFAULT_TIMEOUT)
    }

    /// Build a client with an explicit request timeout
    ///
    /// # Errors
    /// `GeminiError::Http` when the HTTP client cannot be constructed.
    pub fn with_timeout(
        config: &StudioConfig,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            credentials,
        })
    }

    /// Full URL of the `generateContent` call
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Send one request and extract the image
    ///
    /// The key is read at call time so a key selected after start-up is used.
    ///
    /// # Errors
    /// See [`GeminiError`].
    pub async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ImagePayload, GeminiError> {
        let key = self
            .credentials
            .api_key()
            .ok_or(GeminiError::MissingCredential)?;
        let body = GenerateContentRequest::from(request);

        tracing::debug!(
            model = %self.model,
            images = request.images.len(),
            "sending generateContent request"
        );

        let response = self
            .http
            .post(self.url())
            .header(API_KEY_HEADER, key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| GeminiError::Decode(e.to_string()))?;
        let image = parsed.into_image()?;
        tracing::debug!(media_type = %image.media_type, len = image.len(), "image received");
        Ok(image)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<ImagePayload, GeneratorError> {
        self.generate_content(&request).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsketch_core::{ApiKey, CredentialError, RenderOptions};

    struct NoKey;

    #[async_trait::async_trait]
    impl CredentialProvider for NoKey {
        async fn has_active_credential(&self) -> bool {
            false
        }

        async fn prompt_for_credential(&self) -> Result<(), CredentialError> {
            Err(CredentialError::Dismissed)
        }

        fn api_key(&self) -> Option<ApiKey> {
            None
        }
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let config = StudioConfig::new()
            .with_endpoint("http://localhost:9000/v1beta/")
            .with_model("gemini-test");
        let client = GeminiClient::new(&config, Arc::new(NoKey)).unwrap();
        assert_eq!(
            client.url(),
            "http://localhost:9000/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_sending() {
        // Unroutable endpoint: reaching the network would be a transport error
        let config = StudioConfig::new().with_endpoint("http://127.0.0.1:9");
        let client = GeminiClient::new(&config, Arc::new(NoKey)).unwrap();
        let request = GenerationRequest {
            images: vec![],
            prompt: "p".to_string(),
            options: RenderOptions::default(),
        };

        let err = client.generate(request).await.unwrap_err();
        assert_eq!(err, GeneratorError::MissingCredential);
    }
}
