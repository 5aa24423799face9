//! Studio configuration

use crate::error::ConfigError;
use crate::types::{AspectRatio, ImageSize, RenderOptions};
use netsketch_imaging::PrepareOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default image model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Default REST endpoint of the image model
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Studio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Model name
    pub model: String,
    /// REST endpoint base URL
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_var: String,
    /// Render hints sent with every request
    pub render: RenderOptions,
    /// Upload preparation parameters
    pub prepare: PrepareOptions,
}

impl StudioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With model name
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With endpoint base URL
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// With render hints
    #[inline]
    #[must_use]
    pub fn with_render(mut self, aspect_ratio: &str, image_size: &str) -> Self {
        self.render = RenderOptions {
            aspect_ratio: AspectRatio(aspect_ratio.to_string()),
            image_size: ImageSize(image_size.to_string()),
        };
        self
    }

    /// With preparation parameters
    #[inline]
    #[must_use]
    pub fn with_prepare(mut self, prepare: PrepareOptions) -> Self {
        self.prepare = prepare;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` for malformed TOML, `ConfigError::Invalid` for
    /// out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, plus the errors of
    /// [`StudioConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), model = %config.model, "loaded config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be an http(s) URL, got `{}`",
                self.endpoint
            )));
        }
        if self.prepare.max_dimension == 0 {
            return Err(ConfigError::Invalid(
                "prepare.max_dimension must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.prepare.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "prepare.jpeg_quality must be 1-100, got {}",
                self.prepare.jpeg_quality
            )));
        }
        Ok(())
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_var: DEFAULT_API_KEY_VAR.to_string(),
            render: RenderOptions::default(),
            prepare: PrepareOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = StudioConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.prepare.max_dimension, 1536);
        assert_eq!(config.prepare.jpeg_quality, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StudioConfig::from_toml_str(
            r#"
            model = "gemini-3-pro-image-preview"

            [render]
            aspect_ratio = "16:9"
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "gemini-3-pro-image-preview");
        assert_eq!(config.render.aspect_ratio.0, "16:9");
        assert_eq!(config.render.image_size.0, "1K");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn invalid_quality_rejected() {
        let err = StudioConfig::from_toml_str("[prepare]\njpeg_quality = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = StudioConfig::from_toml_str("model = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = \"http://localhost:8080\"").unwrap();

        let config = StudioConfig::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080");
    }

    #[test]
    fn load_missing_file() {
        let err = StudioConfig::load(Path::new("/nonexistent/netsketch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn builders() {
        let config = StudioConfig::new()
            .with_model("m")
            .with_endpoint("https://example.test")
            .with_render("1:1", "2K");
        assert_eq!(config.model, "m");
        assert_eq!(config.render.image_size.0, "2K");
    }
}
