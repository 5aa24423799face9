//! Testing utilities for Netsketch workspace
//!
//! Shared test doubles, fixtures, and assertions.

#![allow(missing_docs)]

use image::{ImageFormat, Rgb, RgbImage};
use netsketch_core::{
    ApiKey, CredentialError, CredentialProvider, DiagramStudio, GenerationRequest, GeneratorError,
    ImageGenerator, ImagePayload, MediaType, StudioConfig,
};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;

/// Callback run before the n-th generator call (0-based)
pub type CallHook = Box<dyn Fn(usize) + Send + Sync>;

/// Generator that replays a fixed script of results
///
/// Calls beyond the script return [`ScriptedGenerator::fallback`].
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<ImagePayload, GeneratorError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    hook: Option<CallHook>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue results in call order
    pub fn with_script(
        results: impl IntoIterator<Item = Result<ImagePayload, GeneratorError>>,
    ) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Run `hook` at the start of every call
    #[must_use]
    pub fn with_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Result returned once the script is exhausted
    pub fn fallback() -> ImagePayload {
        tagged_payload(0xAA)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait::async_trait]
impl ImageGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<ImagePayload, GeneratorError> {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(request);
            requests.len() - 1
        };
        if let Some(hook) = &self.hook {
            hook(call);
        }
        tokio::task::yield_now().await;
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Self::fallback()))
    }
}

/// In-memory credentials; prompting installs `on_prompt` when set
#[derive(Debug, Default)]
pub struct StaticCredentials {
    key: RwLock<Option<ApiKey>>,
    on_prompt: Option<ApiKey>,
}

impl StaticCredentials {
    pub fn with_key(key: &str) -> Self {
        Self {
            key: RwLock::new(ApiKey::new(key)),
            on_prompt: None,
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    /// No key until the selection flow runs, which then yields `key`
    pub fn selectable(key: &str) -> Self {
        Self {
            key: RwLock::new(None),
            on_prompt: ApiKey::new(key),
        }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for StaticCredentials {
    async fn has_active_credential(&self) -> bool {
        self.key.read().is_some()
    }

    async fn prompt_for_credential(&self) -> Result<(), CredentialError> {
        match &self.on_prompt {
            Some(key) => {
                *self.key.write() = Some(key.clone());
                Ok(())
            }
            None => Err(CredentialError::Dismissed),
        }
    }

    fn api_key(&self) -> Option<ApiKey> {
        self.key.read().clone()
    }
}

/// Small payload whose bytes are all `tag`; not a decodable image
pub fn tagged_payload(tag: u8) -> ImagePayload {
    ImagePayload::new(vec![tag; 32], MediaType::Png)
}

/// Decodable PNG of the given size
pub fn sample_png(width: u32, height: u32) -> ImagePayload {
    let img = RgbImage::from_fn(width, height, |x, y| {
        if (x + y) % 16 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    ImagePayload::new(bytes, MediaType::Png)
}

/// Studio wired to a scripted generator and a valid key
pub fn setup_test_studio(generator: Arc<ScriptedGenerator>) -> DiagramStudio {
    DiagramStudio::new(
        StudioConfig::new(),
        generator,
        Arc::new(StaticCredentials::with_key("test-key")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_generator_replays_then_falls_back() {
        let generator = ScriptedGenerator::with_script([
            Ok(tagged_payload(1)),
            Err(GeneratorError::Transport("down".to_string())),
        ]);
        let request = GenerationRequest {
            images: vec![],
            prompt: "p".to_string(),
            options: Default::default(),
        };

        assert_eq!(generator.generate(request.clone()).await.unwrap(), tagged_payload(1));
        assert!(generator.generate(request.clone()).await.is_err());
        assert_eq!(
            generator.generate(request).await.unwrap(),
            ScriptedGenerator::fallback()
        );
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn selectable_credentials() {
        let creds = StaticCredentials::selectable("k");
        assert!(!creds.has_active_credential().await);
        creds.prompt_for_credential().await.unwrap();
        assert!(creds.has_active_credential().await);
        assert_eq!(creds.api_key().unwrap().expose(), "k");
    }

    #[test]
    fn sample_png_decodes() {
        let png = sample_png(40, 30);
        let decoded = image::load_from_memory(&png.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }
}
