//! JSON bodies of the `generateContent` call

use crate::error::GeminiError;
use netsketch_core::{GenerationRequest, ImagePayload, MediaType};
use serde::{Deserialize, Serialize};

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

/// One turn of content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Text or inline binary part
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.media_type.as_mime().to_string(),
                data: image.base64(),
            }),
        }
    }
}

/// Base64 payload with its MIME type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub image_config: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
    pub image_size: String,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        let mut parts: Vec<Part> = request.images.iter().map(Part::image).collect();
        parts.push(Part::text(request.prompt.clone()));

        Self {
            contents: vec![Content { role: None, parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: request.options.aspect_ratio.0.clone(),
                    image_size: request.options.image_size.0.clone(),
                },
            },
        }
    }
}

/// Response body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// First inline image of the first candidate
    ///
    /// The declared MIME type is kept; PNG is assumed when it is missing.
    ///
    /// # Errors
    /// `GeminiError::NoImage` when there is no image part, with the block or
    /// non-`STOP` finish reason attached. `GeminiError::Decode` for bad base64.
    pub fn into_image(self) -> Result<ImagePayload, GeminiError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(GeminiError::NoImage {
                reason: block_reason,
            });
        };

        let inline = candidate
            .content
            .into_iter()
            .flat_map(|c| c.parts)
            .find_map(|p| p.inline_data);

        match inline {
            Some(data) => {
                let media_type = if data.mime_type.is_empty() {
                    MediaType::Png
                } else {
                    MediaType::from_mime(&data.mime_type)
                };
                ImagePayload::from_base64(&data.data, media_type)
                    .map_err(|e| GeminiError::Decode(e.to_string()))
            }
            None => Err(GeminiError::NoImage {
                reason: block_reason.or(candidate.finish_reason.filter(|r| r != "STOP")),
            }),
        }
    }
}

/// Error body of a non-success response
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Human-readable message from an error body, falling back to the raw text
#[must_use]
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => match parsed.error.status {
            Some(status) => format!("{status}: {}", parsed.error.message),
            None => parsed.error.message,
        },
        _ => body.trim().to_string(),
    }
}
