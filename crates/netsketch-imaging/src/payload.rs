//! In-memory image payloads
//!
//! Uploads and model responses are held fully in memory as raw bytes plus a
//! media type. Base64 only appears at the wire and in data URLs.

use crate::error::ImagingError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image media type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
    /// `image/gif`
    Gif,
    /// Any other MIME type, kept verbatim
    Other(String),
}

impl MediaType {
    /// Parse a MIME string
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/webp" => Self::Webp,
            "image/gif" => Self::Gif,
            _ => Self::Other(mime.trim().to_string()),
        }
    }

    /// MIME string
    #[must_use]
    pub fn as_mime(&self) -> &str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Other(mime) => mime,
        }
    }

    /// File extension used when writing the image to disk
    #[must_use]
    pub fn extension(&self) -> &str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Other(_) => "bin",
        }
    }

    /// Guess the media type from a file extension
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

impl From<String> for MediaType {
    fn from(mime: String) -> Self {
        Self::from_mime(&mime)
    }
}

impl From<MediaType> for String {
    fn from(media_type: MediaType) -> Self {
        media_type.as_mime().to_string()
    }
}

/// Binary image plus its media type
///
/// Treated as immutable: edits and new uploads replace the whole payload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// Media type of `bytes`
    pub media_type: MediaType,
}

impl ImagePayload {
    /// Create a payload from raw bytes
    #[inline]
    #[must_use]
    pub fn new(bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self { bytes, media_type }
    }

    /// Decode a payload from base64 text
    ///
    /// # Errors
    /// `ImagingError::Base64` when `data` is not valid standard base64.
    pub fn from_base64(data: &str, media_type: MediaType) -> Result<Self, ImagingError> {
        let bytes = BASE64.decode(data.trim())?;
        Ok(Self { bytes, media_type })
    }

    /// Standard base64 encoding of the bytes
    #[must_use]
    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Render as `data:<mime>;base64,<data>`
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64())
    }

    /// Parse a `data:<mime>;base64,<data>` URL
    ///
    /// # Errors
    /// `ImagingError::MalformedDataUrl` for any other shape, `ImagingError::Base64`
    /// when the data section does not decode.
    pub fn from_data_url(url: &str) -> Result<Self, ImagingError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| ImagingError::MalformedDataUrl("missing `data:` prefix".to_string()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| ImagingError::MalformedDataUrl("missing `,` separator".to_string()))?;
        let mime = header.strip_suffix(";base64").ok_or_else(|| {
            ImagingError::MalformedDataUrl("only base64 data URLs are supported".to_string())
        })?;
        if mime.is_empty() {
            return Err(ImagingError::MalformedDataUrl("empty media type".to_string()));
        }
        Self::from_base64(data, MediaType::from_mime(mime))
    }

    /// Size of the encoded image in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when there are no bytes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn media_type_from_mime() {
        assert_eq!(MediaType::from_mime("image/jpeg"), MediaType::Jpeg);
        assert_eq!(MediaType::from_mime("IMAGE/PNG"), MediaType::Png);
        assert_eq!(
            MediaType::from_mime("image/heic"),
            MediaType::Other("image/heic".to_string())
        );
    }

    #[test]
    fn media_type_extension() {
        assert_eq!(MediaType::Jpeg.extension(), "jpg");
        assert_eq!(MediaType::from_extension("JPEG"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("txt"), None);
    }

    #[test]
    fn data_url_parses() {
        let payload = ImagePayload::from_data_url("data:image/png;base64,AQID").unwrap();
        assert_eq!(payload.media_type, MediaType::Png);
        assert_eq!(payload.bytes, vec![1, 2, 3]);
        assert_eq!(payload.to_data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn data_url_rejects_non_base64_form() {
        let err = ImagePayload::from_data_url("data:text/plain,hello").unwrap_err();
        assert!(matches!(err, ImagingError::MalformedDataUrl(_)));

        let err = ImagePayload::from_data_url("image/png;base64,AQID").unwrap_err();
        assert!(matches!(err, ImagingError::MalformedDataUrl(_)));
    }

    #[test]
    fn data_url_rejects_bad_base64() {
        let err = ImagePayload::from_data_url("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, ImagingError::Base64(_)));
    }

    #[test]
    fn debug_hides_bytes() {
        let payload = ImagePayload::new(vec![0; 4096], MediaType::Jpeg);
        let debug = format!("{payload:?}");
        assert!(debug.contains("4096"));
        assert!(!debug.contains("0, 0, 0"));
    }
}
