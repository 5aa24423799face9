//! Error types for image payload handling

/// Image payload errors
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    /// Input was not a `data:<mime>;base64,<data>` URL
    #[error("malformed data URL: {0}")]
    MalformedDataUrl(String),

    /// Payload section was not valid base64
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imaging_error_display() {
        let err = ImagingError::MalformedDataUrl("missing comma".to_string());
        assert!(err.to_string().contains("malformed data URL"));
    }
}
