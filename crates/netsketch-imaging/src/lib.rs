//! Netsketch Imaging
//!
//! Image handling at the edge of the workflow:
//! - In-memory image payloads tagged with a media type
//! - Data-URL encoding and decoding
//! - Upload preparation (bounded resolution, JPEG re-encode)
//!
//! # Example
//!
//! ```rust,ignore
//! use netsketch_imaging::{prepare_image, ImagePayload, MediaType, PrepareOptions};
//!
//! let upload = ImagePayload::new(std::fs::read("sketch.png")?, MediaType::Png);
//! let prepared = prepare_image(&upload, &PrepareOptions::default());
//! assert_eq!(prepared.media_type, MediaType::Jpeg);
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod payload;
pub mod prepare;

pub use error::ImagingError;
pub use payload::{ImagePayload, MediaType};
pub use prepare::{prepare_image, scaled_dimensions, PrepareOptions};
