//! Upload preparation
//!
//! Every image sent to the model goes through [`prepare_image`]: it is bounded
//! to a maximum side length and re-encoded as JPEG. Preparation never fails;
//! undecodable input is forwarded untouched.

use crate::payload::{ImagePayload, MediaType};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageResult, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Largest side, in pixels, of a prepared image
pub const MAX_DIMENSION: u32 = 1536;

/// JPEG quality of a prepared image
pub const JPEG_QUALITY: u8 = 90;

/// Preparation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    /// Cap on the larger image side
    pub max_dimension: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

/// Target dimensions after bounding `(width, height)` by `cap`
///
/// The larger side becomes `cap`; the other side is scaled proportionally
/// and truncated. Images already within the cap are left unchanged.
#[must_use]
pub fn scaled_dimensions(width: u32, height: u32, cap: u32) -> (u32, u32) {
    if width <= cap && height <= cap {
        return (width, height);
    }

    let scale = |side: u32, larger: u32| -> u32 {
        let scaled = u64::from(side) * u64::from(cap) / u64::from(larger);
        u32::try_from(scaled).unwrap_or(cap).max(1)
    };

    if width > height {
        (cap, scale(height, width))
    } else {
        (scale(width, height), cap)
    }
}

/// Bound and re-encode an image for transmission
///
/// Falls back to the original bytes tagged `image/png` when the input cannot
/// be decoded or the JPEG encode fails.
#[must_use]
pub fn prepare_image(input: &ImagePayload, options: &PrepareOptions) -> ImagePayload {
    match try_prepare(input, options) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::warn!(
                media_type = %input.media_type,
                len = input.len(),
                "image preparation failed, forwarding original bytes: {}",
                e
            );
            ImagePayload::new(input.bytes.clone(), MediaType::Png)
        }
    }
}

fn try_prepare(input: &ImagePayload, options: &PrepareOptions) -> ImageResult<ImagePayload> {
    let decoded = image::load_from_memory(&input.bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    let (target_w, target_h) = scaled_dimensions(width, height, options.max_dimension.max(1));

    let resized = if (target_w, target_h) == (width, height) {
        decoded
    } else {
        tracing::debug!(
            "resizing {}x{} -> {}x{}",
            width,
            height,
            target_w,
            target_h
        );
        decoded.resize_exact(target_w, target_h, FilterType::Lanczos3)
    };

    let flattened = flatten_onto_white(&resized);

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, options.jpeg_quality.clamp(1, 100));
    flattened.write_with_encoder(encoder)?;

    Ok(ImagePayload::new(bytes, MediaType::Jpeg))
}

/// Composite any alpha channel over a white background
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| -> u8 {
            let mixed = (u16::from(c) * alpha + 255 * (255 - alpha)) / 255;
            u8::try_from(mixed).unwrap_or(u8::MAX)
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> ImagePayload {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImagePayload::new(bytes, MediaType::Png)
    }

    #[test]
    fn scaled_dimensions_within_cap() {
        assert_eq!(scaled_dimensions(800, 600, 1536), (800, 600));
        assert_eq!(scaled_dimensions(1536, 1536, 1536), (1536, 1536));
    }

    #[test]
    fn scaled_dimensions_landscape() {
        assert_eq!(scaled_dimensions(3072, 1000, 1536), (1536, 500));
        assert_eq!(scaled_dimensions(4000, 3000, 1536), (1536, 1152));
    }

    #[test]
    fn scaled_dimensions_portrait_and_square() {
        assert_eq!(scaled_dimensions(1000, 3000, 1536), (512, 1536));
        assert_eq!(scaled_dimensions(2000, 2000, 1536), (1536, 1536));
    }

    #[test]
    fn scaled_dimensions_never_zero() {
        assert_eq!(scaled_dimensions(10_000, 1, 1536), (1536, 1));
    }

    #[test]
    fn large_image_is_bounded_and_jpeg() {
        let prepared = prepare_image(&png(2000, 1000), &PrepareOptions::default());
        assert_eq!(prepared.media_type, MediaType::Jpeg);

        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1536, 768));
    }

    #[test]
    fn small_image_keeps_size_but_is_reencoded() {
        let prepared = prepare_image(&png(120, 90), &PrepareOptions::default());
        assert_eq!(prepared.media_type, MediaType::Jpeg);
        assert_eq!(
            image::guess_format(&prepared.bytes).unwrap(),
            ImageFormat::Jpeg
        );

        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 90));
    }

    #[test]
    fn undecodable_input_is_forwarded() {
        let input = ImagePayload::new(b"not an image".to_vec(), MediaType::Jpeg);
        let prepared = prepare_image(&input, &PrepareOptions::default());
        assert_eq!(prepared.bytes, input.bytes);
        assert_eq!(prepared.media_type, MediaType::Png);
    }

    #[test]
    fn transparent_pixels_become_white() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let prepared = prepare_image(
            &ImagePayload::new(bytes, MediaType::Png),
            &PrepareOptions::default(),
        );
        let decoded = image::load_from_memory(&prepared.bytes).unwrap().to_rgb8();
        let Rgb([r, g, b]) = *decoded.get_pixel(8, 8);
        assert!(r > 240 && g > 240 && b > 240);
    }
}
