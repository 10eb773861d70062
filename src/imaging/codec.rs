//! Image transport encoding and thumbnail production
//!
//! Captured image bytes travel through the system as base64 JPEG. This
//! module converts raw bytes to and from that transport form and produces
//! the proportionally scaled thumbnails stored with history entries.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{LenslateError, Result};

/// MIME type used for all transport images
pub const JPEG_MIME: &str = "image/jpeg";

/// JPEG quality for history thumbnails
const THUMBNAIL_JPEG_QUALITY: u8 = 70;

/// An encoded image in transport form: base64 payload plus MIME type
///
/// This is the representation sent to the inference service, stored in
/// history thumbnails, and returned by the overlay renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportImage {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type of the encoded bytes
    pub mime_type: String,
}

impl TransportImage {
    /// Decode the base64 payload back into raw image bytes
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if the payload is not valid base64.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| LenslateError::InvalidImage(format!("invalid base64 payload: {}", e)).into())
    }
}

/// Encode raw image bytes into transport form
///
/// Pure and deterministic; the caller guarantees the bytes are a valid
/// encoded image.
///
/// # Examples
///
/// ```
/// use lenslate::imaging::codec;
///
/// let image = codec::encode(&[0xFF, 0xD8, 0xFF]);
/// assert_eq!(image.mime_type, "image/jpeg");
/// assert_eq!(image.as_bytes().unwrap(), vec![0xFF, 0xD8, 0xFF]);
/// ```
pub fn encode(raw: &[u8]) -> TransportImage {
    TransportImage {
        data: STANDARD.encode(raw),
        mime_type: JPEG_MIME.to_string(),
    }
}

/// Decode a transport image into pixel data
///
/// # Errors
///
/// Returns `InvalidImage` if the payload is not base64 or the bytes do not
/// decode as an image.
pub fn decode(image: &TransportImage) -> Result<DynamicImage> {
    let bytes = image.as_bytes()?;
    image::load_from_memory(&bytes)
        .map_err(|e| LenslateError::InvalidImage(format!("image decode failed: {}", e)).into())
}

/// Produce a proportionally scaled thumbnail with the given width
///
/// The output width equals `max_width` and the height is
/// `round(original_height * max_width / original_width)`. Deterministic for
/// identical inputs.
///
/// # Errors
///
/// Returns `InvalidImage` if the source cannot be decoded or has zero width.
pub fn thumbnail(image: &TransportImage, max_width: u32) -> Result<TransportImage> {
    let source = decode(image)?;
    let (width, height) = (source.width(), source.height());
    if width == 0 {
        return Err(LenslateError::InvalidImage("source image has zero width".to_string()).into());
    }

    let scaled_height =
        ((height as f64) * (max_width as f64) / (width as f64)).round() as u32;
    let resized = image::imageops::resize(
        &source.to_rgb8(),
        max_width,
        scaled_height,
        FilterType::Triangle,
    );

    let bytes = encode_jpeg(&resized, THUMBNAIL_JPEG_QUALITY)?;
    Ok(encode(&bytes))
}

/// Encode RGB pixel data as JPEG at the given quality
pub(crate) fn encode_jpeg(pixels: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    pixels
        .write_with_encoder(encoder)
        .map_err(|e| LenslateError::InvalidImage(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let pixels = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        encode_jpeg(&pixels, 90).unwrap()
    }

    #[test]
    fn test_encode_roundtrips_raw_bytes() {
        let raw = sample_jpeg(8, 8);
        let transport = encode(&raw);
        assert_eq!(transport.mime_type, JPEG_MIME);
        assert_eq!(transport.as_bytes().unwrap(), raw);
    }

    #[test]
    fn test_decode_recovers_dimensions() {
        let transport = encode(&sample_jpeg(12, 7));
        let decoded = decode(&transport).unwrap();
        assert_eq!(decoded.width(), 12);
        assert_eq!(decoded.height(), 7);
    }

    #[test]
    fn test_decode_rejects_garbage_base64() {
        let bad = TransportImage {
            data: "not base64 at all!!!".to_string(),
            mime_type: JPEG_MIME.to_string(),
        };
        let err = decode(&bad).unwrap_err();
        assert!(err.to_string().contains("Invalid image"));
    }

    #[test]
    fn test_decode_rejects_non_image_bytes() {
        let bad = encode(b"plain text, not an image");
        let err = decode(&bad).unwrap_err();
        assert!(err.to_string().contains("Invalid image"));
    }

    #[test]
    fn test_thumbnail_width_is_exact() {
        let transport = encode(&sample_jpeg(300, 200));
        let thumb = thumbnail(&transport, 100).unwrap();
        let decoded = decode(&thumb).unwrap();
        assert_eq!(decoded.width(), 100);
    }

    #[test]
    fn test_thumbnail_height_is_rounded_proportion() {
        // 300x200 at width 100 -> height round(200 * 100 / 300) = 67
        let transport = encode(&sample_jpeg(300, 200));
        let thumb = thumbnail(&transport, 100).unwrap();
        assert_eq!(decode(&thumb).unwrap().height(), 67);

        // 3x5 at width 2 -> height round(5 * 2 / 3) = 3
        let transport = encode(&sample_jpeg(3, 5));
        let thumb = thumbnail(&transport, 2).unwrap();
        assert_eq!(decode(&thumb).unwrap().height(), 3);
    }

    #[test]
    fn test_thumbnail_can_upscale() {
        let transport = encode(&sample_jpeg(10, 20));
        let thumb = thumbnail(&transport, 40).unwrap();
        let decoded = decode(&thumb).unwrap();
        assert_eq!(decoded.width(), 40);
        assert_eq!(decoded.height(), 80);
    }

    #[test]
    fn test_thumbnail_is_deterministic() {
        let transport = encode(&sample_jpeg(64, 48));
        let first = thumbnail(&transport, 32).unwrap();
        let second = thumbnail(&transport, 32).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_thumbnail_rejects_undecodable_source() {
        let bad = encode(b"nope");
        assert!(thumbnail(&bad, 100).is_err());
    }
}
