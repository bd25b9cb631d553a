//! Image decoding with format detection, dimension limits, and a timeout.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::EnhanceError;

/// Decoder for fetched source bytes, with configurable limits.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding a source image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected source format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode source bytes off-thread, with a timeout and dimension checks.
    ///
    /// Decoding is CPU-bound and untrusted input can take pathologically
    /// long, so it runs in `spawn_blocking` under a deadline.
    pub async fn decode(&self, bytes: Vec<u8>, url: &str) -> Result<DecodedImage, EnhanceError> {
        let url_owned = url.to_string();
        let deadline = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(deadline, async {
            tokio::task::spawn_blocking(move || decode_sync(bytes, &url_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(EnhanceError::ImageTooLarge {
                        url: url.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(EnhanceError::Decode {
                url: url.to_string(),
                message: format!("Task join error: {e}"),
            }),
            Err(_) => Err(EnhanceError::Timeout {
                url: url.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }
}

/// Synchronous decode (runs in spawn_blocking).
fn decode_sync(bytes: Vec<u8>, url: &str) -> Result<DecodedImage, EnhanceError> {
    use std::io::Cursor;

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EnhanceError::Decode {
            url: url.to_string(),
            message: format!("Cannot detect image format: {e}"),
        })?;

    let format = reader.format().ok_or_else(|| EnhanceError::Decode {
        url: url.to_string(),
        message: "Unrecognized image format".to_string(),
    })?;

    let image = reader.decode().map_err(|e| EnhanceError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        image,
        format,
        width,
        height,
    })
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([120, 80, 40, 255]),
        ));
        let mut out = std::io::Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_decode_png_bytes() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder.decode(png_bytes(10, 6), "mem://test").await.unwrap();
        assert_eq!(decoded.width, 10);
        assert_eq!(decoded.height, 6);
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_decode() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode(b"definitely not an image".to_vec(), "mem://junk")
            .await
            .unwrap_err();
        assert!(matches!(err, EnhanceError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_oversized_dimensions_rejected() {
        let limits = LimitsConfig {
            max_image_dimension: 8,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder.decode(png_bytes(16, 4), "mem://big").await.unwrap_err();
        assert!(matches!(err, EnhanceError::ImageTooLarge { .. }));
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::Tiff), "unknown");
    }
}
