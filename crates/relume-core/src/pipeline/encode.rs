//! Re-encoding of processed rasters.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::config::EncodeConfig;
use crate::error::EnhanceError;

/// JPEG encoder for filter stack output.
#[derive(Clone)]
pub struct ImageEncoder {
    config: EncodeConfig,
}

impl ImageEncoder {
    /// Create an encoder with the given settings.
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    /// Encode an RGBA raster as JPEG at the configured quality.
    ///
    /// JPEG has no alpha channel, so the raster is flattened to RGB first.
    pub fn encode(&self, buffer: &RgbaImage, url: &str) -> Result<Vec<u8>, EnhanceError> {
        let rgb = DynamicImage::ImageRgba8(buffer.clone()).to_rgb8();

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.config.quality);
        DynamicImage::ImageRgb8(rgb)
            .write_with_encoder(encoder)
            .map_err(|e| EnhanceError::Encode {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(out)
    }
}

/// BLAKE3 hash of encoded output, hex-encoded. Stable identity for a result
/// handle regardless of which URL produced it.
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
