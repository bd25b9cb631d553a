//! The pixel filter stack: pure transforms over a decoded raster buffer.
//!
//! Stages run in fixed order — denoise, sharpen, auto-levels, then
//! contrast/brightness — mutating the buffer in place. Exactly one buffer is
//! ever mid-filter at a time; the orchestrator processes jobs sequentially.

pub mod adjust;
pub mod denoise;
pub mod levels;
pub mod sharpen;

pub use adjust::contrast_brightness;
pub use denoise::denoise;
pub use levels::auto_levels;
pub use sharpen::sharpen;

use image::RgbaImage;

use crate::config::FilterConfig;
use crate::error::{EnhanceError, EnhanceResult};

/// Run the full filter stack over a raster buffer.
///
/// Fails on an unusable buffer (zero-sized raster); any failure aborts the
/// job with no partial-stage retry.
pub fn run_stack(buffer: &mut RgbaImage, config: &FilterConfig, url: &str) -> EnhanceResult<()> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(EnhanceError::Filter {
            url: url.to_string(),
            stage: "denoise".to_string(),
            message: "zero-size raster buffer".to_string(),
        });
    }

    denoise(buffer, config.denoise_passes);
    sharpen(buffer, config.sharpen_amount);
    auto_levels(buffer, config.levels_clip_percent);
    contrast_brightness(buffer, config.contrast, config.brightness);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_run_stack_on_gradient() {
        let mut buffer = RgbaImage::from_fn(32, 32, |x, y| {
            let v = ((x + y) * 4).min(255) as u8;
            Rgba([v, v, v, 255])
        });
        let result = run_stack(&mut buffer, &FilterConfig::default(), "test");
        assert!(result.is_ok());
        assert_eq!(buffer.dimensions(), (32, 32));
    }

    #[test]
    fn test_run_stack_rejects_empty_buffer() {
        let mut buffer = RgbaImage::new(0, 0);
        let err = run_stack(&mut buffer, &FilterConfig::default(), "test").unwrap_err();
        assert!(matches!(err, EnhanceError::Filter { .. }));
    }

    #[test]
    fn test_stack_is_deterministic() {
        let make = || {
            RgbaImage::from_fn(16, 16, |x, y| {
                Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
            })
        };
        let config = FilterConfig::default();
        let mut a = make();
        let mut b = make();
        run_stack(&mut a, &config, "a").unwrap();
        run_stack(&mut b, &config, "b").unwrap();
        assert_eq!(a, b);
    }
}
