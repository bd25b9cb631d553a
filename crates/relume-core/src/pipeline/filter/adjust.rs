//! Global contrast and brightness, the final stage of the stack.

use image::RgbaImage;

/// Apply linear contrast about the midpoint, then a brightness multiplier.
///
/// `value' = clamp(((value - 128) * contrast + 128) * brightness)`. The
/// mapping is per-value, so it is computed once as a 256-entry lookup table.
/// Alpha is untouched. Order matters: this stage runs after auto-levels.
pub fn contrast_brightness(buffer: &mut RgbaImage, contrast: f32, brightness: f32) {
    let mut table = [0u8; 256];
    for (value, slot) in table.iter_mut().enumerate() {
        let contrasted = (value as f32 - 128.0) * contrast + 128.0;
        *slot = (contrasted * brightness).round().clamp(0.0, 255.0) as u8;
    }

    for pixel in buffer.pixels_mut() {
        for c in 0..3 {
            pixel.0[c] = table[pixel.0[c] as usize];
        }
    }
}
