//! Unsharp-mask sharpening.

use image::{Rgba, RgbaImage};

/// Sharpen interior pixels with a 3x3 unsharp-mask kernel.
///
/// Kernel: center weight `1 + 4*amount`, the four orthogonal neighbors
/// `-amount`, corners zero. The kernel sums to 1, so flat regions pass
/// through unchanged. Output values are clamped to [0, 255]; border pixels
/// and the alpha channel are left as-is. Reads from a snapshot so the
/// convolution sees original neighbor values.
pub fn sharpen(buffer: &mut RgbaImage, amount: f32) {
    let (width, height) = buffer.dimensions();
    if width < 3 || height < 3 || amount == 0.0 {
        return;
    }

    let snapshot = buffer.clone();
    let center_weight = 1.0 + 4.0 * amount;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = snapshot.get_pixel(x, y).0;
            let up = snapshot.get_pixel(x, y - 1).0;
            let down = snapshot.get_pixel(x, y + 1).0;
            let left = snapshot.get_pixel(x - 1, y).0;
            let right = snapshot.get_pixel(x + 1, y).0;

            let mut out = [0u8; 4];
            for c in 0..3 {
                let neighbors =
                    f32::from(up[c]) + f32::from(down[c]) + f32::from(left[c]) + f32::from(right[c]);
                let value = f32::from(center[c]) * center_weight - amount * neighbors;
                out[c] = value.round().clamp(0.0, 255.0) as u8;
            }
            out[3] = center[3];
            buffer.put_pixel(x, y, Rgba(out));
        }
    }
}
