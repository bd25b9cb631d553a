//! Per-channel histogram auto-levels.

use image::RgbaImage;

/// Stretch each color channel so its clipped range maps to [0, 255].
///
/// For each of R, G, B independently: build a 256-bin histogram, walk from
/// each end until the cumulative count first exceeds `clip_percent` of the
/// total pixel count, and linearly rescale so the low cut maps to 0 and the
/// high cut to 255. A degenerate range (high <= low) is treated as 1 to
/// avoid division by zero. Alpha is untouched.
pub fn auto_levels(buffer: &mut RgbaImage, clip_percent: f32) {
    let (width, height) = buffer.dimensions();
    let total = u64::from(width) * u64::from(height);
    if total == 0 {
        return;
    }

    let mut histograms = [[0u64; 256]; 3];
    for pixel in buffer.pixels() {
        for c in 0..3 {
            histograms[c][pixel.0[c] as usize] += 1;
        }
    }

    let threshold = (total as f64 * f64::from(clip_percent) / 100.0) as u64;

    let mut low = [0.0f32; 3];
    let mut scale = [1.0f32; 3];
    for c in 0..3 {
        let cut_low = cut_from_low(&histograms[c], threshold);
        let cut_high = cut_from_high(&histograms[c], threshold);
        let range = if cut_high > cut_low {
            (cut_high - cut_low) as f32
        } else {
            1.0
        };
        low[c] = cut_low as f32;
        scale[c] = 255.0 / range;
    }

    for pixel in buffer.pixels_mut() {
        for c in 0..3 {
            let value = (f32::from(pixel.0[c]) - low[c]) * scale[c];
            pixel.0[c] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn cut_from_low(histogram: &[u64; 256], threshold: u64) -> usize {
    let mut cumulative = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative > threshold {
            return value;
        }
    }
    255
}

fn cut_from_high(histogram: &[u64; 256], threshold: u64) -> usize {
    let mut cumulative = 0u64;
    for (value, &count) in histogram.iter().enumerate().rev() {
        cumulative += count;
        if cumulative > threshold {
            return value;
        }
    }
    0
}
