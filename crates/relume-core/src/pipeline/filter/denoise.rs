//! Box-mean denoise, an approximation of a bilateral blur.

use image::{Rgba, RgbaImage};

/// Replace each interior pixel with the unweighted mean of its 3x3
/// neighborhood, for the given number of passes.
///
/// Each pass reads from a snapshot of the buffer taken before the pass and
/// writes to the live buffer, so results within a single pass never compound.
/// The 1-pixel border is left untouched. Buffers smaller than 3x3 have no
/// interior and pass through unchanged.
pub fn denoise(buffer: &mut RgbaImage, passes: u32) {
    let (width, height) = buffer.dimensions();
    if width < 3 || height < 3 {
        return;
    }

    for _ in 0..passes {
        let snapshot = buffer.clone();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut sums = [0u32; 4];
                for dy in 0..3 {
                    for dx in 0..3 {
                        let p = snapshot.get_pixel(x + dx - 1, y + dy - 1);
                        for c in 0..4 {
                            sums[c] += u32::from(p.0[c]);
                        }
                    }
                }
                let mut out = [0u8; 4];
                for c in 0..4 {
                    out[c] = (sums[c] / 9) as u8;
                }
                buffer.put_pixel(x, y, Rgba(out));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32, value: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(value))
    }

    #[test]
    fn test_flat_image_unchanged() {
        let mut buffer = flat(8, 8, [100, 150, 200, 255]);
        let expected = buffer.clone();
        denoise(&mut buffer, 2);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_border_untouched() {
        let mut buffer = flat(5, 5, [50, 50, 50, 255]);
        buffer.put_pixel(2, 2, Rgba([255, 255, 255, 255]));
        denoise(&mut buffer, 1);

        // Spike is averaged down; border pixels keep their original value.
        assert!(buffer.get_pixel(2, 2).0[0] < 255);
        assert_eq!(buffer.get_pixel(0, 0).0, [50, 50, 50, 255]);
        assert_eq!(buffer.get_pixel(4, 4).0, [50, 50, 50, 255]);
        assert_eq!(buffer.get_pixel(0, 2).0, [50, 50, 50, 255]);
    }

    #[test]
    fn test_spike_spreads_to_neighbors() {
        let mut buffer = flat(5, 5, [0, 0, 0, 255]);
        buffer.put_pixel(2, 2, Rgba([90, 90, 90, 255]));
        denoise(&mut buffer, 1);

        // 3x3 mean of eight zeros and one 90 is 10.
        assert_eq!(buffer.get_pixel(2, 2).0[0], 10);
        assert_eq!(buffer.get_pixel(1, 2).0[0], 10);
    }

    #[test]
    fn test_pass_reads_snapshot_not_live_buffer() {
        // If the pass read its own output, the pixel left of the spike
        // (processed first) would feed into the spike's mean and change it.
        let mut one_pass = flat(7, 7, [0, 0, 0, 255]);
        one_pass.put_pixel(3, 3, Rgba([90, 90, 90, 255]));
        denoise(&mut one_pass, 1);
        assert_eq!(one_pass.get_pixel(3, 3).0[0], 10);
    }

    #[test]
    fn test_tiny_image_passthrough() {
        let mut buffer = flat(2, 2, [10, 20, 30, 255]);
        let expected = buffer.clone();
        denoise(&mut buffer, 2);
        assert_eq!(buffer, expected);
    }
}
