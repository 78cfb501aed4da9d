#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pixel-level primitives shared by the snake autoplay detectors.
//!
//! Frames are converted to the 8-bit HSV convention used by the detector
//! tuning, thresholded into binary masks, and reduced to the outer contours
//! of each blob. Contour measurements follow the polygon conventions of the
//! classic border-following pipeline so empirically tuned thresholds carry
//! over unchanged.

mod contour;
mod hsv;

pub use self::contour::{external_contours, Contour, Moments};
pub use self::hsv::{rgb_to_hsv, HsvImage, HsvRange, MASK_ON};

use image::{GrayImage, Luma};

/// Number of foreground pixels in a binary mask.
#[must_use]
pub fn count_nonzero(mask: &GrayImage) -> u32 {
    let count = mask.pixels().filter(|pixel| pixel.0[0] != 0).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Clears every mask pixel inside the rectangle spanned by two corners.
///
/// Both corners are inclusive and the rectangle is clipped to the mask.
pub fn clear_rect(mask: &mut GrayImage, top_left: (u32, u32), bottom_right: (u32, u32)) {
    if mask.width() == 0 || mask.height() == 0 {
        return;
    }

    let x_end = bottom_right.0.min(mask.width() - 1);
    let y_end = bottom_right.1.min(mask.height() - 1);
    for y in top_left.1..=y_end {
        for x in top_left.0..=x_end {
            mask.put_pixel(x, y, Luma([0]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn frame_with_block(origin: (u32, u32), size: (u32, u32), color: [u8; 3]) -> RgbImage {
        let mut frame = RgbImage::new(60, 40);
        for y in origin.1..origin.1 + size.1 {
            for x in origin.0..origin.0 + size.0 {
                frame.put_pixel(x, y, Rgb(color));
            }
        }
        frame
    }

    #[test]
    fn mask_selects_only_matching_pixels() {
        let frame = frame_with_block((5, 5), (10, 4), [0, 255, 0]);
        let hsv = HsvImage::from_rgb(&frame);
        let green = hsv.mask(&HsvRange::new([40, 40, 40], [70, 255, 255]));
        let blue = hsv.mask(&HsvRange::new([100, 150, 0], [140, 255, 255]));

        assert_eq!(count_nonzero(&green), 40);
        assert_eq!(count_nonzero(&blue), 0);
    }

    #[test]
    fn filled_block_yields_one_outer_contour() {
        let frame = frame_with_block((1, 1), (17, 17), [0, 0, 255]);
        let hsv = HsvImage::from_rgb(&frame);
        let mask = hsv.mask(&HsvRange::new([100, 150, 0], [140, 255, 255]));
        let contours = external_contours(&mask);

        assert_eq!(contours.len(), 1);
        let contour = &contours[0];
        assert!((contour.area() - 256.0).abs() < 1e-9);
        assert_eq!(contour.centroid(), Some((9, 9)));
    }

    #[test]
    fn hollow_block_reports_only_the_outer_border() {
        let mut frame = frame_with_block((10, 10), (20, 20), [255, 0, 0]);
        for y in 15..25 {
            for x in 15..25 {
                frame.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let hsv = HsvImage::from_rgb(&frame);
        let mask = hsv.mask(&HsvRange::new([0, 120, 120], [10, 255, 255]));

        assert_eq!(external_contours(&mask).len(), 1);
    }

    #[test]
    fn clear_rect_is_inclusive_and_clipped() {
        let mut mask = GrayImage::from_pixel(10, 10, Luma([MASK_ON]));
        clear_rect(&mut mask, (2, 2), (4, 4));
        assert_eq!(count_nonzero(&mask), 100 - 9);

        clear_rect(&mut mask, (8, 8), (40, 40));
        assert_eq!(count_nonzero(&mask), 100 - 9 - 4);
    }
}
