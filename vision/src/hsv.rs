//! OpenCV-compatible 8-bit HSV conversion and inclusive range masks.

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

/// Value written into masks for pixels that matched.
pub const MASK_ON: u8 = 255;

/// Inclusive hue/saturation/value window.
///
/// Hue follows the 8-bit convention where the colour wheel spans `0..180`;
/// saturation and value span `0..=255`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    /// Lower bound for each of hue, saturation and value.
    pub lower: [u8; 3],
    /// Upper bound for each of hue, saturation and value.
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Creates a range from inclusive lower and upper bounds.
    #[must_use]
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Reports whether every channel of the pixel lies within the bounds.
    #[must_use]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        hsv.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(value, (lower, upper))| lower <= value && value <= upper)
    }
}

/// Frame converted to hue, saturation and value channels.
#[derive(Clone, Debug)]
pub struct HsvImage {
    pixels: RgbImage,
}

impl HsvImage {
    /// Converts an RGB frame pixel by pixel.
    #[must_use]
    pub fn from_rgb(frame: &RgbImage) -> Self {
        let pixels = RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
            image::Rgb(rgb_to_hsv(frame.get_pixel(x, y).0))
        });
        Self { pixels }
    }

    /// Width of the image in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height of the image in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// HSV triple stored at the pixel.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }

    /// Binary mask of pixels that fall inside the range.
    #[must_use]
    pub fn mask(&self, range: &HsvRange) -> GrayImage {
        self.mask_any(std::slice::from_ref(range))
    }

    /// Binary mask of pixels that fall inside any of the ranges.
    #[must_use]
    pub fn mask_any(&self, ranges: &[HsvRange]) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let hsv = self.get(x, y);
            if ranges.iter().any(|range| range.contains(hsv)) {
                Luma([MASK_ON])
            } else {
                Luma([0])
            }
        })
    }
}

/// Converts one RGB pixel to 8-bit HSV.
#[must_use]
pub fn rgb_to_hsv([red, green, blue]: [u8; 3]) -> [u8; 3] {
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let delta = f32::from(max - min);

    let saturation = if max == 0 {
        0.0
    } else {
        255.0 * delta / f32::from(max)
    };

    let (r, g, b) = (f32::from(red), f32::from(green), f32::from(blue));
    let mut hue = if max == min {
        0.0
    } else if max == red {
        60.0 * (g - b) / delta
    } else if max == green {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    let mut hue = (hue / 2.0).round() as u8;
    if hue >= 180 {
        hue -= 180;
    }

    [hue, saturation.round() as u8, max]
}
