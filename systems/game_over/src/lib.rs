#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Banner detector that recognises the end-of-game screen.
//!
//! The banner is drawn in the same red as the food, so the detector removes
//! the food's cell from the red mask and then looks for a blob that is both
//! large and clearly non-circular. Round blobs score close to 1.0 on the
//! circularity measure while rendered text scores well below it.

use serde::{Deserialize, Serialize};
use snake_autoplay_core::{Frame, GridGeometry, GridPosition};
use snake_autoplay_vision::{clear_rect, count_nonzero, external_contours, HsvImage, HsvRange};

/// Thresholds that decide when a red region counts as the game-over banner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOverTuning {
    /// HSV windows whose union forms the red mask; red wraps around hue zero.
    pub red: Vec<HsvRange>,
    /// Total red pixels must strictly exceed this count.
    pub min_red_area: u32,
    /// A banner contour must enclose strictly more than this area.
    pub min_banner_area: f64,
    /// A banner contour must score strictly below this circularity.
    pub max_circularity: f64,
}

impl Default for GameOverTuning {
    fn default() -> Self {
        Self {
            red: vec![
                HsvRange::new([0, 120, 120], [10, 255, 255]),
                HsvRange::new([170, 120, 120], [180, 255, 255]),
            ],
            min_red_area: 1200,
            min_banner_area: 1000.0,
            max_circularity: 0.7,
        }
    }
}

/// Red contour that satisfied the banner area and shape filters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BannerCandidate {
    /// Area enclosed by the contour.
    pub area: f64,
    /// Circularity score of the contour.
    pub circularity: f64,
}

/// Measurements gathered while looking for the banner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BannerInspection {
    /// Red pixels left after removing the food cell.
    pub red_area: u32,
    /// First contour that passed every banner filter, if the red area qualified.
    pub banner: Option<BannerCandidate>,
}

impl BannerInspection {
    /// Reports whether the inspection found the game-over banner.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.banner.is_some()
    }
}

/// Pure system that inspects frames for the game-over banner.
#[derive(Clone, Debug)]
pub struct GameOverDetector {
    tuning: GameOverTuning,
    geometry: GridGeometry,
}

impl GameOverDetector {
    /// Creates a detector using the supplied tuning and grid geometry.
    #[must_use]
    pub fn new(tuning: GameOverTuning, geometry: GridGeometry) -> Self {
        Self { tuning, geometry }
    }

    /// Reports whether the frame shows the game-over banner.
    #[must_use]
    pub fn is_game_over(&self, frame: &Frame, food: Option<GridPosition>) -> bool {
        self.inspect(frame, food).is_game_over()
    }

    /// Measures the red regions of an RGB frame.
    #[must_use]
    pub fn inspect(&self, frame: &Frame, food: Option<GridPosition>) -> BannerInspection {
        self.inspect_hsv(&HsvImage::from_rgb(frame), food)
    }

    /// Measures the red regions of a frame that was already converted to HSV.
    #[must_use]
    pub fn inspect_hsv(&self, hsv: &HsvImage, food: Option<GridPosition>) -> BannerInspection {
        let mut mask = hsv.mask_any(&self.tuning.red);

        if let Some((x, y)) = food.and_then(|cell| self.geometry.cell_origin(cell)) {
            let pitch = self.geometry.pitch();
            clear_rect(
                &mut mask,
                (x, y),
                (x.saturating_add(pitch), y.saturating_add(pitch)),
            );
        }

        let red_area = count_nonzero(&mask);
        if red_area <= self.tuning.min_red_area {
            return BannerInspection {
                red_area,
                banner: None,
            };
        }

        let banner = external_contours(&mask).iter().find_map(|contour| {
            let area = contour.area();
            if area <= self.tuning.min_banner_area {
                return None;
            }

            let circularity = contour.circularity()?;
            (circularity < self.tuning.max_circularity)
                .then_some(BannerCandidate { area, circularity })
        });

        BannerInspection { red_area, banner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn detector() -> GameOverDetector {
        GameOverDetector::new(GameOverTuning::default(), GridGeometry::default())
    }

    #[test]
    fn black_frame_is_not_game_over() {
        let inspection = detector().inspect(&RgbImage::new(300, 200), None);
        assert_eq!(inspection, BannerInspection::default());
    }

    #[test]
    fn food_cell_is_removed_before_counting() {
        let mut frame = RgbImage::new(100, 100);
        for y in 40..60 {
            for x in 40..60 {
                frame.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }

        let detector = GameOverDetector::new(
            GameOverTuning {
                min_red_area: 0,
                ..GameOverTuning::default()
            },
            GridGeometry::default(),
        );

        assert_eq!(detector.inspect(&frame, None).red_area, 400);
        assert_eq!(
            detector
                .inspect(&frame, Some(GridPosition::new(2, 2)))
                .red_area,
            0
        );
    }
}
