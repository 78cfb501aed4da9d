#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Colour-segmentation system that turns captured frames into observations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use snake_autoplay_core::{Frame, GridGeometry, GridPosition, Observation};
use snake_autoplay_vision::{external_contours, Contour, HsvImage, HsvRange};

/// Colour windows and blob filters used to segment the game objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionTuning {
    /// HSV window matching the snake head (blue in the stock palette).
    pub head: HsvRange,
    /// HSV window matching body segments (green in the stock palette).
    pub body: HsvRange,
    /// HSV window matching the food (red in the stock palette).
    pub food: HsvRange,
    /// Body blobs must enclose strictly more than this many square pixels.
    pub min_body_area: f64,
}

impl Default for DetectionTuning {
    fn default() -> Self {
        Self {
            head: HsvRange::new([100, 150, 0], [140, 255, 255]),
            body: HsvRange::new([40, 40, 40], [70, 255, 255]),
            food: HsvRange::new([0, 120, 120], [10, 255, 255]),
            min_body_area: 10.0,
        }
    }
}

/// Pure system that locates the head, body and food in a single frame.
///
/// Every frame is evaluated on its own; nothing is carried over between
/// ticks.
#[derive(Clone, Debug)]
pub struct ObjectDetector {
    tuning: DetectionTuning,
    geometry: GridGeometry,
}

impl ObjectDetector {
    /// Creates a detector using the supplied tuning and grid geometry.
    #[must_use]
    pub fn new(tuning: DetectionTuning, geometry: GridGeometry) -> Self {
        Self { tuning, geometry }
    }

    /// Detects game objects in an RGB frame.
    #[must_use]
    pub fn detect(&self, frame: &Frame) -> Observation {
        self.detect_hsv(&HsvImage::from_rgb(frame))
    }

    /// Detects game objects in a frame that was already converted to HSV.
    #[must_use]
    pub fn detect_hsv(&self, hsv: &HsvImage) -> Observation {
        let head = self.largest_blob_cell(hsv, &self.tuning.head);
        let food = self.largest_blob_cell(hsv, &self.tuning.food);
        let body = self.body_cells(hsv);
        Observation::new(head, body, food)
    }

    fn largest_blob_cell(&self, hsv: &HsvImage, range: &HsvRange) -> Option<GridPosition> {
        let contours = external_contours(&hsv.mask(range));
        let largest = contours.into_iter().reduce(|best, candidate| {
            if candidate.area() > best.area() {
                candidate
            } else {
                best
            }
        })?;
        self.cell_of(&largest)
    }

    fn body_cells(&self, hsv: &HsvImage) -> BTreeSet<GridPosition> {
        external_contours(&hsv.mask(&self.tuning.body))
            .iter()
            .filter(|contour| contour.area() > self.tuning.min_body_area)
            .filter_map(|contour| self.cell_of(contour))
            .collect()
    }

    fn cell_of(&self, contour: &Contour) -> Option<GridPosition> {
        let (x, y) = contour.centroid()?;
        Some(self.geometry.cell_at(x, y))
    }
}
