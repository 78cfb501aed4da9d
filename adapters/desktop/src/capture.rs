use image::{imageops, DynamicImage, RgbaImage};
use snake_autoplay_core::{CaptureError, Frame, FrameSource, ScreenRegion};
use xcap::Monitor;

/// Captures a fixed screen region from the monitor containing its top-left corner.
///
/// Coordinates are used as reported by the platform; display scaling is not
/// compensated.
#[derive(Clone, Copy, Debug)]
pub struct ScreenCapture {
    region: ScreenRegion,
}

impl ScreenCapture {
    /// Creates a capture for `region`.
    #[must_use]
    pub const fn new(region: ScreenRegion) -> Self {
        Self { region }
    }
}

impl FrameSource for ScreenCapture {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let monitor = Monitor::from_point(self.region.left, self.region.top).map_err(|err| {
            CaptureError::with_source(
                format!("no monitor at ({}, {})", self.region.left, self.region.top),
                err,
            )
        })?;
        let screen = monitor
            .capture_image()
            .map_err(|err| CaptureError::with_source("monitor capture failed", err))?;

        crop_region(&screen, (monitor.x(), monitor.y()), self.region).ok_or_else(|| {
            CaptureError::new(format!(
                "region {}x{} at ({}, {}) lies outside the monitor",
                self.region.width, self.region.height, self.region.left, self.region.top
            ))
        })
    }
}

/// Crops `region`, given in screen coordinates, out of a monitor image whose
/// top-left corner sits at `monitor_origin`.
///
/// The crop is clipped to the monitor; `None` when nothing overlaps.
fn crop_region(
    screen: &RgbaImage,
    monitor_origin: (i32, i32),
    region: ScreenRegion,
) -> Option<Frame> {
    let x = u32::try_from(region.left.checked_sub(monitor_origin.0)?).ok()?;
    let y = u32::try_from(region.top.checked_sub(monitor_origin.1)?).ok()?;
    if x >= screen.width() || y >= screen.height() {
        return None;
    }

    let width = region.width.min(screen.width() - x);
    let height = region.height.min(screen.height() - y);
    if width == 0 || height == 0 {
        return None;
    }

    let cropped = imageops::crop_imm(screen, x, y, width, height).to_image();
    Some(DynamicImage::ImageRgba8(cropped).to_rgb8())
}
