use snake_autoplay_core::ScreenRegion;
use tracing::debug;
use xcap::Window;

use crate::DesktopError;

/// On-screen window that hosts the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameWindow {
    title: String,
    bounds: ScreenRegion,
}

impl GameWindow {
    /// Creates a window description from its title and outer bounds.
    #[must_use]
    pub fn new(title: impl Into<String>, bounds: ScreenRegion) -> Self {
        Self {
            title: title.into(),
            bounds,
        }
    }

    /// Title the window was found by.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Screen point at the middle of the window.
    #[must_use]
    pub fn center(&self) -> (i32, i32) {
        let half_width = i32::try_from(self.bounds.width / 2).unwrap_or(i32::MAX);
        let half_height = i32::try_from(self.bounds.height / 2).unwrap_or(i32::MAX);
        (
            self.bounds.left.saturating_add(half_width),
            self.bounds.top.saturating_add(half_height),
        )
    }

    /// Play area below the title bar: same size as the window, shifted down.
    #[must_use]
    pub fn game_region(&self, title_bar_offset: u32) -> ScreenRegion {
        let offset = i32::try_from(title_bar_offset).unwrap_or(i32::MAX);
        ScreenRegion {
            top: self.bounds.top.saturating_add(offset),
            ..self.bounds
        }
    }
}

/// Finds the first open window whose title equals `title` exactly.
pub fn locate_window(title: &str) -> Result<GameWindow, DesktopError> {
    let windows = Window::all().map_err(|err| DesktopError::WindowQuery(err.to_string()))?;
    debug!(count = windows.len(), "enumerated windows");

    windows
        .iter()
        .find(|window| window.title() == title)
        .map(|window| {
            GameWindow::new(
                window.title(),
                ScreenRegion {
                    left: window.x(),
                    top: window.y(),
                    width: window.width(),
                    height: window.height(),
                },
            )
        })
        .ok_or_else(|| DesktopError::WindowNotFound {
            title: title.to_owned(),
        })
}
