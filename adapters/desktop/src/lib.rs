#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Desktop adapter that connects the control loop to a live game window.
//!
//! Window discovery and screen capture go through `xcap`, synthetic input
//! through `enigo`, and the stop hotkey is polled with `device_query`.

mod capture;
mod hotkey;
mod input;
mod window;

use thiserror::Error;

pub use capture::ScreenCapture;
pub use hotkey::{Hotkey, StopHotkey, UnknownHotkeyError};
pub use input::DesktopInput;
pub use window::{locate_window, GameWindow};

/// Failures raised while talking to the desktop environment.
#[derive(Debug, Error)]
pub enum DesktopError {
    /// No window carries the requested title.
    #[error("no window titled `{title}` is open")]
    WindowNotFound {
        /// Title that was searched for.
        title: String,
    },
    /// The window list could not be read.
    #[error("failed to enumerate windows: {0}")]
    WindowQuery(String),
    /// The input backend could not be created or rejected an event.
    #[error("input backend failed: {0}")]
    Input(String),
    /// The hotkey watcher thread could not be started.
    #[error("failed to start hotkey watcher: {0}")]
    Hotkey(#[source] std::io::Error),
}
