use std::{thread, time::Duration};

use enigo::{
    Button, Coordinate, Direction as Press, Enigo, Key as EnigoKey, Keyboard, Mouse, Settings,
};
use snake_autoplay_core::{Direction, DispatchError, Key, KeySink};
use tracing::{debug, info};

use crate::{DesktopError, GameWindow};

/// Synthetic keyboard and mouse backed by `enigo`.
pub struct DesktopInput {
    enigo: Enigo,
}

impl std::fmt::Debug for DesktopInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopInput").finish_non_exhaustive()
    }
}

impl DesktopInput {
    /// Connects to the platform input backend.
    pub fn new() -> Result<Self, DesktopError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|err| DesktopError::Input(format!("{err:?}")))?;
        Ok(Self { enigo })
    }

    /// Brings `window` to the foreground by clicking its centre, then waits `settle`.
    pub fn activate(&mut self, window: &GameWindow, settle: Duration) -> Result<(), DesktopError> {
        let (x, y) = window.center();
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|err| DesktopError::Input(format!("{err:?}")))?;
        self.enigo
            .button(Button::Left, Press::Click)
            .map_err(|err| DesktopError::Input(format!("{err:?}")))?;
        info!(title = window.title(), x, y, "window activated");
        thread::sleep(settle);
        Ok(())
    }
}

impl KeySink for DesktopInput {
    fn press(&mut self, key: Key) -> Result<(), DispatchError> {
        debug!(%key, "pressing key");
        self.enigo
            .key(key_code(key), Press::Click)
            .map_err(|err| DispatchError::new(key, format!("{err:?}")))
    }
}

fn key_code(key: Key) -> EnigoKey {
    match key {
        Key::Direction(Direction::Up) => EnigoKey::UpArrow,
        Key::Direction(Direction::Down) => EnigoKey::DownArrow,
        Key::Direction(Direction::Left) => EnigoKey::LeftArrow,
        Key::Direction(Direction::Right) => EnigoKey::RightArrow,
        Key::Restart => EnigoKey::Unicode('r'),
    }
}
