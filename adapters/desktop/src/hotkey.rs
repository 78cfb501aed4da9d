use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use device_query::{DeviceQuery, DeviceState, Keycode};
use snake_autoplay_session::StopSignal;
use thiserror::Error;
use tracing::{info, warn};

use crate::DesktopError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Keys that may be bound to the stop request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hotkey {
    /// Function key `F1`..=`F12`, holding its number.
    Function(u8),
    /// The escape key.
    Escape,
}

/// Error returned when a string does not name a supported hotkey.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unsupported hotkey `{0}`; expected F1 to F12 or Escape")]
pub struct UnknownHotkeyError(String);

impl FromStr for Hotkey {
    type Err = UnknownHotkeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("escape") || trimmed.eq_ignore_ascii_case("esc") {
            return Ok(Self::Escape);
        }

        trimmed
            .strip_prefix(|first: char| first.eq_ignore_ascii_case(&'f'))
            .and_then(|number| number.parse::<u8>().ok())
            .filter(|number| (1..=12).contains(number))
            .map(Self::Function)
            .ok_or_else(|| UnknownHotkeyError(trimmed.to_owned()))
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(number) => write!(f, "F{number}"),
            Self::Escape => f.write_str("Escape"),
        }
    }
}

impl Hotkey {
    fn keycode(self) -> Keycode {
        match self {
            Self::Function(1) => Keycode::F1,
            Self::Function(2) => Keycode::F2,
            Self::Function(3) => Keycode::F3,
            Self::Function(4) => Keycode::F4,
            Self::Function(5) => Keycode::F5,
            Self::Function(6) => Keycode::F6,
            Self::Function(7) => Keycode::F7,
            Self::Function(8) => Keycode::F8,
            Self::Function(9) => Keycode::F9,
            Self::Function(10) => Keycode::F10,
            Self::Function(11) => Keycode::F11,
            Self::Function(_) => Keycode::F12,
            Self::Escape => Keycode::Escape,
        }
    }
}

/// Background watcher that raises a [`StopSignal`] when the hotkey is held.
///
/// The watcher thread is joined when the guard is dropped.
#[derive(Debug)]
pub struct StopHotkey {
    hotkey: Hotkey,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StopHotkey {
    /// Starts polling the keyboard for `hotkey`.
    pub fn spawn(hotkey: Hotkey, stop: StopSignal) -> Result<Self, DesktopError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let watcher_shutdown = Arc::clone(&shutdown);
        let keycode = hotkey.keycode();

        let handle = thread::Builder::new()
            .name("stop-hotkey".to_owned())
            .spawn(move || {
                let device = DeviceState::new();
                while !watcher_shutdown.load(Ordering::SeqCst) && !stop.is_raised() {
                    if device.get_keys().contains(&keycode) {
                        info!(%hotkey, "stop hotkey pressed");
                        stop.raise();
                        break;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            })
            .map_err(DesktopError::Hotkey)?;

        info!(%hotkey, "stop hotkey registered");
        Ok(Self {
            hotkey,
            shutdown,
            handle: Some(handle),
        })
    }
}

impl Drop for StopHotkey {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(hotkey = %self.hotkey, "hotkey watcher panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_function_keys_and_escape() {
        assert_eq!("F12".parse(), Ok(Hotkey::Function(12)));
        assert_eq!(" f1 ".parse(), Ok(Hotkey::Function(1)));
        assert_eq!("Escape".parse(), Ok(Hotkey::Escape));
        assert_eq!(Hotkey::Function(12).keycode(), Keycode::F12);
    }

    #[test]
    fn rejects_unknown_keys() {
        for name in ["F0", "F13", "Space", "", "F"] {
            assert!(name.parse::<Hotkey>().is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn display_round_trips() {
        for hotkey in [Hotkey::Function(7), Hotkey::Escape] {
            assert_eq!(hotkey.to_string().parse(), Ok(hotkey));
        }
    }
}
