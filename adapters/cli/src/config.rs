use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use snake_autoplay_core::{Direction, GridGeometry, DEFAULT_GRID_PITCH};
use snake_autoplay_desktop::Hotkey;
use snake_autoplay_session::LoopTiming;
use snake_autoplay_system_game_over::GameOverTuning;
use snake_autoplay_system_object_detection::DetectionTuning;

const DEFAULT_WINDOW_TITLE: &str = "贪吃蛇游戏";

/// Complete autoplayer configuration as read from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AutoplayConfig {
    pub(crate) window: WindowConfig,
    pub(crate) grid: GridConfig,
    pub(crate) detection: DetectionTuning,
    pub(crate) game_over: GameOverTuning,
    pub(crate) timing: TimingConfig,
    pub(crate) control: ControlConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    /// Exact title of the game window.
    pub(crate) title: String,
    /// Pixels between the window's top edge and the play area.
    pub(crate) title_bar_offset: u32,
    pub(crate) activation_settle_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_WINDOW_TITLE.to_owned(),
            title_bar_offset: 30,
            activation_settle_ms: 1000,
        }
    }
}

impl WindowConfig {
    pub(crate) fn activation_settle(&self) -> Duration {
        Duration::from_millis(self.activation_settle_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridConfig {
    /// Side length of one cell in pixels.
    pub(crate) pitch: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_GRID_PITCH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TimingConfig {
    pub(crate) tick_delay_ms: u64,
    pub(crate) restart_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: 10,
            restart_settle_ms: 1500,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ControlConfig {
    pub(crate) initial_direction: Direction,
    /// `F1`..`F12` or `Escape`.
    pub(crate) stop_hotkey: String,
    /// Seed for tie-breaking; drawn from the OS when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) seed: Option<u64>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            initial_direction: Direction::Right,
            stop_hotkey: "F12".to_owned(),
            seed: None,
        }
    }
}

impl AutoplayConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let _ = self.geometry()?;
        let _ = self.hotkey()?;
        Ok(())
    }

    pub(crate) fn geometry(&self) -> Result<GridGeometry> {
        GridGeometry::new(self.grid.pitch).context("grid.pitch must be positive")
    }

    pub(crate) fn hotkey(&self) -> Result<Hotkey> {
        self.control
            .stop_hotkey
            .parse()
            .context("control.stop_hotkey is not supported")
    }

    pub(crate) fn timing(&self) -> LoopTiming {
        LoopTiming {
            tick_delay: Duration::from_millis(self.timing.tick_delay_ms),
            restart_settle: Duration::from_millis(self.timing.restart_settle_ms),
            initial_direction: self.control.initial_direction,
        }
    }

    pub(crate) fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render configuration as toml")
    }
}
