#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Control loop that plays the game one captured frame at a time.
//!
//! The loop owns an [`AutoplayState`] and drives it through the
//! `Running -> GameOverRecovery -> Running` cycle until the [`StopSignal`] is
//! raised or an I/O seam fails. Screen capture, key injection and waiting are
//! all injected, so the same loop runs against the desktop or scripted tests.

mod pause;
mod state;

use std::time::Duration;

use rand::Rng;
use snake_autoplay_core::{
    CaptureError, DispatchError, Direction, FrameSource, GridGeometry, Key, KeySink,
};
use snake_autoplay_system_decision::DecisionEngine;
use snake_autoplay_system_dispatch::ActionDispatcher;
use snake_autoplay_system_game_over::GameOverDetector;
use snake_autoplay_system_object_detection::ObjectDetector;
use snake_autoplay_vision::HsvImage;
use thiserror::Error;
use tracing::{debug, error, info};

pub use pause::{Pause, ThreadPause, DEFAULT_PAUSE_SLICE};
pub use state::{AutoplayState, Phase, StopSignal};

/// Delays and starting conditions of the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopTiming {
    /// Wait after each steering tick.
    pub tick_delay: Duration,
    /// Wait after pressing restart before capturing again.
    pub restart_settle: Duration,
    /// Direction assumed before the first key is sent.
    pub initial_direction: Direction,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            tick_delay: Duration::from_millis(10),
            restart_settle: Duration::from_millis(1500),
            initial_direction: Direction::Right,
        }
    }
}

/// Failure that ends the control loop.
#[derive(Debug, Error)]
pub enum AutoplayError {
    /// The frame source failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The key sink failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Why the control loop exited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The stop signal was raised.
    Requested,
    /// An I/O seam failed; carries the rendered error.
    Failed(String),
}

/// Summary returned once the control loop exits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Frames captured while running.
    pub ticks: u64,
    /// Direction keys sent.
    pub moves: u64,
    /// Restart keys sent.
    pub restarts: u64,
    /// Why the loop exited.
    pub outcome: StopReason,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: u64,
    moves: u64,
    restarts: u64,
}

/// Wires the detectors, decision engine and dispatcher into the control loop.
#[derive(Debug)]
pub struct Autoplay<R> {
    detector: ObjectDetector,
    game_over: GameOverDetector,
    engine: DecisionEngine<R>,
    dispatcher: ActionDispatcher,
    geometry: GridGeometry,
    timing: LoopTiming,
    pending: Vec<Key>,
}

impl<R: Rng> Autoplay<R> {
    /// Assembles a loop from its systems.
    #[must_use]
    pub fn new(
        detector: ObjectDetector,
        game_over: GameOverDetector,
        engine: DecisionEngine<R>,
        geometry: GridGeometry,
        timing: LoopTiming,
    ) -> Self {
        Self {
            detector,
            game_over,
            engine,
            dispatcher: ActionDispatcher::new(),
            geometry,
            timing,
            pending: Vec::new(),
        }
    }

    /// Runs until `stop` is raised or a seam fails.
    pub fn run<F, K, P>(
        &mut self,
        frames: &mut F,
        keys: &mut K,
        pause: &mut P,
        stop: &StopSignal,
    ) -> RunReport
    where
        F: FrameSource,
        K: KeySink,
        P: Pause,
    {
        let mut state = AutoplayState::new(self.timing.initial_direction, stop.clone());
        let mut counters = Counters::default();
        info!(direction = %state.current_direction(), "autoplay started");

        let outcome = loop {
            if state.stop_requested() {
                break StopReason::Requested;
            }

            let step = match state.phase() {
                Phase::Running => self.tick(&mut state, frames, keys, &mut counters),
                Phase::GameOverRecovery => self.recover(&mut state, keys, &mut counters),
                Phase::Stopped => break StopReason::Requested,
            };

            match step {
                Ok(Some(delay)) => pause.pause(delay, stop),
                Ok(None) => {}
                Err(err) => {
                    error!(error = %err, "autoplay loop failed");
                    break StopReason::Failed(err.to_string());
                }
            }
        };

        state.stop();
        info!(
            ticks = counters.ticks,
            moves = counters.moves,
            restarts = counters.restarts,
            "autoplay stopped"
        );

        RunReport {
            ticks: counters.ticks,
            moves: counters.moves,
            restarts: counters.restarts,
            outcome,
        }
    }

    /// Runs one steering tick, returning the delay to wait before the next one.
    fn tick<F: FrameSource, K: KeySink>(
        &mut self,
        state: &mut AutoplayState,
        frames: &mut F,
        keys: &mut K,
        counters: &mut Counters,
    ) -> Result<Option<Duration>, AutoplayError> {
        let frame = frames.capture()?;
        counters.ticks += 1;

        let hsv = HsvImage::from_rgb(&frame);
        let observation = self.detector.detect_hsv(&hsv);
        let grid = self.geometry.size_for(frame.width(), frame.height());

        if !state.is_game_over()
            && self
                .game_over
                .inspect_hsv(&hsv, observation.food())
                .is_game_over()
        {
            info!("game over detected");
            state.enter_recovery();
            return Ok(None);
        }

        let current = state.current_direction();
        let decision = self.engine.decide(&observation, current, grid);
        state.request(decision.direction);
        debug!(
            current = %current,
            next = %state.next_direction(),
            reason = ?decision.reason,
            "decision made"
        );

        if state.stop_requested() {
            return Ok(None);
        }

        self.pending.clear();
        let committed = self
            .dispatcher
            .dispatch(state.next_direction(), current, &mut self.pending);
        for key in self.pending.drain(..) {
            keys.press(key)?;
            counters.moves += 1;
        }
        if committed != current {
            debug!(from = %current, to = %committed, "direction changed");
        }
        state.commit(committed);

        Ok(Some(self.timing.tick_delay))
    }

    fn recover<K: KeySink>(
        &mut self,
        state: &mut AutoplayState,
        keys: &mut K,
        counters: &mut Counters,
    ) -> Result<Option<Duration>, AutoplayError> {
        keys.press(Key::Restart)?;
        counters.restarts += 1;
        info!(restarts = counters.restarts, "restart requested");
        state.resume();
        Ok(Some(self.timing.restart_settle))
    }
}
