use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use snake_autoplay_core::Direction;

/// Shared flag that asks the control loop to stop.
///
/// Clones observe the same flag, so a watcher thread can hold one clone while
/// the loop polls another.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a signal that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop. Raising twice has no further effect.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Reports whether a stop was requested.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// Stage of the control loop state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Capturing frames and steering the snake.
    Running,
    /// Game over was detected; a restart is pending.
    GameOverRecovery,
    /// The loop has exited.
    Stopped,
}

/// Mutable state owned by the control loop.
#[derive(Clone, Debug)]
pub struct AutoplayState {
    current_direction: Direction,
    next_direction: Direction,
    phase: Phase,
    game_over: bool,
    stop: StopSignal,
}

impl AutoplayState {
    /// Creates a running state heading in `initial_direction`.
    #[must_use]
    pub fn new(initial_direction: Direction, stop: StopSignal) -> Self {
        Self {
            current_direction: initial_direction,
            next_direction: initial_direction,
            phase: Phase::Running,
            game_over: false,
            stop,
        }
    }

    /// Direction most recently committed to the game.
    #[must_use]
    pub const fn current_direction(&self) -> Direction {
        self.current_direction
    }

    /// Direction most recently requested by the decision engine.
    #[must_use]
    pub const fn next_direction(&self) -> Direction {
        self.next_direction
    }

    /// Current stage of the state machine.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the game-over banner was seen and not yet acted on.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.is_raised()
    }

    pub(crate) fn request(&mut self, direction: Direction) {
        self.next_direction = direction;
    }

    pub(crate) fn commit(&mut self, direction: Direction) {
        self.current_direction = direction;
    }

    pub(crate) fn enter_recovery(&mut self) {
        self.game_over = true;
        self.phase = Phase::GameOverRecovery;
    }

    pub(crate) fn resume(&mut self) {
        self.game_over = false;
        self.phase = Phase::Running;
    }

    pub(crate) fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }
}
