#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates requested directions into key presses.

use snake_autoplay_core::{Direction, Key};

/// Pure system that emits at most one key per requested direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionDispatcher;

impl ActionDispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Commits `requested` against `current`, pushing a key when the direction changes.
    ///
    /// A request for the reverse of `current` is treated as a request to hold
    /// course. Returns the direction that is committed after the call.
    pub fn dispatch(
        &self,
        requested: Direction,
        current: Direction,
        out: &mut Vec<Key>,
    ) -> Direction {
        let direction = if requested == current.reverse() {
            current
        } else {
            requested
        };

        if direction != current {
            out.push(Key::Direction(direction));
        }

        direction
    }
}
