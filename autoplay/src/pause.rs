use std::{thread, time::Duration};

use crate::StopSignal;

/// Default granularity of [`ThreadPause`].
pub const DEFAULT_PAUSE_SLICE: Duration = Duration::from_millis(10);

/// Waits between loop iterations.
pub trait Pause {
    /// Waits for up to `duration`, returning early once `stop` is raised.
    fn pause(&mut self, duration: Duration, stop: &StopSignal);
}

/// Sleeps the calling thread in short slices so that stop requests are noticed promptly.
#[derive(Clone, Copy, Debug)]
pub struct ThreadPause {
    slice: Duration,
}

impl ThreadPause {
    /// Creates a pause that re-checks the stop signal every `slice`.
    #[must_use]
    pub fn new(slice: Duration) -> Self {
        Self {
            slice: slice.max(Duration::from_millis(1)),
        }
    }
}

impl Default for ThreadPause {
    fn default() -> Self {
        Self::new(DEFAULT_PAUSE_SLICE)
    }
}

impl Pause for ThreadPause {
    fn pause(&mut self, duration: Duration, stop: &StopSignal) {
        let mut remaining = duration;
        while !remaining.is_zero() && !stop.is_raised() {
            let nap = remaining.min(self.slice);
            thread::sleep(nap);
            remaining = remaining.saturating_sub(nap);
        }
    }
}
