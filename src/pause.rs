//! Suspending the tick clock without eating into cell lifespans.

use rayon::prelude::*;

use crate::cell::Timestamp;
use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseController {
    running: bool,
    pause_started_at: Option<Timestamp>,
    resumes: u64,
}

impl Default for PauseController {
    fn default() -> Self {
        Self::running()
    }
}

impl PauseController {
    pub fn running() -> Self {
        PauseController {
            running: true,
            pause_started_at: None,
            resumes: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn paused_since(&self) -> Option<Timestamp> {
        self.pause_started_at
    }

    /// Number of pause/resume cycles completed so far.
    pub fn resume_count(&self) -> u64 {
        self.resumes
    }

    /// Time as the simulation sees it: frozen at the pause instant while
    /// paused, the clock's reading otherwise.
    pub fn effective_now(&self, clock_now: Timestamp) -> Timestamp {
        self.pause_started_at.unwrap_or(clock_now)
    }

    /// Stops the clock. Returns `false` if it was already paused.
    pub fn pause(&mut self, now: Timestamp) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.pause_started_at = Some(now);
        true
    }

    /// Restarts the clock and pushes every living cell's birth time forward by
    /// the length of the pause.
    ///
    /// Returns the pause length in milliseconds, or `None` if already running.
    pub fn resume(&mut self, now: Timestamp, grid: &mut Grid) -> Option<u64> {
        if self.running {
            return None;
        }
        let delta = self
            .pause_started_at
            .take()
            .map_or(0, |started| now.millis_since(started));
        grid.cells_mut()
            .par_iter_mut()
            .filter(|cell| cell.alive)
            .for_each(|cell| cell.birth_time = cell.birth_time.shifted_by(delta));
        self.running = true;
        self.resumes += 1;
        Some(delta)
    }
}
