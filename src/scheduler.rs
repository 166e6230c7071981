//! Periodic driver that fires ticks at the configured cadence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::cell::Timestamp;
use crate::clock::Clock;
use crate::engine::{SimulationEngine, TickReport};
use crate::rng::RandomSource;

/// Stops a [`Scheduler`] from firing further ticks.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Fires `tick()` once per interval while the engine is running.
///
/// The timer is only rearmed after a tick returns, so a slow tick delays the
/// next one instead of overlapping it. The interval is re-read from the
/// engine's configuration on every poll.
#[derive(Debug, Default)]
pub struct Scheduler {
    armed_at: Option<Timestamp>,
    seen_resumes: u64,
    cancel: CancellationHandle,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    /// Runs a tick if one is due.
    ///
    /// While the engine is paused the timer is disarmed. The first poll after
    /// a resume arms it again, even if no poll saw the pause, so ticking
    /// restarts a full interval later.
    pub fn poll<R: RandomSource, C: Clock>(
        &mut self,
        engine: &mut SimulationEngine<R, C>,
    ) -> Option<TickReport> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if !engine.is_running() {
            self.armed_at = None;
            return None;
        }
        if engine.resume_count() != self.seen_resumes {
            self.seen_resumes = engine.resume_count();
            self.armed_at = None;
        }
        let now = engine.clock().now();
        let armed_at = *self.armed_at.get_or_insert(now);
        if now.millis_since(armed_at) < engine.config().tick_interval_ms {
            return None;
        }

        let report = engine.tick();
        self.armed_at = Some(engine.clock().now());
        Some(report)
    }

    /// How long until the next tick would be due.
    pub fn time_until_due<R: RandomSource, C: Clock>(&self, engine: &SimulationEngine<R, C>) -> Duration {
        let interval = engine.config().tick_interval_ms;
        let waited = self
            .armed_at
            .map_or(0, |armed_at| engine.clock().now().millis_since(armed_at));
        Duration::from_millis(interval.saturating_sub(waited))
    }

    /// Polls until cancelled, sleeping between polls.
    ///
    /// `on_tick` sees the engine after every executed tick and may issue
    /// commands on it.
    pub fn run<R, C, F>(&mut self, engine: &mut SimulationEngine<R, C>, mut on_tick: F)
    where
        R: RandomSource,
        C: Clock,
        F: FnMut(&mut SimulationEngine<R, C>, &TickReport),
    {
        while !self.cancel.is_cancelled() {
            if let Some(report) = self.poll(engine) {
                on_tick(engine, &report);
            }
            let timeout = self.time_until_due(engine).max(Duration::from_millis(1));
            thread::sleep(timeout);
        }
        debug!("scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SimulationConfig;
    use crate::rng::ScriptedRandom;

    fn engine() -> (SimulationEngine<ScriptedRandom, ManualClock>, ManualClock) {
        let clock = ManualClock::at(0);
        let config = SimulationConfig::new(60_000, 0.05, 100).expect("valid config");
        let engine = SimulationEngine::with_parts(config, 5, ScriptedRandom::constant(0.99), clock.clone())
            .expect("engine");
        (engine, clock)
    }

    #[test]
    fn fires_once_per_interval() {
        let (mut engine, clock) = engine();
        let mut scheduler = Scheduler::new();

        assert!(scheduler.poll(&mut engine).is_none());
        clock.advance(99);
        assert!(scheduler.poll(&mut engine).is_none());
        assert_eq!(scheduler.time_until_due(&engine), Duration::from_millis(1));
        clock.advance(1);
        assert!(scheduler.poll(&mut engine).is_some());
        assert!(scheduler.poll(&mut engine).is_none());
        clock.advance(250);
        assert!(scheduler.poll(&mut engine).is_some());
        assert!(scheduler.poll(&mut engine).is_none());
        assert_eq!(engine.growth().len(), 2);
    }

    #[test]
    fn paused_engine_is_never_ticked() {
        let (mut engine, clock) = engine();
        let mut scheduler = Scheduler::new();
        scheduler.poll(&mut engine);
        engine.pause();
        clock.advance(1000);
        assert!(scheduler.poll(&mut engine).is_none());

        engine.resume();
        // Rearmed on the first poll after resuming.
        assert!(scheduler.poll(&mut engine).is_none());
        clock.advance(100);
        assert!(scheduler.poll(&mut engine).is_some());
    }

    #[test]
    fn pause_between_polls_restarts_the_interval() {
        let (mut engine, clock) = engine();
        let mut scheduler = Scheduler::new();
        scheduler.poll(&mut engine);
        clock.set(10);
        engine.pause();
        clock.set(90);
        engine.resume();

        clock.set(100);
        assert!(scheduler.poll(&mut engine).is_none());
        clock.set(199);
        assert!(scheduler.poll(&mut engine).is_none());
        clock.set(200);
        assert!(scheduler.poll(&mut engine).is_some());
        assert_eq!(engine.growth().len(), 1);
    }

    #[test]
    fn interval_change_applies_to_next_arm() {
        let (mut engine, clock) = engine();
        let mut scheduler = Scheduler::new();
        scheduler.poll(&mut engine);
        engine.configure(60_000, 0.05, 500).expect("valid");
        clock.advance(100);
        assert!(scheduler.poll(&mut engine).is_none());
        clock.advance(400);
        assert!(scheduler.poll(&mut engine).is_some());
    }

    #[test]
    fn cancelled_scheduler_stops_immediately() {
        let (mut engine, clock) = engine();
        let mut scheduler = Scheduler::new();
        let handle = scheduler.cancellation_handle();
        scheduler.poll(&mut engine);
        handle.cancel();
        clock.advance(1000);
        assert!(scheduler.poll(&mut engine).is_none());

        // Returns without sleeping forever.
        scheduler.run(&mut engine, |_, _| unreachable!("no tick after cancel"));
        assert!(engine.growth().is_empty());
    }
}
