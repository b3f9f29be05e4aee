//! Update pacing
//!
//! Portable tick pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping between ticks.

use embassy_time::{Duration, Instant};

use crate::command::CommandReceiver;
use crate::{Clock, OutputDriver, StackLight};

/// Default update rate (50 Hz).
pub const DEFAULT_UPDATE_RATE: u64 = 50;

/// Default duration between updates.
pub const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_UPDATE_RATE);

/// Result of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// Deadline of the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero when behind schedule).
    pub sleep_duration: Duration,
}

/// Drives a [`StackLight`] at a fixed cadence.
///
/// Each tick applies the queued commands before updating the engine, so
/// configuration changes never land in the middle of an update.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = UpdateScheduler::new(engine, COMMANDS.receiver());
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     sleep_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct UpdateScheduler<'a, O: OutputDriver, C: Clock, const N: usize, const SIZE: usize> {
    engine: StackLight<O, C, N>,
    commands: CommandReceiver<'a, SIZE>,
    next_tick: Instant,
    tick_duration: Duration,
}

impl<'a, O: OutputDriver, C: Clock, const N: usize, const SIZE: usize>
    UpdateScheduler<'a, O, C, N, SIZE>
{
    /// Create a scheduler ticking at [`DEFAULT_TICK_DURATION`].
    pub fn new(engine: StackLight<O, C, N>, commands: CommandReceiver<'a, SIZE>) -> Self {
        Self::with_tick_duration(engine, commands, DEFAULT_TICK_DURATION)
    }

    /// Create a scheduler with a custom tick duration.
    pub fn with_tick_duration(
        engine: StackLight<O, C, N>,
        commands: CommandReceiver<'a, SIZE>,
        tick_duration: Duration,
    ) -> Self {
        Self {
            engine,
            commands,
            next_tick: Instant::from_millis(0),
            tick_duration,
        }
    }

    /// Apply pending commands, update the engine and return timing information.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        // Skip the backlog after a stall instead of bursting to catch up
        let max_drift = self.tick_duration.as_millis() * 2;
        if now.as_millis() > self.next_tick.as_millis() + max_drift {
            self.next_tick = now;
        }

        self.engine.apply_pending(&self.commands);
        self.engine.update_at(now);

        self.next_tick += self.tick_duration;

        let sleep_duration = if self.next_tick > now {
            self.next_tick - now
        } else {
            Duration::from_millis(0)
        };

        TickResult {
            next_deadline: self.next_tick,
            sleep_duration,
        }
    }

    /// Get a reference to the engine.
    pub fn engine(&self) -> &StackLight<O, C, N> {
        &self.engine
    }

    /// Get a mutable reference to the engine.
    pub fn engine_mut(&mut self) -> &mut StackLight<O, C, N> {
        &mut self.engine
    }
}
