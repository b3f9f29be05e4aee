#![no_std]

pub mod command;
pub mod engine;
pub mod gamma;
pub mod module;
pub mod pattern;
pub mod pwm;
pub mod scheduler;

pub use command::{
    CommandChannel, CommandReceiver, CommandSender, ModuleCommand, TryReceiveError, TrySendError,
};
pub use engine::{StackLight, StackLightConfig};
pub use gamma::GammaTable;
pub use module::Module;
pub use pattern::{ModuleConfig, Pattern, PulseShape};
pub use pwm::PwmOutputs;
pub use scheduler::{TickResult, UpdateScheduler};
pub use self_test::{SelfTest, SelfTestConfig};

pub use embassy_time::{Duration, Instant};

/// Abstract output driver trait.
///
/// Implement this trait to support different hardware platforms.
/// The engine is generic over this trait.
pub trait OutputDriver {
    /// Identifier of a single output.
    type Channel: Copy;

    /// Prepare a channel for output. Called once per channel before any write.
    fn configure(&mut self, channel: Self::Channel);

    /// Set the duty cycle (0-255) of a channel.
    fn write(&mut self, channel: Self::Channel, duty: u8);
}

/// Source of the current time.
pub trait Clock {
    /// Read the current time.
    fn now(&self) -> Instant;
}

/// Clock backed by the `embassy-time` driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock reading the time from a function or closure.
#[derive(Debug, Clone, Copy)]
pub struct FnClock<F>(pub F);

impl<F: Fn() -> Instant> Clock for FnClock<F> {
    fn now(&self) -> Instant {
        (self.0)()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
