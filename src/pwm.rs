//! Output driver over `embedded-hal` PWM channels

use embedded_hal::pwm::SetDutyCycle;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::OutputDriver;

/// Array of PWM channels addressed by index.
///
/// Duty values 0-255 are scaled onto each channel's own range.
/// Write errors are dropped.
pub struct PwmOutputs<P: SetDutyCycle, const M: usize> {
    channels: [P; M],
}

impl<P: SetDutyCycle, const M: usize> PwmOutputs<P, M> {
    /// Wrap an array of PWM channels.
    pub const fn new(channels: [P; M]) -> Self {
        Self { channels }
    }

    /// Channel indices, for passing to the engine.
    pub fn indices() -> [usize; M] {
        core::array::from_fn(|index| index)
    }

    /// Get a channel by index.
    pub fn channel(&self, index: usize) -> Option<&P> {
        self.channels.get(index)
    }

    /// Release the wrapped channels.
    pub fn into_inner(self) -> [P; M] {
        self.channels
    }
}

impl<P: SetDutyCycle, const M: usize> OutputDriver for PwmOutputs<P, M> {
    type Channel = usize;

    fn configure(&mut self, channel: usize) {
        let Some(pwm) = self.channels.get_mut(channel) else {
            return;
        };
        if let Err(_err) = pwm.set_duty_cycle_fully_off() {
            #[cfg(feature = "esp32-log")]
            println!("[PwmOutputs.configure] channel {}: {:?}", channel, _err);
        }
    }

    fn write(&mut self, channel: usize, duty: u8) {
        let Some(pwm) = self.channels.get_mut(channel) else {
            #[cfg(feature = "esp32-log")]
            println!("[PwmOutputs.write] unknown channel {}", channel);
            return;
        };
        if let Err(_err) = pwm.set_duty_cycle_fraction(u16::from(duty), u16::from(u8::MAX)) {
            #[cfg(feature = "esp32-log")]
            println!("[PwmOutputs.write] channel {}: {:?}", channel, _err);
        }
    }
}
