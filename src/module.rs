use embassy_time::{Duration, Instant};

use crate::pattern::{ModuleConfig, Pattern, PulseShape, flash_is_on};

/// State of one light module.
///
/// The pattern is kept as its raw id so that an unknown id can be stored
/// and rendered as off.
#[derive(Debug, Clone, Copy)]
pub struct Module<C> {
    channel: C,
    pattern: u8,
    brightness: u8,
    period: Duration,
    param: u8,
}

impl<C: Copy> Module<C> {
    /// Solid, fully off module.
    pub(crate) const fn new(channel: C) -> Self {
        Self {
            channel,
            pattern: Pattern::Solid.as_raw(),
            brightness: 0,
            period: Duration::from_millis(0),
            param: 0,
        }
    }

    /// Output channel this module drives.
    pub const fn channel(&self) -> C {
        self.channel
    }

    /// Configured pattern, `None` if the stored id is unknown.
    pub const fn pattern(&self) -> Option<Pattern> {
        Pattern::from_raw(self.pattern)
    }

    /// Maximum brightness used by the pattern.
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Length of one half-cycle for flash and pulse.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Reserved pattern parameter.
    pub const fn param(&self) -> u8 {
        self.param
    }

    pub(crate) const fn configure(&mut self, config: &ModuleConfig) {
        self.set_raw(
            config.pattern.as_raw(),
            config.brightness,
            config.period,
            config.param,
        );
    }

    pub(crate) const fn set_raw(&mut self, pattern: u8, brightness: u8, period: Duration, param: u8) {
        self.pattern = pattern;
        self.brightness = brightness;
        self.period = period;
        self.param = param;
    }

    pub(crate) const fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub(crate) const fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    pub(crate) const fn set_param(&mut self, param: u8) {
        self.param = param;
    }

    /// Brightness of the pattern at `now`, before gamma correction.
    pub(crate) const fn level(&self, now: Instant) -> u8 {
        match self.pattern() {
            Some(Pattern::Solid) => self.brightness,
            Some(Pattern::Flash) => {
                if flash_is_on(now, self.period) {
                    self.brightness
                } else {
                    0
                }
            }
            Some(Pattern::Pulse) => PulseShape::new(self.brightness, self.period)
                .with_smooth()
                .level(now),
            None => 0,
        }
    }
}
