//! Pattern identifiers and waveform math
//!
//! All waveforms are derived from absolute time, so the rate at which the
//! engine is updated never changes pattern speed. Times and periods are
//! condensed by [`PERIOD_DIVISOR`] before the modulo arithmetic.

use embassy_time::{Duration, Instant};

/// Divisor applied to times and periods before waveform arithmetic.
pub const PERIOD_DIVISOR: u64 = 16;

/// Period used when a pattern is set without an explicit one (0.5 Hz).
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(2000);

const PATTERN_NAME_SOLID: &str = "solid";
const PATTERN_NAME_FLASH: &str = "flash";
const PATTERN_NAME_PULSE: &str = "pulse";

const PATTERN_ID_SOLID: u8 = 0;
const PATTERN_ID_FLASH: u8 = 1;
const PATTERN_ID_PULSE: u8 = 2;

/// Waveform shape of a module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Pattern {
    /// Constant brightness.
    #[default]
    Solid = PATTERN_ID_SOLID,
    /// Square wave: on for one period, off for the next.
    Flash = PATTERN_ID_FLASH,
    /// Triangle wave: fade in over one period, fade out over the next.
    Pulse = PATTERN_ID_PULSE,
}

impl Pattern {
    /// Look up a pattern by its numeric id.
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            PATTERN_ID_SOLID => Self::Solid,
            PATTERN_ID_FLASH => Self::Flash,
            PATTERN_ID_PULSE => Self::Pulse,
            _ => return None,
        })
    }

    /// Numeric id of the pattern.
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Lowercase name of the pattern.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => PATTERN_NAME_SOLID,
            Self::Flash => PATTERN_NAME_FLASH,
            Self::Pulse => PATTERN_NAME_PULSE,
        }
    }

    /// Look up a pattern by its lowercase name.
    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            PATTERN_NAME_SOLID => Some(Self::Solid),
            PATTERN_NAME_FLASH => Some(Self::Flash),
            PATTERN_NAME_PULSE => Some(Self::Pulse),
            _ => None,
        }
    }
}

/// Full configuration of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleConfig {
    pub pattern: Pattern,
    /// Maximum brightness used by the pattern.
    pub brightness: u8,
    /// Length of one half-cycle for flash and pulse.
    pub period: Duration,
    /// Reserved pattern parameter, not read by any current pattern.
    pub param: u8,
}

impl ModuleConfig {
    /// Configuration with default brightness (0), period and param (0).
    pub const fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            brightness: 0,
            period: DEFAULT_PERIOD,
            param: 0,
        }
    }

    /// Set the maximum brightness.
    #[must_use]
    pub const fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    /// Set the half-cycle length.
    #[must_use]
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the reserved parameter.
    #[must_use]
    pub const fn with_param(mut self, param: u8) -> Self {
        self.param = param;
        self
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self::new(Pattern::Solid)
    }
}

/// Condensed period, never zero.
///
/// Periods shorter than one divisor step behave as exactly one step.
#[inline]
pub(crate) const fn condensed_period(period: Duration) -> u64 {
    let period = period.as_millis() / PERIOD_DIVISOR;
    if period == 0 { 1 } else { period }
}

/// Condensed time.
#[inline]
pub(crate) const fn condensed_time(now: Instant) -> u64 {
    now.as_millis() / PERIOD_DIVISOR
}

/// Whether condensed time `t` falls in the second half of a `2 * period` cycle.
#[inline]
const fn is_second_half(t: u64, period: u64) -> bool {
    t % (2 * period) != t % period
}

/// Whether a flash with the given half-period is lit at `now`.
///
/// Every cycle starts lit.
pub const fn flash_is_on(now: Instant, period: Duration) -> bool {
    !is_second_half(condensed_time(now), condensed_period(period))
}

/// Linear fade between two brightness levels.
///
/// The fade goes from `off_brightness` to `brightness` over one `period`.
/// A smooth pulse then fades back down over the next period (triangle wave),
/// otherwise it jumps back to the off level (saw wave).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseShape {
    /// Level reached at the top of the fade.
    pub brightness: u8,
    /// Duration of one fade.
    pub period: Duration,
    /// Mirror every other fade.
    pub smooth: bool,
    /// Level at the bottom of the fade.
    pub off_brightness: u8,
    /// Phase shift; a fade starts when `(now + offset) % period == 0`.
    pub offset: Duration,
}

impl PulseShape {
    /// Saw wave from 0 to `brightness`.
    pub const fn new(brightness: u8, period: Duration) -> Self {
        Self {
            brightness,
            period,
            smooth: false,
            off_brightness: 0,
            offset: Duration::from_millis(0),
        }
    }

    /// Fade back down instead of jumping to the off level.
    #[must_use]
    pub const fn with_smooth(mut self) -> Self {
        self.smooth = true;
        self
    }

    /// Set the level at the bottom of the wave.
    #[must_use]
    pub const fn with_off_brightness(mut self, off_brightness: u8) -> Self {
        self.off_brightness = off_brightness;
        self
    }

    /// Shift the wave in time.
    #[must_use]
    pub const fn with_offset(mut self, offset: Duration) -> Self {
        self.offset = offset;
        self
    }

    /// Brightness at `now`, before gamma correction.
    ///
    /// Never exceeds `brightness`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
    pub const fn level(&self, now: Instant) -> u8 {
        let period = condensed_period(self.period);
        let t = condensed_time(now).wrapping_add(self.offset.as_millis() / PERIOD_DIVISOR);

        let invert = self.smooth && is_second_half(t, period);
        let mut phase = t % period;
        if invert {
            phase = period - phase;
        }

        let range = self.brightness.saturating_sub(self.off_brightness) as u64;
        let level = phase * range / period + self.off_brightness as u64;
        if level > self.brightness as u64 {
            self.brightness
        } else {
            level as u8
        }
    }
}
