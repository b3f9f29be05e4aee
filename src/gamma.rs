//! Perceptual brightness correction
//!
//! LEDs respond linearly to duty cycle while the eye does not, so raw
//! brightness values are remapped through a power curve before they reach
//! the output.

/// Default gamma exponent.
pub const DEFAULT_GAMMA: f32 = 2.5;

/// Precomputed gamma lookup table.
///
/// Maps a raw brightness (0-255) to `round(255 * (raw / 255) ^ gamma)`.
#[derive(Debug, Clone)]
pub struct GammaTable {
    lut: [u8; 256],
}

impl GammaTable {
    /// Build a table for the given exponent.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(exponent: f32) -> Self {
        let mut lut = [0u8; 256];
        for (raw, corrected) in (0..=u8::MAX).zip(lut.iter_mut()) {
            let x = f32::from(raw) / 255.0;
            let y = libm::roundf(libm::powf(x, exponent) * 255.0);
            *corrected = y.clamp(0.0, 255.0) as u8;
        }
        Self { lut }
    }

    /// Corrected value for a raw brightness.
    #[inline]
    pub const fn correct(&self, raw: u8) -> u8 {
        self.lut[raw as usize]
    }

    /// Raw table contents, indexed by raw brightness.
    pub const fn as_slice(&self) -> &[u8; 256] {
        &self.lut
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        Self::new(DEFAULT_GAMMA)
    }
}
