use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Exact rational controller gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gain {
    /// Numerator
    pub numerator: i64,
    /// Denominator, non-zero
    pub denominator: i64,
}

impl Gain {
    /// Term disabled
    pub const ZERO: Self = Self::new(0, 1);

    /// `numerator / denominator`
    #[must_use]
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Scale `value`, truncating toward zero and saturating at the `i128` range
    #[must_use]
    pub fn apply(&self, value: i128) -> i128 {
        if self.denominator == 0 {
            return 0;
        }
        value
            .saturating_mul(i128::from(self.numerator))
            .saturating_div(i128::from(self.denominator))
    }

    /// Whether the gain contributes nothing
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }
}

/// Media clock recovery tuning
///
/// Defaults match a CS2100-class fractional-N PLL driven from a 100 MHz
/// reference timer: integral-only correction at 1/500, no proportional
/// term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Fractional bits of the internal wordlen (`F`)
    pub fractional_bits: u32,

    /// Fractional bits of the wordlen handed to the pacing consumer (`W`)
    pub external_fractional_bits: u32,

    /// Local reference timer frequency in Hz
    pub ref_clock_hz: u32,

    /// Proportional gain, applied to the change in error
    pub kp: Gain,

    /// Integral gain
    pub ki: Gain,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            fractional_bits: 24,
            external_fractional_bits: 16,
            ref_clock_hz: 100_000_000,
            kp: Gain::ZERO,
            ki: Gain::new(1, 500),
        }
    }
}

impl RecoveryConfig {
    /// Largest internal width for which the clamped integral error
    /// (`2^30 << F`) still fits a signed 64-bit accumulator
    pub const MAX_FRACTIONAL_BITS: u32 = 32;

    /// Create a new config builder
    #[must_use]
    pub fn builder() -> RecoveryConfigBuilder {
        RecoveryConfigBuilder::default()
    }

    /// Check fixed-point widths and gains
    ///
    /// # Errors
    ///
    /// Returns `InvalidFractionalBits` unless `W < F <= 32`, or
    /// `InvalidGain` for a zero denominator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fractional_bits <= self.external_fractional_bits
            || self.fractional_bits > Self::MAX_FRACTIONAL_BITS
        {
            return Err(ConfigError::InvalidFractionalBits {
                internal: self.fractional_bits,
                external: self.external_fractional_bits,
            });
        }
        if self.kp.denominator == 0 {
            return Err(ConfigError::InvalidGain { name: "kp" });
        }
        if self.ki.denominator == 0 {
            return Err(ConfigError::InvalidGain { name: "ki" });
        }
        Ok(())
    }
}

/// Builder for `RecoveryConfig`
#[derive(Debug, Clone, Default)]
pub struct RecoveryConfigBuilder {
    config: RecoveryConfig,
}

impl RecoveryConfigBuilder {
    /// Set internal fractional bits
    #[must_use]
    pub fn fractional_bits(mut self, bits: u32) -> Self {
        self.config.fractional_bits = bits;
        self
    }

    /// Set external fractional bits
    #[must_use]
    pub fn external_fractional_bits(mut self, bits: u32) -> Self {
        self.config.external_fractional_bits = bits;
        self
    }

    /// Set reference timer frequency
    #[must_use]
    pub fn ref_clock_hz(mut self, hz: u32) -> Self {
        self.config.ref_clock_hz = hz;
        self
    }

    /// Set proportional gain
    #[must_use]
    pub fn kp(mut self, gain: Gain) -> Self {
        self.config.kp = gain;
        self
    }

    /// Set integral gain
    #[must_use]
    pub fn ki(mut self, gain: Gain) -> Self {
        self.config.ki = gain;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> RecoveryConfig {
        self.config
    }
}
